//! The simplicial complex: vertices, edges, triangles, and their adjacency.
//!
//! Storage is arena-based with generation-checked handles; all iteration
//! runs in ascending slot order so that the update engine's work queues are
//! deterministic. Triangles store their vertex triple in counter-clockwise
//! order and carry the single owning phase label; edge and vertex phase
//! membership is derived from triangle incidence.

use hashbrown::HashMap;
use itertools::Itertools;

use crate::data::positions::PositionState;
use crate::geometry::signed_area;
use crate::mesh_error::MeshMorphError;
use crate::phase::PhaseLabel;
use crate::topology::arena::Arena;
use crate::topology::handle::{EdgeId, TriId, VertexId};

#[derive(Debug, Clone, Default)]
pub(crate) struct Vertex {
    /// Incident edges, kept sorted ascending.
    pub(crate) edges: Vec<EdgeId>,
}

#[derive(Debug, Clone)]
pub(crate) struct Edge {
    pub(crate) vertices: [VertexId; 2],
    /// Incident triangles; 1 for boundary edges, 2 for interior edges.
    pub(crate) tris: Vec<TriId>,
}

#[derive(Debug, Clone)]
pub(crate) struct Triangle {
    /// CCW vertex triple.
    pub(crate) vertices: [VertexId; 3],
    /// `edges[i]` connects `vertices[i]` and `vertices[(i + 1) % 3]`.
    pub(crate) edges: [EdgeId; 3],
    pub(crate) label: PhaseLabel,
}

/// Owner of all mesh elements and their incidence relations.
#[derive(Debug, Clone, Default)]
pub struct SimplicialComplex {
    pub(crate) vertices: Arena<Vertex>,
    pub(crate) edges: Arena<Edge>,
    pub(crate) tris: Arena<Triangle>,
    /// Canonical (min slot, max slot) vertex pair to edge lookup.
    pub(crate) edge_lookup: HashMap<(u32, u32), EdgeId>,
}

impl SimplicialComplex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a complex from a static input mesh.
    ///
    /// Triangles are CCW-normalized against the input coordinates before
    /// insertion; the returned [`PositionState`] seeds every vertex with
    /// `current == target == input position`.
    ///
    /// # Errors
    /// Fails fast on out-of-range vertex indices, non-positive triangle
    /// area after normalization, duplicate triangles, or an edge shared by
    /// more than two triangles (non-manifold input).
    pub fn from_static_mesh(
        coordinates: &[[f64; 2]],
        triangles: &[[usize; 3]],
        labels: &[PhaseLabel],
    ) -> Result<(Self, PositionState), MeshMorphError> {
        let mut complex = Self::new();
        let mut positions = PositionState::new();

        let vertex_ids: Vec<VertexId> = coordinates
            .iter()
            .map(|&p| {
                let v = complex.insert_vertex();
                positions.insert(v, p);
                v
            })
            .collect();

        let mut seen: HashMap<[usize; 3], usize> = HashMap::new();
        for (tri_index, tri) in triangles.iter().enumerate() {
            for &index in tri {
                if index >= vertex_ids.len() {
                    return Err(MeshMorphError::VertexIndexOutOfRange {
                        triangle: tri_index,
                        index,
                        vertex_count: vertex_ids.len(),
                    });
                }
            }

            let mut key = *tri;
            key.sort_unstable();
            if seen.insert(key, tri_index).is_some() {
                return Err(MeshMorphError::DuplicateTriangle { triangle: tri_index });
            }

            // Normalize to CCW under the kernel's convention.
            let [i0, i1, i2] = *tri;
            let area = signed_area(coordinates[i0], coordinates[i1], coordinates[i2]);
            let (i0, i1, i2) = if area < 0.0 { (i0, i2, i1) } else { (i0, i1, i2) };
            let area = area.abs();
            if area <= 0.0 {
                return Err(MeshMorphError::DegenerateInputTriangle {
                    triangle: tri_index,
                    area: area.into(),
                });
            }

            let label = labels.get(tri_index).copied().unwrap_or_default();
            let verts = [vertex_ids[i0], vertex_ids[i1], vertex_ids[i2]];
            complex.insert_triangle(verts, label)?;
        }

        log::info!(
            "loaded static mesh: {} vertices, {} edges, {} triangles",
            complex.vertex_count(),
            complex.edge_count(),
            complex.triangle_count()
        );
        Ok((complex, positions))
    }

    // --- element counts and iteration -----------------------------------

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.tris.len()
    }

    /// Live vertex handles in ascending slot order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices
            .iter()
            .map(|(slot, generation, _)| VertexId::new(slot, generation))
    }

    /// Live edge handles in ascending slot order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges
            .iter()
            .map(|(slot, generation, _)| EdgeId::new(slot, generation))
    }

    /// Live triangle handles in ascending slot order.
    pub fn triangles(&self) -> impl Iterator<Item = TriId> + '_ {
        self.tris
            .iter()
            .map(|(slot, generation, _)| TriId::new(slot, generation))
    }

    pub fn contains_vertex(&self, v: VertexId) -> bool {
        self.vertices.contains(v.slot(), v.generation())
    }

    pub fn contains_edge(&self, e: EdgeId) -> bool {
        self.edges.contains(e.slot(), e.generation())
    }

    pub fn contains_triangle(&self, t: TriId) -> bool {
        self.tris.contains(t.slot(), t.generation())
    }

    /// Slot capacity per dimension; attribute columns size to these.
    pub fn slot_counts(&self) -> [usize; 3] {
        [
            self.vertices.slot_count(),
            self.edges.slot_count(),
            self.tris.slot_count(),
        ]
    }

    // --- adjacency queries ----------------------------------------------

    pub(crate) fn vertex(&self, v: VertexId) -> Result<&Vertex, MeshMorphError> {
        self.vertices
            .get(v.slot(), v.generation())
            .ok_or(MeshMorphError::StaleVertex(v))
    }

    pub(crate) fn edge(&self, e: EdgeId) -> Result<&Edge, MeshMorphError> {
        self.edges
            .get(e.slot(), e.generation())
            .ok_or(MeshMorphError::StaleEdge(e))
    }

    pub(crate) fn tri(&self, t: TriId) -> Result<&Triangle, MeshMorphError> {
        self.tris
            .get(t.slot(), t.generation())
            .ok_or(MeshMorphError::StaleTriangle(t))
    }

    /// Endpoints of an edge.
    pub fn edge_vertices(&self, e: EdgeId) -> Result<[VertexId; 2], MeshMorphError> {
        Ok(self.edge(e)?.vertices)
    }

    /// Incident triangles of an edge (1 for boundary, 2 for interior).
    pub fn edge_triangles(&self, e: EdgeId) -> Result<&[TriId], MeshMorphError> {
        Ok(&self.edge(e)?.tris)
    }

    /// CCW vertex triple of a triangle.
    pub fn triangle_vertices(&self, t: TriId) -> Result<[VertexId; 3], MeshMorphError> {
        Ok(self.tri(t)?.vertices)
    }

    /// The three edges of a triangle; `edges[i]` joins vertices `i` and `i+1`.
    pub fn triangle_edges(&self, t: TriId) -> Result<[EdgeId; 3], MeshMorphError> {
        Ok(self.tri(t)?.edges)
    }

    /// Owning phase label of a triangle.
    pub fn triangle_label(&self, t: TriId) -> Result<PhaseLabel, MeshMorphError> {
        Ok(self.tri(t)?.label)
    }

    pub fn set_triangle_label(&mut self, t: TriId, label: PhaseLabel) -> Result<(), MeshMorphError> {
        self.tris
            .get_mut(t.slot(), t.generation())
            .ok_or(MeshMorphError::StaleTriangle(t))?
            .label = label;
        Ok(())
    }

    /// Incident edges of a vertex, ascending.
    pub fn vertex_edges(&self, v: VertexId) -> Result<&[EdgeId], MeshMorphError> {
        Ok(&self.vertex(v)?.edges)
    }

    /// Triangles incident to a vertex, ascending and deduplicated.
    pub fn vertex_triangles(&self, v: VertexId) -> Result<Vec<TriId>, MeshMorphError> {
        let mut tris: Vec<TriId> = Vec::new();
        for &e in &self.vertex(v)?.edges {
            tris.extend_from_slice(&self.edge(e)?.tris);
        }
        Ok(tris.into_iter().sorted_unstable().dedup().collect())
    }

    /// Vertex neighbors of a vertex, ascending.
    pub fn vertex_neighbors(&self, v: VertexId) -> Result<Vec<VertexId>, MeshMorphError> {
        let mut out = Vec::new();
        for &e in &self.vertex(v)?.edges {
            let [a, b] = self.edge(e)?.vertices;
            out.push(if a == v { b } else { a });
        }
        Ok(out.into_iter().sorted_unstable().dedup().collect())
    }

    /// The edge joining two vertices, if one exists.
    pub fn edge_between(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        let key = canonical_pair(a, b);
        self.edge_lookup.get(&key).copied().filter(|&e| {
            // Guard against a stale lookup entry after slot reuse.
            self.edges
                .get(e.slot(), e.generation())
                .is_some_and(|edge| {
                    let [x, y] = edge.vertices;
                    (x == a && y == b) || (x == b && y == a)
                })
        })
    }

    /// Vertex of `t` not on edge `e`.
    pub fn opposite_vertex(&self, t: TriId, e: EdgeId) -> Result<VertexId, MeshMorphError> {
        let [a, b] = self.edge(e)?.vertices;
        let verts = self.tri(t)?.vertices;
        verts
            .into_iter()
            .find(|&v| v != a && v != b)
            .ok_or(MeshMorphError::DanglingReference {
                from: format!("triangle {t} does not span edge {e}"),
            })
    }

    /// An edge with exactly one incident triangle lies on the domain boundary.
    pub fn is_boundary_edge(&self, e: EdgeId) -> Result<bool, MeshMorphError> {
        Ok(self.edge(e)?.tris.len() == 1)
    }

    /// An edge on the domain boundary or between triangles of different
    /// labels separates phases.
    pub fn is_interface_edge(&self, e: EdgeId) -> Result<bool, MeshMorphError> {
        let edge = self.edge(e)?;
        match edge.tris.as_slice() {
            [t] => {
                let _ = self.tri(*t)?;
                Ok(true)
            }
            [t0, t1] => Ok(self.tri(*t0)?.label != self.tri(*t1)?.label),
            other => Err(MeshMorphError::EdgeTriangleCount {
                edge: e,
                count: other.len(),
            }),
        }
    }

    /// Whether any incident edge of `v` lies on the domain boundary.
    pub fn is_boundary_vertex(&self, v: VertexId) -> Result<bool, MeshMorphError> {
        for &e in &self.vertex(v)?.edges {
            if self.is_boundary_edge(e)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether any incident edge of `v` separates phases.
    pub fn is_interface_vertex(&self, v: VertexId) -> Result<bool, MeshMorphError> {
        for &e in &self.vertex(v)?.edges {
            if self.is_interface_edge(e)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Labels of all triangles incident to a vertex, ascending.
    pub fn vertex_labels(&self, v: VertexId) -> Result<Vec<PhaseLabel>, MeshMorphError> {
        let labels: Vec<PhaseLabel> = self
            .vertex_triangles(v)?
            .into_iter()
            .map(|t| self.tri(t).map(|tri| tri.label))
            .collect::<Result<_, _>>()?;
        Ok(labels.into_iter().sorted_unstable().dedup().collect())
    }

    /// Labels of the triangles incident to an edge, ascending.
    pub fn edge_labels(&self, e: EdgeId) -> Result<Vec<PhaseLabel>, MeshMorphError> {
        let labels: Vec<PhaseLabel> = self
            .edge(e)?
            .tris
            .iter()
            .map(|&t| self.tri(t).map(|tri| tri.label))
            .collect::<Result<_, _>>()?;
        Ok(labels.into_iter().sorted_unstable().dedup().collect())
    }

    // --- internal element bookkeeping -----------------------------------

    pub(crate) fn insert_vertex(&mut self) -> VertexId {
        let (slot, generation) = self.vertices.insert(Vertex::default());
        VertexId::new(slot, generation)
    }

    /// Insert an edge between two live vertices, or return the existing one.
    pub(crate) fn ensure_edge(&mut self, a: VertexId, b: VertexId) -> (EdgeId, bool) {
        if let Some(existing) = self.edge_between(a, b) {
            return (existing, false);
        }
        let (slot, generation) = self.edges.insert(Edge {
            vertices: [a, b],
            tris: Vec::new(),
        });
        let e = EdgeId::new(slot, generation);
        self.edge_lookup.insert(canonical_pair(a, b), e);
        for v in [a, b] {
            if let Some(vertex) = self.vertices.get_mut(v.slot(), v.generation()) {
                let pos = vertex.edges.partition_point(|&x| x < e);
                vertex.edges.insert(pos, e);
            }
        }
        (e, true)
    }

    /// Insert a triangle over existing vertices, creating its edges.
    ///
    /// Enforces the two-triangles-per-edge bound; never called with an
    /// unnormalized (CW) triple.
    pub(crate) fn insert_triangle(
        &mut self,
        verts: [VertexId; 3],
        label: PhaseLabel,
    ) -> Result<TriId, MeshMorphError> {
        let mut edges = [EdgeId::new(0, 0); 3];
        for i in 0..3 {
            let (e, _) = self.ensure_edge(verts[i], verts[(i + 1) % 3]);
            if self.edge(e)?.tris.len() >= 2 {
                let [a, b] = self.edge(e)?.vertices;
                return Err(MeshMorphError::NonManifoldInput {
                    v0: a.slot() as usize,
                    v1: b.slot() as usize,
                    count: 3,
                });
            }
            edges[i] = e;
        }
        let (slot, generation) = self.tris.insert(Triangle {
            vertices: verts,
            edges,
            label,
        });
        let t = TriId::new(slot, generation);
        for e in edges {
            if let Some(edge) = self.edges.get_mut(e.slot(), e.generation()) {
                edge.tris.push(t);
                edge.tris.sort_unstable();
            }
        }
        Ok(t)
    }

    /// Remove a triangle, detaching it from its edges. Edges and vertices
    /// are left in place for the caller to clean up.
    pub(crate) fn remove_triangle(&mut self, t: TriId) -> Option<Triangle> {
        let tri = self.tris.remove(t.slot(), t.generation())?;
        for e in tri.edges {
            if let Some(edge) = self.edges.get_mut(e.slot(), e.generation()) {
                edge.tris.retain(|&x| x != t);
            }
        }
        Some(tri)
    }

    /// Remove an edge, detaching it from its endpoint vertices.
    pub(crate) fn remove_edge(&mut self, e: EdgeId) -> Option<Edge> {
        let edge = self.edges.remove(e.slot(), e.generation())?;
        let [a, b] = edge.vertices;
        if self
            .edge_lookup
            .get(&canonical_pair(a, b))
            .is_some_and(|&stored| stored == e)
        {
            self.edge_lookup.remove(&canonical_pair(a, b));
        }
        for v in [a, b] {
            if let Some(vertex) = self.vertices.get_mut(v.slot(), v.generation()) {
                vertex.edges.retain(|&x| x != e);
            }
        }
        Some(edge)
    }

    pub(crate) fn remove_vertex(&mut self, v: VertexId) -> Option<()> {
        self.vertices.remove(v.slot(), v.generation()).map(|_| ())
    }
}

/// Canonical unordered vertex-pair key for the edge lookup.
pub(crate) fn canonical_pair(a: VertexId, b: VertexId) -> (u32, u32) {
    let (x, y) = (a.slot(), b.slot());
    if x <= y { (x, y) } else { (y, x) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> (SimplicialComplex, PositionState) {
        // Two CCW triangles over the unit square.
        SimplicialComplex::from_static_mesh(
            &[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            &[[0, 1, 2], [0, 2, 3]],
            &[PhaseLabel(1), PhaseLabel(1)],
        )
        .unwrap()
    }

    #[test]
    fn build_counts_and_adjacency() {
        let (complex, _) = unit_square();
        assert_eq!(complex.vertex_count(), 4);
        assert_eq!(complex.edge_count(), 5);
        assert_eq!(complex.triangle_count(), 2);

        let v0 = complex.vertices().next().unwrap();
        let v2 = complex.vertices().nth(2).unwrap();
        let diagonal = complex.edge_between(v0, v2).unwrap();
        assert_eq!(complex.edge_triangles(diagonal).unwrap().len(), 2);
        assert!(!complex.is_boundary_edge(diagonal).unwrap());
    }

    #[test]
    fn cw_input_is_normalized() {
        let (complex, positions) = SimplicialComplex::from_static_mesh(
            &[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            &[[0, 2, 1]], // clockwise
            &[PhaseLabel(1)],
        )
        .unwrap();
        let t = complex.triangles().next().unwrap();
        let [a, b, c] = complex.triangle_vertices(t).unwrap();
        let area = signed_area(
            positions.current(a).unwrap(),
            positions.current(b).unwrap(),
            positions.current(c).unwrap(),
        );
        assert!(area > 0.0);
    }

    #[test]
    fn out_of_range_index_rejected() {
        let err = SimplicialComplex::from_static_mesh(
            &[[0.0, 0.0], [1.0, 0.0]],
            &[[0, 1, 5]],
            &[PhaseLabel(1)],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            MeshMorphError::VertexIndexOutOfRange { index: 5, .. }
        ));
    }

    #[test]
    fn zero_area_triangle_rejected() {
        let err = SimplicialComplex::from_static_mesh(
            &[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]],
            &[[0, 1, 2]],
            &[PhaseLabel(1)],
        )
        .unwrap_err();
        assert!(matches!(err, MeshMorphError::DegenerateInputTriangle { .. }));
    }

    #[test]
    fn duplicate_triangle_rejected() {
        let err = SimplicialComplex::from_static_mesh(
            &[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            &[[0, 1, 2], [1, 2, 0]],
            &[PhaseLabel(1), PhaseLabel(1)],
        )
        .unwrap_err();
        assert!(matches!(err, MeshMorphError::DuplicateTriangle { triangle: 1 }));
    }

    #[test]
    fn non_manifold_input_rejected() {
        // Three triangles sharing the edge (0, 1).
        let err = SimplicialComplex::from_static_mesh(
            &[[0.0, 0.0], [1.0, 0.0], [0.5, 1.0], [0.5, -1.0], [0.5, 2.0]],
            &[[0, 1, 2], [0, 3, 1], [0, 1, 4]],
            &[PhaseLabel(1); 3],
        )
        .unwrap_err();
        assert!(matches!(err, MeshMorphError::NonManifoldInput { .. }));
    }

    #[test]
    fn interface_classification() {
        let (mut complex, _) = unit_square();
        let t1 = complex.triangles().nth(1).unwrap();
        complex.set_triangle_label(t1, PhaseLabel(2)).unwrap();

        let v0 = complex.vertices().next().unwrap();
        let v2 = complex.vertices().nth(2).unwrap();
        let diagonal = complex.edge_between(v0, v2).unwrap();
        assert!(complex.is_interface_edge(diagonal).unwrap());
        assert_eq!(
            complex.edge_labels(diagonal).unwrap(),
            vec![PhaseLabel(1), PhaseLabel(2)]
        );
        assert_eq!(
            complex.vertex_labels(v0).unwrap(),
            vec![PhaseLabel(1), PhaseLabel(2)]
        );
    }

    #[test]
    fn stale_handle_detected() {
        let (mut complex, _) = unit_square();
        let t = complex.triangles().next().unwrap();
        complex.remove_triangle(t);
        assert!(matches!(
            complex.triangle_vertices(t),
            Err(MeshMorphError::StaleTriangle(_))
        ));
    }
}
