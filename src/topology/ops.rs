//! Transactional local operations: edge split, edge collapse, edge flip.
//!
//! Each operation follows a plan/commit discipline: all rejection checks
//! run against the untouched complex first, and mutation only begins once
//! the operation is known to succeed. A rejected operation leaves the
//! complex bit-identical; a committed one returns a [`MutationDelta`] for
//! the attribute columns and position state to replay.

use crate::data::positions::PositionState;
use crate::geometry::signed_area;
use crate::mesh_error::MeshMorphError;
use crate::phase::PhaseLabel;
use crate::topology::complex::{SimplicialComplex, canonical_pair};
use crate::topology::delta::{EdgeAttrOrigin, MutationDelta, TriAttrOrigin};
use crate::topology::handle::{EdgeId, TriId, VertexId};

/// Sentinel standing in for the not-yet-created split vertex while child
/// triples are planned.
const PLACEHOLDER: VertexId = VertexId::new(u32::MAX, u32::MAX);

struct SplitChildPlan {
    parent: TriId,
    opposite: VertexId,
    /// Parent triple with the far endpoint replaced by [`PLACEHOLDER`].
    verts_near: [VertexId; 3],
    /// Parent triple with the near endpoint replaced by [`PLACEHOLDER`].
    verts_far: [VertexId; 3],
    parent_edges: [EdgeId; 3],
    label: PhaseLabel,
}

impl SimplicialComplex {
    /// Split `edge` by inserting a vertex at `position`.
    ///
    /// The 1-2 incident triangles are each replaced by two children. The
    /// two halves of the split edge inherit its attribute values and the
    /// spokes to the opposite vertices are tagged with the parent
    /// triangle's edge average. Returns the new vertex and the committed
    /// delta.
    ///
    /// # Errors
    /// [`MeshMorphError::StaleEdge`] for a dead handle,
    /// [`MeshMorphError::SplitWouldDegenerate`] if any child triangle would
    /// have non-positive area at `position`.
    pub fn split_edge(
        &mut self,
        edge: EdgeId,
        position: [f64; 2],
        positions: &PositionState,
    ) -> Result<(VertexId, MutationDelta), MeshMorphError> {
        // Plan.
        let [a, b] = self.edge(edge)?.vertices;
        let incident: Vec<TriId> = self.edge(edge)?.tris.clone();

        let mut plans = Vec::with_capacity(incident.len());
        for &t in &incident {
            let tri = self.tri(t)?;
            let opposite = self.opposite_vertex(t, edge)?;
            // Substituting the new vertex for one endpoint keeps the stored
            // CCW rotation, so the children need no re-orientation.
            let verts_near = tri.vertices.map(|v| if v == b { PLACEHOLDER } else { v });
            let verts_far = tri.vertices.map(|v| if v == a { PLACEHOLDER } else { v });
            let plan = SplitChildPlan {
                parent: t,
                opposite,
                verts_near,
                verts_far,
                parent_edges: tri.edges,
                label: tri.label,
            };
            for verts in [&plan.verts_near, &plan.verts_far] {
                if planned_area(verts, position, positions)? <= 0.0 {
                    return Err(MeshMorphError::SplitWouldDegenerate(edge));
                }
            }
            plans.push(plan);
        }

        // Commit.
        let mut delta = MutationDelta::default();
        for &t in &incident {
            self.remove_triangle(t);
            delta.removed_triangles.push(t);
        }
        self.remove_edge(edge);
        delta.removed_edges.push(edge);

        let midpoint = self.insert_vertex();
        delta.created_vertices.push((midpoint, position));

        // The two halves of the split edge.
        for endpoint in [a, b] {
            let (half, _created) = self.ensure_edge(midpoint, endpoint);
            debug_assert!(_created);
            delta
                .created_edges
                .push((half, EdgeAttrOrigin::Inherit(edge)));
        }

        for plan in &plans {
            let (spoke, _created) = self.ensure_edge(midpoint, plan.opposite);
            debug_assert!(_created);
            delta
                .created_edges
                .push((spoke, EdgeAttrOrigin::Average(plan.parent_edges)));

            for verts in [plan.verts_near, plan.verts_far] {
                let verts = verts.map(|v| if v == PLACEHOLDER { midpoint } else { v });
                let child = self.insert_triangle(verts, plan.label)?;
                delta
                    .created_triangles
                    .push((child, TriAttrOrigin::Inherit(plan.parent)));
            }
        }

        Ok((midpoint, delta))
    }

    /// Collapse `edge`, merging its endpoints into `survivor` placed at
    /// `placement`.
    ///
    /// The edge and its incident triangles disappear. Edges of the removed
    /// endpoint are rewired to the survivor in place, so surviving edges
    /// and triangles keep their handles and attribute values.
    ///
    /// # Errors
    /// Rejected without side effects when the link condition fails, when
    /// the collapse would pinch the domain boundary, or when any surviving
    /// triangle would end up with non-positive area at `placement`.
    pub fn collapse_edge(
        &mut self,
        edge: EdgeId,
        survivor: VertexId,
        placement: [f64; 2],
        positions: &PositionState,
    ) -> Result<(VertexId, MutationDelta), MeshMorphError> {
        // Plan.
        let [a, b] = self.edge(edge)?.vertices;
        if survivor != a && survivor != b {
            return Err(MeshMorphError::StaleVertex(survivor));
        }
        let removed = if survivor == a { b } else { a };
        let dead_tris: Vec<TriId> = self.edge(edge)?.tris.clone();

        let opposites: Vec<VertexId> = dead_tris
            .iter()
            .map(|&t| self.opposite_vertex(t, edge))
            .collect::<Result<_, _>>()?;

        // Link condition: the only common neighbors of the endpoints must
        // be the opposite vertices of the dying triangles; anything else
        // means the collapse would glue two triangles onto the same vertex
        // pair.
        let survivor_neighbors = self.vertex_neighbors(survivor)?;
        let removed_neighbors = self.vertex_neighbors(removed)?;
        let mut common: Vec<VertexId> = survivor_neighbors
            .iter()
            .copied()
            .filter(|v| removed_neighbors.contains(v))
            .collect();
        common.sort_unstable();
        let mut expected = opposites.clone();
        expected.sort_unstable();
        expected.dedup();
        if common != expected {
            return Err(MeshMorphError::CollapseNonManifold(edge));
        }

        // Collapsing an interior edge between two boundary vertices would
        // pinch the domain boundary into a non-manifold vertex.
        if !self.is_boundary_edge(edge)?
            && self.is_boundary_vertex(survivor)?
            && self.is_boundary_vertex(removed)?
        {
            return Err(MeshMorphError::CollapseNonManifold(edge));
        }

        // Each merged edge pair must end up with 1 or 2 incident triangles.
        for &opposite in &opposites {
            let to_survivor = self.edge_between(survivor, opposite);
            let to_removed = self.edge_between(removed, opposite);
            let (Some(to_survivor), Some(to_removed)) = (to_survivor, to_removed) else {
                return Err(MeshMorphError::CollapseNonManifold(edge));
            };
            let live = |e: EdgeId| -> Result<usize, MeshMorphError> {
                Ok(self
                    .edge(e)?
                    .tris
                    .iter()
                    .filter(|t| !dead_tris.contains(t))
                    .count())
            };
            let merged = live(to_survivor)? + live(to_removed)?;
            if merged == 0 || merged > 2 {
                return Err(MeshMorphError::CollapseNonManifold(edge));
            }
        }

        // Orientation: every surviving triangle touching either endpoint
        // is re-evaluated with the survivor at `placement`.
        for v in [survivor, removed] {
            for t in self.vertex_triangles(v)? {
                if dead_tris.contains(&t) {
                    continue;
                }
                let verts = self.tri(t)?.vertices;
                let area = planned_area_merged(&verts, survivor, removed, placement, positions)?;
                if area <= 0.0 {
                    return Err(MeshMorphError::CollapseWouldInvert(edge));
                }
            }
        }

        // Commit.
        let mut delta = MutationDelta::default();
        for &t in &dead_tris {
            self.remove_triangle(t);
            delta.removed_triangles.push(t);
        }
        self.remove_edge(edge);
        delta.removed_edges.push(edge);

        // Merge the duplicate edge pairs along the dead triangles; the
        // survivor-side edge keeps its identity and attribute values.
        for &opposite in &opposites {
            let Some(to_removed) = self.edge_between(removed, opposite) else {
                continue;
            };
            let to_survivor = self
                .edge_between(survivor, opposite)
                .ok_or(MeshMorphError::CollapseNonManifold(edge))?;
            let orphan_tris: Vec<TriId> = self.edge(to_removed)?.tris.clone();
            self.remove_edge(to_removed);
            delta.removed_edges.push(to_removed);
            for t in orphan_tris {
                self.repoint_triangle_edge(t, to_removed, to_survivor)?;
            }
        }

        // Rewire the remaining edges of the removed endpoint in place.
        let leftover: Vec<EdgeId> = self.vertex_edges(removed)?.to_vec();
        for e in leftover {
            self.rename_edge_endpoint(e, removed, survivor)?;
        }

        // Fix up the vertex triples of every triangle now reaching the
        // survivor through the rewired edges.
        for t in self.vertex_triangles(survivor)? {
            self.replace_triangle_vertex(t, removed, survivor)?;
        }

        self.remove_vertex(removed);
        delta.removed_vertices.push(removed);
        delta.moved_vertices.push((survivor, placement));

        Ok((survivor, delta))
    }

    /// Flip an interior edge, replacing it with the opposite diagonal of
    /// the incident quadrilateral.
    ///
    /// The new diagonal inherits the old edge's attribute values; each new
    /// triangle inherits from one of the removed pair.
    ///
    /// # Errors
    /// Rejected for boundary edges, label-mismatched triangle pairs,
    /// pre-existing opposite diagonals, and flips that would invert either
    /// resulting triangle.
    pub fn flip_edge(
        &mut self,
        edge: EdgeId,
        positions: &PositionState,
    ) -> Result<(EdgeId, MutationDelta), MeshMorphError> {
        // Plan.
        let [a, b] = self.edge(edge)?.vertices;
        let incident = self.edge(edge)?.tris.clone();
        let [t0, t1] = match incident.as_slice() {
            [t0, t1] => [*t0, *t1],
            [_] => return Err(MeshMorphError::FlipBoundaryEdge(edge)),
            other => {
                return Err(MeshMorphError::EdgeTriangleCount {
                    edge,
                    count: other.len(),
                });
            }
        };

        let label = self.tri(t0)?.label;
        if label != self.tri(t1)?.label {
            return Err(MeshMorphError::FlipLabelMismatch(edge));
        }

        let p = self.opposite_vertex(t0, edge)?;
        let q = self.opposite_vertex(t1, edge)?;
        if self.edge_between(p, q).is_some() {
            return Err(MeshMorphError::FlipDuplicateEdge(edge));
        }

        // With t0 = (.., a, b, ..) in CCW rotation the quad cycle is
        // (b, p, a, q); the flipped diagonal carves it into (p, a, q) and
        // (q, b, p).
        let (a, b) = orient_shared_edge(self.tri(t0)?.vertices, a, b);
        let n0 = [p, a, q];
        let n1 = [q, b, p];
        for verts in [n0, n1] {
            let area = signed_area(
                positions.current(verts[0])?,
                positions.current(verts[1])?,
                positions.current(verts[2])?,
            );
            if area <= 0.0 {
                return Err(MeshMorphError::FlipWouldInvert(edge));
            }
        }

        // Commit.
        let mut delta = MutationDelta::default();
        for t in [t0, t1] {
            self.remove_triangle(t);
            delta.removed_triangles.push(t);
        }
        self.remove_edge(edge);
        delta.removed_edges.push(edge);

        let first = self.insert_triangle(n0, label)?;
        delta
            .created_triangles
            .push((first, TriAttrOrigin::Inherit(t0)));
        let second = self.insert_triangle(n1, label)?;
        delta
            .created_triangles
            .push((second, TriAttrOrigin::Inherit(t1)));

        let diagonal = self
            .edge_between(p, q)
            .ok_or(MeshMorphError::StaleEdge(edge))?;
        delta
            .created_edges
            .push((diagonal, EdgeAttrOrigin::Inherit(edge)));

        Ok((diagonal, delta))
    }

    // --- commit helpers --------------------------------------------------

    /// Point triangle `t` at `new_edge` wherever it referenced `old_edge`.
    fn repoint_triangle_edge(
        &mut self,
        t: TriId,
        old_edge: EdgeId,
        new_edge: EdgeId,
    ) -> Result<(), MeshMorphError> {
        let tri = self
            .tris
            .get_mut(t.slot(), t.generation())
            .ok_or(MeshMorphError::StaleTriangle(t))?;
        for e in &mut tri.edges {
            if *e == old_edge {
                *e = new_edge;
            }
        }
        let new = self
            .edges
            .get_mut(new_edge.slot(), new_edge.generation())
            .ok_or(MeshMorphError::StaleEdge(new_edge))?;
        if !new.tris.contains(&t) {
            new.tris.push(t);
            new.tris.sort_unstable();
        }
        Ok(())
    }

    /// Rename one endpoint of `e`, keeping its identity and attributes.
    fn rename_edge_endpoint(
        &mut self,
        e: EdgeId,
        from: VertexId,
        to: VertexId,
    ) -> Result<(), MeshMorphError> {
        let [a, b] = self.edge(e)?.vertices;
        let old_key = canonical_pair(a, b);
        let renamed = [
            if a == from { to } else { a },
            if b == from { to } else { b },
        ];
        {
            let edge = self
                .edges
                .get_mut(e.slot(), e.generation())
                .ok_or(MeshMorphError::StaleEdge(e))?;
            edge.vertices = renamed;
        }
        if self.edge_lookup.get(&old_key).is_some_and(|&x| x == e) {
            self.edge_lookup.remove(&old_key);
        }
        self.edge_lookup
            .insert(canonical_pair(renamed[0], renamed[1]), e);

        if let Some(vertex) = self.vertices.get_mut(from.slot(), from.generation()) {
            vertex.edges.retain(|&x| x != e);
        }
        if let Some(vertex) = self.vertices.get_mut(to.slot(), to.generation()) {
            if !vertex.edges.contains(&e) {
                let pos = vertex.edges.partition_point(|&x| x < e);
                vertex.edges.insert(pos, e);
            }
        }
        Ok(())
    }

    /// Substitute `from` with `to` in a triangle's vertex triple.
    fn replace_triangle_vertex(
        &mut self,
        t: TriId,
        from: VertexId,
        to: VertexId,
    ) -> Result<(), MeshMorphError> {
        let tri = self
            .tris
            .get_mut(t.slot(), t.generation())
            .ok_or(MeshMorphError::StaleTriangle(t))?;
        for v in &mut tri.vertices {
            if *v == from {
                *v = to;
            }
        }
        Ok(())
    }
}

/// Signed area of a planned triple where [`PLACEHOLDER`] stands for the
/// new vertex at `position`.
fn planned_area(
    verts: &[VertexId; 3],
    position: [f64; 2],
    positions: &PositionState,
) -> Result<f64, MeshMorphError> {
    let mut pts = [[0.0; 2]; 3];
    for (i, &v) in verts.iter().enumerate() {
        pts[i] = if v == PLACEHOLDER {
            position
        } else {
            positions.current(v)?
        };
    }
    Ok(signed_area(pts[0], pts[1], pts[2]))
}

/// Signed area of a triple after merging `removed` into `survivor` at
/// `placement`.
fn planned_area_merged(
    verts: &[VertexId; 3],
    survivor: VertexId,
    removed: VertexId,
    placement: [f64; 2],
    positions: &PositionState,
) -> Result<f64, MeshMorphError> {
    let mut pts = [[0.0; 2]; 3];
    for (i, &v) in verts.iter().enumerate() {
        pts[i] = if v == survivor || v == removed {
            placement
        } else {
            positions.current(v)?
        };
    }
    Ok(signed_area(pts[0], pts[1], pts[2]))
}

/// Return `(a, b)` ordered so `a` directly precedes `b` in the CCW
/// rotation of the reference triangle triple.
fn orient_shared_edge(verts: [VertexId; 3], a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    for i in 0..3 {
        if verts[i] == a && verts[(i + 1) % 3] == b {
            return (a, b);
        }
        if verts[i] == b && verts[(i + 1) % 3] == a {
            return (b, a);
        }
    }
    (a, b)
}
