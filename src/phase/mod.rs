//! Phase labels and phase views.
//!
//! A phase is the set of triangles carrying one label, together with every
//! edge and vertex on those triangles. A [`Phase`] is an ordered snapshot
//! of that set: global handles in ascending order plus a global-to-local
//! vertex index map, so that bulk attribute and position transfers can use
//! dense local indexing. A snapshot is only valid until the next mutating
//! operation on the complex.

mod predicate;

pub use predicate::{
    And, InPhase, IsDimension, Not, OnDomainBoundary, OnInterface, Or, SimplexPredicate,
    SimplexRef,
};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::mesh_error::MeshMorphError;
use crate::topology::complex::SimplicialComplex;
use crate::topology::handle::{EdgeId, TriId, VertexId};

/// Label identifying the phase a triangle belongs to.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PhaseLabel(pub u32);

impl std::fmt::Display for PhaseLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Simplex dimension selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dimension {
    Vertex,
    Edge,
    Triangle,
}

/// Ordered snapshot of a subset of the complex.
///
/// Vertices, edges, and triangles appear in ascending global handle order;
/// `edge_locals` / `triangle_locals` express connectivity in local vertex
/// indices, parallel to `edges()` / `triangles()`.
#[derive(Debug, Clone, Default)]
pub struct Phase {
    labels: Vec<PhaseLabel>,
    vertices: Vec<VertexId>,
    vertex_local: HashMap<VertexId, u32>,
    edges: Vec<EdgeId>,
    edge_locals: Vec<[u32; 2]>,
    triangles: Vec<TriId>,
    triangle_locals: Vec<[u32; 3]>,
}

impl Phase {
    /// Labels covered by this snapshot, ascending.
    pub fn labels(&self) -> &[PhaseLabel] {
        &self.labels
    }

    /// Global vertex handles, ascending.
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// Global edge handles, ascending.
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Global triangle handles, ascending.
    pub fn triangles(&self) -> &[TriId] {
        &self.triangles
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Local index of a global vertex handle, if it belongs to the phase.
    pub fn local_vertex(&self, v: VertexId) -> Option<u32> {
        self.vertex_local.get(&v).copied()
    }

    /// Endpoints of `edges()[i]` as local vertex indices.
    pub fn edge_local(&self, i: usize) -> Option<[u32; 2]> {
        self.edge_locals.get(i).copied()
    }

    /// Vertex triple of `triangles()[i]` as local vertex indices, CCW.
    pub fn triangle_local(&self, i: usize) -> Option<[u32; 3]> {
        self.triangle_locals.get(i).copied()
    }

    /// Assemble a snapshot from explicit element sets. Vertices of every
    /// listed edge and triangle are added to close the set downward.
    fn assemble(
        complex: &SimplicialComplex,
        mut vertices: Vec<VertexId>,
        mut edges: Vec<EdgeId>,
        mut triangles: Vec<TriId>,
    ) -> Result<Self, MeshMorphError> {
        triangles.sort_unstable();
        triangles.dedup();
        edges.sort_unstable();
        edges.dedup();
        for &e in &edges {
            vertices.extend(complex.edge_vertices(e)?);
        }
        for &t in &triangles {
            vertices.extend(complex.triangle_vertices(t)?);
        }
        vertices.sort_unstable();
        vertices.dedup();

        let vertex_local: HashMap<VertexId, u32> = vertices
            .iter()
            .enumerate()
            .map(|(i, &v)| (v, i as u32))
            .collect();

        let edge_locals = edges
            .iter()
            .map(|&e| {
                let [a, b] = complex.edge_vertices(e)?;
                Ok([vertex_local[&a], vertex_local[&b]])
            })
            .collect::<Result<_, MeshMorphError>>()?;
        let triangle_locals = triangles
            .iter()
            .map(|&t| {
                let [a, b, c] = complex.triangle_vertices(t)?;
                Ok([vertex_local[&a], vertex_local[&b], vertex_local[&c]])
            })
            .collect::<Result<_, MeshMorphError>>()?;

        let mut labels: Vec<PhaseLabel> = triangles
            .iter()
            .map(|&t| complex.triangle_label(t))
            .collect::<Result<_, _>>()?;
        labels.sort_unstable();
        labels.dedup();

        Ok(Self {
            labels,
            vertices,
            vertex_local,
            edges,
            edge_locals,
            triangles,
            triangle_locals,
        })
    }
}

/// Snapshot of all triangles with `label`, closed downward.
pub fn make_phase(
    complex: &SimplicialComplex,
    label: PhaseLabel,
) -> Result<Phase, MeshMorphError> {
    filter(complex, &InPhase(label))
}

/// Snapshot of the whole complex.
pub fn make_phase_all(complex: &SimplicialComplex) -> Result<Phase, MeshMorphError> {
    let vertices = complex.vertices().collect();
    let edges = complex.edges().collect();
    let triangles = complex.triangles().collect();
    Phase::assemble(complex, vertices, edges, triangles)
}

/// Snapshot of every simplex matched by `predicate`, closed downward so
/// local connectivity stays well defined.
pub fn filter<P: SimplexPredicate + ?Sized>(
    complex: &SimplicialComplex,
    predicate: &P,
) -> Result<Phase, MeshMorphError> {
    let vertices = complex
        .vertices()
        .filter(|&v| predicate.matches(complex, SimplexRef::Vertex(v)))
        .collect();
    let edges = complex
        .edges()
        .filter(|&e| predicate.matches(complex, SimplexRef::Edge(e)))
        .collect();
    let triangles = complex
        .triangles()
        .filter(|&t| predicate.matches(complex, SimplexRef::Triangle(t)))
        .collect();
    Phase::assemble(complex, vertices, edges, triangles)
}
