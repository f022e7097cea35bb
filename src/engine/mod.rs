//! The adaptive update engine.
//!
//! [`MeshEngine`] owns the three coupled stores: the simplicial complex
//! (topology), the attribute columns, and the position state. All mutation
//! goes through the engine so the three never drift apart: every committed
//! topology operation's delta is replayed onto attributes and positions
//! before the next operation runs.

mod parameters;
mod update;

pub use parameters::Parameters;
pub use update::UpdateReport;

use crate::data::attributes::AttributeStore;
use crate::data::positions::PositionState;
use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshMorphError;
use crate::phase::PhaseLabel;
use crate::topology::complex::SimplicialComplex;
use crate::topology::handle::{EdgeId, VertexId};

/// Owner of the mesh, its attributes, and its positions.
#[derive(Debug, Clone, Default)]
pub struct MeshEngine {
    complex: SimplicialComplex,
    attributes: AttributeStore,
    positions: PositionState,
    sparse_edge_attributes: bool,
}

impl MeshEngine {
    /// Load a static input mesh.
    pub fn from_static_mesh(
        coordinates: &[[f64; 2]],
        triangles: &[[usize; 3]],
        labels: &[PhaseLabel],
    ) -> Result<Self, MeshMorphError> {
        let (complex, positions) =
            SimplicialComplex::from_static_mesh(coordinates, triangles, labels)?;
        Ok(Self {
            complex,
            attributes: AttributeStore::new(),
            positions,
            sparse_edge_attributes: false,
        })
    }

    pub fn complex(&self) -> &SimplicialComplex {
        &self.complex
    }

    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeStore {
        &mut self.attributes
    }

    pub fn positions(&self) -> &PositionState {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut PositionState {
        &mut self.positions
    }

    /// Split an edge, replaying the delta onto attributes and positions.
    pub fn split_edge(
        &mut self,
        edge: EdgeId,
        position: [f64; 2],
    ) -> Result<VertexId, MeshMorphError> {
        let (vertex, delta) = self.complex.split_edge(edge, position, &self.positions)?;
        self.positions.apply_delta(&delta);
        self.attributes
            .apply_delta(&delta, self.sparse_edge_attributes);
        Ok(vertex)
    }

    /// Collapse an edge onto `survivor` at `placement`, replaying the delta.
    pub fn collapse_edge(
        &mut self,
        edge: EdgeId,
        survivor: VertexId,
        placement: [f64; 2],
    ) -> Result<VertexId, MeshMorphError> {
        let (vertex, delta) = self
            .complex
            .collapse_edge(edge, survivor, placement, &self.positions)?;
        self.positions.apply_delta(&delta);
        self.attributes
            .apply_delta(&delta, self.sparse_edge_attributes);
        Ok(vertex)
    }

    /// Flip an interior edge, replaying the delta.
    pub fn flip_edge(&mut self, edge: EdgeId) -> Result<EdgeId, MeshMorphError> {
        let (diagonal, delta) = self.complex.flip_edge(edge, &self.positions)?;
        self.positions.apply_delta(&delta);
        self.attributes
            .apply_delta(&delta, self.sparse_edge_attributes);
        Ok(diagonal)
    }

    /// Edge length under current positions.
    pub(crate) fn edge_length(&self, edge: EdgeId) -> Result<f64, MeshMorphError> {
        let [a, b] = self.complex.edge_vertices(edge)?;
        Ok(crate::geometry::edge_length(
            self.positions.current(a)?,
            self.positions.current(b)?,
        ))
    }

}

impl DebugInvariants for MeshEngine {
    fn validate_invariants(&self) -> Result<(), MeshMorphError> {
        self.complex.validate_invariants()?;
        self.complex.validate_orientation(&self.positions)?;
        self.attributes.validate(self.complex.slot_counts())
    }
}
