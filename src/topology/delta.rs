//! Mutation deltas emitted by the transactional topology operations.
//!
//! A [`MutationDelta`] describes one committed split/collapse/flip: which
//! elements were created and removed, where new vertices sit, and which
//! pre-operation elements each new element inherits attribute values from.
//! Attribute columns and the position state replay the delta after the
//! topology has changed; parent slots still hold their pre-operation values
//! at that point, so inheritance reads never race with slot reuse as long
//! as reads happen before writes (which [`crate::data::AttributeStore::apply_delta`]
//! guarantees).

use crate::topology::handle::{EdgeId, TriId, VertexId};

/// Where a freshly created edge takes its attribute values from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeAttrOrigin {
    /// Column default.
    Default,
    /// Copy the parent edge's values (split children, flip diagonals).
    Inherit(EdgeId),
    /// Mean of a parent triangle's three edge values (split spokes).
    Average([EdgeId; 3]),
}

/// Where a freshly created triangle takes its attribute values from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriAttrOrigin {
    /// Column default.
    Default,
    /// Copy the parent triangle's values.
    Inherit(TriId),
}

/// Record of one committed topology mutation.
///
/// Element lists are in creation/removal order; new vertices always take
/// the registered column default for vertex attributes.
#[derive(Debug, Clone, Default)]
pub struct MutationDelta {
    /// New vertices and their initial (current == target) positions.
    pub created_vertices: Vec<(VertexId, [f64; 2])>,
    /// New edges with their attribute inheritance tag.
    pub created_edges: Vec<(EdgeId, EdgeAttrOrigin)>,
    /// New triangles with their attribute inheritance tag.
    pub created_triangles: Vec<(TriId, TriAttrOrigin)>,
    /// Removed vertices.
    pub removed_vertices: Vec<VertexId>,
    /// Removed edges.
    pub removed_edges: Vec<EdgeId>,
    /// Removed triangles.
    pub removed_triangles: Vec<TriId>,
    /// Surviving vertices repositioned by the operation (collapse survivor).
    pub moved_vertices: Vec<(VertexId, [f64; 2])>,
}

impl MutationDelta {
    /// True when the operation changed nothing.
    pub fn is_empty(&self) -> bool {
        self.created_vertices.is_empty()
            && self.created_edges.is_empty()
            && self.created_triangles.is_empty()
            && self.removed_vertices.is_empty()
            && self.removed_edges.is_empty()
            && self.removed_triangles.is_empty()
            && self.moved_vertices.is_empty()
    }
}
