//! Per-simplex data: attribute columns and vertex positions.

pub mod attributes;
pub mod positions;

pub use attributes::{AttrKey, AttributeStore, EdgeAttr, TriAttr, VertexAttr};
pub use positions::PositionState;
