//! Mesh topology: handles, arenas, the simplicial complex, and its
//! transactional local operations.

pub mod arena;
pub mod complex;
pub mod delta;
pub mod handle;
mod ops;
mod validation;

pub use complex::SimplicialComplex;
pub use delta::{EdgeAttrOrigin, MutationDelta, TriAttrOrigin};
pub use handle::{EdgeId, RawHandle, TriId, VertexId};
