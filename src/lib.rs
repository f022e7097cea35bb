//! mesh-morph: a dynamic 2D simplicial-complex engine for multi-phase
//! interface tracking.
//!
//! A [`engine::MeshEngine`] owns a triangle mesh whose triangles each carry
//! a phase label, per-simplex attribute columns, and current/target vertex
//! positions. Each [`engine::MeshEngine::update`] step realizes vertex
//! motion under an inversion guard, refines and coarsens edges against
//! length thresholds (scalar, per-label, or attribute-driven), resolves
//! contact between approaching interfaces of distinct phases, and
//! optionally improves triangle quality with edge flips. Every pass keeps
//! the triangulation manifold, counter-clockwise, and free of dangling
//! references.
//!
//! Element handles are generational: any handle minted before a mutation
//! that removed its element is detected and rejected instead of silently
//! aliasing a reused slot.
//!
//! ```
//! use mesh_morph::prelude::*;
//!
//! let mut engine = MeshEngine::from_static_mesh(
//!     &[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
//!     &[[0, 1, 2], [0, 2, 3]],
//!     &[PhaseLabel(1), PhaseLabel(1)],
//! )?;
//! let params = Parameters {
//!     labels: vec![PhaseLabel(1)],
//!     upper_threshold: 0.8,
//!     ..Parameters::default()
//! };
//! let report = engine.update(&params)?;
//! assert!(report.splits > 0);
//! # Ok::<(), mesh_morph::MeshMorphError>(())
//! ```

pub mod data;
pub mod debug_invariants;
pub mod engine;
pub mod geometry;
pub mod io;
pub mod mesh_error;
pub mod phase;
pub mod topology;

pub use mesh_error::MeshMorphError;

/// Common imports for working with the engine.
pub mod prelude {
    pub use crate::data::{AttrKey, AttributeStore, EdgeAttr, PositionState, TriAttr, VertexAttr};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::engine::{MeshEngine, Parameters, UpdateReport};
    pub use crate::io::{read_mesh, read_mesh_str, write_mesh, write_mesh_string};
    pub use crate::mesh_error::MeshMorphError;
    pub use crate::phase::{
        Dimension, InPhase, IsDimension, OnDomainBoundary, OnInterface, Phase, PhaseLabel,
        SimplexPredicate, SimplexRef, filter, make_phase, make_phase_all,
    };
    pub use crate::topology::{EdgeId, MutationDelta, SimplicialComplex, TriId, VertexId};
}
