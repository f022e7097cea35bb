//! Opt-in structural invariant checking.
//!
//! `validate_invariants` is always available; `debug_assert_invariants`
//! additionally panics in debug builds and under the `check-invariants`
//! feature, and compiles to nothing otherwise.

use crate::mesh_error::MeshMorphError;

pub trait DebugInvariants {
    /// Run the full structural audit, returning the first violation.
    fn validate_invariants(&self) -> Result<(), MeshMorphError>;

    /// Panic on a violated invariant in debug builds or with the
    /// `check-invariants` feature enabled.
    fn debug_assert_invariants(&self) {
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        if let Err(violation) = self.validate_invariants() {
            panic!("invariant violation: {violation}");
        }
    }
}

impl DebugInvariants for crate::topology::SimplicialComplex {
    fn validate_invariants(&self) -> Result<(), MeshMorphError> {
        crate::topology::SimplicialComplex::validate_invariants(self)
    }
}
