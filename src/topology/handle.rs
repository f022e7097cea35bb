//! Strong, generation-checked handles for mesh elements.
//!
//! Every element of the complex is addressed by a handle pairing an arena
//! slot with a generation counter. Mutating operations (split, collapse,
//! flip) may free and reuse slots; the generation lets the arena detect a
//! handle minted before the mutation and reject it instead of silently
//! aliasing the reused slot.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw slot + generation pair backing every typed handle.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(C)]
pub struct RawHandle {
    slot: u32,
    generation: u32,
}

impl RawHandle {
    #[inline]
    pub(crate) const fn new(slot: u32, generation: u32) -> Self {
        Self { slot, generation }
    }

    /// Arena slot index.
    #[inline]
    pub const fn slot(self) -> u32 {
        self.slot
    }

    /// Generation the slot had when this handle was issued.
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

macro_rules! typed_handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[repr(transparent)]
        pub struct $name(pub(crate) RawHandle);

        impl $name {
            #[inline]
            pub(crate) const fn new(slot: u32, generation: u32) -> Self {
                Self(RawHandle::new(slot, generation))
            }

            /// Arena slot index; stable for the lifetime of the element.
            #[inline]
            pub const fn slot(self) -> u32 {
                self.0.slot()
            }

            /// Generation stamp carried by this handle.
            #[inline]
            pub const fn generation(self) -> u32 {
                self.0.generation()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name))
                    .field(&self.slot())
                    .field(&self.generation())
                    .finish()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}v{}", self.slot(), self.generation())
            }
        }
    };
}

typed_handle!(
    /// Handle of a vertex (0-simplex).
    VertexId
);
typed_handle!(
    /// Handle of an edge (1-simplex).
    EdgeId
);
typed_handle!(
    /// Handle of a triangle (2-simplex).
    TriId
);
