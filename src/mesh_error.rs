//! `MeshMorphError`: unified error type for mesh-morph public APIs.
//!
//! Every fallible operation in the crate reports through this enum so that
//! callers can match on the failure class: load errors are fatal to the
//! load, attribute errors are fatal to the offending call, topology errors
//! reject a single local operation, and invariant violations indicate a bug
//! in the engine rather than an expected runtime condition.

use thiserror::Error;

use crate::phase::Dimension;
use crate::topology::handle::{EdgeId, TriId, VertexId};

/// Unified error type for mesh-morph operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshMorphError {
    // --- load-time errors (fatal, the load aborts) ----------------------
    /// A triangle referenced a vertex index past the end of the vertex list.
    #[error("mesh load error: triangle {triangle} references vertex {index}, but only {vertex_count} vertices were declared")]
    VertexIndexOutOfRange {
        /// Input-order index of the offending triangle.
        triangle: usize,
        /// The out-of-range vertex index.
        index: usize,
        /// Number of vertices declared before the triangle section.
        vertex_count: usize,
    },
    /// A triangle has zero or negative area even after orientation normalization.
    #[error("mesh load error: triangle {triangle} has non-positive area {area}")]
    DegenerateInputTriangle { triangle: usize, area: OrderedF64 },
    /// The same vertex triple was declared twice.
    #[error("mesh load error: triangle {triangle} duplicates an earlier triangle")]
    DuplicateTriangle { triangle: usize },
    /// An edge is shared by more than two triangles; the input is non-manifold.
    #[error("mesh load error: edge ({v0}, {v1}) is shared by {count} triangles (non-manifold input)")]
    NonManifoldInput { v0: usize, v1: usize, count: usize },
    /// A label record referenced a triangle that was never declared.
    #[error("mesh load error: label record names triangle ({i0}, {i1}, {i2}) which was never declared")]
    LabelForUnknownTriangle { i0: usize, i1: usize, i2: usize },
    /// The mesh text format could not be parsed.
    #[error("mesh parse error at line {line}: {message}")]
    MeshIoParse { line: usize, message: String },
    /// Reading the mesh source failed.
    #[error("mesh read error: {0}")]
    MeshIoRead(String),
    /// Writing the mesh failed.
    #[error("mesh write error: {0}")]
    MeshIoWrite(String),

    // --- attribute errors (fatal to the call, state unchanged) ----------
    /// An attribute with this name already exists for the dimension.
    #[error("attribute `{name}` is already registered for dimension {dimension:?}")]
    DuplicateAttribute { name: String, dimension: Dimension },
    /// The attribute handle does not name a registered column.
    #[error("unknown attribute handle (dimension {dimension:?}, slot {slot})")]
    UnknownAttribute { dimension: Dimension, slot: u32 },
    /// A sub-range read/write did not match the phase's element count.
    #[error("attribute sub-range length mismatch for dimension {dimension:?}: expected {expected}, found {found}")]
    SubRangeLengthMismatch {
        dimension: Dimension,
        expected: usize,
        found: usize,
    },
    /// A configured sizing-field binding names an attribute that was never registered.
    #[error("sizing attribute `{name}` is not registered for dimension {dimension:?}")]
    UnresolvedSizingAttribute { name: String, dimension: Dimension },

    // --- topology errors (the single operation is rejected) -------------
    /// A handle refers to a vertex that no longer exists.
    #[error("stale vertex handle {0}")]
    StaleVertex(VertexId),
    /// A handle refers to an edge that no longer exists.
    #[error("stale edge handle {0}")]
    StaleEdge(EdgeId),
    /// A handle refers to a triangle that no longer exists.
    #[error("stale triangle handle {0}")]
    StaleTriangle(TriId),
    /// Flip requested on a boundary edge (only one incident triangle).
    #[error("cannot flip boundary edge {0}")]
    FlipBoundaryEdge(EdgeId),
    /// Flipping the edge would invert one of the resulting triangles.
    #[error("flipping edge {0} would invert a triangle")]
    FlipWouldInvert(EdgeId),
    /// The two triangles incident to the edge carry different phase labels.
    #[error("cannot flip edge {0}: incident triangles have different phase labels")]
    FlipLabelMismatch(EdgeId),
    /// The opposite diagonal of the incident quadrilateral already exists.
    #[error("cannot flip edge {0}: the opposite diagonal already exists")]
    FlipDuplicateEdge(EdgeId),
    /// Collapse would produce a non-manifold configuration (link condition).
    #[error("collapsing edge {0} would violate the manifold invariant")]
    CollapseNonManifold(EdgeId),
    /// Collapse would invert a surviving triangle.
    #[error("collapsing edge {0} would invert a surviving triangle")]
    CollapseWouldInvert(EdgeId),
    /// Split position does not produce positively oriented children.
    #[error("splitting edge {0} at the requested position would create a degenerate triangle")]
    SplitWouldDegenerate(EdgeId),

    // --- invariant violations (bug class, fatal) -------------------------
    /// An edge has the wrong number of incident triangles.
    #[error("invariant violation: edge {edge} has {count} incident triangles")]
    EdgeTriangleCount { edge: EdgeId, count: usize },
    /// A stored triangle is not counter-clockwise.
    #[error("invariant violation: triangle {tri} has non-positive area")]
    TriangleNotCcw { tri: TriId },
    /// An element references a handle that is not live in the complex.
    #[error("invariant violation: dangling reference from {from}")]
    DanglingReference { from: String },
    /// Two edges connect the same vertex pair.
    #[error("invariant violation: duplicate edge between {v0} and {v1}")]
    DuplicateEdge { v0: VertexId, v1: VertexId },
    /// An attribute column is out of sync with its arena.
    #[error("invariant violation: attribute column `{name}` has length {found}, arena requires {expected}")]
    ColumnLengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    // --- configuration errors --------------------------------------------
    /// A configuration value could not be parsed as the required type.
    #[error("config error: key `{key}` has unparsable value `{value}`")]
    ConfigParse { key: String, value: String },
    /// Parameter validation failed.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// An `f64` carried inside an error, compared bitwise so the error enum can
/// stay `Eq`.
#[derive(Debug, Clone, Copy)]
pub struct OrderedF64(pub f64);

impl PartialEq for OrderedF64 {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for OrderedF64 {}

impl From<f64> for OrderedF64 {
    fn from(value: f64) -> Self {
        OrderedF64(value)
    }
}

impl std::fmt::Display for OrderedF64 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
