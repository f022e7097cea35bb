//! Geometry kernel for mesh-morph.
//!
//! Pure, deterministic `f64` predicates shared by the topology operations
//! and the update engine. Exactly-zero signed area is reported as a value
//! (`Orientation::Degenerate`), never as an error; the policy decision
//! belongs to the call site.

pub mod predicates;
pub mod quality;

pub use predicates::{
    Orientation, distance, distance_point_segment, edge_length, orient2d, segment_intersection,
    segments_intersect, signed_area,
};
pub use quality::{aspect_ratio, diagonal_min_angle_deg, min_angle_deg, triangle_angles_deg};
