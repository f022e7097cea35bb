//! Orientation, distance, and intersection predicates.
//!
//! All predicates operate on `[f64; 2]` points in the same floating-point
//! domain as the stored vertex coordinates. They are pure functions with no
//! tolerance knobs; callers decide how to treat exact degeneracy.

/// Sign of the signed area of a point triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Counter-clockwise (positive signed area).
    Ccw,
    /// Clockwise (negative signed area).
    Cw,
    /// Exactly zero signed area.
    Degenerate,
}

/// Twice-signed-area free form: `(b - a) x (c - a)`.
#[inline]
fn cross2(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Signed area of the triangle `(a, b, c)`; positive for CCW order.
#[inline]
pub fn signed_area(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    0.5 * cross2(a, b, c)
}

/// Orientation of the point triple `(a, b, c)`.
#[inline]
pub fn orient2d(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> Orientation {
    let det = cross2(a, b, c);
    if det > 0.0 {
        Orientation::Ccw
    } else if det < 0.0 {
        Orientation::Cw
    } else {
        Orientation::Degenerate
    }
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    (dx * dx + dy * dy).sqrt()
}

/// Length of the segment `(a, b)`; alias kept for call-site readability.
#[inline]
pub fn edge_length(a: [f64; 2], b: [f64; 2]) -> f64 {
    distance(a, b)
}

/// Distance from point `p` to the closed segment `(a, b)`.
///
/// Degenerate segments (`a == b`) fall back to point distance.
pub fn distance_point_segment(p: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    let ab = [b[0] - a[0], b[1] - a[1]];
    let len2 = ab[0] * ab[0] + ab[1] * ab[1];
    if len2 == 0.0 {
        return distance(p, a);
    }
    let t = ((p[0] - a[0]) * ab[0] + (p[1] - a[1]) * ab[1]) / len2;
    let t = t.clamp(0.0, 1.0);
    distance(p, [a[0] + t * ab[0], a[1] + t * ab[1]])
}

/// Whether the closed segments `(a0, a1)` and `(b0, b1)` intersect.
///
/// Shared endpoints and collinear overlap count as intersection; this is the
/// predicate used to detect boundary segments of different phases touching
/// or crossing.
pub fn segments_intersect(a0: [f64; 2], a1: [f64; 2], b0: [f64; 2], b1: [f64; 2]) -> bool {
    let d1 = cross2(b0, b1, a0);
    let d2 = cross2(b0, b1, a1);
    let d3 = cross2(a0, a1, b0);
    let d4 = cross2(a0, a1, b1);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(b0, b1, a0))
        || (d2 == 0.0 && on_segment(b0, b1, a1))
        || (d3 == 0.0 && on_segment(a0, a1, b0))
        || (d4 == 0.0 && on_segment(a0, a1, b1))
}

/// Intersection point of the interiors of two properly crossing segments.
///
/// Returns `None` for parallel, collinear, or non-crossing pairs; use
/// [`segments_intersect`] when touching endpoints matter.
pub fn segment_intersection(
    a0: [f64; 2],
    a1: [f64; 2],
    b0: [f64; 2],
    b1: [f64; 2],
) -> Option<[f64; 2]> {
    let r = [a1[0] - a0[0], a1[1] - a0[1]];
    let s = [b1[0] - b0[0], b1[1] - b0[1]];
    let denom = r[0] * s[1] - r[1] * s[0];
    if denom == 0.0 {
        return None;
    }
    let qp = [b0[0] - a0[0], b0[1] - a0[1]];
    let t = (qp[0] * s[1] - qp[1] * s[0]) / denom;
    let u = (qp[0] * r[1] - qp[1] * r[0]) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some([a0[0] + t * r[0], a0[1] + t * r[1]])
    } else {
        None
    }
}

/// `p` is known collinear with `(a, b)`; test whether it lies on the segment.
fn on_segment(a: [f64; 2], b: [f64; 2], p: [f64; 2]) -> bool {
    p[0] >= a[0].min(b[0]) && p[0] <= a[0].max(b[0]) && p[1] >= a[1].min(b[1]) && p[1] <= a[1].max(b[1])
}
