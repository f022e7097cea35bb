//! Triangle quality measures used by the adaptive quality pass.

use super::predicates::distance;

/// Interior angles of triangle `(a, b, c)` in degrees, in vertex order.
///
/// Degenerate triangles (a zero-length side) report `0.0` for the collapsed
/// corners so that callers treat them as worst-quality.
pub fn triangle_angles_deg(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> [f64; 3] {
    let la = distance(b, c);
    let lb = distance(c, a);
    let lc = distance(a, b);
    [
        corner_angle_deg(lb, lc, la),
        corner_angle_deg(lc, la, lb),
        corner_angle_deg(la, lb, lc),
    ]
}

/// Minimum interior angle in degrees.
pub fn min_angle_deg(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    let angles = triangle_angles_deg(a, b, c);
    angles[0].min(angles[1]).min(angles[2])
}

/// Longest-to-shortest edge length ratio.
///
/// Returns `f64::INFINITY` when the shortest edge has zero length.
pub fn aspect_ratio(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    let la = distance(b, c);
    let lb = distance(c, a);
    let lc = distance(a, b);
    let longest = la.max(lb).max(lc);
    let shortest = la.min(lb).min(lc);
    if shortest == 0.0 {
        f64::INFINITY
    } else {
        longest / shortest
    }
}

/// Law-of-cosines corner angle opposite the side of length `opposite`.
fn corner_angle_deg(adj0: f64, adj1: f64, opposite: f64) -> f64 {
    if adj0 == 0.0 || adj1 == 0.0 {
        return 0.0;
    }
    let cos = ((adj0 * adj0 + adj1 * adj1 - opposite * opposite) / (2.0 * adj0 * adj1))
        .clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Minimum angle of the pair of triangles produced by diagonal `(d0, d1)`
/// splitting the quadrilateral with off-diagonal corners `p` and `q`.
///
/// Used by the flip decision: compare the current diagonal against the
/// opposite one and keep whichever maximizes the minimum angle.
pub fn diagonal_min_angle_deg(d0: [f64; 2], d1: [f64; 2], p: [f64; 2], q: [f64; 2]) -> f64 {
    min_angle_deg(d0, d1, p).min(min_angle_deg(d1, d0, q))
}
