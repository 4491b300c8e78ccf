//! Planar geometry helpers shared by the signal extractors.
//!
//! All functions are pure. Degenerate inputs resolve to fixed fallbacks rather
//! than propagating NaN into downstream comparisons.

use crate::pose::{Landmark, PersonPose, Point};

/// Vectors shorter than this are treated as having no direction.
pub const DEGENERATE_LEN: f32 = 1e-6;

/// Verticality reported when the torso axis has no usable direction.
pub const AMBIGUOUS_VERTICALITY: f32 = 0.5;

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f32 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Angle in degrees at vertex `p2` formed by `p1` and `p3`.
///
/// The cosine is clamped to [-1, 1] before `acos`. Zero-length arms yield 0.0.
pub fn angle_at(p1: Point, p2: Point, p3: Point) -> f32 {
    let (ax, ay) = (p1.x - p2.x, p1.y - p2.y);
    let (bx, by) = (p3.x - p2.x, p3.y - p2.y);
    let norm = ax.hypot(ay) * bx.hypot(by);
    if norm.is_nan() || norm < DEGENERATE_LEN {
        return 0.0;
    }
    let cos = ((ax * bx + ay * by) / norm).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Alignment of the torso axis with the image vertical, in [0, 1].
///
/// 1.0 is upright (or inverted), 0.0 is horizontal. The axis runs from the
/// shoulder midpoint to the hip midpoint; when it is shorter than
/// [`DEGENERATE_LEN`] the pose is ambiguous and 0.5 is returned.
pub fn verticality(pose: &PersonPose) -> f32 {
    let shoulders = pose.midpoint(Landmark::LeftShoulder, Landmark::RightShoulder);
    let hips = pose.midpoint(Landmark::LeftHip, Landmark::RightHip);
    let (dx, dy) = (hips.x - shoulders.x, hips.y - shoulders.y);
    let len = dx.hypot(dy);
    if len.is_nan() || len < DEGENERATE_LEN {
        return AMBIGUOUS_VERTICALITY;
    }
    // cosine similarity with (0, 1); magnitude only, so lying either way reads low
    (dy / len).clamp(-1.0, 1.0).abs()
}

/// Unit vector from `from` toward `to`, or `None` when they (nearly) coincide.
pub fn unit_vector(from: Point, to: Point) -> Option<(f32, f32)> {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let len = dx.hypot(dy);
    if len >= DEGENERATE_LEN {
        Some((dx / len, dy / len))
    } else {
        None
    }
}
