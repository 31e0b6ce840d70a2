//! Angle helpers
//!
//! All angles are radians measured counter-clockwise from +X.

use std::f32::consts::{PI, TAU};

use glam::Vec2;

/// Wrap an angle into `[0, 2π)`.
#[must_use]
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Angle of a vector, wrapped into `[0, 2π)`.
#[must_use]
#[inline]
pub fn vector_angle(v: Vec2) -> f32 {
    normalize_angle(v.y.atan2(v.x))
}

/// Check if `angle` lies strictly inside the counter-clockwise span from
/// `start` to `end`. Both bounds must already be normalized.
///
/// When `end < start` the span wraps through zero.
#[must_use]
pub fn angle_in_span(angle: f32, start: f32, end: f32) -> bool {
    if end < start {
        angle > start || angle < end
    } else {
        angle > start && angle < end
    }
}

/// Shortest unsigned angular distance between two angles, in `[0, π]`.
#[must_use]
pub fn angle_distance(a: f32, b: f32) -> f32 {
    let d = normalize_angle(a - b);
    if d > PI { TAU - d } else { d }
}
