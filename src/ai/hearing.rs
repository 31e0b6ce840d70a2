//! Sound propagation
//!
//! Sounds lose volume with distance and through walls. Quiet sounds are heard
//! at a blurred position, louder ones more precisely.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use crate::chunk::ChunkQuery;
use crate::core::DroneConfig;

/// Volume left after travelling `distance`.
///
/// A blocked line of sight halves the volume before the distance falloff is
/// subtracted.
#[must_use]
pub fn perceived_volume(volume: f32, distance: f32, occluded: bool, sensitivity: f32) -> f32 {
    let volume = if occluded { volume * 0.5 } else { volume };
    volume - distance / sensitivity
}

/// Volume of a sound at `source` as heard from `listener`, or `None` if it
/// is out of range or too faint.
#[must_use]
pub fn audible_volume<C: ChunkQuery + ?Sized>(
    chunk: &C,
    listener: Vec2,
    source: Vec2,
    volume: f32,
    config: &DroneConfig,
) -> Option<f32> {
    let distance_sq = listener.distance_squared(source);
    if distance_sq > config.audible_distance * config.audible_distance {
        return None;
    }

    let occluded = chunk
        .intersect_line(source, listener - source, 1.0, false, false)
        .is_some();
    let sensitivity = if chunk.alarm_raised() {
        config.alert_sensitivity
    } else {
        config.clear_sensitivity
    };

    let heard = perceived_volume(volume, distance_sq.sqrt(), occluded, sensitivity);
    (heard > 0.0).then_some(heard)
}

/// Where a sound of `volume` at `source` seems to come from.
///
/// The error grows as the volume falls below `base_volume` and never pushes
/// the position through a wall.
#[must_use]
pub fn locate_sound<C: ChunkQuery + ?Sized, R: Rng + ?Sized>(
    chunk: &C,
    source: Vec2,
    volume: f32,
    config: &DroneConfig,
    rng: &mut R,
) -> Vec2 {
    let precision = (volume / config.base_volume).min(1.0);
    let dir = Vec2::from_angle(rng.gen_range(0.0..TAU));
    let side = dir.perp() * config.half_width();

    let mut offset = (1.0 - precision) * config.hearing_precision;
    for origin in [source + side, source - side] {
        if let Some(t) = chunk.intersect_line(origin, dir, offset, false, true) {
            offset = t;
        }
    }

    source + dir * offset
}
