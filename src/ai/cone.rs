//! Vision cone sensor
//!
//! A circular sector anchored at the agent. Its reach is cut short by the
//! first solid tile along either edge, and it can test points and moving
//! boxes for overlap.
//!
//! Derived geometry (tight bounds, edge points, edge lines) is computed
//! lazily and cached until the position, angles or radius change.

use std::cell::Cell;
use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::chunk::ChunkQuery;
use crate::geometry::{
    CircleRoots, MovingBox, Rect, angle_in_span, line_intersection, line_through,
    normalize_angle, segment_circle_roots, vector_angle,
};

/// Alert level shown by a cone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConeColor {
    /// Nothing suspicious
    #[default]
    Clear,
    /// Checking out a noise
    Inspect,
    /// Chasing a known intruder
    Alert,
}

// ============================================================================
// Cached Geometry
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct ConeGeometry {
    /// Tight bounding box of the sector
    bounds: Rect,
    /// Unit direction of the first edge
    dir1: Vec2,
    /// Unit direction of the second edge
    dir2: Vec2,
    /// Homogeneous line along the first edge
    line1: Vec3,
    /// Homogeneous line along the second edge
    line2: Vec3,
}

// ============================================================================
// View Cone
// ============================================================================

/// A vision cone.
///
/// Angles are counter-clockwise and kept in `[0, 2π)`. The cone spans from
/// `angle1` to `angle2`, wrapping through zero when `angle2 < angle1`.
#[derive(Debug, Clone)]
pub struct ViewCone {
    position: Vec2,
    angle1: f32,
    angle2: f32,
    nominal_radius: f32,
    occluded_radius: f32,
    occlusion_dirty: bool,
    color: ConeColor,
    geometry: Cell<Option<ConeGeometry>>,
}

impl ViewCone {
    /// Create a cone at `position` looking along `direction` (radians)
    #[must_use]
    pub fn new(position: Vec2, direction: f32, spread: f32, radius: f32) -> Self {
        let mut cone = Self {
            position,
            angle1: 0.0,
            angle2: 0.0,
            nominal_radius: radius,
            occluded_radius: radius,
            occlusion_dirty: true,
            color: ConeColor::Clear,
            geometry: Cell::new(None),
        };
        cone.set_direction(direction, spread);
        cone
    }

    // -------------------------------------------------------------------------
    // Angles
    // -------------------------------------------------------------------------

    /// Point the cone along `direction` with total opening `spread`, in degrees
    pub fn from_degrees(&mut self, direction: f32, spread: f32) {
        self.set_direction(direction.to_radians(), spread.to_radians());
    }

    /// Point the cone along `direction` with total opening `spread`, in radians
    pub fn set_direction(&mut self, direction: f32, spread: f32) {
        let half = spread * 0.5;
        self.set_angles(direction - half, direction + half);
    }

    /// Set both bounding angles. They are normalized into `[0, 2π)`.
    pub fn set_angles(&mut self, angle1: f32, angle2: f32) {
        let (angle1, angle2) = (normalize_angle(angle1), normalize_angle(angle2));
        if self.angle1 != angle1 || self.angle2 != angle2 {
            self.angle1 = angle1;
            self.angle2 = angle2;
            self.invalidate();
        }
    }

    /// Bounding angles `(angle1, angle2)`
    #[must_use]
    pub fn angles(&self) -> (f32, f32) {
        (self.angle1, self.angle2)
    }

    /// Angular opening of the cone
    #[must_use]
    pub fn spread(&self) -> f32 {
        normalize_angle(self.angle2 - self.angle1)
    }

    /// Angle halfway between the two edges
    #[must_use]
    pub fn middle(&self) -> f32 {
        normalize_angle(self.angle1 + self.spread() * 0.5)
    }

    /// Rotate the cone so its middle lies at `middle`, keeping the spread
    pub fn set_middle(&mut self, middle: f32) {
        let half = self.spread() * 0.5;
        self.set_angles(middle - half, middle + half);
    }

    // -------------------------------------------------------------------------
    // Radius and position
    // -------------------------------------------------------------------------

    /// Reach after occlusion
    #[must_use]
    #[inline]
    pub fn radius(&self) -> f32 {
        self.occluded_radius
    }

    /// Reach before occlusion
    #[must_use]
    #[inline]
    pub fn nominal_radius(&self) -> f32 {
        self.nominal_radius
    }

    /// Set the nominal reach. Occlusion is recomputed on the next update.
    pub fn set_radius(&mut self, radius: f32) {
        self.nominal_radius = radius;
        self.occluded_radius = radius;
        self.invalidate();
    }

    /// Apex of the cone
    #[must_use]
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Move the apex
    pub fn set_position(&mut self, position: Vec2) {
        if self.position != position {
            self.position = position;
            self.invalidate();
        }
    }

    /// Current alert level
    #[must_use]
    pub fn color(&self) -> ConeColor {
        self.color
    }

    /// Set the alert level
    pub fn set_color(&mut self, color: ConeColor) {
        self.color = color;
    }

    fn invalidate(&mut self) {
        self.occlusion_dirty = true;
        self.geometry.set(None);
    }

    // -------------------------------------------------------------------------
    // Occlusion
    // -------------------------------------------------------------------------

    /// Clip the reach against solid geometry along both edges
    pub fn update<C: ChunkQuery + ?Sized>(&mut self, chunk: &C) {
        if !self.occlusion_dirty {
            return;
        }

        let mut radius = self.nominal_radius;
        for angle in [self.angle1, self.angle2] {
            let edge = Vec2::from_angle(angle) * self.nominal_radius;
            if let Some(t) = chunk.intersect_line(self.position, edge, 1.0, false, false) {
                radius = radius.min(t * self.nominal_radius);
            }
        }

        self.occluded_radius = radius;
        self.occlusion_dirty = false;
        self.geometry.set(None);
    }

    // -------------------------------------------------------------------------
    // Bounds
    // -------------------------------------------------------------------------

    fn geometry(&self) -> ConeGeometry {
        if let Some(geometry) = self.geometry.get() {
            return geometry;
        }

        let r = self.occluded_radius;
        let dir1 = Vec2::from_angle(self.angle1);
        let dir2 = Vec2::from_angle(self.angle2);

        let mut points = vec![self.position, self.position + dir1 * r, self.position + dir2 * r];
        for axis in [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2] {
            if angle_in_span(axis, self.angle1, self.angle2) {
                points.push(self.position + Vec2::from_angle(axis) * r);
            }
        }

        let geometry = ConeGeometry {
            bounds: Rect::from_points(points).unwrap_or_default(),
            dir1,
            dir2,
            line1: line_through(self.position, self.position + dir1),
            line2: line_through(self.position, self.position + dir2),
        };
        self.geometry.set(Some(geometry));
        geometry
    }

    /// Smallest box around the sector
    #[must_use]
    pub fn tight_bounds(&self) -> Rect {
        self.geometry().bounds
    }

    /// Box around the full circle
    #[must_use]
    pub fn loose_bounds(&self) -> Rect {
        Rect::from_center(self.position, Vec2::splat(self.occluded_radius))
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Whether a world point lies strictly between the edges and within reach
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let local = point - self.position;
        local.length_squared() <= self.occluded_radius * self.occluded_radius && self.in_span(local)
    }

    fn in_span(&self, local: Vec2) -> bool {
        angle_in_span(vector_angle(local), self.angle1, self.angle2)
    }

    /// Whether a box moving for `dt` seconds touches the cone
    #[must_use]
    pub fn collides(&self, mover: &MovingBox, dt: f32) -> bool {
        let motion_bounds = mover.motion_bounds(dt);
        if !motion_bounds.intersects(&self.loose_bounds()) {
            return false;
        }

        let geometry = self.geometry();
        if !motion_bounds.intersects(&geometry.bounds) {
            return false;
        }

        let r = self.occluded_radius;
        let center = mover.center() - self.position;
        if center.length_squared() < r * r && self.in_span(center) {
            return true;
        }

        let polygon = mover.swept_polygon(dt);
        let edges = || {
            polygon
                .iter()
                .zip(polygon.iter().cycle().skip(1))
                .map(|(&p, &q)| (p, q))
        };

        // Polygon edges against the two straight sides of the cone
        for (p, q) in edges() {
            let Some(edge_dir) = (q - p).try_normalize() else {
                continue;
            };
            let edge_len = p.distance(q);
            let edge_line = line_through(p, q);

            for (cone_line, cone_dir) in [
                (geometry.line1, geometry.dir1),
                (geometry.line2, geometry.dir2),
            ] {
                let Some(hit) = line_intersection(cone_line, edge_line) else {
                    continue;
                };
                let along_cone = (hit - self.position).dot(cone_dir);
                let along_edge = (hit - p).dot(edge_dir);
                if along_cone > 0.0 && along_cone < r && along_edge > 0.0 && along_edge < edge_len
                {
                    return true;
                }
            }
        }

        // Polygon edges against the arc
        for (p, q) in edges() {
            let (p1, p2) = (p - self.position, q - self.position);
            let crosses_arc = |t: f32| t > 0.0 && t < 1.0 && self.in_span(p1 + (p2 - p1) * t);
            let hit = match segment_circle_roots(p1, p2, r) {
                CircleRoots::None => false,
                CircleRoots::Tangent(t) => crosses_arc(t),
                CircleRoots::Two(t1, t2) => crosses_arc(t1) || crosses_arc(t2),
            };
            if hit {
                return true;
            }
        }

        false
    }
}
