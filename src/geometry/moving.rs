//! Moving axis-aligned boxes
//!
//! The sensor and collision queries treat any mobile entity as a box that
//! travels along its velocity for one timestep.

use glam::Vec2;
use smallvec::SmallVec;

use super::Rect;

/// Polygon covering the area swept by a moving box during one step
pub type SweptPolygon = SmallVec<[Vec2; 8]>;

/// A box entity with a velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingBox {
    /// Bounds at the start of the step
    pub bounds: Rect,
    /// Velocity in world units per second
    pub velocity: Vec2,
}

impl MovingBox {
    /// Create a moving box
    #[must_use]
    pub fn new(bounds: Rect, velocity: Vec2) -> Self {
        Self { bounds, velocity }
    }

    /// Center of the box at the start of the step
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.bounds.center()
    }

    /// Displacement over `dt` seconds
    #[must_use]
    pub fn motion(&self, dt: f32) -> Vec2 {
        self.velocity * dt
    }

    /// Bounding box of the whole motion
    #[must_use]
    pub fn motion_bounds(&self, dt: f32) -> Rect {
        self.bounds.swept(self.motion(dt))
    }

    /// Convex polygon (counter-clockwise) of the box swept over `dt` seconds.
    ///
    /// A stationary box yields its four corners; a moving one yields the hull
    /// of the start and end boxes (a hexagon for diagonal motion).
    #[must_use]
    pub fn swept_polygon(&self, dt: f32) -> SweptPolygon {
        let motion = self.motion(dt);
        let (min, max) = (self.bounds.min(), self.bounds.max());
        let corners = [
            min,
            Vec2::new(max.x, min.y),
            max,
            Vec2::new(min.x, max.y),
        ];

        let mut points: SmallVec<[Vec2; 8]> = SmallVec::new();
        points.extend(corners);
        if motion != Vec2::ZERO {
            points.extend(corners.iter().map(|&c| c + motion));
        }
        convex_hull(points)
    }
}

/// Monotone chain convex hull. Collinear points are dropped.
fn convex_hull(mut points: SmallVec<[Vec2; 8]>) -> SweptPolygon {
    points.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    points.dedup();
    if points.len() < 3 {
        return points;
    }

    let cross = |o: Vec2, a: Vec2, b: Vec2| (a - o).perp_dot(b - o);
    let mut hull: SweptPolygon = SmallVec::new();

    for &p in points.iter() {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }

    let lower_len = hull.len() + 1;
    for &p in points.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }

    hull.pop();
    hull
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stationary_polygon_is_box() {
        let mover = MovingBox::new(Rect::new(0.0, 0.0, 2.0, 2.0), Vec2::ZERO);
        let poly = mover.swept_polygon(1.0);

        assert_eq!(poly.len(), 4);
        assert!(poly.contains(&Vec2::new(0.0, 0.0)));
        assert!(poly.contains(&Vec2::new(2.0, 2.0)));
    }

    #[test]
    fn test_diagonal_sweep_is_hexagon() {
        let mover = MovingBox::new(Rect::new(0.0, 0.0, 2.0, 2.0), Vec2::new(4.0, 4.0));
        let poly = mover.swept_polygon(1.0);

        assert_eq!(poly.len(), 6);
        assert!(!poly.contains(&Vec2::new(2.0, 2.0)));
        assert!(poly.contains(&Vec2::new(6.0, 6.0)));
    }

    #[test]
    fn test_axis_sweep_is_rectangle() {
        let mover = MovingBox::new(Rect::new(0.0, 0.0, 2.0, 2.0), Vec2::new(3.0, 0.0));
        let poly = mover.swept_polygon(1.0);

        assert_eq!(poly.len(), 4);
        assert!(poly.contains(&Vec2::new(5.0, 2.0)));
    }
}
