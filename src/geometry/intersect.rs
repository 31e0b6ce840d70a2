//! Line and circle intersection primitives
//!
//! Lines are handled in homogeneous coordinates: the line through two points is
//! their cross product, and two lines meet at the cross product of the lines.

use glam::{Vec2, Vec3};

/// Homogeneous line through two points.
#[must_use]
#[inline]
pub fn line_through(a: Vec2, b: Vec2) -> Vec3 {
    a.extend(1.0).cross(b.extend(1.0))
}

/// Intersection point of two homogeneous lines, or `None` if they are parallel.
#[must_use]
pub fn line_intersection(l1: Vec3, l2: Vec3) -> Option<Vec2> {
    let p = l1.cross(l2);
    if p.z.abs() <= f32::EPSILON * p.x.abs().max(p.y.abs()).max(1.0) {
        return None;
    }
    Some(Vec2::new(p.x / p.z, p.y / p.z))
}

/// Roots of the segment `p1 -> p2` against a circle of `radius` at the origin.
///
/// Returns the parameters `t` where `p1 + t * (p2 - p1)` lies on the circle.
/// A tangent segment produces a single root.
#[must_use]
pub fn segment_circle_roots(p1: Vec2, p2: Vec2, radius: f32) -> CircleRoots {
    let d = p2 - p1;
    let a = d.length_squared();
    if a == 0.0 {
        return CircleRoots::None;
    }
    let b = 2.0 * p1.dot(d);
    let c = p1.length_squared() - radius * radius;
    let disc = b * b - 4.0 * a * c;

    if disc < 0.0 {
        CircleRoots::None
    } else if disc == 0.0 {
        CircleRoots::Tangent(-b / (2.0 * a))
    } else {
        let sq = disc.sqrt();
        CircleRoots::Two((-b - sq) / (2.0 * a), (-b + sq) / (2.0 * a))
    }
}

/// Result of a segment/circle intersection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircleRoots {
    /// No intersection with the circle's supporting line
    None,
    /// Touches the circle at one parameter
    Tangent(f32),
    /// Crosses the circle at two parameters (ascending)
    Two(f32, f32),
}

/// Distance along a ray at which it leaves a circle.
///
/// `dir` does not need to be normalized; the result is in multiples of `dir`.
/// Returns `None` if the ray misses the circle or the exit lies behind the origin.
#[must_use]
pub fn ray_circle_exit(origin: Vec2, dir: Vec2, center: Vec2, radius: f32) -> Option<f32> {
    match segment_circle_roots(origin - center, origin - center + dir, radius) {
        CircleRoots::Two(_, t) if t > 0.0 => Some(t),
        CircleRoots::Tangent(t) if t > 0.0 => Some(t),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_intersection() {
        let horizontal = line_through(Vec2::new(0.0, 1.0), Vec2::new(4.0, 1.0));
        let vertical = line_through(Vec2::new(2.0, -3.0), Vec2::new(2.0, 5.0));

        let p = line_intersection(horizontal, vertical).unwrap();
        assert!((p - Vec2::new(2.0, 1.0)).length() < 1e-4);
    }

    #[test]
    fn test_parallel_lines_do_not_meet() {
        let a = line_through(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0));
        let b = line_through(Vec2::new(0.0, 2.0), Vec2::new(1.0, 2.0));

        assert!(line_intersection(a, b).is_none());
    }

    #[test]
    fn test_segment_circle_roots() {
        let roots = segment_circle_roots(Vec2::new(-2.0, 0.0), Vec2::new(2.0, 0.0), 1.0);
        match roots {
            CircleRoots::Two(t1, t2) => {
                assert!((t1 - 0.25).abs() < 1e-5);
                assert!((t2 - 0.75).abs() < 1e-5);
            }
            other => panic!("expected two roots, got {other:?}"),
        }

        let miss = segment_circle_roots(Vec2::new(-2.0, 3.0), Vec2::new(2.0, 3.0), 1.0);
        assert_eq!(miss, CircleRoots::None);
    }

    #[test]
    fn test_segment_touching_circle() {
        let touch = segment_circle_roots(Vec2::new(-2.0, 1.0), Vec2::new(2.0, 1.0), 1.0);
        assert_eq!(touch, CircleRoots::Tangent(0.5));

        // Supporting line touches beyond the segment's end
        let past_end = segment_circle_roots(Vec2::new(-4.0, 1.0), Vec2::new(-2.0, 1.0), 1.0);
        assert_eq!(past_end, CircleRoots::Tangent(2.0));
    }

    #[test]
    fn test_ray_circle_exit_from_inside() {
        let exit = ray_circle_exit(Vec2::ZERO, Vec2::X, Vec2::ZERO, 10.0).unwrap();
        assert!((exit - 10.0).abs() < 1e-4);

        let exit = ray_circle_exit(Vec2::new(5.0, 0.0), Vec2::X, Vec2::ZERO, 10.0).unwrap();
        assert!((exit - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_ray_circle_exit_behind() {
        assert!(ray_circle_exit(Vec2::new(20.0, 0.0), Vec2::X, Vec2::ZERO, 10.0).is_none());
    }
}
