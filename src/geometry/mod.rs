//! 2D geometry primitives
//!
//! Rectangles, angle spans, homogeneous line intersection, circle tests and
//! swept boxes. Everything here is frame-discrete 2D math with no knowledge of
//! tiles or agents.

mod angle;
mod intersect;
mod moving;
mod rect;

pub use angle::{angle_distance, angle_in_span, normalize_angle, vector_angle};
pub use intersect::{
    CircleRoots, line_intersection, line_through, ray_circle_exit, segment_circle_roots,
};
pub use moving::{MovingBox, SweptPolygon};
pub use rect::Rect;
