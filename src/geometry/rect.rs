//! Axis-aligned rectangles
//!
//! Bounding boxes for chunks, agent bodies and cone extents.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Minimum corner
    pub position: Vec2,
    /// Size (width, height)
    pub size: Vec2,
}

impl Rect {
    /// Create a new rectangle from its minimum corner and size
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Create from two corners
    #[must_use]
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self {
            position: min,
            size: max - min,
        }
    }

    /// Create from a center and half extents
    #[must_use]
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            position: center - half_extents,
            size: half_extents * 2.0,
        }
    }

    /// Smallest rectangle covering all points. Returns `None` for an empty iterator.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self::from_min_max(min, max))
    }

    /// Minimum corner
    #[must_use]
    #[inline]
    pub fn min(&self) -> Vec2 {
        self.position
    }

    /// Maximum corner
    #[must_use]
    #[inline]
    pub fn max(&self) -> Vec2 {
        self.position + self.size
    }

    /// Center point
    #[must_use]
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// Half of the size
    #[must_use]
    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        self.size * 0.5
    }

    /// Check if a point is inside the rectangle (edges inclusive)
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.position.x
            && point.x <= max.x
            && point.y >= self.position.y
            && point.y <= max.y
    }

    /// Check if two rectangles overlap (touching edges count)
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x <= b_max.x && b_min.x <= a_max.x && a_min.y <= b_max.y && b_min.y <= a_max.y
    }

    /// Move by an offset
    #[must_use]
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            position: self.position + offset,
            size: self.size,
        }
    }

    /// Grow the rectangle so it covers its own area swept by `motion`.
    ///
    /// The growth is rounded outward to whole units.
    #[must_use]
    pub fn swept(&self, motion: Vec2) -> Self {
        let grow_min = motion.min(Vec2::ZERO).floor();
        let grow_max = motion.max(Vec2::ZERO).ceil();
        Self {
            position: self.position + grow_min,
            size: self.size - grow_min + grow_max,
        }
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}
