//! Reduced paths and their cursor

use std::sync::Arc;

use glam::Vec2;

/// A reduced path being followed by an agent.
///
/// Point 0 is where the agent stood when the path was adopted; the cursor
/// starts at 1 and only moves forward.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    points: Arc<[Vec2]>,
    cursor: usize,
}

/// Read-only copy of a path and its cursor, handed to path workers
#[derive(Debug, Clone, PartialEq)]
pub struct PathSnapshot {
    /// Waypoints of the previous path
    pub points: Arc<[Vec2]>,
    /// Index of the waypoint that was next
    pub cursor: usize,
}

impl Path {
    /// Adopt a reduced path
    #[must_use]
    pub fn new(points: Vec<Vec2>) -> Self {
        Self {
            points: points.into(),
            cursor: 1,
        }
    }

    /// All waypoints
    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Number of waypoints
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the path has no points
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Index of the next waypoint
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Waypoints not yet reached
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.points.len().saturating_sub(self.cursor)
    }

    /// Next waypoint, if any
    #[must_use]
    pub fn waypoint(&self) -> Option<Vec2> {
        self.points.get(self.cursor).copied()
    }

    /// Whether the next waypoint is the final one
    #[must_use]
    pub fn on_final_leg(&self) -> bool {
        self.cursor + 1 >= self.points.len()
    }

    /// Last point of the path
    #[must_use]
    pub fn end(&self) -> Option<Vec2> {
        self.points.last().copied()
    }

    /// Mark the current waypoint as reached
    pub fn advance(&mut self) {
        self.cursor = (self.cursor + 1).min(self.points.len());
    }

    /// Whether every waypoint has been reached
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.points.len()
    }

    /// Cheap copy for a path worker
    #[must_use]
    pub fn snapshot(&self) -> PathSnapshot {
        PathSnapshot {
            points: Arc::clone(&self.points),
            cursor: self.cursor,
        }
    }
}
