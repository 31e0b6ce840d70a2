//! Level chunk queries
//!
//! The AI core never owns level geometry. It reads it through [`ChunkQuery`],
//! which a game implements on top of its own level representation.
//! [`TileChunk`] is an in-memory implementation built from tile arrays or
//! ASCII maps.

mod tile_chunk;

use std::sync::Arc;

use glam::Vec2;

use crate::geometry::{MovingBox, Rect};

pub use tile_chunk::{ChunkError, TileChunk};

/// Terrain kind of a single tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TileKind {
    /// Free space
    #[default]
    Open,
    /// Solid geometry: blocks movement, sight and sound
    Solid,
    /// Barrier that only aerial drones may not path through
    DroneWall,
}

impl TileKind {
    /// Whether an agent may not enter this tile
    #[must_use]
    pub const fn blocks(self, aerial: bool) -> bool {
        match self {
            Self::Open => false,
            Self::Solid => true,
            Self::DroneWall => aerial,
        }
    }
}

/// Integer cell coordinate inside a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCoord {
    /// Column (x)
    pub col: i32,
    /// Row (y)
    pub row: i32,
}

impl GridCoord {
    /// Create a coordinate
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Offset by a step
    #[must_use]
    pub const fn offset(self, dc: i32, dr: i32) -> Self {
        Self {
            col: self.col + dc,
            row: self.row + dr,
        }
    }
}

/// Side of a moving box that hit level geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Hit while moving in -X
    Left,
    /// Hit while moving in +X
    Right,
    /// Hit while moving in -Y
    Bottom,
    /// Hit while moving in +Y
    Top,
}

/// First contact of a moving box with solid geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    /// Side of the moving box that made contact
    pub side: Side,
    /// Fraction of the step at which contact happens, in `[0, 1]`
    pub time: f32,
    /// Bounds of the tile that was hit
    pub obstacle: Rect,
}

/// Read-only view of a level chunk used by pathfinding and sensing.
///
/// Implementations must be safe to share with pathfinding worker threads; the
/// tile layout must not change while a chunk is shared.
pub trait ChunkQuery {
    /// Tile at a grid coordinate. Coordinates outside the chunk are `Solid`.
    fn tile(&self, coord: GridCoord) -> TileKind;

    /// Width in tiles
    fn width(&self) -> i32;

    /// Height in tiles
    fn height(&self) -> i32;

    /// Edge length of one tile in world units
    fn tile_size(&self) -> f32;

    /// World-space bounds of the chunk
    fn bounds(&self) -> Rect;

    /// Cast `origin + t * dir` for `t` in `[0, max_fraction]` against solid
    /// geometry and return the smallest hit `t`.
    ///
    /// With `grazing`, rays that only touch a tile boundary count as hits.
    /// With `edge_only`, tiles that already contain the origin are ignored.
    fn intersect_line(
        &self,
        origin: Vec2,
        dir: Vec2,
        max_fraction: f32,
        grazing: bool,
        edge_only: bool,
    ) -> Option<f32>;

    /// Earliest contact of a moving box with solid geometry during `dt`
    fn collide_solid(&self, mover: &MovingBox, dt: f32) -> Option<Collision>;

    /// Whether the chunk-wide alarm is raised
    fn alarm_raised(&self) -> bool;

    /// Grid cell containing a world position
    fn to_grid(&self, pos: Vec2) -> GridCoord {
        let local = (pos - self.bounds().min()) / self.tile_size();
        GridCoord::new(local.x.floor() as i32, local.y.floor() as i32)
    }

    /// World position of a cell's center
    fn cell_center(&self, coord: GridCoord) -> Vec2 {
        let size = self.tile_size();
        self.bounds().min()
            + Vec2::new(
                (coord.col as f32 + 0.5) * size,
                (coord.row as f32 + 0.5) * size,
            )
    }

    /// Whether a coordinate is inside the chunk
    fn in_bounds(&self, coord: GridCoord) -> bool {
        coord.col >= 0 && coord.row >= 0 && coord.col < self.width() && coord.row < self.height()
    }
}

/// A chunk shared between a controller and its pathfinding workers
pub type SharedChunk = Arc<dyn ChunkQuery + Send + Sync>;
