//! In-memory tile chunk
//!
//! A rectangular block of square tiles with an origin in world space.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use glam::Vec2;

use super::{ChunkQuery, Collision, GridCoord, Side, TileKind};
use crate::geometry::{MovingBox, Rect};

/// Boundary contacts shorter than this (world units) are treated as grazing.
const GRAZE_EPSILON: f32 = 1e-4;

/// A 2D tile chunk
#[derive(Debug)]
pub struct TileChunk {
    /// Width in tiles
    width: usize,
    /// Height in tiles
    height: usize,
    /// Tile size in world units
    tile_size: f32,
    /// Row-major tiles
    tiles: Vec<TileKind>,
    /// World position of the chunk's minimum corner
    origin: Vec2,
    /// Chunk-wide alarm flag
    alarm: AtomicBool,
}

impl TileChunk {
    /// Create a new chunk (all tiles open)
    #[must_use]
    pub fn new(width: usize, height: usize, tile_size: f32) -> Self {
        Self {
            width,
            height,
            tile_size,
            tiles: vec![TileKind::Open; width * height],
            origin: Vec2::ZERO,
            alarm: AtomicBool::new(false),
        }
    }

    /// Place the chunk's minimum corner at `origin`
    #[must_use]
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Parse a chunk from an ASCII map.
    ///
    /// Each non-empty line is one row, starting at row 0. `.` or space is open,
    /// `#` is solid and `x` is a drone wall.
    ///
    /// # Errors
    ///
    /// Returns an error if the map is empty, rows differ in length, or a
    /// character is not a known tile.
    pub fn from_ascii(map: &str, tile_size: f32) -> Result<Self, ChunkError> {
        let rows: Vec<&str> = map
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .collect();

        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if width == 0 {
            return Err(ChunkError::Empty);
        }

        let mut chunk = Self::new(width, rows.len(), tile_size);
        for (y, line) in rows.iter().enumerate() {
            let len = line.chars().count();
            if len != width {
                return Err(ChunkError::RaggedRow {
                    row: y,
                    expected: width,
                    found: len,
                });
            }
            for (x, ch) in line.chars().enumerate() {
                let kind = match ch {
                    '.' | ' ' => TileKind::Open,
                    '#' => TileKind::Solid,
                    'x' => TileKind::DroneWall,
                    other => return Err(ChunkError::UnknownTile { row: y, col: x, ch: other }),
                };
                chunk.set_tile(x, y, kind);
            }
        }

        Ok(chunk)
    }

    /// Set a tile's kind. Out-of-range coordinates are ignored.
    pub fn set_tile(&mut self, x: usize, y: usize, kind: TileKind) {
        if x < self.width && y < self.height {
            self.tiles[y * self.width + x] = kind;
        }
    }

    /// Raise or clear the chunk alarm
    pub fn set_alarm(&self, raised: bool) {
        self.alarm.store(raised, Ordering::Relaxed);
    }

    /// World-space bounds of a single tile
    #[must_use]
    pub fn tile_bounds(&self, coord: GridCoord) -> Rect {
        Rect::new(
            self.origin.x + coord.col as f32 * self.tile_size,
            self.origin.y + coord.row as f32 * self.tile_size,
            self.tile_size,
            self.tile_size,
        )
    }

    /// Solid tiles whose bounds may overlap `area`
    fn solid_tiles_in(&self, area: Rect) -> impl Iterator<Item = GridCoord> + '_ {
        let pad = Vec2::splat(GRAZE_EPSILON);
        let lo = self.to_grid(area.min() - pad);
        let hi = self.to_grid(area.max() + pad);

        let col_lo = lo.col.max(0);
        let row_lo = lo.row.max(0);
        let col_hi = hi.col.min(self.width as i32 - 1);
        let row_hi = hi.row.min(self.height as i32 - 1);

        (row_lo..=row_hi)
            .flat_map(move |row| (col_lo..=col_hi).map(move |col| GridCoord::new(col, row)))
            .filter(|&c| self.tile(c) == TileKind::Solid)
    }
}

/// Slab intersection of a ray with a box.
///
/// Returns `(enter, exit, entry_axis)` in multiples of `dir`. With
/// `inclusive`, a ray lying exactly on a box edge is considered inside.
fn ray_box(origin: Vec2, dir: Vec2, bounds: Rect, inclusive: bool) -> Option<(f32, f32, usize)> {
    let (lo, hi) = (bounds.min(), bounds.max());
    let mut enter = f32::NEG_INFINITY;
    let mut exit = f32::INFINITY;
    let mut axis = 0;

    for i in 0..2 {
        if dir[i] == 0.0 {
            let inside = if inclusive {
                origin[i] >= lo[i] && origin[i] <= hi[i]
            } else {
                origin[i] > lo[i] && origin[i] < hi[i]
            };
            if !inside {
                return None;
            }
            continue;
        }

        let t1 = (lo[i] - origin[i]) / dir[i];
        let t2 = (hi[i] - origin[i]) / dir[i];
        let (near, far) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
        if near > enter {
            enter = near;
            axis = i;
        }
        exit = exit.min(far);
    }

    (enter <= exit).then_some((enter, exit, axis))
}

impl ChunkQuery for TileChunk {
    fn tile(&self, coord: GridCoord) -> TileKind {
        if !self.in_bounds(coord) {
            return TileKind::Solid;
        }
        self.tiles[coord.row as usize * self.width + coord.col as usize]
    }

    fn width(&self) -> i32 {
        self.width as i32
    }

    fn height(&self) -> i32 {
        self.height as i32
    }

    fn tile_size(&self) -> f32 {
        self.tile_size
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y,
            self.width as f32 * self.tile_size,
            self.height as f32 * self.tile_size,
        )
    }

    fn intersect_line(
        &self,
        origin: Vec2,
        dir: Vec2,
        max_fraction: f32,
        grazing: bool,
        edge_only: bool,
    ) -> Option<f32> {
        if max_fraction < 0.0 || !dir.is_finite() || !origin.is_finite() {
            return None;
        }

        let end = origin + dir * max_fraction;
        let area = Rect::from_min_max(origin.min(end), origin.max(end));
        let length = dir.length();
        let mut best: Option<f32> = None;

        for coord in self.solid_tiles_in(area) {
            let Some((enter, exit, _)) = ray_box(origin, dir, self.tile_bounds(coord), grazing)
            else {
                continue;
            };
            if exit < 0.0 || enter > max_fraction {
                continue;
            }
            if enter < 0.0 && edge_only {
                continue;
            }
            if !grazing && (exit - enter) * length <= GRAZE_EPSILON {
                continue;
            }

            let hit = enter.max(0.0);
            if best.is_none_or(|b| hit < b) {
                best = Some(hit);
            }
        }

        best
    }

    fn collide_solid(&self, mover: &MovingBox, dt: f32) -> Option<Collision> {
        let motion = mover.motion(dt);
        if motion == Vec2::ZERO {
            return None;
        }

        let half = mover.bounds.half_extents();
        let center = mover.center();
        let mut best: Option<Collision> = None;

        for coord in self.solid_tiles_in(mover.motion_bounds(dt)) {
            let tile = self.tile_bounds(coord);
            let expanded = Rect::from_center(tile.center(), tile.half_extents() + half);
            let Some((enter, exit, axis)) = ray_box(center, motion, expanded, false) else {
                continue;
            };
            if !(0.0..=1.0).contains(&enter) || exit - enter <= 0.0 {
                continue;
            }

            let side = match axis {
                0 if motion.x > 0.0 => Side::Right,
                0 => Side::Left,
                _ if motion.y > 0.0 => Side::Top,
                _ => Side::Bottom,
            };

            if best.is_none_or(|b| enter < b.time) {
                best = Some(Collision {
                    side,
                    time: enter,
                    obstacle: tile,
                });
            }
        }

        best
    }

    fn alarm_raised(&self) -> bool {
        self.alarm.load(Ordering::Relaxed)
    }
}

/// Errors that can occur while parsing an ASCII chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkError {
    /// The map has no tiles
    Empty,
    /// A row has a different length than the first row
    RaggedRow {
        /// Row index
        row: usize,
        /// Width of the first row
        expected: usize,
        /// Width of this row
        found: usize,
    },
    /// A character does not name a tile kind
    UnknownTile {
        /// Row index
        row: usize,
        /// Column index
        col: usize,
        /// Offending character
        ch: char,
    },
}

impl fmt::Display for ChunkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "chunk map is empty"),
            Self::RaggedRow { row, expected, found } => {
                write!(f, "row {row} has {found} tiles, expected {expected}")
            }
            Self::UnknownTile { row, col, ch } => {
                write!(f, "unknown tile '{ch}' at row {row}, column {col}")
            }
        }
    }
}

impl std::error::Error for ChunkError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_to_grid_and_back() {
        let chunk = TileChunk::new(10, 10, 16.0).with_origin(Vec2::new(100.0, 50.0));

        assert_eq!(chunk.to_grid(Vec2::new(100.0, 50.0)), GridCoord::new(0, 0));
        assert_eq!(chunk.to_grid(Vec2::new(133.0, 70.0)), GridCoord::new(2, 1));
        assert_eq!(chunk.to_grid(Vec2::new(99.0, 50.0)), GridCoord::new(-1, 0));
        assert_eq!(
            chunk.cell_center(GridCoord::new(2, 1)),
            Vec2::new(140.0, 74.0)
        );
    }

    #[test]
    fn test_out_of_bounds_is_solid() {
        let chunk = TileChunk::new(4, 4, 1.0);

        assert_eq!(chunk.tile(GridCoord::new(0, 0)), TileKind::Open);
        assert_eq!(chunk.tile(GridCoord::new(4, 0)), TileKind::Solid);
        assert_eq!(chunk.tile(GridCoord::new(0, -1)), TileKind::Solid);
    }

    #[test]
    fn test_from_ascii() {
        let chunk = TileChunk::from_ascii("..#.\n.x..\n", 8.0).unwrap();
        assert_eq!(chunk.width(), 4);
        assert_eq!(chunk.tile(GridCoord::new(2, 0)), TileKind::Solid);
        assert_eq!(chunk.tile(GridCoord::new(1, 1)), TileKind::DroneWall);
        assert_eq!(chunk.bounds(), Rect::new(0.0, 0.0, 32.0, 16.0));
    }

    #[test]
    fn test_from_ascii_errors() {
        assert_eq!(TileChunk::from_ascii("\n\n", 1.0).unwrap_err(), ChunkError::Empty);
        assert_eq!(
            TileChunk::from_ascii("...\n..\n", 1.0).unwrap_err(),
            ChunkError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            }
        );
        assert!(matches!(
            TileChunk::from_ascii("..?\n", 1.0),
            Err(ChunkError::UnknownTile { ch: '?', .. })
        ));
    }

    #[test]
    fn test_intersect_line_hits_wall() {
        let chunk = TileChunk::from_ascii(".....\n.....\n..#..\n", 10.0).unwrap();

        let hit = chunk.intersect_line(Vec2::new(5.0, 25.0), Vec2::new(40.0, 0.0), 1.0, false, true);
        let t = hit.unwrap();
        assert!((t - 0.375).abs() < 1e-4);

        let miss = chunk.intersect_line(Vec2::new(5.0, 5.0), Vec2::new(40.0, 0.0), 1.0, false, true);
        assert!(miss.is_none());
    }

    #[test]
    fn test_intersect_line_respects_max_fraction() {
        let chunk = TileChunk::from_ascii("....#\n", 10.0).unwrap();

        let dir = Vec2::new(1.0, 0.0);
        assert!(chunk.intersect_line(Vec2::new(5.0, 5.0), dir, 30.0, false, true).is_none());
        let t = chunk
            .intersect_line(Vec2::new(5.0, 5.0), dir, 50.0, false, true)
            .unwrap();
        assert!((t - 35.0).abs() < 1e-4);
    }

    #[test]
    fn test_intersect_line_edge_only_ignores_origin_tile() {
        let chunk = TileChunk::from_ascii("#...\n", 10.0).unwrap();
        let origin = Vec2::new(5.0, 5.0);
        let dir = Vec2::new(30.0, 0.0);

        assert!(chunk.intersect_line(origin, dir, 1.0, false, true).is_none());
        assert_eq!(chunk.intersect_line(origin, dir, 1.0, false, false), Some(0.0));
    }

    #[test]
    fn test_intersect_line_grazing() {
        let chunk = TileChunk::from_ascii("....\n.#..\n", 10.0).unwrap();
        // Runs exactly along the top edge of the solid tile
        let origin = Vec2::new(0.0, 10.0);
        let dir = Vec2::new(40.0, 0.0);

        assert!(chunk.intersect_line(origin, dir, 1.0, false, true).is_none());
        assert!(chunk.intersect_line(origin, dir, 1.0, true, true).is_some());
    }

    #[test]
    fn test_collide_solid() {
        let chunk = TileChunk::from_ascii("...#\n", 10.0).unwrap();
        let mover = MovingBox::new(
            Rect::from_center(Vec2::new(15.0, 5.0), Vec2::splat(2.0)),
            Vec2::new(20.0, 0.0),
        );

        let hit = chunk.collide_solid(&mover, 1.0).unwrap();
        assert_eq!(hit.side, Side::Right);
        assert!((hit.time - 0.65).abs() < 1e-4);
        assert_eq!(hit.obstacle, Rect::new(30.0, 0.0, 10.0, 10.0));

        let slow = MovingBox::new(mover.bounds, Vec2::new(5.0, 0.0));
        assert!(chunk.collide_solid(&slow, 1.0).is_none());
    }

    #[test]
    fn test_alarm_flag() {
        let chunk = TileChunk::new(2, 2, 1.0);
        assert!(!chunk.alarm_raised());
        chunk.set_alarm(true);
        assert!(chunk.alarm_raised());
    }
}
