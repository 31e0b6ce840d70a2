//! A* pathfinding on a tile chunk
//!
//! 8-directional search with no corner cutting. Paths are returned in reverse
//! order: the first point is the destination, the last the start cell center.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::f32::consts::SQRT_2;

use glam::Vec2;
use rustc_hash::{FxHashMap, FxHashSet};

use super::task::CancelToken;
use crate::chunk::{ChunkQuery, GridCoord};

/// A* node for priority queue
#[derive(Debug, Clone)]
struct Node {
    coord: GridCoord,
    g_cost: f32, // Cost from start
    f_cost: f32, // g_cost + heuristic
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap: lowest f first, then lowest row, then lowest column
        other
            .f_cost
            .total_cmp(&self.f_cost)
            .then_with(|| other.coord.row.cmp(&self.coord.row))
            .then_with(|| other.coord.col.cmp(&self.coord.col))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Euclidean distance between cells, in cells
fn cell_distance(a: GridCoord, b: GridCoord) -> f32 {
    let dx = (a.col - b.col) as f32;
    let dy = (a.row - b.row) as f32;
    (dx * dx + dy * dy).sqrt()
}

/// Find a path from `start` to the world position `target`.
///
/// The result is target-first: the literal `target` followed by cell centers
/// back to the start cell. If the target cell cannot be reached, the path
/// leads to the reachable cell closest to it instead. `aerial` agents are also
/// blocked by drone walls.
///
/// Returns `None` only if `cancel` was triggered during the search.
#[must_use]
pub fn find_path<C: ChunkQuery + ?Sized>(
    chunk: &C,
    start: GridCoord,
    target: Vec2,
    cancel: &CancelToken,
    aerial: bool,
) -> Option<Vec<Vec2>> {
    let goal = chunk.to_grid(target);

    let mut open_set = BinaryHeap::new();
    let mut closed: FxHashSet<GridCoord> = FxHashSet::default();
    let mut came_from: FxHashMap<GridCoord, GridCoord> = FxHashMap::default();
    let mut g_score: FxHashMap<GridCoord, f32> = FxHashMap::default();

    let mut best = start;
    let mut best_distance = cell_distance(start, goal);

    g_score.insert(start, 0.0);
    open_set.push(Node {
        coord: start,
        g_cost: 0.0,
        f_cost: best_distance,
    });

    let blocked = |c: GridCoord| chunk.tile(c).blocks(aerial);

    while let Some(current) = open_set.pop() {
        if cancel.is_cancelled() {
            return None;
        }

        if current.coord == goal {
            return Some(reconstruct_path(chunk, &came_from, current.coord, target));
        }

        // Stale heap entry superseded by a cheaper one
        if !closed.insert(current.coord) {
            continue;
        }

        for dr in -1..=1 {
            for dc in -1..=1 {
                if dc == 0 && dr == 0 {
                    continue;
                }

                let neighbor = current.coord.offset(dc, dr);
                if !chunk.in_bounds(neighbor) || blocked(neighbor) || closed.contains(&neighbor) {
                    continue;
                }

                let diagonal = dc != 0 && dr != 0;
                if diagonal
                    && (blocked(current.coord.offset(dc, 0)) || blocked(current.coord.offset(0, dr)))
                {
                    continue;
                }

                let step = if diagonal { SQRT_2 } else { 1.0 };
                let tentative_g = current.g_cost + step;

                let known = g_score.get(&neighbor).copied();
                if known.is_some_and(|g| tentative_g >= g) {
                    continue;
                }

                let distance = cell_distance(neighbor, goal);
                if known.is_none() && distance < best_distance {
                    best_distance = distance;
                    best = neighbor;
                }

                came_from.insert(neighbor, current.coord);
                g_score.insert(neighbor, tentative_g);
                open_set.push(Node {
                    coord: neighbor,
                    g_cost: tentative_g,
                    f_cost: tentative_g + distance,
                });
            }
        }
    }

    // Target unreachable: head for the closest cell that was reached
    let best_center = chunk.cell_center(best);
    log::trace!("target {target} unreachable, falling back to cell {best:?}");
    Some(match came_from.get(&best) {
        Some(&previous) => reconstruct_path(chunk, &came_from, previous, best_center),
        None => vec![best_center],
    })
}

/// Walk the connection graph back from `current`.
fn reconstruct_path<C: ChunkQuery + ?Sized>(
    chunk: &C,
    came_from: &FxHashMap<GridCoord, GridCoord>,
    mut current: GridCoord,
    first_point: Vec2,
) -> Vec<Vec2> {
    let mut path = vec![first_point, chunk.cell_center(current)];

    while let Some(&previous) = came_from.get(&current) {
        path.push(chunk.cell_center(previous));
        current = previous;
    }

    path
}

/// Total length of a polyline
#[must_use]
pub fn path_length(points: &[Vec2]) -> f32 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{TileChunk, TileKind};

    fn search(chunk: &TileChunk, from: (i32, i32), to: Vec2) -> Vec<Vec2> {
        find_path(
            chunk,
            GridCoord::new(from.0, from.1),
            to,
            &CancelToken::new(),
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_direct_path() {
        let chunk = TileChunk::new(10, 10, 1.0);

        let path = search(&chunk, (0, 0), Vec2::new(3.7, 0.2));

        // Literal target, then 4 cell centers back to the start
        assert_eq!(path.len(), 5);
        assert_eq!(path[0], Vec2::new(3.7, 0.2));
        assert_eq!(path[1], Vec2::new(3.5, 0.5));
        assert_eq!(*path.last().unwrap(), Vec2::new(0.5, 0.5));
    }

    #[test]
    fn test_optimal_length_open_grid() {
        let chunk = TileChunk::new(10, 10, 2.0);

        let target = chunk.cell_center(GridCoord::new(3, 5));
        let path = search(&chunk, (0, 0), target);

        let expected = (3.0 * SQRT_2 + 2.0) * 2.0;
        assert!((path_length(&path[1..]) - expected).abs() < 1e-3);
    }

    #[test]
    fn test_path_around_wall() {
        let mut chunk = TileChunk::new(10, 10, 1.0);

        // Create a wall
        for y in 2..8 {
            chunk.set_tile(5, y, TileKind::Solid);
        }

        let path = search(&chunk, (2, 5), Vec2::new(8.5, 5.5));

        assert!(path.len() > 2);
        for point in &path {
            assert_ne!(chunk.tile(chunk.to_grid(*point)), TileKind::Solid);
        }
        // Under the wall: the corner tiles force one straight step on each side
        let expected = 4.0 * SQRT_2 + 4.0;
        assert!((path_length(&path[1..]) - expected).abs() < 1e-3);
    }

    #[test]
    fn test_no_corner_cutting() {
        let chunk = TileChunk::from_ascii(
            "....\n\
             .#..\n\
             ....\n\
             ....\n",
            1.0,
        )
        .unwrap();

        let path = search(&chunk, (0, 0), Vec2::new(2.5, 2.5));

        for pair in path[1..].windows(2) {
            let a = chunk.to_grid(pair[0]);
            let b = chunk.to_grid(pair[1]);
            let (dc, dr) = (b.col - a.col, b.row - a.row);
            if dc != 0 && dr != 0 {
                assert_eq!(chunk.tile(a.offset(dc, 0)), TileKind::Open);
                assert_eq!(chunk.tile(a.offset(0, dr)), TileKind::Open);
            }
        }
    }

    #[test]
    fn test_drone_wall_only_blocks_aerial() {
        let chunk = TileChunk::from_ascii(
            "..x..\n\
             ..x..\n\
             ..x..\n",
            1.0,
        )
        .unwrap();
        let target = Vec2::new(4.5, 1.5);
        let token = CancelToken::new();

        let walker = find_path(&chunk, GridCoord::new(0, 1), target, &token, false).unwrap();
        assert_eq!(walker[0], target);

        let drone = find_path(&chunk, GridCoord::new(0, 1), target, &token, true).unwrap();
        assert_ne!(drone[0], target);
        assert_eq!(chunk.to_grid(drone[0]), GridCoord::new(1, 1));
    }

    #[test]
    fn test_unreachable_falls_back_to_closest_cell() {
        let chunk = TileChunk::from_ascii(
            "......\n\
             ...###\n\
             ...#..\n\
             ...#..\n",
            1.0,
        )
        .unwrap();

        let path = search(&chunk, (0, 0), Vec2::new(4.5, 3.5));

        // Closest reachable cell to (4, 3) is (2, 3)
        assert_eq!(path[0], Vec2::new(2.5, 3.5));
        assert_eq!(*path.last().unwrap(), Vec2::new(0.5, 0.5));
    }

    #[test]
    fn test_isolated_start_returns_single_point() {
        let chunk = TileChunk::from_ascii(
            "###.\n\
             #.#.\n\
             ###.\n",
            1.0,
        )
        .unwrap();

        let path = search(&chunk, (1, 1), Vec2::new(3.5, 0.5));

        assert_eq!(path, vec![Vec2::new(1.5, 1.5)]);
    }

    #[test]
    fn test_deterministic() {
        let chunk = TileChunk::from_ascii(
            "........\n\
             ..##....\n\
             ....#...\n\
             ........\n",
            4.0,
        )
        .unwrap();

        let a = search(&chunk, (0, 3), Vec2::new(30.0, 2.0));
        let b = search(&chunk, (0, 3), Vec2::new(30.0, 2.0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_cancelled_search_returns_none() {
        let chunk = TileChunk::new(20, 20, 1.0);
        let token = CancelToken::new();
        token.cancel();

        let path = find_path(&chunk, GridCoord::new(0, 0), Vec2::new(19.5, 19.5), &token, true);
        assert!(path.is_none());
    }
}
