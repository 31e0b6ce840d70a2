//! Path reduction
//!
//! Turns a raw grid path into a short list of waypoints that an agent of a
//! given width can fly between in straight lines.

use glam::Vec2;

use super::path::PathSnapshot;
use super::task::CancelToken;
use crate::chunk::ChunkQuery;

/// Whether a body of `half_width` can travel from `from` along `dir`.
///
/// Two rays are cast along the body's edges, offset perpendicular to the
/// direction of travel.
pub(crate) fn body_clear<C: ChunkQuery + ?Sized>(
    chunk: &C,
    from: Vec2,
    dir: Vec2,
    half_width: f32,
) -> bool {
    let offset = Vec2::new(dir.y, -dir.x).normalize_or_zero() * half_width;
    chunk
        .intersect_line(from + offset, dir, 1.0, false, true)
        .is_none()
        && chunk
            .intersect_line(from - offset, dir, 1.0, false, true)
            .is_none()
}

/// Reduce a raw, target-first path.
///
/// The result starts at `position` and ends at `raw[0]`. When a waypoint has
/// to be kept and it also lies on the path the agent was following, the
/// already reduced part of that path is reused from the agent's last reached
/// waypoint.
///
/// A missing `raw` path reduces to an empty list. Returns `None` if `cancel`
/// was triggered.
#[must_use]
pub fn reduce_path<C: ChunkQuery + ?Sized>(
    chunk: &C,
    raw: Option<&[Vec2]>,
    half_width: f32,
    position: Vec2,
    previous: Option<&PathSnapshot>,
    cancel: &CancelToken,
) -> Option<Vec<Vec2>> {
    let Some(raw) = raw else {
        return Some(Vec::new());
    };
    let Some(&target) = raw.first() else {
        return Some(Vec::new());
    };

    let mut reduced = vec![position];
    let mut last_clear = position;

    for &candidate in raw[1..].iter().rev() {
        if cancel.is_cancelled() {
            return None;
        }

        let base = reduced.last().copied().unwrap_or(position);
        if !body_clear(chunk, base, candidate - base, half_width) {
            match previous.and_then(|prev| splice(prev, last_clear)) {
                Some(reused) => reduced = reused,
                None => push_distinct(&mut reduced, last_clear),
            }
        }

        last_clear = candidate;
    }

    push_distinct(&mut reduced, target);
    Some(reduced)
}

/// Previous path from the last reached waypoint up to `point`, if `point` is
/// still ahead on it
fn splice(previous: &PathSnapshot, point: Vec2) -> Option<Vec<Vec2>> {
    let ahead = previous.points.get(previous.cursor..)?;
    let found = previous.cursor + ahead.iter().position(|&p| p == point)?;
    Some(previous.points[previous.cursor.saturating_sub(1)..=found].to_vec())
}

fn push_distinct(points: &mut Vec<Vec2>, point: Vec2) {
    if points.last() != Some(&point) {
        points.push(point);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::path::Path;
    use crate::chunk::{GridCoord, TileChunk};

    fn reduce(chunk: &TileChunk, raw: &[Vec2], position: Vec2) -> Vec<Vec2> {
        reduce_path(chunk, Some(raw), 2.0, position, None, &CancelToken::new()).unwrap()
    }

    #[test]
    fn test_straight_path_reduces_to_endpoints() {
        let chunk = TileChunk::new(8, 8, 16.0);
        let raw: Vec<Vec2> = (0..6)
            .rev()
            .map(|c| chunk.cell_center(GridCoord::new(c, 2)))
            .collect();
        let position = Vec2::new(9.0, 40.0);

        let reduced = reduce(&chunk, &raw, position);
        assert_eq!(reduced, vec![position, raw[0]]);
    }

    #[test]
    fn test_missing_path_reduces_to_nothing() {
        let chunk = TileChunk::new(4, 4, 16.0);
        let reduced = reduce_path(&chunk, None, 2.0, Vec2::ZERO, None, &CancelToken::new());
        assert_eq!(reduced, Some(Vec::new()));
    }

    #[test]
    fn test_cancelled_reduction() {
        let chunk = TileChunk::new(4, 4, 16.0);
        let token = CancelToken::new();
        token.cancel();
        let raw = [Vec2::new(40.0, 8.0), Vec2::new(24.0, 8.0), Vec2::new(8.0, 8.0)];

        assert!(reduce_path(&chunk, Some(&raw[..]), 2.0, Vec2::new(8.0, 8.0), None, &token).is_none());
    }

    #[test]
    fn test_corner_is_kept() {
        // Around the corner of an L-shaped corridor
        let chunk = TileChunk::from_ascii(
            "...\n\
             ##.\n\
             ##.\n",
            16.0,
        )
        .unwrap();
        let start = chunk.cell_center(GridCoord::new(0, 0));
        let corner = chunk.cell_center(GridCoord::new(2, 0));
        let end = chunk.cell_center(GridCoord::new(2, 2));
        let raw = [
            end,
            chunk.cell_center(GridCoord::new(2, 1)),
            corner,
            chunk.cell_center(GridCoord::new(1, 0)),
            start,
        ];

        let reduced = reduce(&chunk, &raw, start);
        assert_eq!(reduced, vec![start, corner, end]);
    }

    #[test]
    fn test_reuses_previous_path() {
        let chunk = TileChunk::from_ascii(
            "...\n\
             ##.\n\
             ##.\n",
            16.0,
        )
        .unwrap();
        let start = chunk.cell_center(GridCoord::new(0, 0));
        let corner = chunk.cell_center(GridCoord::new(2, 0));
        let end = chunk.cell_center(GridCoord::new(2, 2));
        let behind = Vec2::new(-20.0, 8.0);

        // The agent was already flying toward the same corner
        let mut previous = Path::new(vec![behind, start, corner, Vec2::new(60.0, 60.0)]);
        previous.advance();
        let snapshot = previous.snapshot();

        let raw = [
            end,
            chunk.cell_center(GridCoord::new(2, 1)),
            corner,
            chunk.cell_center(GridCoord::new(1, 0)),
            start,
        ];
        let reduced = reduce_path(
            &chunk,
            Some(&raw[..]),
            2.0,
            Vec2::new(10.0, 8.0),
            Some(&snapshot),
            &CancelToken::new(),
        )
        .unwrap();

        assert_eq!(reduced, vec![start, corner, end]);
    }

    #[test]
    fn test_unrelated_previous_path_is_ignored() {
        let chunk = TileChunk::from_ascii(
            "...\n\
             ##.\n\
             ##.\n",
            16.0,
        )
        .unwrap();
        let start = chunk.cell_center(GridCoord::new(0, 0));
        let corner = chunk.cell_center(GridCoord::new(2, 0));
        let end = chunk.cell_center(GridCoord::new(2, 2));
        let position = Vec2::new(10.0, 8.0);
        let raw = [
            end,
            chunk.cell_center(GridCoord::new(2, 1)),
            corner,
            chunk.cell_center(GridCoord::new(1, 0)),
            start,
        ];
        let fresh = reduce(&chunk, &raw, position);

        // Never passes the corner
        let elsewhere = Path::new(vec![position, Vec2::new(8.0, 20.0), Vec2::new(30.0, 30.0)]);
        // Passed the corner already, so it is behind the cursor
        let mut passed = Path::new(vec![position, corner, Vec2::new(40.0, 8.0)]);
        passed.advance();
        passed.advance();

        for previous in [elsewhere.snapshot(), passed.snapshot()] {
            let reduced = reduce_path(
                &chunk,
                Some(&raw[..]),
                2.0,
                position,
                Some(&previous),
                &CancelToken::new(),
            )
            .unwrap();
            assert_eq!(reduced, fresh);
        }
        assert_eq!(fresh, vec![position, corner, end]);
    }

    #[test]
    fn test_wide_body_keeps_more_waypoints() {
        let chunk = TileChunk::from_ascii(
            "....\n\
             ....\n\
             .#..\n",
            16.0,
        )
        .unwrap();
        let start = chunk.cell_center(GridCoord::new(0, 1));
        let raw = [
            chunk.cell_center(GridCoord::new(3, 1)),
            chunk.cell_center(GridCoord::new(2, 1)),
            chunk.cell_center(GridCoord::new(1, 1)),
            start,
        ];

        let thin = reduce_path(&chunk, Some(&raw[..]), 2.0, start, None, &CancelToken::new()).unwrap();
        assert_eq!(thin.len(), 2);

        // A wider body clips the wall below and needs an extra waypoint
        let wide = reduce_path(&chunk, Some(&raw[..]), 10.0, start, None, &CancelToken::new()).unwrap();
        assert!(wide.len() > thin.len());
    }
}
