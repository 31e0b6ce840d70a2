//! Walking patrol guard
//!
//! Paces back and forth along a floor and turns around whenever it walks into
//! solid geometry. Its cone always looks the way it walks.

use std::f32::consts::PI;

use glam::Vec2;

use super::cone::ViewCone;
use crate::chunk::{ChunkQuery, Side};
use crate::core::DroneConfig;
use crate::geometry::{MovingBox, Rect};

/// Direction a ground patrol walks in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Heading {
    /// Towards -X
    Left,
    /// Towards +X
    #[default]
    Right,
}

impl Heading {
    /// The other way
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Facing angle in radians
    #[must_use]
    pub fn angle(self) -> f32 {
        match self {
            Self::Left => PI,
            Self::Right => 0.0,
        }
    }

    fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    fn blocked_by(self, side: Side) -> bool {
        matches!(
            (self, side),
            (Self::Left, Side::Left) | (Self::Right, Side::Right)
        )
    }
}

/// A guard that walks a floor and watches ahead
#[derive(Debug)]
pub struct GroundPatrol {
    bounds: Rect,
    speed: f32,
    spread: f32,
    heading: Heading,
    cone: ViewCone,
}

impl GroundPatrol {
    /// Create a patrol centered at `position`, walking right at the
    /// configured patrol speed
    #[must_use]
    pub fn new(position: Vec2, half_extents: Vec2, config: &DroneConfig) -> Self {
        let heading = Heading::default();
        let spread = config.view_spread.to_radians();
        Self {
            bounds: Rect::from_center(position, half_extents),
            speed: config.patrol_speed,
            spread,
            heading,
            cone: ViewCone::new(position, heading.angle(), spread, config.view_radius),
        }
    }

    /// Start walking the other way
    #[must_use]
    pub fn with_heading(mut self, heading: Heading) -> Self {
        self.heading = heading;
        self.cone.set_direction(heading.angle(), self.spread);
        self
    }

    /// Center of the body
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.bounds.center()
    }

    /// Body bounds
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Current walking direction
    #[must_use]
    pub fn heading(&self) -> Heading {
        self.heading
    }

    /// Walking velocity
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.heading.sign() * self.speed, 0.0)
    }

    /// Vision cone
    #[must_use]
    pub fn cone(&self) -> &ViewCone {
        &self.cone
    }

    /// Bounds and velocity for swept tests
    #[must_use]
    pub fn moving_box(&self) -> MovingBox {
        MovingBox::new(self.bounds, self.velocity())
    }

    /// Walk for `dt` seconds. Returns `true` if the patrol turned around.
    pub fn update<C: ChunkQuery + ?Sized>(&mut self, chunk: &C, dt: f32) -> bool {
        let mover = self.moving_box();
        let motion = mover.motion(dt);

        let turned = match chunk.collide_solid(&mover, dt) {
            Some(hit) if self.heading.blocked_by(hit.side) => {
                self.bounds = self.bounds.translated(motion * hit.time);
                self.heading = self.heading.reversed();
                log::debug!("patrol at {} turned {:?}", self.position(), self.heading);
                true
            }
            _ => {
                self.bounds = self.bounds.translated(motion);
                false
            }
        };

        self.cone.set_position(self.position());
        self.cone.set_direction(self.heading.angle(), self.spread);
        self.cone.update(chunk);
        turned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::TileChunk;

    const DT: f32 = 1.0 / 60.0;

    fn corridor() -> TileChunk {
        TileChunk::from_ascii(
            "##########\n\
             #........#\n\
             ##########\n",
            16.0,
        )
        .unwrap()
    }

    #[test]
    fn test_walks_and_turns_at_walls() {
        let chunk = corridor();
        let config = DroneConfig::default();
        let mut patrol = GroundPatrol::new(Vec2::new(40.0, 24.0), Vec2::new(4.0, 6.0), &config);

        let mut turns = Vec::new();
        for _ in 0..600 {
            if patrol.update(&chunk, DT) {
                turns.push(patrol.heading());
            }
            let x = patrol.position().x;
            assert!(x >= 20.0 - 1e-3 && x <= 140.0 + 1e-3, "walked into a wall: {x}");
        }

        // 120 units of floor at 50 per second: right wall, left wall, right wall
        assert!(turns.len() >= 3);
        assert_eq!(turns[0], Heading::Left);
        assert_eq!(turns[1], Heading::Right);
    }

    #[test]
    fn test_cone_looks_ahead() {
        let chunk = corridor();
        let config = DroneConfig::default();
        let mut patrol = GroundPatrol::new(Vec2::new(80.0, 24.0), Vec2::new(4.0, 6.0), &config);
        patrol.update(&chunk, DT);

        // Floor and ceiling clip the reach to about 19 units
        assert!(patrol.cone().contains(patrol.position() + Vec2::new(10.0, 0.0)));
        assert!(!patrol.cone().contains(patrol.position() - Vec2::new(10.0, 0.0)));

        let mut patrol = patrol.with_heading(Heading::Left);
        patrol.update(&chunk, DT);
        assert!(patrol.velocity().x < 0.0);
        assert!(patrol.cone().contains(patrol.position() - Vec2::new(10.0, 0.0)));
    }

    #[test]
    fn test_cone_is_clipped_by_wall_ahead() {
        let chunk = TileChunk::from_ascii(
            "......#...\n\
             ......#...\n\
             ......#...\n\
             ......#...\n\
             ......#...\n",
            16.0,
        )
        .unwrap();
        let config = DroneConfig::default();
        let mut patrol = GroundPatrol::new(Vec2::new(40.0, 40.0), Vec2::new(4.0, 6.0), &config);
        patrol.update(&chunk, DT);

        // Edges at 25 degrees meet the wall face at x = 96
        let reach = patrol.cone().radius();
        assert!(reach < config.view_radius);
        assert!(reach > 55.0, "reach {reach}");
    }
}
