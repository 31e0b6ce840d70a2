//! Steering for hovering agents
//!
//! Agents turn in place until they face their goal, then fly straight at it.
//! While idle they sweep their camera back and forth.

use std::f32::consts::PI;

use glam::Vec2;

use crate::geometry::normalize_angle;

/// Output from one steering step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteeringOutput {
    /// Velocity for this tick
    pub velocity: Vec2,
    /// New facing angle in radians
    pub facing: f32,
    /// Whether the goal was reached
    pub arrived: bool,
}

impl SteeringOutput {
    /// Standing still, facing `facing`
    #[must_use]
    pub fn hold(facing: f32) -> Self {
        Self {
            velocity: Vec2::ZERO,
            facing,
            arrived: false,
        }
    }
}

/// Turn-then-move towards a point
#[derive(Debug, Clone, Copy)]
pub struct MoveTo {
    /// Goal position
    pub target: Vec2,
    /// Flight speed once facing the goal
    pub speed: f32,
    /// Turn rate in radians per second
    pub turn_rate: f32,
}

impl MoveTo {
    /// Create a new move-to behavior
    #[must_use]
    pub fn new(target: Vec2, speed: f32, turn_rate: f32) -> Self {
        Self {
            target,
            speed,
            turn_rate,
        }
    }

    /// Steer for one tick of `dt` seconds.
    ///
    /// The goal counts as reached within two ticks of travel. Facings within
    /// two ticks of turning snap onto the goal, and the agent starts moving.
    #[must_use]
    pub fn steer(&self, position: Vec2, facing: f32, dt: f32) -> SteeringOutput {
        let to_target = self.target - position;
        let reach = 2.0 * dt * self.speed;

        if to_target.length_squared() <= reach * reach {
            return SteeringOutput {
                arrived: true,
                ..SteeringOutput::hold(facing)
            };
        }

        let heading = to_target.y.atan2(to_target.x);
        let ahead = normalize_angle(heading - facing);
        let snap = 2.0 * dt * self.turn_rate;

        if ahead <= snap || normalize_angle(facing - heading) <= snap {
            let facing = normalize_angle(heading);
            return match to_target.try_normalize() {
                Some(dir) => SteeringOutput {
                    velocity: dir * self.speed,
                    facing,
                    arrived: false,
                },
                None => SteeringOutput {
                    arrived: true,
                    ..SteeringOutput::hold(facing)
                },
            };
        }

        let step = dt * self.turn_rate;
        let turned = if ahead < PI { facing + step } else { facing - step };
        SteeringOutput::hold(normalize_angle(turned))
    }
}

/// Idle camera sweep.
///
/// Over `duration` seconds the agent holds, turns one way, holds, turns back
/// twice as long, holds, turns forward again and holds, ending where it began.
#[derive(Debug, Clone, Copy)]
pub struct IdleScan {
    /// Length of the whole sweep in seconds
    pub duration: f32,
    /// Turn rate in radians per second
    pub turn_rate: f32,
}

impl IdleScan {
    /// Create a new idle sweep
    #[must_use]
    pub fn new(duration: f32, turn_rate: f32) -> Self {
        Self {
            duration,
            turn_rate,
        }
    }

    /// Angular velocity after `elapsed` seconds, or `None` once the sweep is over
    #[must_use]
    pub fn angular_velocity(&self, elapsed: f32) -> Option<f32> {
        let phase = elapsed / self.duration;
        let rate = self.turn_rate;

        if phase <= 0.05 {
            Some(0.0)
        } else if phase <= 0.25 {
            Some(rate)
        } else if phase <= 0.3 {
            Some(0.0)
        } else if phase <= 0.7 {
            Some(-rate)
        } else if phase <= 0.75 {
            Some(0.0)
        } else if phase <= 0.95 {
            Some(rate)
        } else if phase <= 1.0 {
            Some(0.0)
        } else {
            None
        }
    }
}
