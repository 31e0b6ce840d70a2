//! Facility alarm
//!
//! Raised when a drone spots the intruder and kept up by every further
//! sighting. It clears on its own once nobody has been seen for a while.

use glam::Vec2;

/// Alarm state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlarmState {
    /// Nothing going on
    #[default]
    Clear,
    /// Drones are hunting the intruder
    Raised,
}

/// What changed after an alarm call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlarmTransition {
    /// No change drones need to hear about
    None,
    /// The alarm went off; send drones to the position
    Raised(Vec2),
    /// A new sighting while raised; send drones to the new position
    Redispatched(Vec2),
    /// The alarm ran out
    Cleared,
}

/// Facility-wide alarm with a countdown
#[derive(Debug, Clone)]
pub struct Alarm {
    state: AlarmState,
    alarm_time: f32,
    timer: f32,
    last_known: Option<Vec2>,
}

impl Alarm {
    /// Create a clear alarm that stays raised for `alarm_time` seconds
    #[must_use]
    pub fn new(alarm_time: f32) -> Self {
        Self {
            state: AlarmState::Clear,
            alarm_time,
            timer: 0.0,
            last_known: None,
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> AlarmState {
        self.state
    }

    /// Whether the alarm is raised
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.state == AlarmState::Raised
    }

    /// Seconds left until the alarm clears
    #[must_use]
    pub fn remaining(&self) -> f32 {
        self.timer
    }

    /// Where the intruder was last seen
    #[must_use]
    pub fn last_known_position(&self) -> Option<Vec2> {
        self.last_known
    }

    /// The intruder was seen at `position`
    pub fn detect(&mut self, position: Vec2) -> AlarmTransition {
        self.last_known = Some(position);
        self.timer = self.alarm_time;

        match self.state {
            AlarmState::Clear => {
                log::info!("alarm raised, intruder at {position}");
                self.state = AlarmState::Raised;
                AlarmTransition::Raised(position)
            }
            AlarmState::Raised => AlarmTransition::Redispatched(position),
        }
    }

    /// Count down by `dt` seconds
    pub fn update(&mut self, dt: f32) -> AlarmTransition {
        if self.state != AlarmState::Raised {
            return AlarmTransition::None;
        }

        self.timer -= dt;
        if self.timer <= 0.0 {
            log::info!("alarm cleared");
            self.timer = 0.0;
            self.state = AlarmState::Clear;
            return AlarmTransition::Cleared;
        }
        AlarmTransition::None
    }
}

impl Default for Alarm {
    fn default() -> Self {
        Self::new(20.0)
    }
}
