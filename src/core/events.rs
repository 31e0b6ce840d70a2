//! Simulation event queue
//!
//! A double-buffered queue: events pushed while step N runs (and between
//! steps) become readable once step N swaps the buffers at its end. Consumers
//! such as audio or logging read them without being coupled to the drones
//! that produced them.
//!
//! # Example
//!
//! ```ignore
//! sim.step();
//! for event in sim.events() {
//!     if let SimEvent::AlarmRaised { position } = event {
//!         show_alarm_banner(*position);
//!     }
//! }
//! ```

use std::collections::VecDeque;

use glam::Vec2;

use super::engine::{DroneId, PatrolId};
use crate::ai::DroneEvent;

// ============================================================================
// Event Types
// ============================================================================

/// Things that happened during a simulation step.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SimEvent {
    /// Something a drone reported about itself.
    Drone {
        /// Drone that produced the event
        id: DroneId,
        /// What happened
        event: DroneEvent,
    },

    /// A drone's cone touched the intruder.
    IntruderSpotted {
        /// Drone that saw the intruder
        by: DroneId,
        /// Intruder center
        position: Vec2,
    },

    /// A ground patrol's cone touched the intruder.
    PatrolSpotted {
        /// Patrol that saw the intruder
        by: PatrolId,
        /// Intruder center
        position: Vec2,
    },

    /// A drone's body touched the intruder.
    IntruderCaught {
        /// Drone that made contact
        by: DroneId,
    },

    /// A sound was emitted into the facility.
    SoundEmitted {
        /// Source position
        position: Vec2,
        /// Base volume
        volume: f32,
    },

    /// The alarm went off.
    AlarmRaised {
        /// Where the intruder was seen
        position: Vec2,
    },

    /// The alarm ran out.
    AlarmCleared,
}

impl SimEvent {
    /// Whether this is a sighting by a drone or a patrol
    #[must_use]
    pub fn is_sighting(&self) -> bool {
        matches!(self, Self::IntruderSpotted { .. } | Self::PatrolSpotted { .. })
    }
}

// ============================================================================
// Event Queue
// ============================================================================

/// Double-buffered event queue, swapped once per simulation step.
#[derive(Debug)]
pub struct EventQueue {
    /// Events produced by the step in progress
    current: VecDeque<SimEvent>,
    /// Events of the last finished step
    published: VecDeque<SimEvent>,
}

impl EventQueue {
    /// Typical number of events in a busy step
    const STEP_CAPACITY: usize = 64;

    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: VecDeque::with_capacity(Self::STEP_CAPACITY),
            published: VecDeque::with_capacity(Self::STEP_CAPACITY),
        }
    }

    /// Record an event of the step in progress.
    #[inline]
    pub fn push(&mut self, event: SimEvent) {
        self.current.push_back(event);
    }

    /// Publish the step in progress. Published events that were never drained
    /// are dropped.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.published);
        self.current.clear();
    }

    /// Events of the last finished step
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &SimEvent> {
        self.published.iter()
    }

    /// Take the events of the last finished step
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = SimEvent> + '_ {
        self.published.drain(..)
    }

    /// What one drone reported about itself during the last finished step
    pub fn for_drone(&self, id: DroneId) -> impl Iterator<Item = &DroneEvent> {
        self.published.iter().filter_map(move |event| match event {
            SimEvent::Drone { id: from, event } if *from == id => Some(event),
            _ => None,
        })
    }

    /// Whether anyone saw the intruder during the last finished step
    #[must_use]
    pub fn intruder_seen(&self) -> bool {
        self.published.iter().any(SimEvent::is_sighting)
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{ConeColor, DroneState};

    fn state_change(id: usize, to: DroneState) -> SimEvent {
        SimEvent::Drone {
            id: DroneId(id),
            event: DroneEvent::StateChanged {
                from: DroneState::Patrolling,
                to,
            },
        }
    }

    #[test]
    fn test_step_is_published_on_swap() {
        let mut queue = EventQueue::new();

        queue.push(SimEvent::AlarmCleared);
        assert!(queue.iter().next().is_none(), "step still in progress");

        queue.swap();
        assert_eq!(queue.iter().collect::<Vec<_>>(), vec![&SimEvent::AlarmCleared]);

        // A step with no events hides the previous one
        queue.swap();
        assert!(queue.iter().next().is_none());
    }

    #[test]
    fn test_next_step_stays_hidden_while_reading() {
        let mut queue = EventQueue::new();
        queue.push(SimEvent::IntruderCaught { by: DroneId(0) });
        queue.swap();

        queue.push(SimEvent::IntruderCaught { by: DroneId(1) });
        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(drained, vec![SimEvent::IntruderCaught { by: DroneId(0) }]);
        assert!(queue.iter().next().is_none());

        queue.swap();
        assert_eq!(
            queue.iter().collect::<Vec<_>>(),
            vec![&SimEvent::IntruderCaught { by: DroneId(1) }]
        );
    }

    #[test]
    fn test_events_for_one_drone() {
        let mut queue = EventQueue::new();
        queue.push(state_change(0, DroneState::Searching));
        queue.push(state_change(1, DroneState::Targeting));
        queue.push(SimEvent::Drone {
            id: DroneId(1),
            event: DroneEvent::ConeColorChanged(ConeColor::Alert),
        });
        queue.swap();

        let first: Vec<_> = queue.for_drone(DroneId(0)).collect();
        assert_eq!(first.len(), 1);
        assert!(matches!(
            first[0],
            DroneEvent::StateChanged { to: DroneState::Searching, .. }
        ));

        assert_eq!(queue.for_drone(DroneId(1)).count(), 2);
        assert_eq!(queue.for_drone(DroneId(2)).count(), 0);
    }

    #[test]
    fn test_sightings() {
        let mut queue = EventQueue::new();
        queue.push(SimEvent::SoundEmitted { position: Vec2::ONE, volume: 50.0 });
        queue.swap();
        assert!(!queue.intruder_seen());

        queue.push(SimEvent::PatrolSpotted { by: PatrolId(0), position: Vec2::ONE });
        queue.swap();
        assert!(queue.intruder_seen());
        assert!(!SimEvent::AlarmRaised { position: Vec2::ONE }.is_sighting());
    }
}
