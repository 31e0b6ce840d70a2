//! Headless facility simulation
//!
//! Owns one chunk, its drones, the facility alarm and an optional intruder,
//! and advances them at a fixed timestep. The simulation is the glue between
//! sensors and behavior: it tests every cone against the intruder, routes
//! sounds to drones, and broadcasts alarm changes.

use std::sync::Arc;

use glam::Vec2;

use super::config::FacilityConfig;
use super::events::{EventQueue, SimEvent};
use crate::ai::{Alarm, AlarmTransition, Drone, DroneEvent, GroundPatrol};
use crate::chunk::{ChunkQuery, SharedChunk, Side, TileChunk};
use crate::geometry::{MovingBox, Rect};

/// Handle to a drone owned by a [`Simulation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DroneId(pub usize);

/// Handle to a ground patrol owned by a [`Simulation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatrolId(pub usize);

// ============================================================================
// Intruder
// ============================================================================

/// The player-controlled body the drones are hunting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intruder {
    /// Current bounds
    pub bounds: Rect,
    /// Velocity in units per second
    pub velocity: Vec2,
    /// Hidden intruders are never spotted or caught
    pub hidden: bool,
}

impl Intruder {
    /// Create a resting intruder centered at `position`
    #[must_use]
    pub fn new(position: Vec2, half_extents: Vec2) -> Self {
        Self {
            bounds: Rect::from_center(position, half_extents),
            velocity: Vec2::ZERO,
            hidden: false,
        }
    }

    /// Set the velocity
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Center of the body
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.bounds.center()
    }

    /// Bounds and velocity for swept tests
    #[must_use]
    pub fn moving_box(&self) -> MovingBox {
        MovingBox::new(self.bounds, self.velocity)
    }
}

// ============================================================================
// Simulation
// ============================================================================

/// Fixed-step driver for a facility full of drones
pub struct Simulation {
    config: FacilityConfig,
    tiles: Arc<TileChunk>,
    chunk: SharedChunk,
    drones: Vec<Drone>,
    patrols: Vec<GroundPatrol>,
    alarm: Alarm,
    intruder: Option<Intruder>,
    events: EventQueue,
    tick: u64,
}

impl Simulation {
    /// Create an empty simulation over `chunk`
    #[must_use]
    pub fn new(config: FacilityConfig, chunk: Arc<TileChunk>) -> Self {
        log::info!(
            "facility {}x{} tiles at {} ticks per second",
            chunk.width(),
            chunk.height(),
            config.tick_rate
        );

        let shared: SharedChunk = chunk.clone();
        Self {
            alarm: Alarm::new(config.alarm_time),
            config,
            tiles: chunk,
            chunk: shared,
            drones: Vec::new(),
            patrols: Vec::new(),
            intruder: None,
            events: EventQueue::new(),
            tick: 0,
        }
    }

    /// Spawn a drone. Each drone gets its own seed derived from the base seed.
    pub fn add_drone(&mut self, spawn: Vec2) -> DroneId {
        let id = DroneId(self.drones.len());
        let seed = self.config.seed.wrapping_add(id.0 as u64);
        self.drones
            .push(Drone::new(spawn, self.config.drone.clone(), seed));
        log::debug!("drone {} spawned at {spawn}", id.0);
        id
    }

    /// Spawn a ground patrol standing at `position`, walking right
    pub fn add_patrol(&mut self, position: Vec2) -> PatrolId {
        let id = PatrolId(self.patrols.len());
        let tile = self.chunk.tile_size();
        let half_extents = Vec2::new(tile / 4.0, tile * 0.375);
        self.patrols
            .push(GroundPatrol::new(position, half_extents, &self.config.drone));
        log::debug!("patrol {} spawned at {position}", id.0);
        id
    }

    /// Place the intruder, replacing any previous one
    pub fn set_intruder(&mut self, intruder: Intruder) {
        self.intruder = Some(intruder);
    }

    /// Current intruder
    #[must_use]
    pub fn intruder(&self) -> Option<&Intruder> {
        self.intruder.as_ref()
    }

    /// Current intruder, for steering it between steps
    pub fn intruder_mut(&mut self) -> Option<&mut Intruder> {
        self.intruder.as_mut()
    }

    /// Make a noise at `position`. Returns how many drones went to check it.
    pub fn emit_sound(&mut self, position: Vec2, volume: f32) -> usize {
        self.events.push(SimEvent::SoundEmitted { position, volume });

        let mut reacted = 0;
        for drone in &mut self.drones {
            if drone.hear_sound(&self.chunk, position, volume) {
                reacted += 1;
            }
        }
        reacted
    }

    /// Advance the whole facility by one timestep
    pub fn step(&mut self) {
        let dt = self.config.timestep();

        if self.alarm.update(dt) == AlarmTransition::Cleared {
            self.tiles.set_alarm(false);
            self.events.push(SimEvent::AlarmCleared);
            for drone in &mut self.drones {
                drone.clear_alarm(&self.chunk);
            }
        }

        self.move_intruder(dt);

        for drone in &mut self.drones {
            drone.update(&self.chunk, dt);
        }
        for patrol in &mut self.patrols {
            patrol.update(self.chunk.as_ref(), dt);
        }

        self.sense_intruder(dt);

        for (index, drone) in self.drones.iter_mut().enumerate() {
            for event in drone.drain_events() {
                self.events.push(SimEvent::Drone {
                    id: DroneId(index),
                    event,
                });
            }
        }

        self.events.swap();
        self.tick += 1;
    }

    fn move_intruder(&mut self, dt: f32) {
        let Some(intruder) = self.intruder.as_mut() else {
            return;
        };

        let mover = intruder.moving_box();
        let Some(hit) = self.chunk.collide_solid(&mover, dt) else {
            intruder.bounds = intruder.bounds.translated(mover.motion(dt));
            return;
        };

        // Stop at the contact point and drop the blocked axis
        log::trace!("intruder hit {:?} side", hit.side);
        intruder.bounds = intruder.bounds.translated(mover.motion(dt) * hit.time);
        match hit.side {
            Side::Left | Side::Right => intruder.velocity.x = 0.0,
            Side::Bottom | Side::Top => intruder.velocity.y = 0.0,
        }
    }

    fn sense_intruder(&mut self, dt: f32) {
        let Some(intruder) = self.intruder.filter(|i| !i.hidden) else {
            return;
        };

        let mover = intruder.moving_box();
        let position = intruder.position();
        let mut spotted = false;

        for (index, drone) in self.drones.iter().enumerate() {
            if drone.cone().collides(&mover, dt) {
                spotted = true;
                self.events.push(SimEvent::IntruderSpotted {
                    by: DroneId(index),
                    position,
                });
            }
            if drone.bounds().intersects(&intruder.bounds) {
                log::info!("drone {index} caught the intruder at {position}");
                self.events.push(SimEvent::IntruderCaught {
                    by: DroneId(index),
                });
            }
        }

        for (index, patrol) in self.patrols.iter().enumerate() {
            if patrol.cone().collides(&mover, dt) {
                spotted = true;
                self.events.push(SimEvent::PatrolSpotted {
                    by: PatrolId(index),
                    position,
                });
            }
        }

        if !spotted {
            return;
        }

        match self.alarm.detect(position) {
            AlarmTransition::Raised(at) => {
                self.tiles.set_alarm(true);
                self.events.push(SimEvent::AlarmRaised { position: at });
                self.alert_all(at);
            }
            AlarmTransition::Redispatched(at) => self.alert_all(at),
            AlarmTransition::None | AlarmTransition::Cleared => {}
        }
    }

    fn alert_all(&mut self, position: Vec2) {
        for drone in &mut self.drones {
            drone.alert(&self.chunk, position);
        }
    }

    /// Block until every drone's in-flight path request has been applied.
    ///
    /// Makes scripted runs independent of worker thread timing.
    pub fn wait_for_paths(&mut self) {
        for drone in &mut self.drones {
            drone.wait_for_path();
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Events produced by the last step
    pub fn events(&self) -> impl Iterator<Item = &SimEvent> {
        self.events.iter()
    }

    /// Take the events produced by the last step
    pub fn drain_events(&mut self) -> impl Iterator<Item = SimEvent> + '_ {
        self.events.drain()
    }

    /// What one drone reported about itself during the last step
    pub fn drone_events(&self, id: DroneId) -> impl Iterator<Item = &DroneEvent> {
        self.events.for_drone(id)
    }

    /// Whether a drone or a patrol saw the intruder during the last step
    #[must_use]
    pub fn intruder_seen(&self) -> bool {
        self.events.intruder_seen()
    }

    /// Drone by id
    #[must_use]
    pub fn drone(&self, id: DroneId) -> Option<&Drone> {
        self.drones.get(id.0)
    }

    /// Drone by id, for scripting
    pub fn drone_mut(&mut self, id: DroneId) -> Option<&mut Drone> {
        self.drones.get_mut(id.0)
    }

    /// Ground patrol by id
    #[must_use]
    pub fn patrol(&self, id: PatrolId) -> Option<&GroundPatrol> {
        self.patrols.get(id.0)
    }

    /// All ground patrols in spawn order
    #[must_use]
    pub fn patrols(&self) -> &[GroundPatrol] {
        &self.patrols
    }

    /// All drones in spawn order
    #[must_use]
    pub fn drones(&self) -> &[Drone] {
        &self.drones
    }

    /// Facility alarm
    #[must_use]
    pub fn alarm(&self) -> &Alarm {
        &self.alarm
    }

    /// Shared chunk handle
    #[must_use]
    pub fn chunk(&self) -> &SharedChunk {
        &self.chunk
    }

    /// Configuration the simulation was built with
    #[must_use]
    pub fn config(&self) -> &FacilityConfig {
        &self.config
    }

    /// Steps taken so far
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds elapsed
    #[must_use]
    pub fn time(&self) -> f32 {
        self.tick as f32 * self.config.timestep()
    }
}
