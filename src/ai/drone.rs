//! Aerial drone behavior
//!
//! A drone idles at its spawn sweeping its camera, wanders around it, and
//! reacts to sightings and noises by flying to the reported position and
//! searching the area. Paths are computed in the background; the drone keeps
//! acting on its current state until a new path arrives.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use smallvec::{SmallVec, smallvec};

use super::cone::{ConeColor, ViewCone};
use super::hearing::{audible_volume, locate_sound};
use super::path::Path;
use super::steering::{IdleScan, MoveTo};
use super::task::{PathJob, PathPoll, PathRequest};
use crate::chunk::{ChunkQuery, SharedChunk};
use crate::core::DroneConfig;
use crate::geometry::{MovingBox, Rect, normalize_angle, ray_circle_exit};

/// Sound played when a drone goes to check out a noise
pub const ALARMED_SOUND: &str = "drone_alarmed";
/// Sound played when a drone stands down after an alarm
pub const STAND_DOWN_SOUND: &str = "drone_stand_down";

/// Local wander points tried when a search starts
const SEARCH_ATTEMPTS: usize = 5;
/// Half-width of the search fan around the facing, as a fraction of π
const SEARCH_FAN: f32 = 0.15;

/// Behavior state of a drone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DroneState {
    /// Flying to a wander point near the spawn
    Patrolling,
    /// Hovering while sweeping the camera
    Waiting,
    /// Following a path towards a known target
    Targeting,
    /// Following a path back to the spawn
    Returning,
    /// Wandering around a target location with no time limit
    Searching,
    /// Following a path towards a heard noise
    Investigating,
    /// Wandering around a noise until the search timer runs out
    CursorySearching,
}

impl DroneState {
    /// Whether the drone is chasing a known intruder
    #[must_use]
    pub fn is_chasing(self) -> bool {
        matches!(self, Self::Targeting | Self::Searching)
    }
}

/// Alert icon shown above a drone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// Intruder spotted
    Alert,
    /// Something was heard
    Noise,
}

/// Side effect dispatched once when a path request completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PathEffect {
    /// Nothing
    #[default]
    None,
    /// A search escalated into a chase
    Escalate,
    /// Going to check out a noise
    Investigate,
    /// Responding to an alarm
    RaiseAlert,
    /// Going home after the alarm cleared
    StandDown,
}

impl PathEffect {
    /// Events this effect produces
    #[must_use]
    pub fn events(self) -> SmallVec<[DroneEvent; 3]> {
        match self {
            Self::None => SmallVec::new(),
            Self::Escalate => smallvec![DroneEvent::Signal(SignalKind::Alert)],
            Self::Investigate => smallvec![
                DroneEvent::Signal(SignalKind::Noise),
                DroneEvent::PlaySound(ALARMED_SOUND),
                DroneEvent::ConeColorChanged(ConeColor::Inspect),
            ],
            Self::RaiseAlert => smallvec![
                DroneEvent::Signal(SignalKind::Alert),
                DroneEvent::ConeColorChanged(ConeColor::Alert),
            ],
            Self::StandDown => smallvec![DroneEvent::ConeColorChanged(ConeColor::Clear)],
        }
    }
}

/// Something a presentation layer may want to react to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DroneEvent {
    /// The behavior state changed
    StateChanged {
        /// Previous state
        from: DroneState,
        /// New state
        to: DroneState,
    },
    /// Show an alert icon
    Signal(SignalKind),
    /// Play a sound at the drone
    PlaySound(&'static str),
    /// The cone's alert level changed
    ConeColorChanged(ConeColor),
    /// A new path was adopted
    PathAdopted {
        /// Number of points in the path
        waypoints: usize,
    },
}

/// An aerial security drone
#[derive(Debug)]
pub struct Drone<R: Rng = ChaCha8Rng> {
    config: DroneConfig,
    spawn: Vec2,
    position: Vec2,
    velocity: Vec2,
    facing: f32,
    state: DroneState,
    /// Counts up while waiting, down while cursory searching
    timer: f32,
    wander_location: Vec2,
    target_location: Vec2,
    last_target: Vec2,
    path: Option<Path>,
    pending: Option<PathRequest>,
    /// Ticks left during which sounds are ignored
    position_known: u32,
    cone: ViewCone,
    events: Vec<DroneEvent>,
    path_requests: u64,
    rng: R,
}

impl Drone<ChaCha8Rng> {
    /// Create a drone at `spawn` with a seeded generator
    #[must_use]
    pub fn new(spawn: Vec2, config: DroneConfig, seed: u64) -> Self {
        Self::with_rng(spawn, config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> Drone<R> {
    /// Create a drone at `spawn` drawing randomness from `rng`
    #[must_use]
    pub fn with_rng(spawn: Vec2, config: DroneConfig, mut rng: R) -> Self {
        let facing = rng.gen_range(0.0..TAU);
        let cone = ViewCone::new(
            spawn,
            facing,
            config.view_spread.to_radians(),
            config.view_radius,
        );

        Self {
            config,
            spawn,
            position: spawn,
            velocity: Vec2::ZERO,
            facing,
            state: DroneState::Waiting,
            timer: 0.0,
            wander_location: spawn,
            target_location: spawn,
            last_target: spawn,
            path: None,
            pending: None,
            position_known: 0,
            cone,
            events: Vec::new(),
            path_requests: 0,
            rng,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Current state
    #[must_use]
    pub fn state(&self) -> DroneState {
        self.state
    }

    /// Current position
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Velocity applied during the last update
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Facing angle in radians
    #[must_use]
    pub fn facing(&self) -> f32 {
        self.facing
    }

    /// Spawn position
    #[must_use]
    pub fn spawn(&self) -> Vec2 {
        self.spawn
    }

    /// Vision cone
    #[must_use]
    pub fn cone(&self) -> &ViewCone {
        &self.cone
    }

    /// Tunables
    #[must_use]
    pub fn config(&self) -> &DroneConfig {
        &self.config
    }

    /// Path being followed, if any
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    /// Where the current chase or search is centered
    #[must_use]
    pub fn target_location(&self) -> Vec2 {
        self.target_location
    }

    /// Point the drone is wandering to
    #[must_use]
    pub fn wander_location(&self) -> Vec2 {
        self.wander_location
    }

    /// Whether a path request is in flight
    #[must_use]
    pub fn has_pending_path(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of path workers started so far
    #[must_use]
    pub fn path_requests_issued(&self) -> u64 {
        self.path_requests
    }

    /// Body bounds
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.position, self.config.half_extents)
    }

    /// Body as a moving box for contact tests
    #[must_use]
    pub fn moving_box(&self) -> MovingBox {
        MovingBox::new(self.bounds(), self.velocity)
    }

    /// Events produced since the last drain
    #[must_use]
    pub fn events(&self) -> &[DroneEvent] {
        &self.events
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<DroneEvent> {
        std::mem::take(&mut self.events)
    }

    // -------------------------------------------------------------------------
    // State switches
    // -------------------------------------------------------------------------

    fn set_state(&mut self, to: DroneState) {
        let from = self.state;
        if from != to {
            log::debug!("drone at {}: {from:?} -> {to:?}", self.position);
            self.state = to;
            self.events.push(DroneEvent::StateChanged { from, to });
        }
    }

    fn set_cone_color(&mut self, color: ConeColor) {
        if self.cone.color() != color {
            self.cone.set_color(color);
            self.events.push(DroneEvent::ConeColorChanged(color));
        }
    }

    fn dispatch(&mut self, effect: PathEffect) {
        for event in effect.events() {
            match event {
                DroneEvent::ConeColorChanged(color) => self.set_cone_color(color),
                other => self.events.push(other),
            }
        }
    }

    /// Request a path to `target`, entering `next_state` once it arrives.
    ///
    /// Returns `false` if the request was suppressed: the drone is already
    /// closing in on that target, or an identical request is in flight.
    pub fn target(&mut self, chunk: &SharedChunk, target: Vec2, next_state: DroneState) -> bool {
        self.request_path(chunk, target, next_state, PathEffect::None)
    }

    fn request_path(
        &mut self,
        chunk: &SharedChunk,
        target: Vec2,
        next_state: DroneState,
        effect: PathEffect,
    ) -> bool {
        if self.state == DroneState::Targeting {
            let path_len = self.path.as_ref().map_or(0, Path::len);

            // Target in plain sight on the last leg: steer at it directly
            if self.path.as_ref().is_some_and(|p| p.remaining() <= 1)
                && chunk
                    .intersect_line(self.position, target - self.position, 1.0, false, true)
                    .is_none()
            {
                self.target_location = target;
            }

            let moved = self.last_target.distance_squared(target);
            let tile = chunk.tile_size();
            if (path_len > 2 && moved < tile * tile) || (path_len > 1 && moved < 1.0) {
                log::trace!("target {target} too close to current target, ignored");
                return false;
            }
        }

        if let Some(pending) = &self.pending
            && pending.matches(target, next_state)
        {
            log::trace!("path to {target} already requested");
            return false;
        }

        self.last_target = target;
        self.velocity = Vec2::ZERO;

        if let Some(stale) = self.pending.take() {
            stale.cancel();
        }

        let job = PathJob {
            start: chunk.to_grid(self.position),
            target,
            position: self.position,
            half_width: self.config.half_width(),
            aerial: self.config.aerial,
            previous: self.path.as_ref().map(Path::snapshot),
        };
        self.pending = Some(PathRequest::spawn(chunk, job, next_state, effect));
        self.path_requests += 1;
        true
    }

    /// Wander around `target` for `duration` seconds.
    ///
    /// A cursory search runs at patrol speed, gives up when the timer runs out
    /// and falls back to investigating; a full search never times out and
    /// falls back to targeting.
    pub fn search<C: ChunkQuery + ?Sized>(
        &mut self,
        chunk: &C,
        target: Vec2,
        duration: f32,
        cursory: bool,
    ) {
        self.path = None;
        self.timer = duration;
        self.target_location = target;
        self.wander_location = target;

        for _ in 0..SEARCH_ATTEMPTS {
            let offset = self.rng.gen_range(-SEARCH_FAN..SEARCH_FAN) * PI;
            let dir = Vec2::from_angle(self.facing + offset);
            if self.query_wander(chunk, self.target_location, dir, self.config.search_range) {
                self.target_location = self.wander_location;
                break;
            }
        }

        if cursory {
            self.set_state(DroneState::CursorySearching);
            self.set_cone_color(ConeColor::Inspect);
        } else {
            self.set_state(DroneState::Searching);
            self.set_cone_color(ConeColor::Alert);
        }
    }

    /// Path back to the spawn
    pub fn return_to_spawn(&mut self, chunk: &SharedChunk) -> bool {
        self.request_path(chunk, self.spawn, DroneState::Returning, PathEffect::StandDown)
    }

    /// Hover in place and sweep the camera
    pub fn wait(&mut self) {
        self.path = None;
        self.velocity = Vec2::ZERO;
        self.timer = 0.0;
        self.set_state(DroneState::Waiting);
        self.set_cone_color(ConeColor::Clear);
    }

    /// Put the drone back at its spawn facing a random direction
    pub fn respawn(&mut self) {
        self.pending = None;
        self.facing = self.rng.gen_range(0.0..TAU);
        self.position = self.spawn;
        self.position_known = 0;
        self.cone.set_position(self.spawn);
        self.cone.set_middle(self.facing);
        self.wait();
    }

    // -------------------------------------------------------------------------
    // Senses
    // -------------------------------------------------------------------------

    /// React to a sound of `volume` at `source`.
    ///
    /// Returns `true` if the drone went to check it out.
    pub fn hear_sound(&mut self, chunk: &SharedChunk, source: Vec2, volume: f32) -> bool {
        if self.position_known > 0 {
            return false;
        }

        let Some(heard) = audible_volume(chunk.as_ref(), self.position, source, volume, &self.config)
        else {
            return false;
        };
        let perceived = locate_sound(chunk.as_ref(), source, heard, &self.config, &mut self.rng);
        log::trace!("heard {volume} at {source} as {heard}, placed at {perceived}");

        match self.state {
            DroneState::Searching => {
                self.request_path(chunk, perceived, DroneState::Targeting, PathEffect::Escalate)
            }
            DroneState::Targeting | DroneState::Investigating => false,
            _ => self.request_path(
                chunk,
                perceived,
                DroneState::Investigating,
                PathEffect::Investigate,
            ),
        }
    }

    /// The intruder was seen at `position`
    pub fn alert(&mut self, chunk: &SharedChunk, position: Vec2) -> bool {
        self.position_known = self.config.position_known_ticks;

        if !self.state.is_chasing() {
            self.cone.set_radius(self.config.alert_view_radius);
            self.cone
                .set_direction(self.facing, self.config.alert_spread.to_radians());
        }

        self.request_path(chunk, position, DroneState::Targeting, PathEffect::RaiseAlert)
    }

    /// The alarm ran out: narrow the cone again and head home
    pub fn clear_alarm(&mut self, chunk: &SharedChunk) {
        self.cone.set_radius(self.config.view_radius);
        self.cone
            .set_direction(self.facing, self.config.view_spread.to_radians());
        self.return_to_spawn(chunk);
        self.events.push(DroneEvent::PlaySound(STAND_DOWN_SOUND));
    }

    // -------------------------------------------------------------------------
    // Wandering
    // -------------------------------------------------------------------------

    /// Try to pick a wander point along `dir` inside the circle around
    /// `center`. On success the point becomes the wander location.
    pub fn query_wander<C: ChunkQuery + ?Sized>(
        &mut self,
        chunk: &C,
        center: Vec2,
        dir: Vec2,
        range: f32,
    ) -> bool {
        let Some(mut reach) = ray_circle_exit(self.position, dir, center, range) else {
            return false;
        };

        let half_width = self.config.half_width();
        let side = Vec2::new(dir.y, -dir.x).normalize_or_zero() * half_width;
        for origin in [self.position + side, self.position - side] {
            if let Some(t) = chunk.intersect_line(origin, dir, reach, false, true) {
                reach = t;
            }
        }

        reach -= half_width;
        let min = self.config.min_movement;
        if reach < min {
            return false;
        }

        let distance = min + self.rng.gen_range(0.0..1.0) * (reach - min);
        let candidate = self.position + dir * distance;
        if chunk.bounds().contains(candidate) {
            self.wander_location = candidate;
            true
        } else {
            false
        }
    }

    /// Try random directions until a wander point around `center` is found
    pub fn find_wander<C: ChunkQuery + ?Sized>(&mut self, chunk: &C, center: Vec2, range: f32) -> bool {
        (0..self.config.wander_attempts).any(|_| {
            let dir = Vec2::from_angle(self.rng.gen_range(0.0..TAU));
            self.query_wander(chunk, center, dir, range)
        })
    }

    // -------------------------------------------------------------------------
    // Update
    // -------------------------------------------------------------------------

    /// Advance the drone by `dt` seconds
    pub fn update(&mut self, chunk: &SharedChunk, dt: f32) {
        self.position_known = self.position_known.saturating_sub(1);
        self.velocity = Vec2::ZERO;

        match self.state {
            DroneState::Patrolling => {
                if self.move_to(self.wander_location, self.config.patrol_speed, dt) {
                    self.wait();
                }
            }
            DroneState::Searching => {
                self.search_step(chunk, dt, self.config.search_speed, DroneState::Targeting);
            }
            DroneState::CursorySearching => {
                self.search_step(chunk, dt, self.config.patrol_speed, DroneState::Investigating);
                self.timer -= dt;
                if self.timer <= 0.0 {
                    self.return_to_spawn(chunk);
                }
            }
            DroneState::Waiting => self.wait_step(chunk, dt),
            DroneState::Targeting => self.targeting_step(chunk, dt),
            DroneState::Investigating => self.investigating_step(chunk, dt),
            DroneState::Returning => self.returning_step(dt),
        }

        self.poll_path();

        self.position += dt * self.velocity;
        self.cone.set_position(self.position);
        self.cone.set_middle(self.facing);
        self.cone.update(chunk.as_ref());
    }

    /// Block until the in-flight path request finishes and apply it.
    ///
    /// Returns `true` if a request was settled.
    pub fn wait_for_path(&mut self) -> bool {
        let Some(request) = self.pending.as_mut() else {
            return false;
        };
        let outcome = request.wait();
        self.settle(outcome);
        true
    }

    fn move_to(&mut self, target: Vec2, speed: f32, dt: f32) -> bool {
        let output = MoveTo::new(target, speed, self.config.turn_rate).steer(
            self.position,
            self.facing,
            dt,
        );
        self.facing = output.facing;
        self.velocity = output.velocity;
        output.arrived
    }

    fn wait_step(&mut self, chunk: &SharedChunk, dt: f32) {
        self.timer += dt;
        let scan = IdleScan::new(self.config.wait_time, self.config.wait_turn_rate);

        match scan.angular_velocity(self.timer) {
            Some(rate) => self.facing = normalize_angle(self.facing + rate * dt),
            None => {
                if self.find_wander(chunk.as_ref(), self.spawn, self.config.patrol_range) {
                    self.set_state(DroneState::Patrolling);
                } else {
                    self.return_to_spawn(chunk);
                }
            }
        }
    }

    fn search_step(&mut self, chunk: &SharedChunk, dt: f32, speed: f32, fallback: DroneState) {
        if !self.move_to(self.wander_location, speed, dt) {
            return;
        }

        self.velocity = Vec2::ZERO;
        if !self.find_wander(chunk.as_ref(), self.target_location, self.config.patrol_range) {
            self.target(chunk, self.target_location, fallback);
        }
    }

    /// Next point to steer at while targeting: the path's waypoints, then
    /// the target location for the final leg
    fn targeting_goal(&self) -> Vec2 {
        match &self.path {
            Some(path) if path.cursor() + 1 < path.len() => path.points()[path.cursor()],
            _ => self.target_location,
        }
    }

    fn targeting_step(&mut self, chunk: &SharedChunk, dt: f32) {
        if self.path.is_none() {
            self.search(chunk.as_ref(), self.target_location, f32::INFINITY, false);
            return;
        }

        let speed = self.config.target_speed;
        if self.move_to(self.targeting_goal(), speed, dt) {
            self.velocity = Vec2::ZERO;
            let exhausted = self.path.as_mut().is_none_or(|path| {
                path.advance();
                path.is_exhausted()
            });

            if exhausted {
                self.search(chunk.as_ref(), self.target_location, f32::INFINITY, false);
            } else {
                self.move_to(self.targeting_goal(), speed, dt);
            }
        }
    }

    fn investigating_step(&mut self, chunk: &SharedChunk, dt: f32) {
        let Some(goal) = self.path.as_ref().and_then(Path::waypoint) else {
            self.search(chunk.as_ref(), self.target_location, self.config.search_time, true);
            return;
        };

        let speed = self.config.search_speed;
        if self.move_to(goal, speed, dt) {
            self.velocity = Vec2::ZERO;
            let next = self.path.as_mut().and_then(|path| {
                path.advance();
                path.waypoint()
            });

            match next {
                Some(next) => {
                    self.move_to(next, speed, dt);
                }
                None => {
                    let end = self.path.as_ref().and_then(Path::end).unwrap_or(goal);
                    self.search(chunk.as_ref(), end, self.config.search_time, true);
                }
            }
        }
    }

    fn returning_step(&mut self, dt: f32) {
        let Some(goal) = self.path.as_ref().and_then(Path::waypoint) else {
            self.wait();
            return;
        };

        if self.move_to(goal, self.config.patrol_speed, dt) {
            let exhausted = self.path.as_mut().is_none_or(|path| {
                path.advance();
                path.is_exhausted()
            });
            if exhausted {
                self.wait();
            }
        }
    }

    // -------------------------------------------------------------------------
    // Path requests
    // -------------------------------------------------------------------------

    fn poll_path(&mut self) {
        let Some(request) = self.pending.as_mut() else {
            return;
        };
        let outcome = request.poll();
        if !matches!(outcome, PathPoll::Pending) {
            self.settle(outcome);
        }
    }

    fn settle(&mut self, outcome: PathPoll) {
        let Some(request) = self.pending.take() else {
            return;
        };

        match outcome {
            PathPoll::Pending => self.pending = Some(request),
            PathPoll::Discarded => log::trace!("path to {} discarded", request.destination),
            PathPoll::Ready(points) => {
                if points.len() > 1 {
                    log::debug!(
                        "adopting path to {} with {} points",
                        request.destination,
                        points.len()
                    );
                    self.events.push(DroneEvent::PathAdopted {
                        waypoints: points.len(),
                    });
                    self.target_location = points[points.len() - 1];
                    self.path = Some(Path::new(points));
                } else {
                    self.path = None;
                }

                self.set_state(request.next_state);
                self.dispatch(request.effect);
            }
        }
    }
}
