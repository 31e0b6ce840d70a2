//! Tunables for drones and facilities
//!
//! Configuration is plain serde data. Any field left out of a file keeps its
//! default, so a config file only needs to name what it changes.

use std::f32::consts::PI;
use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Per-drone behavior and sensing parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DroneConfig {
    /// Cone reach while the alarm is clear
    pub view_radius: f32,
    /// Cone reach while alerted
    pub alert_view_radius: f32,
    /// Cone opening while the alarm is clear, in degrees
    pub view_spread: f32,
    /// Cone opening while alerted, in degrees
    pub alert_spread: f32,
    /// Shortest wander segment worth flying
    pub min_movement: f32,
    /// Speed while patrolling, cursory searching and returning
    pub patrol_speed: f32,
    /// Speed while searching and investigating
    pub search_speed: f32,
    /// Speed while targeting
    pub target_speed: f32,
    /// Wander radius around the spawn
    pub patrol_range: f32,
    /// Wander radius used when a search starts
    pub search_range: f32,
    /// Length of a cursory search in seconds
    pub search_time: f32,
    /// Length of the idle sweep in seconds
    pub wait_time: f32,
    /// Idle sweep turn rate in radians per second
    pub wait_turn_rate: f32,
    /// Turn rate towards a goal in radians per second
    pub turn_rate: f32,
    /// Random wander tries before giving up
    pub wander_attempts: u32,
    /// Volume heard with full precision
    pub base_volume: f32,
    /// Distance per unit of volume lost while the alarm is clear
    pub clear_sensitivity: f32,
    /// Distance per unit of volume lost while the alarm is raised
    pub alert_sensitivity: f32,
    /// Largest error of a perceived sound position
    pub hearing_precision: f32,
    /// Sounds farther away than this are never heard
    pub audible_distance: f32,
    /// Ticks after an alert during which sounds are ignored
    pub position_known_ticks: u32,
    /// Half extents of the drone body
    pub half_extents: Vec2,
    /// Whether drone walls block this drone
    pub aerial: bool,
}

impl Default for DroneConfig {
    fn default() -> Self {
        let tile = 16.0;
        Self {
            view_radius: 70.0,
            alert_view_radius: 140.0,
            view_spread: 50.0,
            alert_spread: 30.0,
            min_movement: 30.0,
            patrol_speed: 50.0,
            search_speed: 80.0,
            target_speed: 120.0,
            patrol_range: 160.0,
            search_range: 160.0,
            search_time: 7.0,
            wait_time: 5.0,
            wait_turn_rate: 0.375 * PI,
            turn_rate: 2.0 * PI,
            wander_attempts: 15,
            base_volume: 100.0,
            clear_sensitivity: 2.4,
            alert_sensitivity: 5.0,
            hearing_precision: tile * 8.0,
            audible_distance: 400.0,
            position_known_ticks: 2,
            half_extents: Vec2::new(tile / 3.0, tile / 6.0),
            aerial: true,
        }
    }
}

impl DroneConfig {
    /// Set the clear and alert cone reach
    #[must_use]
    pub fn with_view(mut self, radius: f32, alert_radius: f32) -> Self {
        self.view_radius = radius;
        self.alert_view_radius = alert_radius;
        self
    }

    /// Set patrol, search and target speeds
    #[must_use]
    pub fn with_speeds(mut self, patrol: f32, search: f32, target: f32) -> Self {
        self.patrol_speed = patrol;
        self.search_speed = search;
        self.target_speed = target;
        self
    }

    /// Set the idle sweep length
    #[must_use]
    pub fn with_wait_time(mut self, seconds: f32) -> Self {
        self.wait_time = seconds;
        self
    }

    /// Set the wander radius around the spawn
    #[must_use]
    pub fn with_patrol_range(mut self, range: f32) -> Self {
        self.patrol_range = range;
        self
    }

    /// Set the body half extents
    #[must_use]
    pub fn with_half_extents(mut self, half_extents: Vec2) -> Self {
        self.half_extents = half_extents;
        self
    }

    /// Half of the body width used by clearance rays
    #[must_use]
    pub fn half_width(&self) -> f32 {
        self.half_extents.x
    }
}

/// Settings for a whole simulated facility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilityConfig {
    /// Fixed simulation steps per second
    pub tick_rate: u32,
    /// Seconds the alarm stays raised without a new sighting
    pub alarm_time: f32,
    /// Base seed for drone random number generators
    pub seed: u64,
    /// Parameters shared by every drone
    pub drone: DroneConfig,
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            alarm_time: 20.0,
            seed: 0,
            drone: DroneConfig::default(),
        }
    }
}

impl FacilityConfig {
    /// Set the tick rate
    #[must_use]
    pub fn with_tick_rate(mut self, tick_rate: u32) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    /// Set the alarm duration
    #[must_use]
    pub fn with_alarm_time(mut self, seconds: f32) -> Self {
        self.alarm_time = seconds;
        self
    }

    /// Set the base seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the drone parameters
    #[must_use]
    pub fn with_drone(mut self, drone: DroneConfig) -> Self {
        self.drone = drone;
        self
    }

    /// Seconds per simulation step
    #[must_use]
    pub fn timestep(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Parse a RON document
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a valid config
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        ron::from_str(source).map_err(|e| ConfigError::Deserialize(e.to_string()))
    }

    /// Load a config from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Save the config to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Load a config from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Deserialize(e.to_string()))
    }

    /// Load a config, picking the format from the file extension.
    /// Anything other than `.json` is read as RON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::load_json(path),
            _ => Self::load_ron(path),
        }
    }
}

/// Errors that can occur while loading or saving configuration
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error
    Io(String),
    /// Serialization error
    Serialize(String),
    /// Deserialization error
    Deserialize(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Serialize(e) => write!(f, "Serialization error: {e}"),
            Self::Deserialize(e) => write!(f, "Deserialization error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FacilityConfig::default();

        assert_eq!(config.tick_rate, 60);
        assert_eq!(config.drone.view_radius, 70.0);
        assert_eq!(config.drone.wander_attempts, 15);
        assert!((config.drone.half_width() - 16.0 / 3.0).abs() < 1e-6);
        assert!((config.timestep() - 1.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let config =
            FacilityConfig::from_ron_str("(alarm_time: 5.0, drone: (patrol_speed: 10.0))").unwrap();

        assert_eq!(config.alarm_time, 5.0);
        assert_eq!(config.drone.patrol_speed, 10.0);
        assert_eq!(config.drone.search_speed, 80.0);
        assert_eq!(config.tick_rate, 60);
    }

    #[test]
    fn test_ron_roundtrip() {
        let config = FacilityConfig::default()
            .with_seed(7)
            .with_drone(DroneConfig::default().with_view(50.0, 90.0));

        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        let loaded = FacilityConfig::from_ron_str(&ron_str).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_and_load_ron_file() {
        let drone = DroneConfig::default()
            .with_speeds(40.0, 60.0, 90.0)
            .with_wait_time(1.5)
            .with_patrol_range(64.0)
            .with_half_extents(Vec2::new(3.0, 5.0));
        let config = FacilityConfig::default()
            .with_tick_rate(30)
            .with_drone(drone);
        assert!((config.timestep() - 1.0 / 30.0).abs() < 1e-9);
        assert_eq!(config.drone.half_width(), 3.0);

        let path = std::env::temp_dir().join(format!("drone_ai_config_{}.ron", std::process::id()));
        config.save_ron(&path).unwrap();
        let loaded = FacilityConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, config);
        assert_eq!(loaded.drone.target_speed, 90.0);
        assert_eq!(loaded.drone.wait_time, 1.5);
        assert_eq!(loaded.drone.patrol_range, 64.0);
    }

    #[test]
    fn test_json_partial() {
        let loaded: FacilityConfig =
            serde_json::from_str(r#"{ "tick_rate": 30, "drone": { "aerial": false } }"#).unwrap();

        assert_eq!(loaded.tick_rate, 30);
        assert!(!loaded.drone.aerial);
        assert_eq!(loaded.drone.turn_rate, 2.0 * PI);
    }

    #[test]
    fn test_invalid_ron() {
        let err = FacilityConfig::from_ron_str("(tick_rate: \"fast\")").unwrap_err();
        assert!(matches!(err, ConfigError::Deserialize(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = FacilityConfig::load("/nonexistent/facility.ron").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(err.to_string().starts_with("IO error"));
    }
}
