//! Core simulation module
//!
//! Configuration, the event queue and the headless facility driver

mod config;
mod engine;
mod events;

pub use config::{ConfigError, DroneConfig, FacilityConfig};
pub use engine::{DroneId, Intruder, PatrolId, Simulation};
pub use events::{EventQueue, SimEvent};
