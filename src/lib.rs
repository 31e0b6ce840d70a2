//! Security drone navigation and sensing
//!
//! This crate provides:
//! - Grid A* pathfinding with background workers and path reduction
//! - Drone behavior: idle sweeps, patrols, investigations, searches and chases
//! - Vision cones with occlusion and swept-box collision
//! - Sound attenuation and localization
//! - Walking ground patrols that turn at walls
//! - A headless facility simulation driving drones against an intruder

pub mod ai;
pub mod chunk;
pub mod core;
pub mod geometry;

// Re-exports for convenience
pub use glam;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{
        Alarm, ConeColor, Drone, DroneEvent, DroneState, GroundPatrol, Heading, ViewCone,
    };
    pub use crate::chunk::{ChunkQuery, GridCoord, SharedChunk, TileChunk, TileKind};
    pub use crate::core::{
        DroneConfig, DroneId, FacilityConfig, Intruder, PatrolId, SimEvent, Simulation,
    };
    pub use crate::geometry::{MovingBox, Rect};
    pub use glam::Vec2;
}
