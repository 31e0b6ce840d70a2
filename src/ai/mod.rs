//! Drone AI
//!
//! Grid pathfinding and path reduction, the drone behavior controller, its
//! vision cone and hearing model, walking patrol guards, and the facility alarm.

mod alarm;
mod cone;
mod drone;
mod hearing;
mod path;
mod patrol;
mod pathfinding;
mod simplify;
mod steering;
mod task;

pub use alarm::{Alarm, AlarmState, AlarmTransition};
pub use cone::{ConeColor, ViewCone};
pub use drone::{
    ALARMED_SOUND, Drone, DroneEvent, DroneState, PathEffect, STAND_DOWN_SOUND, SignalKind,
};
pub use hearing::{audible_volume, locate_sound, perceived_volume};
pub use path::{Path, PathSnapshot};
pub use patrol::{GroundPatrol, Heading};
pub use pathfinding::{find_path, path_length};
pub use simplify::reduce_path;
pub use steering::{IdleScan, MoveTo, SteeringOutput};
pub use task::{CancelToken, PathJob, PathPoll, PathRequest};
