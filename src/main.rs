//! Scripted facility run
//!
//! Sends an intruder through a small facility guarded by two drones and a
//! walking patrol, and logs
//! what happens. Pass a RON or JSON config path to override the defaults.
//! Run with `RUST_LOG=info` (or `debug`) to see the log.

use std::sync::Arc;

use drone_ai::prelude::*;

const FACILITY: &str = "\
##############################
#............#...............#
#............#...............#
#....xx......#......##.......#
#....xx..............#.......#
#....................#.......#
#............#...............#
#######..#####.......#.......#
#............#.......#########
#............#...............#
#....##......................#
#....##......#...............#
#............#...............#
##############################";

/// Simulated seconds to run
const RUN_TIME: f32 = 40.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading config from {path}");
            FacilityConfig::load(&path)?
        }
        None => FacilityConfig::default(),
    };

    let chunk = Arc::new(TileChunk::from_ascii(FACILITY, 16.0)?);
    let tile = chunk.tile_size();
    let at = |col: f32, row: f32| Vec2::new((col + 0.5) * tile, (row + 0.5) * tile);

    let mut sim = Simulation::new(config, chunk);
    sim.add_drone(at(20.0, 4.0));
    sim.add_drone(at(8.0, 10.0));
    sim.add_patrol(at(2.0, 12.0));

    // Sneaks along the top room towards the east wing
    sim.set_intruder(
        Intruder::new(at(2.0, 2.0), Vec2::new(4.0, 6.0)).with_velocity(Vec2::new(40.0, 0.0)),
    );

    let steps = (RUN_TIME / sim.config().timestep()) as u64;
    for _ in 0..steps {
        let now = sim.time();

        // Knocks something over at the door
        if sim.tick() == sim.config().tick_rate as u64 * 6 {
            let heard = sim.emit_sound(at(13.0, 4.0), 90.0);
            log::info!("[{now:6.2}s] crash at the door, {heard} drone(s) heard it");
        }

        // Ducks into the south corridor
        if sim.tick() == sim.config().tick_rate as u64 * 12
            && let Some(intruder) = sim.intruder_mut()
        {
            intruder.velocity = Vec2::new(0.0, 40.0);
        }

        sim.step();
        for event in sim.drain_events() {
            report(now, &event);
        }
    }

    for (index, drone) in sim.drones().iter().enumerate() {
        log::info!(
            "drone {index}: {:?} at {}, {} path request(s)",
            drone.state(),
            drone.position(),
            drone.path_requests_issued()
        );
    }
    for (index, patrol) in sim.patrols().iter().enumerate() {
        log::info!("patrol {index}: walking {:?} at {}", patrol.heading(), patrol.position());
    }
    log::info!(
        "alarm {:?} after {:.1}s",
        sim.alarm().state(),
        sim.time()
    );

    Ok(())
}

fn report(now: f32, event: &SimEvent) {
    match event {
        SimEvent::Drone {
            id,
            event: DroneEvent::StateChanged { from, to },
        } => log::info!("[{now:6.2}s] drone {}: {from:?} -> {to:?}", id.0),
        SimEvent::Drone {
            id,
            event: DroneEvent::PlaySound(sound),
        } => log::info!("[{now:6.2}s] drone {} plays {sound}", id.0),
        SimEvent::Drone { id, event } => log::debug!("[{now:6.2}s] drone {}: {event:?}", id.0),
        SimEvent::IntruderSpotted { by, position } => {
            log::info!("[{now:6.2}s] drone {} spotted the intruder at {position}", by.0);
        }
        SimEvent::PatrolSpotted { by, position } => {
            log::info!("[{now:6.2}s] patrol {} spotted the intruder at {position}", by.0);
        }
        SimEvent::IntruderCaught { by } => {
            log::info!("[{now:6.2}s] drone {} caught the intruder", by.0);
        }
        SimEvent::AlarmRaised { position } => {
            log::info!("[{now:6.2}s] ALARM, intruder last seen at {position}");
        }
        SimEvent::AlarmCleared => log::info!("[{now:6.2}s] alarm cleared"),
        other => log::debug!("[{now:6.2}s] {other:?}"),
    }
}
