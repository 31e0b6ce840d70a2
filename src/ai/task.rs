//! Background path requests
//!
//! A drone never blocks on pathfinding. Each request runs the A* search and
//! the path reduction on a worker thread, and the drone polls it once per tick.
//! Cancellation is cooperative through a shared flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use glam::Vec2;

use super::drone::{DroneState, PathEffect};
use super::path::PathSnapshot;
use super::pathfinding::find_path;
use super::simplify::reduce_path;
use crate::chunk::{ChunkQuery, GridCoord, SharedChunk};

/// Cooperative cancellation flag shared with a worker
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create an untriggered token
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the worker to stop
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Inputs for one pathfind-then-reduce run
#[derive(Debug, Clone)]
pub struct PathJob {
    /// Cell the search starts from
    pub start: GridCoord,
    /// Destination in world space
    pub target: Vec2,
    /// Agent position when the request was made
    pub position: Vec2,
    /// Half of the agent's body width
    pub half_width: f32,
    /// Whether drone walls block the agent
    pub aerial: bool,
    /// Path the agent was following, if any
    pub previous: Option<PathSnapshot>,
}

impl PathJob {
    /// Run the search and reduction. `None` means the job was cancelled.
    #[must_use]
    pub fn run<C: ChunkQuery + ?Sized>(&self, chunk: &C, cancel: &CancelToken) -> Option<Vec<Vec2>> {
        let raw = find_path(chunk, self.start, self.target, cancel, self.aerial)?;
        reduce_path(
            chunk,
            Some(raw.as_slice()),
            self.half_width,
            self.position,
            self.previous.as_ref(),
            cancel,
        )
    }
}

/// Outcome of polling a request
#[derive(Debug)]
pub enum PathPoll {
    /// Still running
    Pending,
    /// Cancelled or failed; nothing to adopt
    Discarded,
    /// Finished with a reduced path (possibly too short to use)
    Ready(Vec<Vec2>),
}

#[derive(Debug)]
enum Worker {
    Running(JoinHandle<Option<Vec<Vec2>>>),
    Finished(Option<Vec<Vec2>>),
    Taken,
}

/// An in-flight path request owned by one drone
#[derive(Debug)]
pub struct PathRequest {
    worker: Worker,
    cancel: CancelToken,
    /// Destination that was requested
    pub destination: Vec2,
    /// State to enter once the path arrives
    pub next_state: DroneState,
    /// Side effect to dispatch on completion
    pub effect: PathEffect,
}

impl PathRequest {
    /// Start `job` on a worker thread.
    ///
    /// If no thread can be spawned the job runs inline and its result is
    /// delivered on the next poll.
    #[must_use]
    pub fn spawn(
        chunk: &SharedChunk,
        job: PathJob,
        next_state: DroneState,
        effect: PathEffect,
    ) -> Self {
        let cancel = CancelToken::new();
        let destination = job.target;

        let worker_chunk = Arc::clone(chunk);
        let worker_cancel = cancel.clone();
        let worker_job = job.clone();
        let spawned = thread::Builder::new()
            .name("pathfind".into())
            .spawn(move || worker_job.run(worker_chunk.as_ref(), &worker_cancel));

        let worker = match spawned {
            Ok(handle) => Worker::Running(handle),
            Err(e) => {
                log::warn!("failed to spawn pathfinding worker, running inline: {e}");
                Worker::Finished(job.run(chunk.as_ref(), &cancel))
            }
        };

        Self {
            worker,
            cancel,
            destination,
            next_state,
            effect,
        }
    }

    /// Whether this request was made for the same destination and next state
    #[must_use]
    pub fn matches(&self, destination: Vec2, next_state: DroneState) -> bool {
        self.next_state == next_state && self.destination.distance_squared(destination) < 1.0
    }

    /// Cancel the worker. Its result will be discarded.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Check for completion without blocking
    pub fn poll(&mut self) -> PathPoll {
        if let Worker::Running(handle) = &self.worker
            && !handle.is_finished()
        {
            return PathPoll::Pending;
        }
        self.take()
    }

    /// Block until the worker finishes, then return its outcome
    pub fn wait(&mut self) -> PathPoll {
        self.take()
    }

    fn take(&mut self) -> PathPoll {
        let result = match std::mem::replace(&mut self.worker, Worker::Taken) {
            Worker::Running(handle) => match handle.join() {
                Ok(result) => result,
                Err(_) => {
                    log::error!("pathfinding worker panicked");
                    None
                }
            },
            Worker::Finished(result) => result,
            Worker::Taken => None,
        };

        match result {
            Some(path) if !self.cancel.is_cancelled() => PathPoll::Ready(path),
            _ => PathPoll::Discarded,
        }
    }
}

impl Drop for PathRequest {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
