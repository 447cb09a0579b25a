//! Task contract
//!
//! A task is a unit of recurring work owned by exactly one scheduler. It is
//! set up once, run on every tick or pass, and finished once after it
//! reports [`TaskStatus::Complete`].

use crate::context::{Context, ContextError};
use crate::traits::{AssetError, ClockError, NetworkError, SensorError};

/// Outcome of a successful run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskStatus {
    /// Keep scheduling this task
    Running,
    /// The task is done and should be finished
    Complete,
}

/// Errors a task can report from any lifecycle callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskError {
    /// Context write rejected
    Context(ContextError),
    /// Sensor read failed
    Sensor(SensorError),
    /// Network or time sync failed
    Network(NetworkError),
    /// Real-time clock access failed
    Clock(ClockError),
    /// Asset could not be read
    Asset(AssetError),
    /// Display transport or compositor failure
    Display,
    /// Any other peripheral failure
    Peripheral,
}

impl From<ContextError> for TaskError {
    fn from(e: ContextError) -> Self {
        TaskError::Context(e)
    }
}

impl From<SensorError> for TaskError {
    fn from(e: SensorError) -> Self {
        TaskError::Sensor(e)
    }
}

impl From<NetworkError> for TaskError {
    fn from(e: NetworkError) -> Self {
        TaskError::Network(e)
    }
}

impl From<ClockError> for TaskError {
    fn from(e: ClockError) -> Self {
        TaskError::Clock(e)
    }
}

impl From<AssetError> for TaskError {
    fn from(e: AssetError) -> Self {
        TaskError::Asset(e)
    }
}

/// A schedulable unit of work
///
/// Peripheral handles are passed in at construction; `setup` runs once the
/// scheduler accepts the task, so it may touch hardware that was not ready
/// when the task value was built.
pub trait Task {
    /// Well-known name other tasks use to locate this one in the context
    fn name(&self) -> Option<&'static str> {
        None
    }

    /// One-time initialization, run before the first `run`
    fn setup(&mut self) -> Result<(), TaskError> {
        Ok(())
    }

    /// One unit of work
    fn run(&mut self, ctx: &mut Context) -> Result<TaskStatus, TaskError>;

    /// One-time teardown, run after the task reports completion
    fn finish(&mut self) -> Result<(), TaskError> {
        Ok(())
    }
}
