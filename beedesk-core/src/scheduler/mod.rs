//! Cooperative schedulers
//!
//! Two variants share the same task contract and the same context:
//!
//! - [`PeriodicScheduler`] runs every task once per timer tick and removes
//!   tasks that report completion.
//! - [`SuspendScheduler`] runs one task per pass in round-robin order from a
//!   blocking loop until its [`RunFlag`] is cleared.
//!
//! Neither preempts a running task. Failures are logged and contained: a
//! task whose setup fails is never scheduled, and a task whose `run` fails
//! stays scheduled.

pub mod periodic;
pub mod suspend;

pub use periodic::PeriodicScheduler;
pub use suspend::{RunFlag, SuspendScheduler};

use crate::context::{ContextError, SharedContext, Value};
use crate::task::{Task, TaskError};

/// Identifier assigned to a task when a scheduler accepts it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskId(pub u16);

impl TaskId {
    /// Raw value as stored in the context
    pub const fn as_handle(self) -> u32 {
        self.0 as u32
    }
}

/// Errors from `exec`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExecError {
    /// `setup` failed; the task was not scheduled
    SetupFailed(TaskError),
    /// The scheduler holds its maximum number of tasks
    Full,
    /// The task name could not be registered in the context
    Register(ContextError),
}

/// A scheduled task with its id
pub(crate) struct Slot<'a, T: ?Sized> {
    pub id: TaskId,
    pub task: &'a mut T,
}

impl<T: Task + ?Sized> Slot<'_, T> {
    /// Name for log lines
    pub fn label(&self) -> &'static str {
        self.task.name().unwrap_or("-")
    }
}

/// Run `setup` and register the task name, logging failures
///
/// Shared by both schedulers' `exec`. Setup runs outside the context lock.
pub(crate) fn prepare<T: Task + ?Sized>(
    task: &mut T,
    id: TaskId,
    ctx: &SharedContext,
) -> Result<(), ExecError> {
    if let Err(e) = task.setup() {
        error!(
            "task {} ({}) setup failed: {:?}",
            id.0,
            task.name().unwrap_or("-"),
            e
        );
        return Err(ExecError::SetupFailed(e));
    }

    if let Some(name) = task.name() {
        if let Err(e) = ctx.with(|ctx| ctx.set(name, Value::Handle(id.as_handle()))) {
            error!("task {} ({}) register failed: {:?}", id.0, name, e);
            return Err(ExecError::Register(e));
        }
    }

    Ok(())
}
