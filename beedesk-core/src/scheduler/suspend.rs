//! Round-robin scheduler for the main thread
//!
//! Each pass runs exactly one task and advances the index modulo the task
//! count, so with `n` tasks every task runs once per `n` passes. The
//! blocking loop exits at the next pass boundary after the [`RunFlag`] is
//! cleared.

use heapless::Vec;
use portable_atomic::{AtomicBool, Ordering};

use super::{prepare, ExecError, Slot, TaskId};
use crate::context::SharedContext;
use crate::task::{Task, TaskStatus};
use crate::traits::MonotonicClock;

/// Cooperative stop handle for [`SuspendScheduler::run_forever`]
///
/// Can be cleared from interrupt context or from a task.
#[derive(Debug)]
pub struct RunFlag(AtomicBool);

impl RunFlag {
    /// Create a cleared flag
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Set the flag
    pub fn start(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Clear the flag
    pub fn stop(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// Whether the flag is set
    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Round-robin scheduler holding up to `N` tasks
pub struct SuspendScheduler<'a, C, const N: usize> {
    ctx: &'a SharedContext,
    clock: C,
    flag: &'a RunFlag,
    tasks: Vec<Slot<'a, dyn Task + 'a>, N>,
    index: usize,
    next_id: u16,
}

impl<'a, C: MonotonicClock, const N: usize> SuspendScheduler<'a, C, N> {
    /// Create a scheduler stopped by `flag`
    pub fn new(ctx: &'a SharedContext, clock: C, flag: &'a RunFlag) -> Self {
        Self {
            ctx,
            clock,
            flag,
            tasks: Vec::new(),
            index: 0,
            next_id: 0,
        }
    }

    /// Mark the scheduler as running
    pub fn setup_os(&self) {
        self.flag.start();
        info!("suspend: running");
    }

    /// Set up a task immediately and append it to the rotation
    pub fn exec(&mut self, task: &'a mut (dyn Task + 'a)) -> Result<TaskId, ExecError> {
        if self.tasks.is_full() {
            warn!("suspend: no room for task {}", task.name().unwrap_or("-"));
            return Err(ExecError::Full);
        }

        let id = TaskId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);

        prepare(task, id, self.ctx)?;

        let _ = self.tasks.push(Slot { id, task });
        debug!("suspend: task {} scheduled", id.0);
        Ok(id)
    }

    /// Number of scheduled tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no task is scheduled
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run the next task in the rotation
    ///
    /// Returns `false` when there is nothing to run.
    pub fn run_pass(&mut self) -> bool {
        let len = self.tasks.len();
        if len == 0 {
            return false;
        }

        let now = self.clock.now_ms() as i64;
        let slot = &mut self.tasks[self.index % len];
        self.index = (self.index + 1) % len;

        let (result, merged) = self.ctx.run_at(now, |ctx| slot.task.run(ctx));
        if let Err(e) = merged {
            warn!(
                "suspend: task {} ({}) context write-back failed: {:?}",
                slot.id.0,
                slot.label(),
                e
            );
        }

        match result {
            Ok(TaskStatus::Running) => {}
            Ok(TaskStatus::Complete) => {
                debug!("suspend: task {} ({}) reported completion", slot.id.0, slot.label());
            }
            Err(e) => {
                warn!(
                    "suspend: task {} ({}) run failed: {:?}",
                    slot.id.0,
                    slot.label(),
                    e
                );
            }
        }

        true
    }

    /// Run passes until the run flag is cleared
    pub fn run_forever(&mut self) {
        while self.flag.is_running() {
            if !self.run_pass() {
                core::hint::spin_loop();
            }
        }
        info!("suspend: stopped");
    }

    /// Clear the run flag; `run_forever` returns at the next pass boundary
    pub fn shutdown(&self) {
        self.flag.stop();
    }
}
