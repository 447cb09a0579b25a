//! Timer-driven scheduler
//!
//! Every tick runs each task once, in registration order. A task that
//! reports completion is removed and finished in the same tick. The timer
//! itself lives outside this crate: firmware calls [`PeriodicScheduler::tick`]
//! from its periodic interrupt context.

use heapless::Vec;
use portable_atomic::{AtomicBool, Ordering};

use super::{prepare, ExecError, Slot, TaskId};
use crate::context::SharedContext;
use crate::task::{Task, TaskStatus};
use crate::traits::MonotonicClock;

/// Periodic scheduler holding up to `N` tasks
pub struct PeriodicScheduler<'a, C, const N: usize> {
    ctx: &'a SharedContext,
    clock: C,
    period_ms: u32,
    tasks: Vec<Slot<'a, dyn Task + Send + 'a>, N>,
    next_id: u16,
    armed: AtomicBool,
}

impl<'a, C: MonotonicClock, const N: usize> PeriodicScheduler<'a, C, N> {
    /// Create a disarmed scheduler ticking every `period_ms`
    pub fn new(ctx: &'a SharedContext, clock: C, period_ms: u32) -> Self {
        Self {
            ctx,
            clock,
            period_ms,
            tasks: Vec::new(),
            next_id: 0,
            armed: AtomicBool::new(false),
        }
    }

    /// Tick period the timer should be programmed with
    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Set up a task and append it to the run list
    ///
    /// A task whose setup fails is logged and dropped; the scheduler keeps
    /// running without it.
    pub fn exec(&mut self, task: &'a mut (dyn Task + Send + 'a)) -> Result<TaskId, ExecError> {
        if self.tasks.is_full() {
            warn!("periodic: no room for task {}", task.name().unwrap_or("-"));
            return Err(ExecError::Full);
        }

        let id = TaskId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);

        prepare(task, id, self.ctx)?;

        let _ = self.tasks.push(Slot { id, task });
        debug!("periodic: task {} scheduled", id.0);
        Ok(id)
    }

    /// Arm the scheduler so ticks run tasks
    pub fn start(&self) {
        self.armed.store(true, Ordering::Release);
        info!("periodic: armed at {} ms", self.period_ms);
    }

    /// Disarm the scheduler; later ticks do nothing
    pub fn shutdown(&self) {
        self.armed.store(false, Ordering::Release);
        info!("periodic: disarmed");
    }

    /// Whether ticks currently run tasks
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Number of scheduled tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no task is scheduled
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run every scheduled task once
    ///
    /// Each run sees `ticks_ms` set to the current clock reading. The
    /// context lock is held only around each run, not through it.
    pub fn tick(&mut self) {
        if !self.is_armed() {
            return;
        }

        let mut i = 0;
        while i < self.tasks.len() {
            let now = self.clock.now_ms() as i64;
            let slot = &mut self.tasks[i];
            let (result, merged) = self.ctx.run_at(now, |ctx| slot.task.run(ctx));
            if let Err(e) = merged {
                warn!(
                    "periodic: task {} ({}) context write-back failed: {:?}",
                    slot.id.0,
                    slot.label(),
                    e
                );
            }

            match result {
                Ok(TaskStatus::Running) => i += 1,
                Ok(TaskStatus::Complete) => {
                    let slot = self.tasks.remove(i);
                    debug!("periodic: task {} ({}) complete", slot.id.0, slot.label());
                    if let Err(e) = slot.task.finish() {
                        error!(
                            "periodic: task {} ({}) finish failed: {:?}",
                            slot.id.0,
                            slot.label(),
                            e
                        );
                    }
                }
                Err(e) => {
                    warn!(
                        "periodic: task {} ({}) run failed: {:?}",
                        slot.id.0,
                        slot.label(),
                        e
                    );
                    i += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::mock::{call_log, MockClock, RecordingTask};
    use super::*;
    use crate::context::{Context, Value, TICKS_MS};
    use crate::task::TaskError;

    fn entries(log: &super::super::mock::CallLog) -> std::vec::Vec<(u8, &'static str)> {
        log.lock().map(|l| l.clone()).unwrap_or_default()
    }

    #[test]
    fn test_exec_runs_setup_and_registers_name() {
        let ctx = SharedContext::default();
        let clock = MockClock::new(0);
        let log = call_log();
        let mut a = RecordingTask::new(1, &log);
        a.name = Some("beeper");

        let mut sched: PeriodicScheduler<'_, _, 4> = PeriodicScheduler::new(&ctx, &clock, 500);
        let id = sched.exec(&mut a).unwrap();

        assert_eq!(sched.len(), 1);
        assert_eq!(entries(&log), [(1, "setup")]);
        assert_eq!(
            ctx.with(|c| c.get("beeper").cloned()),
            Some(Value::Handle(id.as_handle()))
        );
    }

    #[test]
    fn test_setup_failure_is_not_scheduled() {
        let ctx = SharedContext::default();
        let clock = MockClock::new(0);
        let log = call_log();
        let mut a = RecordingTask::new(1, &log);
        a.fail_setup = true;
        a.name = Some("broken");

        let mut sched: PeriodicScheduler<'_, _, 4> = PeriodicScheduler::new(&ctx, &clock, 500);
        assert_eq!(
            sched.exec(&mut a),
            Err(ExecError::SetupFailed(TaskError::Peripheral))
        );
        assert!(sched.is_empty());
        assert!(!ctx.with(|c| c.contains("broken")));

        sched.start();
        sched.tick();
        assert_eq!(entries(&log), [(1, "setup")]);
    }

    #[test]
    fn test_full_rejects_before_setup() {
        let ctx = SharedContext::default();
        let clock = MockClock::new(0);
        let log = call_log();
        let mut a = RecordingTask::new(1, &log);
        let mut b = RecordingTask::new(2, &log);

        let mut sched: PeriodicScheduler<'_, _, 1> = PeriodicScheduler::new(&ctx, &clock, 500);
        sched.exec(&mut a).unwrap();
        assert_eq!(sched.exec(&mut b), Err(ExecError::Full));
        assert_eq!(entries(&log), [(1, "setup")]);
    }

    #[test]
    fn test_disarmed_tick_is_noop() {
        let ctx = SharedContext::default();
        let clock = MockClock::new(0);
        let log = call_log();
        let mut a = RecordingTask::new(1, &log);

        let mut sched: PeriodicScheduler<'_, _, 4> = PeriodicScheduler::new(&ctx, &clock, 500);
        sched.exec(&mut a).unwrap();
        sched.tick();
        sched.start();
        sched.shutdown();
        sched.tick();
        assert!(!sched.is_armed());
        assert_eq!(entries(&log), [(1, "setup")]);
    }

    #[test]
    fn test_tick_runs_all_tasks_in_order_with_timestamp() {
        let ctx = SharedContext::default();
        let clock = MockClock::new(1_000);
        let log = call_log();
        let mut a = RecordingTask::new(1, &log);
        let mut b = RecordingTask::new(2, &log);

        let mut sched: PeriodicScheduler<'_, _, 4> = PeriodicScheduler::new(&ctx, &clock, 500);
        sched.exec(&mut a).unwrap();
        sched.exec(&mut b).unwrap();
        sched.start();
        sched.tick();
        clock.advance(500);
        sched.tick();
        drop(sched);

        assert_eq!(
            entries(&log),
            [
                (1, "setup"),
                (2, "setup"),
                (1, "run"),
                (2, "run"),
                (1, "run"),
                (2, "run"),
            ]
        );
        assert_eq!(a.seen_ticks, 1_500);
        assert_eq!(b.seen_ticks, 1_500);
        assert_eq!(ctx.with(|c| c.get_int(TICKS_MS, 0)), 1_500);
    }

    /// Counts up a shared key, writing the other scheduler's key mid-run
    struct Counter<'c> {
        shared: &'c SharedContext,
    }

    impl Task for Counter<'_> {
        fn run(&mut self, ctx: &mut Context) -> Result<TaskStatus, TaskError> {
            self.shared.with(|c| c.set("isr", ctx.get_int(TICKS_MS, 0)))?;
            let n = ctx.get_int("count", 0);
            ctx.set("count", n + 1)?;
            Ok(TaskStatus::Running)
        }
    }

    #[test]
    fn test_writes_visible_to_next_task_in_tick() {
        let ctx = SharedContext::default();
        let clock = MockClock::new(250);
        let mut a = Counter { shared: &ctx };
        let mut b = Counter { shared: &ctx };

        let mut sched: PeriodicScheduler<'_, _, 2> = PeriodicScheduler::new(&ctx, &clock, 500);
        sched.exec(&mut a).unwrap();
        sched.exec(&mut b).unwrap();
        sched.start();
        sched.tick();
        drop(sched);

        assert_eq!(ctx.with(|c| c.get_int("count", 0)), 2);
        assert_eq!(ctx.with(|c| c.get_int("isr", 0)), 250);
    }

    #[test]
    fn test_completed_task_is_removed_and_finished() {
        let ctx = SharedContext::default();
        let clock = MockClock::new(0);
        let log = call_log();
        let mut a = RecordingTask::new(1, &log);
        let mut b = RecordingTask::new(2, &log);
        a.complete_after = Some(2);
        a.fail_finish = true;

        let mut sched: PeriodicScheduler<'_, _, 4> = PeriodicScheduler::new(&ctx, &clock, 500);
        sched.exec(&mut a).unwrap();
        sched.exec(&mut b).unwrap();
        sched.start();
        for _ in 0..4 {
            sched.tick();
        }
        assert_eq!(sched.len(), 1);
        drop(sched);

        assert_eq!(a.runs, 2);
        assert_eq!(b.runs, 4);
        let finishes: std::vec::Vec<_> = entries(&log)
            .into_iter()
            .filter(|(_, what)| *what == "finish")
            .collect();
        assert_eq!(finishes, [(1, "finish")]);
    }

    #[test]
    fn test_failing_task_keeps_running() {
        let ctx = SharedContext::default();
        let clock = MockClock::new(0);
        let log = call_log();
        let mut a = RecordingTask::new(1, &log);
        let mut b = RecordingTask::new(2, &log);
        a.fail_run = true;

        let mut sched: PeriodicScheduler<'_, _, 4> = PeriodicScheduler::new(&ctx, &clock, 500);
        sched.exec(&mut a).unwrap();
        sched.exec(&mut b).unwrap();
        sched.start();
        for _ in 0..5 {
            sched.tick();
        }
        assert_eq!(sched.len(), 2);
        drop(sched);

        assert_eq!(a.runs, 5);
        assert_eq!(b.runs, 5);
    }
}
