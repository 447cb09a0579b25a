//! Heap statistics task

use beedesk_core::traits::MemoryStats;
use beedesk_core::{Context, Task, TaskError, TaskStatus, TICKS_MS};

use crate::keys;

/// Publishes heap usage once per interval
pub struct MemStatsTask<M> {
    stats: M,
    interval_ms: i64,
    last: Option<i64>,
}

impl<M: MemoryStats> MemStatsTask<M> {
    pub fn new(stats: M, interval_ms: u32) -> Self {
        Self {
            stats,
            interval_ms: i64::from(interval_ms),
            last: None,
        }
    }
}

impl<M: MemoryStats> Task for MemStatsTask<M> {
    fn run(&mut self, ctx: &mut Context) -> Result<TaskStatus, TaskError> {
        let now = ctx.get_int(TICKS_MS, 0);
        if self.last.is_some_and(|t| now - t < self.interval_ms) {
            return Ok(TaskStatus::Running);
        }
        self.last = Some(now);

        let usage = self.stats.usage();
        info!("mem: used {} free {}", usage.used, usage.free);
        ctx.set(keys::MEM_USED, i64::try_from(usage.used).unwrap_or(i64::MAX))?;
        ctx.set(keys::MEM_FREE, i64::try_from(usage.free).unwrap_or(i64::MAX))?;
        Ok(TaskStatus::Running)
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use beedesk_core::traits::MemoryUsage;

    use super::*;

    struct Heap<'a> {
        used: &'a Cell<usize>,
    }

    impl MemoryStats for Heap<'_> {
        fn usage(&self) -> MemoryUsage {
            MemoryUsage {
                used: self.used.get(),
                free: 4096 - self.used.get(),
            }
        }
    }

    #[test]
    fn test_publishes_once_per_interval() {
        let used = Cell::new(1000);
        let mut task = MemStatsTask::new(Heap { used: &used }, 5_000);
        let mut ctx = Context::new();

        task.run(&mut ctx).unwrap();
        assert_eq!(ctx.get_int(keys::MEM_USED, -1), 1000);
        assert_eq!(ctx.get_int(keys::MEM_FREE, -1), 3096);

        used.set(2000);
        ctx.set(TICKS_MS, 4_999i64).unwrap();
        task.run(&mut ctx).unwrap();
        assert_eq!(ctx.get_int(keys::MEM_USED, -1), 1000);

        ctx.set(TICKS_MS, 5_000i64).unwrap();
        task.run(&mut ctx).unwrap();
        assert_eq!(ctx.get_int(keys::MEM_USED, -1), 2000);
    }
}
