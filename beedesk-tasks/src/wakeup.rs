//! Presence wake-up task
//!
//! Watches the wake sensor output. Going high selects the active colour
//! rule, going low the inactive one, and either way the digits are
//! redrawn in full.

use beedesk_core::{Context, Task, TaskError, TaskStatus};
use beedesk_hal::InputPin;

use crate::keys::{self, rule};

pub struct WakeupTask<P> {
    pin: P,
    level: bool,
}

impl<P: InputPin> WakeupTask<P> {
    /// Create a new task; the sensor is assumed idle (low) at start
    pub fn new(pin: P) -> Self {
        Self { pin, level: false }
    }
}

impl<P: InputPin> Task for WakeupTask<P> {
    fn run(&mut self, ctx: &mut Context) -> Result<TaskStatus, TaskError> {
        let level = self.pin.is_high();
        if level == self.level {
            return Ok(TaskStatus::Running);
        }
        self.level = level;

        let handle = if level { rule::ACTIVE } else { rule::INACTIVE };
        debug!("wakeup: level {}, rule {}", level, handle);
        ctx.set(keys::DISPLAY_COLOR_RULE, handle)?;
        ctx.set(keys::DISPLAY_FLUSH, true)?;
        ctx.set(keys::DISPLAY_FORCE_FLUSH, true)?;

        Ok(TaskStatus::Running)
    }
}
