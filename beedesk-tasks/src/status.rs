//! Status LED task
//!
//! Runs on the periodic scheduler so every tick advances the blinker by
//! one. The blink rate and the always-on latch are read from the context,
//! where the network task keeps them current.

use beedesk_core::{Context, Task, TaskError, TaskStatus};
use beedesk_drivers::StatusLed;
use beedesk_hal::OutputPin;

use crate::keys;

pub struct StatusLedTask<P> {
    led: StatusLed<P>,
    idle_interval: u8,
    always_on: bool,
}

impl<P: OutputPin> StatusLedTask<P> {
    /// Create a new task blinking every `idle_interval` ticks until told otherwise
    pub fn new(led: StatusLed<P>, idle_interval: u8) -> Self {
        Self {
            led,
            idle_interval,
            always_on: false,
        }
    }

    pub fn led(&self) -> &StatusLed<P> {
        &self.led
    }
}

impl<P: OutputPin> Task for StatusLedTask<P> {
    fn run(&mut self, ctx: &mut Context) -> Result<TaskStatus, TaskError> {
        let always_on = ctx.get_bool(keys::STATUS_ALWAYS_ON, false);
        if always_on != self.always_on {
            self.always_on = always_on;
            self.led.set_always_on(always_on);
            if always_on {
                self.led.on();
            } else {
                self.led.off();
            }
        }

        let interval = ctx.get_int(keys::STATUS_INTERVAL, i64::from(self.idle_interval));
        self.led
            .set_blink_interval(u8::try_from(interval).unwrap_or(u8::MAX));
        self.led.blink();

        Ok(TaskStatus::Running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockPin {
        high: bool,
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    fn lit_pattern(task: &mut StatusLedTask<MockPin>, ctx: &mut Context, ticks: usize) -> [bool; 8] {
        let mut out = [false; 8];
        for slot in out.iter_mut().take(ticks) {
            task.run(ctx).unwrap();
            *slot = task.led().is_lit();
        }
        out
    }

    #[test]
    fn test_blinks_at_context_rate() {
        let mut task = StatusLedTask::new(StatusLed::new(MockPin::default()), 1);
        let mut ctx = Context::new();

        assert_eq!(
            lit_pattern(&mut task, &mut ctx, 4),
            [true, false, true, false, false, false, false, false]
        );

        ctx.set(keys::STATUS_INTERVAL, 2i64).unwrap();
        let pattern = lit_pattern(&mut task, &mut ctx, 4);
        assert_eq!(&pattern[..4], &[false, true, true, false]);
    }

    #[test]
    fn test_always_on_latch() {
        let mut task = StatusLedTask::new(StatusLed::new(MockPin::default()), 1);
        let mut ctx = Context::new();
        ctx.set(keys::STATUS_ALWAYS_ON, true).unwrap();

        let pattern = lit_pattern(&mut task, &mut ctx, 4);
        assert!(pattern[..4].iter().all(|lit| *lit));

        ctx.set(keys::STATUS_ALWAYS_ON, false).unwrap();
        task.run(&mut ctx).unwrap();
        assert!(task.led().is_lit());
        task.run(&mut ctx).unwrap();
        assert!(!task.led().is_lit());
    }
}
