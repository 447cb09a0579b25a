//! Front panel button task
//!
//! Every press chirps up and every release chirps down. Any edge also
//! wakes the TFT backlight. Releasing the right button moves to the next
//! display mode.

use beedesk_core::{Context, Task, TaskError, TaskStatus};
use beedesk_drivers::{Button, ButtonBank, ButtonEvent};
use beedesk_hal::InputPin;

use crate::keys::{self, beep, Mode};

/// Turns button edges into context requests
pub struct ButtonTask<P, const N: usize> {
    bank: ButtonBank<P, N>,
}

impl<P: InputPin, const N: usize> ButtonTask<P, N> {
    /// Create a new task over a button bank
    pub fn new(bank: ButtonBank<P, N>) -> Self {
        Self { bank }
    }

    fn handle(ctx: &mut Context, event: ButtonEvent) -> Result<(), TaskError> {
        let seq = if event.pressed {
            beep::SEQ_A
        } else {
            beep::SEQ_B
        };
        ctx.set(keys::BEEP_SEQ, seq)?;
        ctx.set(keys::BEEP_FLUSH, true)?;
        ctx.set(keys::TFT_ENABLE, true)?;

        if event.button == Button::Right && !event.pressed {
            let mode = Mode::read(ctx).next();
            info!("buttons: mode -> {}", mode.code());
            ctx.set(keys::MODE, mode.code())?;
        }
        Ok(())
    }
}

impl<P: InputPin, const N: usize> Task for ButtonTask<P, N> {
    fn run(&mut self, ctx: &mut Context) -> Result<TaskStatus, TaskError> {
        for event in self.bank.poll() {
            Self::handle(ctx, event)?;
        }
        Ok(TaskStatus::Running)
    }
}
