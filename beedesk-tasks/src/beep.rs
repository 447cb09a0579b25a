//! Beeper task
//!
//! Plays short note sequences. Another task picks a sequence with
//! `beep_seq` and raises `beep_flush`; each note holds its frequency for
//! its duration, measured against the scheduler timestamp, and the beeper
//! is silenced once the sequence runs out.

use beedesk_core::traits::Beeper;
use beedesk_core::{Context, Task, TaskError, TaskStatus, TICKS_MS};

use crate::keys::{self, beep};

/// Plays note sequences on the beeper
pub struct BeepTask<B> {
    beeper: B,
    sequence: &'static [beep::Note],
    index: usize,
    next_at: i64,
}

impl<B: Beeper> BeepTask<B> {
    /// Create a new task; nothing plays until requested
    pub fn new(beeper: B) -> Self {
        Self {
            beeper,
            sequence: &[],
            index: 0,
            next_at: 0,
        }
    }

    /// Whether notes remain to be started; the last one may still be sounding
    pub fn is_playing(&self) -> bool {
        self.index < self.sequence.len()
    }

    pub fn beeper(&self) -> &B {
        &self.beeper
    }
}

impl<B: Beeper> Task for BeepTask<B> {
    fn name(&self) -> Option<&'static str> {
        Some(keys::names::BEEP)
    }

    fn setup(&mut self) -> Result<(), TaskError> {
        self.beeper.disable();
        Ok(())
    }

    fn run(&mut self, ctx: &mut Context) -> Result<TaskStatus, TaskError> {
        let now = ctx.get_int(TICKS_MS, 0);

        if ctx.get_bool(keys::BEEP_FLUSH, false) {
            ctx.set(keys::BEEP_FLUSH, false)?;
            self.sequence = beep::resolve(ctx.get_int(keys::BEEP_SEQ, beep::SEQ_A));
            self.index = 0;
            self.next_at = now;
        }

        if !self.is_playing() {
            if now >= self.next_at && self.beeper.is_enabled() {
                self.beeper.disable();
            }
            return Ok(TaskStatus::Running);
        }

        if now >= self.next_at {
            let (hz, ms) = self.sequence[self.index];
            self.next_at = now + i64::from(ms);
            self.beeper.set_frequency(hz);
            self.index += 1;
        }
        if !self.beeper.is_enabled() {
            self.beeper.enable();
        }

        Ok(TaskStatus::Running)
    }
}
