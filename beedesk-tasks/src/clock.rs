//! Clock task
//!
//! Runs on the periodic scheduler. In time mode it publishes hours and
//! minutes for the digits and blinks the colon once per tick. It also owns
//! the real-time clock, so network time arriving through the context is
//! written here.

use core::fmt::Write;

use beedesk_core::traits::{AssetId, DateTime, RealTimeClock};
use beedesk_core::{Context, Task, TaskError, TaskStatus, Value};
use heapless::String;

use crate::keys::{self, Mode};

/// Publishes the time to the digits and the panel
pub struct ClockTask<R> {
    rtc: R,
    shown_minute: Option<(u8, u8)>,
}

impl<R: RealTimeClock> ClockTask<R> {
    /// Create a new task around the calendar clock
    pub fn new(rtc: R) -> Self {
        Self {
            rtc,
            shown_minute: None,
        }
    }

    pub fn rtc_mut(&mut self) -> &mut R {
        &mut self.rtc
    }

    fn apply_sync(&mut self, ctx: &mut Context) -> Result<(), TaskError> {
        let time = match ctx.remove(keys::TIME_SYNC) {
            Some(Value::Text(s)) => DateTime::parse(&s),
            _ => None,
        };
        let Some(time) = time else {
            return Ok(());
        };

        self.rtc.set(&time)?;
        self.shown_minute = None;
        info!("clock: set to {}", time.format().as_str());
        Ok(())
    }

    fn publish_panel(&mut self, ctx: &mut Context, now: &DateTime) -> Result<(), TaskError> {
        let key = (now.hour, now.minute);
        if self.shown_minute == Some(key) {
            return Ok(());
        }
        self.shown_minute = Some(key);

        let mut time: String<8> = String::new();
        let _ = write!(time, "{:02}:{:02}", now.hour, now.minute);
        let mut date: String<12> = String::new();
        let _ = write!(date, "{}-{:02}-{:02}", now.year, now.month, now.day);

        ctx.set(keys::TFT_BC, i64::from(AssetId::ClockBackground.as_u8()))?;
        ctx.set_text(keys::TFT_TITLE, "Clock")?;
        ctx.set_text(keys::TFT_TEXT_1, &time)?;
        ctx.set_text(keys::TFT_TEXT_2, &date)?;
        ctx.set_text(keys::TFT_TEXT_3, "")?;
        ctx.set(keys::TFT_FLUSH, true)?;
        Ok(())
    }
}

impl<R: RealTimeClock> Task for ClockTask<R> {
    fn run(&mut self, ctx: &mut Context) -> Result<TaskStatus, TaskError> {
        self.apply_sync(ctx)?;

        if Mode::read(ctx) != Mode::Time {
            self.shown_minute = None;
            return Ok(TaskStatus::Running);
        }

        let now = self.rtc.now()?;

        let mut minute: String<4> = String::new();
        let _ = write!(minute, "{}", now.minute);
        let mut hour: String<4> = String::new();
        let _ = write!(hour, "{}", now.hour);

        ctx.set_text(keys::DISPLAY_STR_1, &minute)?;
        ctx.set_text(keys::DISPLAY_STR_2, &hour)?;
        ctx.set(keys::DISPLAY_FLUSH, true)?;
        let visible = ctx.get_bool(keys::DISPLAY_SEG_VISIBLE, false);
        ctx.set(keys::DISPLAY_SEG_VISIBLE, !visible)?;

        self.publish_panel(ctx, &now)?;
        Ok(TaskStatus::Running)
    }
}
