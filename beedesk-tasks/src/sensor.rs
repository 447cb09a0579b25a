//! Climate task
//!
//! In climate mode, measures once per poll interval and publishes the
//! temperature and humidity to the digits and the panel. A failed read
//! leaves the previous values on display and is retried next interval.

use core::fmt::Write;

use beedesk_core::traits::{AssetId, ClimateSensor};
use beedesk_core::{Context, Task, TaskError, TaskStatus, TICKS_MS};
use heapless::String;

use crate::keys::{self, Mode};

/// Polls the temperature/humidity sensor
pub struct SensorTask<S> {
    sensor: S,
    poll_interval_ms: i64,
    last_poll: Option<i64>,
}

impl<S: ClimateSensor> SensorTask<S> {
    /// Create a new task measuring at most once per `poll_interval_ms`
    pub fn new(sensor: S, poll_interval_ms: u32) -> Self {
        Self {
            sensor,
            poll_interval_ms: i64::from(poll_interval_ms),
            last_poll: None,
        }
    }

    fn due(&self, now: i64) -> bool {
        self.last_poll
            .map_or(true, |last| now - last >= self.poll_interval_ms)
    }
}

impl<S: ClimateSensor> Task for SensorTask<S> {
    fn name(&self) -> Option<&'static str> {
        Some(keys::names::SENSOR)
    }

    fn run(&mut self, ctx: &mut Context) -> Result<TaskStatus, TaskError> {
        if Mode::read(ctx) != Mode::Climate {
            self.last_poll = None;
            return Ok(TaskStatus::Running);
        }

        let now = ctx.get_int(TICKS_MS, 0);
        if !self.due(now) {
            return Ok(TaskStatus::Running);
        }
        // A failing sensor is retried next interval, not next pass
        self.last_poll = Some(now);

        let reading = self.sensor.measure()?;

        let mut temp: String<8> = String::new();
        let _ = write!(temp, "{}", reading.temperature_c);
        let mut hum: String<8> = String::new();
        let _ = write!(hum, "{}", reading.humidity_pct);

        ctx.set_text(keys::DISPLAY_STR_1, &temp)?;
        ctx.set_text(keys::DISPLAY_STR_2, &hum)?;
        ctx.set(keys::DISPLAY_SEG_VISIBLE, false)?;
        ctx.set(keys::DISPLAY_FLUSH, true)?;

        let mut line: String<12> = String::new();
        let _ = write!(line, "{} C", reading.temperature_c);
        ctx.set_text(keys::TFT_TEXT_1, &line)?;
        line.clear();
        let _ = write!(line, "{} %", reading.humidity_pct);
        ctx.set_text(keys::TFT_TEXT_2, &line)?;
        ctx.set_text(keys::TFT_TEXT_3, "")?;
        ctx.set_text(keys::TFT_TITLE, "Climate")?;
        ctx.set(keys::TFT_BC, i64::from(AssetId::ClimateBackground.as_u8()))?;
        ctx.set(keys::TFT_FLUSH, true)?;

        debug!(
            "climate: {} C {} %",
            reading.temperature_c,
            reading.humidity_pct
        );
        Ok(TaskStatus::Running)
    }
}

#[cfg(test)]
mod tests {
    use beedesk_core::traits::{ClimateReading, SensorError};

    use super::*;

    struct MockSensor {
        next: Result<ClimateReading, SensorError>,
        calls: u32,
    }

    impl ClimateSensor for MockSensor {
        fn measure(&mut self) -> Result<ClimateReading, SensorError> {
            self.calls += 1;
            self.next
        }
    }

    fn sensor(temperature_c: i16, humidity_pct: u8) -> MockSensor {
        MockSensor {
            next: Ok(ClimateReading {
                temperature_c,
                humidity_pct,
            }),
            calls: 0,
        }
    }

    fn climate_ctx(now: i64) -> Context {
        let mut ctx = Context::new();
        ctx.set(keys::MODE, Mode::Climate.code()).unwrap();
        ctx.set(TICKS_MS, now).unwrap();
        ctx
    }

    #[test]
    fn test_publishes_reading() {
        let mut task = SensorTask::new(sensor(23, 45), 10_000);
        let mut ctx = climate_ctx(1_000);

        task.run(&mut ctx).unwrap();
        assert_eq!(ctx.get_text(keys::DISPLAY_STR_1, ""), "23");
        assert_eq!(ctx.get_text(keys::DISPLAY_STR_2, ""), "45");
        assert!(!ctx.get_bool(keys::DISPLAY_SEG_VISIBLE, true));
        assert!(ctx.get_bool(keys::DISPLAY_FLUSH, false));
        assert_eq!(ctx.get_text(keys::TFT_TEXT_1, ""), "23 C");
        assert_eq!(
            ctx.get_int(keys::TFT_BC, -1),
            i64::from(AssetId::ClimateBackground.as_u8())
        );
    }

    #[test]
    fn test_respects_poll_interval() {
        let mut task = SensorTask::new(sensor(20, 50), 10_000);
        let mut ctx = climate_ctx(1_000);

        task.run(&mut ctx).unwrap();
        ctx.set(TICKS_MS, 10_999i64).unwrap();
        task.run(&mut ctx).unwrap();
        assert_eq!(task.sensor.calls, 1);

        ctx.set(TICKS_MS, 11_000i64).unwrap();
        task.run(&mut ctx).unwrap();
        assert_eq!(task.sensor.calls, 2);
    }

    #[test]
    fn test_failure_waits_for_next_interval() {
        let mut task = SensorTask::new(
            MockSensor {
                next: Err(SensorError::Checksum),
                calls: 0,
            },
            10_000,
        );
        let mut ctx = climate_ctx(5_000);
        ctx.set_text(keys::DISPLAY_STR_1, "21").unwrap();

        assert_eq!(
            task.run(&mut ctx),
            Err(TaskError::Sensor(SensorError::Checksum))
        );
        assert_eq!(ctx.get_text(keys::DISPLAY_STR_1, ""), "21");

        ctx.set(TICKS_MS, 6_000i64).unwrap();
        task.run(&mut ctx).unwrap();
        assert_eq!(task.sensor.calls, 1);
    }

    #[test]
    fn test_idle_in_time_mode() {
        let mut task = SensorTask::new(sensor(20, 50), 10_000);
        let mut ctx = Context::new();
        task.run(&mut ctx).unwrap();
        assert_eq!(task.sensor.calls, 0);
    }
}
