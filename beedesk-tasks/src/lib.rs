//! Task definitions for the desk clock
//!
//! Every behaviour of the device is one [`Task`](beedesk_core::Task) here.
//! Tasks own their peripherals and talk to each other only through the
//! keys in [`keys`]:
//!
//! | Task | Scheduler | Reads | Writes |
//! |------|-----------|-------|--------|
//! | [`ClockTask`] | periodic | mode, time_sync | display_*, tft_* |
//! | [`StatusLedTask`] | periodic | status_* | - |
//! | [`LedTask`] | suspend | display_* | display_flush |
//! | [`SensorTask`] | suspend | mode | display_*, tft_* |
//! | [`BeepTask`] | suspend | beep_* | beep_flush |
//! | [`WakeupTask`] | suspend | - | display_color_rule, display_*flush |
//! | [`ButtonTask`] | suspend | mode | mode, beep_*, tft_enable |
//! | [`TftTask`] | suspend | tft_* | tft_flush, tft_enable |
//! | [`WifiTask`] | suspend | - | wifi_connected, status_interval, time_sync |
//! | [`MemStatsTask`] | suspend | - | mem_* |

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod beep;
pub mod buttons;
pub mod clock;
pub mod keys;
pub mod led;
pub mod memstats;
pub mod sensor;
pub mod status;
pub mod tft;
pub mod wakeup;
pub mod wifi;

pub use beep::BeepTask;
pub use buttons::ButtonTask;
pub use clock::ClockTask;
pub use keys::Mode;
pub use led::LedTask;
pub use memstats::MemStatsTask;
pub use sensor::SensorTask;
pub use status::StatusLedTask;
pub use tft::TftTask;
pub use wakeup::WakeupTask;
pub use wifi::WifiTask;

#[cfg(test)]
mod tests {
    //! Both schedulers over one context

    use core::cell::Cell;
    use std::vec::Vec;

    use beedesk_core::traits::{ClockError, DateTime, MonotonicClock, RealTimeClock};
    use beedesk_core::{Context, PeriodicScheduler, RunFlag, SharedContext, SuspendScheduler};
    use beedesk_display::segment::RGB8;
    use beedesk_drivers::{Button, ButtonBank};
    use beedesk_hal::InputPin;
    use smart_leds::SmartLedsWrite;

    use super::*;

    struct StepClock {
        now: Cell<u64>,
    }

    impl MonotonicClock for &StepClock {
        fn now_ms(&self) -> u64 {
            self.now.get()
        }
    }

    struct FixedRtc(DateTime);

    impl RealTimeClock for FixedRtc {
        fn now(&mut self) -> Result<DateTime, ClockError> {
            Ok(self.0)
        }

        fn set(&mut self, time: &DateTime) -> Result<(), ClockError> {
            self.0 = *time;
            Ok(())
        }
    }

    #[derive(Default)]
    struct Strip {
        writes: usize,
    }

    impl SmartLedsWrite for Strip {
        type Error = ();
        type Color = RGB8;

        fn write<T, I>(&mut self, iterator: T) -> Result<(), ()>
        where
            T: IntoIterator<Item = I>,
            I: Into<RGB8>,
        {
            let _: Vec<RGB8> = iterator.into_iter().map(Into::into).collect();
            self.writes += 1;
            Ok(())
        }
    }

    struct MockInput<'a> {
        level: &'a Cell<bool>,
    }

    impl InputPin for MockInput<'_> {
        fn is_high(&self) -> bool {
            self.level.get()
        }
    }

    #[test]
    fn test_clock_reaches_digits_and_button_changes_mode() {
        let mut seeded = Context::new();
        keys::seed(&mut seeded).unwrap();
        let ctx = SharedContext::new(seeded);
        let clock = StepClock { now: Cell::new(0) };
        let flag = RunFlag::new();

        let mut clock_task = ClockTask::new(FixedRtc(DateTime {
            year: 2024,
            month: 1,
            day: 2,
            hour: 13,
            minute: 7,
            second: 0,
        }));
        let mut led_task = LedTask::new(Strip::default(), Strip::default(), Strip::default());
        let right = Cell::new(false);
        let mut button_task = ButtonTask::new(ButtonBank::new([(
            Button::Right,
            MockInput { level: &right },
        )]));

        {
            let mut periodic: PeriodicScheduler<'_, _, 4> =
                PeriodicScheduler::new(&ctx, &clock, 500);
            periodic.exec(&mut clock_task).unwrap();
            periodic.start();
            periodic.tick();
        }

        {
            let mut suspend: SuspendScheduler<'_, _, 4> = SuspendScheduler::new(&ctx, &clock, &flag);
            suspend.setup_os();
            suspend.exec(&mut led_task).unwrap();
            suspend.exec(&mut button_task).unwrap();

            // LED task renders "07" and "13"
            assert!(suspend.run_pass());

            right.set(true);
            assert!(suspend.run_pass());
            assert!(suspend.run_pass());
            right.set(false);
            assert!(suspend.run_pass());
        }

        assert_eq!(led_task.left().screens()[0].code(), 0xFC);
        assert_eq!(led_task.right().screens()[1].code(), 0xF2);
        assert!(led_task.colon_visible());
        assert_eq!(ctx.with(|c| Mode::read(c)), Mode::Climate);
        assert!(!ctx.with(|c| c.get_bool(keys::DISPLAY_FLUSH, true)));
        assert_eq!(ctx.with(|c| c.get_handle(keys::names::LED, u32::MAX)), 0);
    }
}
