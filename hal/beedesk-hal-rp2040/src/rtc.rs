//! Calendar and uptime clocks

use beedesk_core::traits::{ClockError, DateTime, MicrosecondClock, MonotonicClock, RealTimeClock};
use embassy_rp::rtc::{self, DayOfWeek, Instance, Rtc, RtcError};
use embassy_time::Instant;

/// Time since boot from the embassy time driver
#[derive(Debug, Clone, Copy, Default)]
pub struct UptimeClock;

impl MonotonicClock for UptimeClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}

impl MicrosecondClock for UptimeClock {
    fn now_us(&self) -> u64 {
        Instant::now().as_micros()
    }
}

/// Day of the week for a Gregorian date, 0 = Sunday
pub fn weekday(year: u16, month: u8, day: u8) -> u8 {
    const OFFSETS: [u16; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];
    let y = if month < 3 { year.saturating_sub(1) } else { year };
    let m = usize::from(month.clamp(1, 12)) - 1;
    ((y + y / 4 - y / 100 + y / 400 + OFFSETS[m] + u16::from(day)) % 7) as u8
}

fn day_of_week(n: u8) -> DayOfWeek {
    match n {
        1 => DayOfWeek::Monday,
        2 => DayOfWeek::Tuesday,
        3 => DayOfWeek::Wednesday,
        4 => DayOfWeek::Thursday,
        5 => DayOfWeek::Friday,
        6 => DayOfWeek::Saturday,
        _ => DayOfWeek::Sunday,
    }
}

fn clock_err(e: RtcError) -> ClockError {
    match e {
        RtcError::NotRunning => ClockError::NotSet,
        _ => ClockError::Invalid,
    }
}

/// On-chip RTC implementing [`RealTimeClock`]
pub struct RpRtc<'d, T: Instance> {
    rtc: Rtc<'d, T>,
}

impl<'d, T: Instance> RpRtc<'d, T> {
    pub fn new(rtc: Rtc<'d, T>) -> Self {
        Self { rtc }
    }
}

impl<T: Instance> RealTimeClock for RpRtc<'_, T> {
    fn now(&mut self) -> Result<DateTime, ClockError> {
        let t = self.rtc.now().map_err(clock_err)?;
        Ok(DateTime {
            year: t.year,
            month: t.month,
            day: t.day,
            hour: t.hour,
            minute: t.minute,
            second: t.second,
        })
    }

    fn set(&mut self, time: &DateTime) -> Result<(), ClockError> {
        if !time.is_valid() {
            return Err(ClockError::Invalid);
        }
        let t = rtc::DateTime {
            year: time.year,
            month: time.month,
            day: time.day,
            day_of_week: day_of_week(weekday(time.year, time.month, time.day)),
            hour: time.hour,
            minute: time.minute,
            second: time.second,
        };
        self.rtc.set_datetime(t).map_err(clock_err)
    }
}
