//! Clock traits and calendar time

use core::fmt::Write;

use heapless::String;

/// Errors from the real-time clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// The clock has never been set
    NotSet,
    /// A field is out of range
    Invalid,
    /// Hardware access failed
    Hardware,
}

/// Monotonic millisecond counter used for interval timers
pub trait MonotonicClock {
    fn now_ms(&self) -> u64;
}

/// Free-running microsecond counter for timing line pulses
pub trait MicrosecondClock {
    fn now_us(&self) -> u64;
}

/// Calendar date and wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Length of the longest formatted [`DateTime`]
pub const DATETIME_STR_LEN: usize = 20;

impl DateTime {
    /// Check every field is in range (days are not checked per month)
    pub fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && self.hour < 24
            && self.minute < 60
            && self.second < 60
    }

    /// Render as `Y-M-D h:m:s` without zero padding
    pub fn format(&self) -> String<DATETIME_STR_LEN> {
        let mut out = String::new();
        let _ = write!(
            out,
            "{}-{}-{} {}:{}:{}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        );
        out
    }

    /// Parse the `Y-M-D h:m:s` form produced by [`DateTime::format`]
    ///
    /// Leading zeros are accepted. Returns `None` on any deviation.
    pub fn parse(s: &str) -> Option<Self> {
        let (date, time) = s.split_once(' ')?;

        let mut d = date.splitn(3, '-');
        let year = number(d.next()?)?;
        let month = number(d.next()?)?;
        let day = number(d.next()?)?;

        let mut t = time.splitn(3, ':');
        let hour = number(t.next()?)?;
        let minute = number(t.next()?)?;
        let second = number(t.next()?)?;

        Some(Self {
            year: u16::try_from(year).ok()?,
            month: u8::try_from(month).ok()?,
            day: u8::try_from(day).ok()?,
            hour: u8::try_from(hour).ok()?,
            minute: u8::try_from(minute).ok()?,
            second: u8::try_from(second).ok()?,
        })
    }
}

fn number(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Battery-backed or on-chip calendar clock
pub trait RealTimeClock {
    /// Read the current time
    fn now(&mut self) -> Result<DateTime, ClockError>;

    /// Set the current time
    fn set(&mut self, time: &DateTime) -> Result<(), ClockError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DateTime {
        DateTime {
            year: 2024,
            month: 3,
            day: 9,
            hour: 7,
            minute: 5,
            second: 0,
        }
    }

    #[test]
    fn test_format_is_unpadded() {
        assert_eq!(sample().format().as_str(), "2024-3-9 7:5:0");
    }

    #[test]
    fn test_parse_accepts_padded_fields() {
        assert_eq!(DateTime::parse("2024-03-09 07:05:00"), Some(sample()));
        assert_eq!(DateTime::parse(sample().format().as_str()), Some(sample()));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(DateTime::parse("2024-3-9"), None);
        assert_eq!(DateTime::parse("2024-3-9 7:5"), None);
        assert_eq!(DateTime::parse("2024-3-9 7:5:x"), None);
        assert_eq!(DateTime::parse("2024-3-9  7:5:0"), None);
        assert_eq!(DateTime::parse("2024-3-9 7:5:0:1"), None);
        assert_eq!(DateTime::parse("2024-300-9 7:5:0"), None);
    }

    #[test]
    fn test_validity() {
        assert!(sample().is_valid());
        assert!(!DateTime::default().is_valid());
        assert!(!DateTime { hour: 24, ..sample() }.is_valid());
    }
}
