//! PWM slice for the beeper
//!
//! An RP2040 PWM slice counts from 0 to `top` at `SYS_CLK / divider`,
//! where the divider is an 8.4 fixed-point value. For a requested
//! frequency we pick the smallest divider that keeps `top` within 16 bits,
//! which gives the finest duty resolution.

use beedesk_hal::pwm::DUTY_MAX_PERMILLE;
use beedesk_hal::PwmOutput;
use embassy_rp::pwm::{Config, Pwm};

/// System clock frequency (RP2040 default)
pub const SYS_CLK_HZ: u32 = 125_000_000;

/// Largest divider in sixteenths (255 + 15/16)
const MAX_DIVIDER_X16: u64 = 0xFFF;

/// Counter settings for one frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmTiming {
    pub top: u16,
    /// Divider in sixteenths
    pub divider_x16: u16,
}

impl PwmTiming {
    pub fn divider_int(&self) -> u8 {
        (self.divider_x16 >> 4) as u8
    }

    pub fn divider_frac(&self) -> u8 {
        (self.divider_x16 & 0x0F) as u8
    }

    /// Compare value for a duty in permille
    pub fn compare(&self, duty_permille: u16) -> u16 {
        let duty = u32::from(duty_permille.min(DUTY_MAX_PERMILLE));
        let period = u32::from(self.top) + 1;
        (period * duty / u32::from(DUTY_MAX_PERMILLE)).min(u32::from(u16::MAX)) as u16
    }
}

/// Counter settings for `freq_hz`, or `None` when it is out of reach
pub fn calc_pwm_timing(freq_hz: u32) -> Option<PwmTiming> {
    if freq_hz == 0 {
        return None;
    }

    let clk_x16 = u64::from(SYS_CLK_HZ) * 16;
    let freq = u64::from(freq_hz);
    let divider_x16 = clk_x16.div_ceil(freq * 0x1_0000).max(16);
    if divider_x16 > MAX_DIVIDER_X16 {
        return None;
    }

    let top = (clk_x16 / (divider_x16 * freq)).saturating_sub(1);
    Some(PwmTiming {
        top: top.min(0xFFFF) as u16,
        divider_x16: divider_x16 as u16,
    })
}

/// Which output of the slice the load is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmChannel {
    A,
    B,
}

/// One PWM slice output implementing [`PwmOutput`]
pub struct RpPwm<'d> {
    pwm: Pwm<'d>,
    channel: PwmChannel,
    config: Config,
    timing: PwmTiming,
    duty: u16,
}

impl<'d> RpPwm<'d> {
    /// Create a new output, silent until a duty is set
    pub fn new(pwm: Pwm<'d>, channel: PwmChannel, freq_hz: u32) -> Self {
        let timing = calc_pwm_timing(freq_hz).unwrap_or(PwmTiming {
            top: u16::MAX,
            divider_x16: 16,
        });
        let mut out = Self {
            pwm,
            channel,
            config: Config::default(),
            timing,
            duty: 0,
        };
        out.apply();
        out
    }

    fn apply(&mut self) {
        let compare = self.timing.compare(self.duty);
        self.config.top = self.timing.top;
        self.config.divider = fixed::FixedU16::from_bits(self.timing.divider_x16);
        match self.channel {
            PwmChannel::A => self.config.compare_a = compare,
            PwmChannel::B => self.config.compare_b = compare,
        }
        self.pwm.set_config(&self.config);
    }
}

impl PwmOutput for RpPwm<'_> {
    /// Frequencies outside the reachable range are ignored
    fn set_frequency(&mut self, hz: u32) {
        if let Some(timing) = calc_pwm_timing(hz) {
            self.timing = timing;
            self.apply();
        }
    }

    fn set_duty_permille(&mut self, duty: u16) {
        self.duty = duty.min(DUTY_MAX_PERMILLE);
        self.apply();
    }

    fn duty_permille(&self) -> u16 {
        self.duty
    }
}
