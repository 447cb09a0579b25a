//! Piezo beeper on a PWM channel
//!
//! The tone is the PWM frequency and the loudness is the duty cycle while
//! sounding. Silence is duty 0, so the frequency survives enable/disable.

use beedesk_core::traits::Beeper;
use beedesk_hal::pwm::DUTY_MAX_PERMILLE;
use beedesk_hal::PwmOutput;

/// Duty used while sounding unless configured otherwise
pub const DEFAULT_VOLUME_PERMILLE: u16 = 100;

/// PWM-driven piezo
pub struct PwmBeeper<P> {
    pwm: P,
    volume: u16,
    enabled: bool,
}

impl<P: PwmOutput> PwmBeeper<P> {
    /// Create a new beeper; the output starts silent
    pub fn new(mut pwm: P, volume_permille: u16) -> Self {
        pwm.set_duty_permille(0);
        Self {
            pwm,
            volume: volume_permille.min(DUTY_MAX_PERMILLE),
            enabled: false,
        }
    }

    /// Duty while sounding, in permille
    pub fn volume(&self) -> u16 {
        self.volume
    }

    /// Change the loudness; applies immediately if sounding
    pub fn set_volume(&mut self, volume_permille: u16) {
        self.volume = volume_permille.min(DUTY_MAX_PERMILLE);
        if self.enabled {
            self.pwm.set_duty_permille(self.volume);
        }
    }

    pub fn release(self) -> P {
        self.pwm
    }
}

impl<P: PwmOutput> Beeper for PwmBeeper<P> {
    fn enable(&mut self) {
        self.pwm.set_duty_permille(self.volume);
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.pwm.set_duty_permille(0);
        self.enabled = false;
    }

    fn set_frequency(&mut self, hz: u32) {
        self.pwm.set_frequency(hz);
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockPwm {
        hz: u32,
        duty: u16,
    }

    impl PwmOutput for MockPwm {
        fn set_frequency(&mut self, hz: u32) {
            self.hz = hz;
        }

        fn set_duty_permille(&mut self, duty: u16) {
            self.duty = duty.min(DUTY_MAX_PERMILLE);
        }

        fn duty_permille(&self) -> u16 {
            self.duty
        }
    }

    #[test]
    fn test_starts_silent() {
        let pwm = MockPwm {
            hz: 0,
            duty: 500,
        };
        let beeper = PwmBeeper::new(pwm, DEFAULT_VOLUME_PERMILLE);
        assert!(!beeper.is_enabled());
        assert_eq!(beeper.release().duty, 0);
    }

    #[test]
    fn test_enable_uses_volume() {
        let mut beeper = PwmBeeper::new(MockPwm::default(), 250);
        beeper.set_frequency(2500);
        beeper.enable();
        assert!(beeper.is_enabled());

        beeper.set_volume(400);
        beeper.disable();
        beeper.enable();

        let pwm = beeper.release();
        assert_eq!(pwm.hz, 2500);
        assert_eq!(pwm.duty, 400);
    }

    #[test]
    fn test_disable_keeps_frequency() {
        let mut beeper = PwmBeeper::new(MockPwm::default(), 100);
        beeper.set_frequency(3000);
        beeper.enable();
        beeper.disable();

        let pwm = beeper.release();
        assert_eq!(pwm.duty, 0);
        assert_eq!(pwm.hz, 3000);
    }

    #[test]
    fn test_volume_clamped() {
        let beeper = PwmBeeper::new(MockPwm::default(), 5000);
        assert_eq!(beeper.volume(), DUTY_MAX_PERMILLE);
    }
}
