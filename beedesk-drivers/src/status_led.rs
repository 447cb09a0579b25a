//! Status LED blinker
//!
//! Called once per periodic tick. The LED toggles every `interval` calls,
//! so a slow blink means "connected" and a fast one means "searching". The
//! always-on latch overrides blinking and keeps the LED lit.
//!
//! An LED wired active low goes through [`beedesk_hal::ActiveLow`] so
//! `set_high` still means lit.

use beedesk_hal::OutputPin;

/// Blinking status LED
pub struct StatusLed<P> {
    pin: P,
    interval: u8,
    count: u8,
    lit: bool,
    always_on: bool,
}

impl<P: OutputPin> StatusLed<P> {
    /// Create a new blinker; the LED starts off
    pub fn new(pin: P) -> Self {
        let mut led = Self {
            pin,
            interval: 1,
            count: 0,
            lit: false,
            always_on: false,
        };
        led.off();
        led
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    pub fn interval(&self) -> u8 {
        self.interval
    }

    pub fn on(&mut self) {
        self.lit = true;
        self.pin.set_high();
    }

    /// Turn off, unless latched on
    pub fn off(&mut self) {
        if self.always_on {
            self.on();
            return;
        }
        self.lit = false;
        self.pin.set_low();
    }

    /// Ticks between toggles; zero is treated as one
    pub fn set_blink_interval(&mut self, interval: u8) {
        self.interval = interval.max(1);
    }

    pub fn set_always_on(&mut self, always_on: bool) {
        self.always_on = always_on;
    }

    /// Advance one tick
    pub fn blink(&mut self) {
        self.count = self.count.saturating_add(1);
        if self.count < self.interval {
            return;
        }
        self.count = 0;
        if self.lit {
            self.off();
        } else {
            self.on();
        }
    }

    pub fn release(self) -> P {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use beedesk_hal::ActiveLow;

    use super::*;

    #[derive(Default)]
    struct MockPin {
        high: bool,
        toggles: u32,
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            self.high = true;
            self.toggles += 1;
        }

        fn set_low(&mut self) {
            self.high = false;
            self.toggles += 1;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_active_low_starts_dark() {
        let led = StatusLed::new(ActiveLow(MockPin::default()));
        assert!(!led.is_lit());
        // Off drives the wire high
        assert!(led.release().into_inner().high);
    }

    #[test]
    fn test_blink_every_tick() {
        let mut led = StatusLed::new(MockPin::default());
        led.blink();
        assert!(led.is_lit());
        led.blink();
        assert!(!led.is_lit());
    }

    #[test]
    fn test_slow_blink() {
        let mut led = StatusLed::new(MockPin::default());
        led.set_blink_interval(5);

        for _ in 0..4 {
            led.blink();
            assert!(!led.is_lit());
        }
        led.blink();
        assert!(led.is_lit());
        for _ in 0..5 {
            led.blink();
        }
        assert!(!led.is_lit());
    }

    #[test]
    fn test_always_on_latch() {
        let mut led = StatusLed::new(MockPin::default());
        led.set_always_on(true);
        for _ in 0..6 {
            led.blink();
            assert!(led.is_lit());
        }

        led.set_always_on(false);
        led.blink();
        assert!(!led.is_lit());
    }

    #[test]
    fn test_zero_interval() {
        let mut led = StatusLed::new(MockPin::default());
        led.set_blink_interval(0);
        assert_eq!(led.interval(), 1);
        led.blink();
        assert!(led.is_lit());
    }
}
