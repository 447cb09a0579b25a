//! GPIO adapters
//!
//! Thin newtypes so embassy-rp pins can implement the `beedesk_hal` traits.

use beedesk_hal::{InputPin, IoPin, OutputPin};
use embassy_rp::gpio::{Flex, Input, Level, Output, Pull};

/// Push-pull output
pub struct RpOutput<'d>(pub Output<'d>);

impl OutputPin for RpOutput<'_> {
    fn set_high(&mut self) {
        self.0.set_high();
    }

    fn set_low(&mut self) {
        self.0.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.0.is_set_high()
    }
}

/// Digital input
pub struct RpInput<'d>(pub Input<'d>);

impl InputPin for RpInput<'_> {
    fn is_high(&self) -> bool {
        self.0.is_high()
    }
}

/// Open line that is either driven or released to its pull-up
pub struct RpFlex<'d> {
    pin: Flex<'d>,
}

impl<'d> RpFlex<'d> {
    /// Create a new line, released with the internal pull-up enabled
    pub fn new(mut pin: Flex<'d>) -> Self {
        pin.set_pull(Pull::Up);
        pin.set_as_input();
        Self { pin }
    }
}

impl OutputPin for RpFlex<'_> {
    fn set_high(&mut self) {
        self.pin.set_level(Level::High);
        self.pin.set_as_output();
    }

    fn set_low(&mut self) {
        self.pin.set_level(Level::Low);
        self.pin.set_as_output();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

impl InputPin for RpFlex<'_> {
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}

impl IoPin for RpFlex<'_> {
    fn release(&mut self) {
        self.pin.set_as_input();
    }
}
