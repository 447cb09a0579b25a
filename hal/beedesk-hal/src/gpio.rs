//! GPIO pin abstractions
//!
//! Digital pins on this device are infallible register writes, so the
//! traits return nothing. Active-low wiring (backlight, status LED) is
//! expressed with the [`ActiveLow`] adapter instead of being special-cased
//! in every driver.

/// Digital output pin
pub trait OutputPin {
    /// Drive the pin high (logic 1)
    fn set_high(&mut self);

    /// Drive the pin low (logic 0)
    fn set_low(&mut self);

    /// Drive the pin to a specific level
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently driven high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently driven low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }

    /// Invert the current output level
    fn toggle(&mut self) {
        let high = self.is_set_high();
        self.set_state(!high);
    }
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Pin that is switched between driving and sensing at runtime
///
/// Single-wire sensors (DHT11) pull the line low to request a reading and
/// then release it to listen for the reply.
pub trait IoPin: OutputPin + InputPin {
    /// Stop driving the line and let the pull-up take it high
    fn release(&mut self);
}

/// Output adapter for loads that are on when the pin is low
///
/// `set_high` on the adapter means "load on", which drives the wrapped pin
/// low.
#[derive(Debug)]
pub struct ActiveLow<P>(pub P);

impl<P> ActiveLow<P> {
    /// Consume the adapter and return the wrapped pin
    pub fn into_inner(self) -> P {
        self.0
    }
}

impl<P: OutputPin> OutputPin for ActiveLow<P> {
    fn set_high(&mut self) {
        self.0.set_low();
    }

    fn set_low(&mut self) {
        self.0.set_high();
    }

    fn is_set_high(&self) -> bool {
        self.0.is_set_low()
    }
}
