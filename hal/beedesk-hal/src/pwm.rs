//! PWM output abstraction
//!
//! Duty cycle is expressed in permille so callers do not need to know the
//! counter resolution of the underlying timer.

/// Maximum duty value (100%)
pub const DUTY_MAX_PERMILLE: u16 = 1000;

/// A single PWM channel
pub trait PwmOutput {
    /// Set the output frequency in Hz
    fn set_frequency(&mut self, hz: u32);

    /// Set the duty cycle in permille (0 = always low, 1000 = always high)
    ///
    /// Values above [`DUTY_MAX_PERMILLE`] are clamped by implementations.
    fn set_duty_permille(&mut self, duty: u16);

    /// Current duty cycle in permille
    fn duty_permille(&self) -> u16;
}
