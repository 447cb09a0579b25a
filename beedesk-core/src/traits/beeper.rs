//! Piezo beeper trait

/// Tone generator
pub trait Beeper {
    /// Start sounding at the current frequency
    fn enable(&mut self);

    /// Silence the beeper
    fn disable(&mut self);

    /// Change the tone frequency in Hz
    fn set_frequency(&mut self, hz: u32);

    /// Whether the beeper is sounding
    fn is_enabled(&self) -> bool;
}
