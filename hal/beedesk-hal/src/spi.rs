//! SPI bus abstractions
//!
//! The TFT panel is a write-only SPI peripheral; chip-select and
//! data/command lines are plain GPIO handled by the transport above this
//! trait.

/// SPI bus master (transmit only)
pub trait SpiBus {
    /// Error type for SPI operations
    type Error;

    /// Clock out `data`, blocking until it has been queued
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Block until every queued byte has left the shift register
    ///
    /// Chip-select must not be released before this returns.
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// SPI configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Combined clock polarity and phase
    pub mode: Mode,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            frequency: 20_000_000, // 20 MHz, the panel's rated write clock
            mode: Mode::Mode0,
        }
    }
}

/// SPI clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// SPI clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Data captured on first clock transition (CPHA=0)
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}

/// SPI mode (combined polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl Mode {
    /// Clock polarity of this mode
    pub fn polarity(self) -> Polarity {
        match self {
            Mode::Mode0 | Mode::Mode1 => Polarity::IdleLow,
            Mode::Mode2 | Mode::Mode3 => Polarity::IdleHigh,
        }
    }

    /// Clock phase of this mode
    pub fn phase(self) -> Phase {
        match self {
            Mode::Mode0 | Mode::Mode2 => Phase::CaptureOnFirstTransition,
            Mode::Mode1 | Mode::Mode3 => Phase::CaptureOnSecondTransition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_split() {
        assert_eq!(Mode::Mode0.polarity(), Polarity::IdleLow);
        assert_eq!(Mode::Mode0.phase(), Phase::CaptureOnFirstTransition);
        assert_eq!(Mode::Mode3.polarity(), Polarity::IdleHigh);
        assert_eq!(Mode::Mode3.phase(), Phase::CaptureOnSecondTransition);
    }

    #[test]
    fn test_default_config() {
        let config = SpiConfig::default();
        assert_eq!(config.frequency, 20_000_000);
        assert_eq!(config.mode, Mode::Mode0);
    }
}
