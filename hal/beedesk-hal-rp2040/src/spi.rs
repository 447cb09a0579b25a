//! Blocking SPI master for the TFT

use beedesk_hal::spi::{Phase as HalPhase, Polarity as HalPolarity, SpiConfig};
use beedesk_hal::SpiBus;
use embassy_rp::spi::{self, Blocking, Instance, Phase, Polarity, Spi};

/// Translate the board-agnostic SPI settings
pub fn config(cfg: &SpiConfig) -> spi::Config {
    let mut out = spi::Config::default();
    out.frequency = cfg.frequency;
    out.polarity = match cfg.mode.polarity() {
        HalPolarity::IdleLow => Polarity::IdleLow,
        HalPolarity::IdleHigh => Polarity::IdleHigh,
    };
    out.phase = match cfg.mode.phase() {
        HalPhase::CaptureOnFirstTransition => Phase::CaptureOnFirstTransition,
        HalPhase::CaptureOnSecondTransition => Phase::CaptureOnSecondTransition,
    };
    out
}

/// Transmit-only blocking SPI
pub struct RpSpi<'d, T: Instance> {
    spi: Spi<'d, T, Blocking>,
}

impl<'d, T: Instance> RpSpi<'d, T> {
    pub fn new(spi: Spi<'d, T, Blocking>) -> Self {
        Self { spi }
    }
}

impl<T: Instance> SpiBus for RpSpi<'_, T> {
    type Error = spi::Error;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.spi.blocking_write(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.spi.flush()
    }
}
