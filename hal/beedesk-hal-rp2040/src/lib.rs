//! RP2040-specific HAL for the desk clock firmware
//!
//! This crate binds the board-agnostic traits to embassy-rp:
//!
//! - GPIO newtypes implementing `beedesk_hal` pin traits
//! - Blocking SPI for the TFT transport
//! - PWM slice driving the beeper, with divider/top calculation
//! - PIO WS2812 strips exposed as blocking `SmartLedsWrite`
//! - On-chip RTC and embassy-time as the calendar and monotonic clocks
//! - Asset partition in flash (font, background images)
//! - The board pin map

#![no_std]

pub mod board;
pub mod flash;
pub mod gpio;
pub mod pwm;
pub mod rtc;
pub mod spi;
pub mod ws2812;

pub use flash::FlashAssets;
pub use gpio::{RpFlex, RpInput, RpOutput};
pub use pwm::RpPwm;
pub use rtc::{RpRtc, UptimeClock};
pub use spi::RpSpi;
pub use ws2812::BlockingWs2812;
