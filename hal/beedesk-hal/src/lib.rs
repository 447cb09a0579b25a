//! Beedesk Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the desk firmware is
//! written against. Chip-specific crates implement them, and host tests
//! implement them with recording mocks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Drivers, display pipeline, tasks       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  beedesk-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ beedesk-hal-  │       │  host mocks   │
//! │    rp2040     │       │  (cfg(test))  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O (reset, DC, CS,
//!   backlight, buttons, wake pin)
//! - [`spi::SpiBus`] - Write-only SPI master used by the TFT transport
//! - [`pwm::PwmOutput`] - PWM channel driving the piezo beeper

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod pwm;
pub mod spi;

// Re-export key traits at crate root for convenience
pub use gpio::{ActiveLow, InputPin, IoPin, OutputPin};
pub use pwm::PwmOutput;
pub use spi::SpiBus;
