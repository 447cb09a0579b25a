//! Peripheral drivers
//!
//! Concrete implementations of the collaborator traits in `beedesk-core`,
//! written against the pin and PWM traits of `beedesk-hal`:
//!
//! - Piezo beeper on a PWM channel
//! - Polled button bank with edge detection
//! - Status LED blinker
//! - DHT11 temperature/humidity sensor

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod beeper;
pub mod button;
pub mod dht11;
pub mod status_led;

pub use beeper::PwmBeeper;
pub use button::{Button, ButtonBank, ButtonEvent};
pub use dht11::Dht11;
pub use status_led::StatusLed;
