//! Display pipeline for the desk clock
//!
//! ```text
//!   Context strings ──► Font ──► Framebuffer ──flush──► St7735 ──► DisplayInterface ──► SPI
//!   Context strings ──► ScreenGroup ──► SegScreen ──► ColorRule ──► SmartLedsWrite
//! ```
//!
//! This crate provides:
//! - RGB565 colour packing and coordinate clamping
//! - The command/data transport seam (`DisplayInterface`) and an SPI binding
//! - The ST7735 controller protocol: init sequence, addressing window,
//!   chunked pixel streaming, primitive drawing
//! - A software framebuffer with glyph and raw-image compositing
//! - The 8x16 bitmap font lookup
//! - Seven-segment NeoPixel digits with pluggable colour rules

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod color;
pub mod controller;
pub mod font;
pub mod framebuffer;
pub mod interface;
pub mod segment;

pub use color::{Point, Rgb565};
pub use controller::St7735;
pub use font::{Font, FontError};
pub use framebuffer::{Framebuffer, FramebufferError};
pub use interface::{DisplayError, DisplayInterface, SpiInterface, Transfer};
pub use segment::{
    AnyColorRule, ColorRule, FixedColorRule, GradientColorRule, IndicatorScreen, ScreenGroup,
    SegScreen,
};
