//! Device configuration
//!
//! Types with stock defaults plus a line-oriented reader for the
//! `device.toml` text embedded in the firmware image.

pub mod toml;
pub mod types;

pub use self::toml::{parse_config, ConfigError, ConfigErrorKind};
pub use types::*;
