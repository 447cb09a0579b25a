//! Collaborator traits
//!
//! The core coordinates hardware it does not own. These traits describe the
//! narrow surface each collaborator must offer; drivers and the board HAL
//! implement them.

pub mod assets;
pub mod beeper;
pub mod clock;
pub mod memory;
pub mod network;
pub mod sensor;

pub use assets::{AssetError, AssetId, AssetReader, AssetStore, StaticAssets};
pub use beeper::Beeper;
pub use clock::{ClockError, DateTime, MicrosecondClock, MonotonicClock, RealTimeClock};
pub use memory::{MemoryStats, MemoryUsage};
pub use network::{Network, NetworkError};
pub use sensor::{ClimateReading, ClimateSensor, SensorError};
