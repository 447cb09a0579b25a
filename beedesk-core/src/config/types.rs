//! Configuration type definitions
//!
//! Every section has a `Default` matching the stock board, so an empty
//! config file yields a working device.

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum SSID length (802.11 limit)
pub const MAX_SSID_LEN: usize = 32;

/// Maximum WPA passphrase length
pub const MAX_PASSWORD_LEN: usize = 64;

/// Scheduler timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KernelConfig {
    /// Periodic scheduler tick period in milliseconds
    pub tick_period_ms: u32,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 500,
        }
    }
}

/// TFT panel geometry and behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// Visible width in pixels
    pub width: u16,
    /// Visible height in pixels
    pub height: u16,
    /// Controller column of the first visible column
    pub col_offset: u16,
    /// Controller row of the first visible row
    pub row_offset: u16,
    /// Top-left corner the framebuffer is flushed to
    pub window_x: u16,
    pub window_y: u16,
    /// Backlight switches off after this long without a wake event
    pub backlight_timeout_ms: u32,
    /// Invert colours after initialization
    pub inverted: bool,
    /// MADCTL rotation index (0-3); `None` keeps the init-sequence default
    pub rotation: Option<u8>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 160,
            col_offset: 26,
            row_offset: 1,
            window_x: 0,
            window_y: 0,
            backlight_timeout_ms: 20_000,
            inverted: true,
            rotation: None,
        }
    }
}

/// Temperature/humidity polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorConfig {
    /// Minimum time between measurements in milliseconds
    pub poll_interval_ms: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10_000,
        }
    }
}

/// Station credentials and time sync
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WifiConfig {
    pub ssid: String<MAX_SSID_LEN>,
    pub password: String<MAX_PASSWORD_LEN>,
    /// Time between NTP syncs once connected, in milliseconds
    pub sync_interval_ms: u32,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            password: String::new(),
            sync_interval_ms: 3_600_000,
        }
    }
}

impl WifiConfig {
    /// Whether credentials were provided
    pub fn is_configured(&self) -> bool {
        !self.ssid.is_empty()
    }
}

/// Piezo beeper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BeeperConfig {
    /// Duty cycle while sounding, in permille
    pub volume_permille: u16,
}

impl Default for BeeperConfig {
    fn default() -> Self {
        Self {
            volume_permille: 100,
        }
    }
}

/// Status LED blink rates, in scheduler ticks per toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StatusLedConfig {
    pub connected_interval: u8,
    pub disconnected_interval: u8,
}

impl Default for StatusLedConfig {
    fn default() -> Self {
        Self {
            connected_interval: 5,
            disconnected_interval: 1,
        }
    }
}

/// Complete device configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceConfig {
    pub kernel: KernelConfig,
    pub display: DisplayConfig,
    pub sensor: SensorConfig,
    pub wifi: WifiConfig,
    pub beeper: BeeperConfig,
    pub status_led: StatusLedConfig,
}
