//! Network stand-in for boards without a radio
//!
//! The RP2040 board carries no Wi-Fi chip. The Wi-Fi task still runs and
//! keeps the status LED on its "searching" blink whenever credentials are
//! configured.

use beedesk_core::traits::{DateTime, Network, NetworkError};

/// A network that never comes up
#[derive(Debug, Default)]
pub struct OfflineNetwork;

impl Network for OfflineNetwork {
    fn is_connected(&self) -> bool {
        false
    }

    fn connect(&mut self, _ssid: &str, _password: &str) -> Result<(), NetworkError> {
        Err(NetworkError::Unsupported)
    }

    fn sync_time(&mut self) -> Result<DateTime, NetworkError> {
        Err(NetworkError::NotConnected)
    }
}
