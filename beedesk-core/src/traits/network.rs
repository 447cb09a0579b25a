//! Network and time sync boundary
//!
//! The Wi-Fi stack and NTP client live outside this workspace. Failures
//! are never fatal: callers log them and retry on the next interval.

use super::clock::DateTime;

/// Errors from the network collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetworkError {
    /// No link to the access point
    NotConnected,
    /// Association or authentication failed
    ConnectFailed,
    /// Time server did not answer
    SyncTimeout,
    /// No network hardware on this board
    Unsupported,
}

/// Station-mode network with time sync
pub trait Network {
    /// Whether the link is up
    fn is_connected(&self) -> bool;

    /// Start connecting to an access point
    fn connect(&mut self, ssid: &str, password: &str) -> Result<(), NetworkError>;

    /// Fetch the current UTC time
    fn sync_time(&mut self) -> Result<DateTime, NetworkError>;
}
