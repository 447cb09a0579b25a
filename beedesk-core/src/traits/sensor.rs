//! Temperature/humidity sensor trait

/// Errors from a climate measurement
///
/// All of these are transient: the caller skips the interval and retries on
/// the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// The sensor did not answer in time
    Timeout,
    /// Received frame failed its checksum
    Checksum,
    /// Measurement requested too soon after the previous one
    NotReady,
}

/// One temperature/humidity sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClimateReading {
    /// Temperature in whole degrees Celsius
    pub temperature_c: i16,
    /// Relative humidity in percent
    pub humidity_pct: u8,
}

/// Combined temperature and humidity sensor
///
/// `measure` blocks for the whole transaction.
pub trait ClimateSensor {
    fn measure(&mut self) -> Result<ClimateReading, SensorError>;
}
