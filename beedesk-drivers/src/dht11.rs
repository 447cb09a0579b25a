//! DHT11 temperature/humidity sensor
//!
//! Single-wire protocol, bit-banged by polling the line:
//!
//! 1. Host holds the line low for 18 ms, then releases it
//! 2. Sensor answers 80 us low, 80 us high
//! 3. 40 data bits, each 50 us low followed by a high pulse of ~26 us (0)
//!    or ~70 us (1)
//! 4. Bytes are humidity, humidity decimal, temperature, temperature
//!    decimal and a checksum of the first four
//!
//! Pulse widths are timestamps from a [`MicrosecondClock`], so the poll
//! loop's own cost does not skew them. `measure` blocks for roughly 25 ms.

use beedesk_core::traits::{ClimateReading, ClimateSensor, MicrosecondClock, SensorError};
use beedesk_hal::IoPin;
use embedded_hal::delay::DelayNs;

/// Start signal hold time
const START_LOW_MS: u32 = 18;

/// Longest any single phase of the reply may take
const PHASE_TIMEOUT_US: u64 = 100;

/// High pulses longer than this are ones
const ONE_THRESHOLD_US: u64 = 40;

/// DHT11 on an open-drain pin
pub struct Dht11<P, D, T> {
    pin: P,
    delay: D,
    timer: T,
}

impl<P: IoPin, D: DelayNs, T: MicrosecondClock> Dht11<P, D, T> {
    /// Create a new driver; the line is released to idle high
    pub fn new(mut pin: P, delay: D, timer: T) -> Self {
        pin.release();
        Self { pin, delay, timer }
    }

    pub fn release(self) -> (P, D, T) {
        (self.pin, self.delay, self.timer)
    }

    /// Wait until the line reads `high`; returns the microseconds waited
    fn wait_for(&mut self, high: bool) -> Result<u64, SensorError> {
        let start = self.timer.now_us();
        loop {
            let level = self.pin.is_high();
            let waited = self.timer.now_us().saturating_sub(start);
            if level == high {
                return Ok(waited);
            }
            if waited >= PHASE_TIMEOUT_US {
                return Err(SensorError::Timeout);
            }
        }
    }

    fn read_frame(&mut self) -> Result<[u8; 5], SensorError> {
        self.pin.set_low();
        self.delay.delay_ms(START_LOW_MS);
        self.pin.release();

        // Response: line drops, rises, drops again before the first bit
        self.wait_for(false)?;
        self.wait_for(true)?;
        self.wait_for(false)?;

        let mut frame = [0u8; 5];
        for bit in 0..40 {
            self.wait_for(true)?;
            let high_us = self.wait_for(false)?;
            if high_us > ONE_THRESHOLD_US {
                frame[bit / 8] |= 0x80 >> (bit % 8);
            }
        }
        Ok(frame)
    }
}

/// Check and decode a received frame
pub fn decode(frame: [u8; 5]) -> Result<ClimateReading, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::Checksum);
    }

    // Newer parts flag sub-zero readings in the decimal byte
    let magnitude = i16::from(frame[2]);
    let temperature_c = if frame[3] & 0x80 != 0 { -magnitude } else { magnitude };

    Ok(ClimateReading {
        temperature_c,
        humidity_pct: frame[0],
    })
}

impl<P: IoPin, D: DelayNs, T: MicrosecondClock> ClimateSensor for Dht11<P, D, T> {
    fn measure(&mut self) -> Result<ClimateReading, SensorError> {
        let result = self.read_frame();
        self.pin.release();
        let reading = decode(result?)?;
        trace!(
            "dht11: {} C {} %",
            reading.temperature_c,
            reading.humidity_pct
        );
        Ok(reading)
    }
}
