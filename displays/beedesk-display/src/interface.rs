//! Command/data transport to the panel controller
//!
//! The controller listens on a write-only byte bus with two side lines:
//! chip select frames a transfer and data/command select tells the
//! controller how to interpret the bytes.

use beedesk_hal::{OutputPin, SpiBus};

/// Display errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// The bus rejected a write
    Communication,
    /// A buffer does not match the region it is written to
    BufferSize,
}

/// Kind of bytes in a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transfer {
    Command,
    Data,
}

/// Framed byte transport
///
/// A transfer is opened with `begin`, carries any number of `send` calls
/// and is closed with `end`. Pixel streams use one transfer for many
/// chunks.
pub trait DisplayInterface {
    /// Select the controller for a transfer of the given kind
    fn begin(&mut self, kind: Transfer) -> Result<(), DisplayError>;

    /// Send bytes within the open transfer
    fn send(&mut self, bytes: &[u8]) -> Result<(), DisplayError>;

    /// Close the transfer
    fn end(&mut self) -> Result<(), DisplayError>;

    /// Send a single command byte
    fn write_command(&mut self, cmd: u8) -> Result<(), DisplayError> {
        self.begin(Transfer::Command)?;
        self.send(&[cmd])?;
        self.end()
    }

    /// Send one block of parameter or pixel bytes
    fn write_data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        self.begin(Transfer::Data)?;
        self.send(data)?;
        self.end()
    }
}

/// SPI transport with DC and CS lines
pub struct SpiInterface<SPI, DC, CS> {
    spi: SPI,
    dc: DC,
    cs: CS,
}

impl<SPI, DC, CS> SpiInterface<SPI, DC, CS>
where
    SPI: SpiBus,
    DC: OutputPin,
    CS: OutputPin,
{
    /// Create a new interface; chip select starts deasserted
    pub fn new(spi: SPI, dc: DC, mut cs: CS) -> Self {
        cs.set_high();
        Self { spi, dc, cs }
    }

    /// Release the bus and pins
    pub fn release(self) -> (SPI, DC, CS) {
        (self.spi, self.dc, self.cs)
    }
}

impl<SPI, DC, CS> DisplayInterface for SpiInterface<SPI, DC, CS>
where
    SPI: SpiBus,
    DC: OutputPin,
    CS: OutputPin,
{
    fn begin(&mut self, kind: Transfer) -> Result<(), DisplayError> {
        self.dc.set_state(kind == Transfer::Data);
        self.cs.set_low();
        Ok(())
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.spi.write(bytes).map_err(|_| DisplayError::Communication)
    }

    fn end(&mut self) -> Result<(), DisplayError> {
        // Drain the FIFO before releasing chip select
        let result = self.spi.flush().map_err(|_| DisplayError::Communication);
        self.cs.set_high();
        result
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Recording transport for controller and framebuffer tests

    use std::vec::Vec;

    use super::*;

    /// One observed bus event
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Event {
        Begin(Transfer),
        Send(Vec<u8>),
        End,
    }

    #[derive(Default)]
    pub struct RecordingInterface {
        pub events: Vec<Event>,
    }

    impl RecordingInterface {
        /// Commands in the order sent
        pub fn commands(&self) -> Vec<u8> {
            let mut out = Vec::new();
            let mut in_command = false;
            for e in &self.events {
                match e {
                    Event::Begin(kind) => in_command = *kind == Transfer::Command,
                    Event::Send(bytes) if in_command => out.extend_from_slice(bytes),
                    _ => {}
                }
            }
            out
        }

        /// Each command with the data bytes that followed it
        pub fn transactions(&self) -> Vec<(u8, Vec<u8>)> {
            let mut out: Vec<(u8, Vec<u8>)> = Vec::new();
            let mut in_command = false;
            for e in &self.events {
                match e {
                    Event::Begin(kind) => in_command = *kind == Transfer::Command,
                    Event::Send(bytes) if in_command => {
                        for &b in bytes {
                            out.push((b, Vec::new()));
                        }
                    }
                    Event::Send(bytes) => {
                        if let Some(last) = out.last_mut() {
                            last.1.extend_from_slice(bytes);
                        }
                    }
                    Event::End => {}
                }
            }
            out
        }

        /// Sizes of the data sends after the last command
        pub fn last_data_chunks(&self) -> Vec<usize> {
            let mut out = Vec::new();
            let mut in_data = false;
            for e in &self.events {
                match e {
                    Event::Begin(Transfer::Command) => {
                        out.clear();
                        in_data = false;
                    }
                    Event::Begin(Transfer::Data) => in_data = true,
                    Event::Send(bytes) if in_data => out.push(bytes.len()),
                    _ => {}
                }
            }
            out
        }

        pub fn clear(&mut self) {
            self.events.clear();
        }
    }

    impl DisplayInterface for RecordingInterface {
        fn begin(&mut self, kind: Transfer) -> Result<(), DisplayError> {
            self.events.push(Event::Begin(kind));
            Ok(())
        }

        fn send(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
            self.events.push(Event::Send(bytes.to_vec()));
            Ok(())
        }

        fn end(&mut self) -> Result<(), DisplayError> {
            self.events.push(Event::End);
            Ok(())
        }
    }
}
