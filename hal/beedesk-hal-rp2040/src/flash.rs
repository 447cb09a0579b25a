//! Asset partition in on-board flash
//!
//! The last 64KB of flash hold the font table and the raw background
//! images, written once at provisioning time. The partition starts with a
//! small header:
//!
//! ```text
//! offset 0   magic "BDAS"
//! offset 4   3 x (offset: u32 LE, len: u32 LE), indexed by AssetId
//! ```
//!
//! Entry offsets are relative to the partition start. A zero length marks
//! a missing asset.

use beedesk_core::traits::{AssetError, AssetId, AssetStore};
use embassy_rp::flash::{Blocking, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;

/// Flash size of the board
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;
/// Asset partition size
pub const ASSET_PARTITION_SIZE: usize = 64 * 1024;
pub const ASSET_PARTITION_START: usize = FLASH_SIZE - ASSET_PARTITION_SIZE;

pub const ASSET_MAGIC: [u8; 4] = *b"BDAS";
/// Number of asset slots in the header
pub const ASSET_SLOTS: usize = 3;
pub const HEADER_LEN: usize = 4 + ASSET_SLOTS * 8;

/// One header entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AssetEntry {
    pub offset: u32,
    pub len: u32,
}

/// Parse the partition header
pub fn parse_header(bytes: &[u8; HEADER_LEN]) -> Result<[AssetEntry; ASSET_SLOTS], AssetError> {
    if bytes[..4] != ASSET_MAGIC {
        return Err(AssetError::NotFound);
    }

    let mut table = [AssetEntry::default(); ASSET_SLOTS];
    for (i, entry) in table.iter_mut().enumerate() {
        let at = 4 + i * 8;
        let word = |o: usize| u32::from_le_bytes([bytes[o], bytes[o + 1], bytes[o + 2], bytes[o + 3]]);
        *entry = AssetEntry {
            offset: word(at),
            len: word(at + 4),
        };
        let end = u64::from(entry.offset) + u64::from(entry.len);
        if end > ASSET_PARTITION_SIZE as u64 {
            return Err(AssetError::Truncated);
        }
    }
    Ok(table)
}

/// Asset store reading straight from flash
pub struct FlashAssets<'d> {
    flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>,
    table: [AssetEntry; ASSET_SLOTS],
}

impl<'d> FlashAssets<'d> {
    /// Open the partition and read its header
    pub fn new(flash: Peri<'d, FLASH>) -> Result<Self, AssetError> {
        let mut flash = Flash::new_blocking(flash);
        let mut header = [0u8; HEADER_LEN];
        flash
            .blocking_read(ASSET_PARTITION_START as u32, &mut header)
            .map_err(|_| AssetError::Storage)?;
        let table = parse_header(&header)?;
        Ok(Self { flash, table })
    }

    fn entry(&self, id: AssetId) -> Result<AssetEntry, AssetError> {
        let entry = self.table[usize::from(id.as_u8())];
        if entry.len == 0 {
            return Err(AssetError::NotFound);
        }
        Ok(entry)
    }
}

impl AssetStore for FlashAssets<'_> {
    fn size(&self, id: AssetId) -> Result<usize, AssetError> {
        Ok(self.entry(id)?.len as usize)
    }

    fn read_at(&mut self, id: AssetId, offset: usize, buf: &mut [u8]) -> Result<usize, AssetError> {
        let entry = self.entry(id)?;
        let len = entry.len as usize;
        if offset >= len {
            return Ok(0);
        }
        let n = buf.len().min(len - offset);
        let addr = ASSET_PARTITION_START + entry.offset as usize + offset;
        self.flash
            .blocking_read(addr as u32, &mut buf[..n])
            .map_err(|_| AssetError::Storage)?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(entries: [(u32, u32); ASSET_SLOTS]) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[..4].copy_from_slice(&ASSET_MAGIC);
        for (i, (offset, len)) in entries.iter().enumerate() {
            out[4 + i * 8..8 + i * 8].copy_from_slice(&offset.to_le_bytes());
            out[8 + i * 8..12 + i * 8].copy_from_slice(&len.to_le_bytes());
        }
        out
    }

    #[test]
    fn test_parse_header() {
        let table = parse_header(&header([(28, 1520), (1548, 25600), (0, 0)])).unwrap();
        assert_eq!(table[1], AssetEntry { offset: 1548, len: 25600 });
        assert_eq!(table[2].len, 0);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = header([(0, 0); ASSET_SLOTS]);
        bytes[0] = b'X';
        assert_eq!(parse_header(&bytes), Err(AssetError::NotFound));
    }

    #[test]
    fn test_entry_past_partition() {
        let bytes = header([(60_000, 10_000), (0, 0), (0, 0)]);
        assert_eq!(parse_header(&bytes), Err(AssetError::Truncated));
    }
}
