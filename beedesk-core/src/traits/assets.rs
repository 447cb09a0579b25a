//! Read-only asset storage
//!
//! The font table and the background images are produced offline and
//! stored as raw byte blobs. Stores expose random-access reads; tasks
//! consume them through the sequential [`AssetReader`].

/// Asset identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AssetId {
    /// 8x16 glyph table, 16 bytes per character
    Font = 0,
    /// Background image for the clock screen
    ClockBackground = 1,
    /// Background image for the temperature/humidity screen
    ClimateBackground = 2,
}

impl AssetId {
    /// Get the id as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create an id from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(AssetId::Font),
            1 => Some(AssetId::ClockBackground),
            2 => Some(AssetId::ClimateBackground),
            _ => None,
        }
    }
}

/// Errors from asset reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AssetError {
    /// No asset stored under this id
    NotFound,
    /// Underlying storage read failed
    Storage,
    /// Asset is shorter than its format requires
    Truncated,
}

impl embedded_io::Error for AssetError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            AssetError::NotFound => embedded_io::ErrorKind::NotFound,
            AssetError::Storage => embedded_io::ErrorKind::Other,
            AssetError::Truncated => embedded_io::ErrorKind::InvalidData,
        }
    }
}

/// Random-access asset storage
pub trait AssetStore {
    /// Size of an asset in bytes
    fn size(&self, id: AssetId) -> Result<usize, AssetError>;

    /// Read from `offset` into `buf`, returning the number of bytes read
    ///
    /// Reads past the end return 0.
    fn read_at(&mut self, id: AssetId, offset: usize, buf: &mut [u8])
        -> Result<usize, AssetError>;

    /// Open an asset for sequential reading
    fn open(&mut self, id: AssetId) -> Result<AssetReader<'_, Self>, AssetError>
    where
        Self: Sized,
    {
        let len = self.size(id)?;
        Ok(AssetReader {
            store: self,
            id,
            pos: 0,
            len,
        })
    }
}

/// Sequential reader over one asset
pub struct AssetReader<'s, S: AssetStore> {
    store: &'s mut S,
    id: AssetId,
    pos: usize,
    len: usize,
}

impl<S: AssetStore> AssetReader<'_, S> {
    /// Bytes not yet read
    pub fn remaining(&self) -> usize {
        self.len - self.pos
    }
}

impl<S: AssetStore> embedded_io::ErrorType for AssetReader<'_, S> {
    type Error = AssetError;
}

impl<S: AssetStore> embedded_io::Read for AssetReader<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let want = buf.len().min(self.remaining());
        if want == 0 {
            return Ok(0);
        }
        let n = self.store.read_at(self.id, self.pos, &mut buf[..want])?;
        self.pos += n;
        Ok(n)
    }
}

/// Asset store over in-memory slices
///
/// Used by tests and by boards that embed assets in the program image.
pub struct StaticAssets<'a> {
    pub font: &'a [u8],
    pub clock_background: &'a [u8],
    pub climate_background: &'a [u8],
}

impl<'a> StaticAssets<'a> {
    fn blob(&self, id: AssetId) -> &'a [u8] {
        match id {
            AssetId::Font => self.font,
            AssetId::ClockBackground => self.clock_background,
            AssetId::ClimateBackground => self.climate_background,
        }
    }
}

impl AssetStore for StaticAssets<'_> {
    fn size(&self, id: AssetId) -> Result<usize, AssetError> {
        let blob = self.blob(id);
        if blob.is_empty() {
            Err(AssetError::NotFound)
        } else {
            Ok(blob.len())
        }
    }

    fn read_at(&mut self, id: AssetId, offset: usize, buf: &mut [u8]) -> Result<usize, AssetError> {
        let blob = self.blob(id);
        let Some(src) = blob.get(offset..) else {
            return Ok(0);
        };
        let n = src.len().min(buf.len());
        buf[..n].copy_from_slice(&src[..n]);
        Ok(n)
    }
}
