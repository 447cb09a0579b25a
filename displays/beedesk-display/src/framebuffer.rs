//! Software framebuffer
//!
//! A borrowed RGB565 pixel buffer (big-endian, row-major) that glyphs and
//! raw images are composited into before the whole buffer, or a band of
//! rows, is written to the panel in one transfer.
//!
//! There is no double buffering. A flush streams straight from the buffer.

use beedesk_hal::OutputPin;
use embedded_hal::delay::DelayNs;
use embedded_io::Read;

use crate::color::{Point, Rgb565};
use crate::controller::St7735;
use crate::font::{Font, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::interface::{DisplayError, DisplayInterface};

/// Widest image row the blitters accept, in pixels
pub const MAX_ROW_PIXELS: usize = 256;

/// Framebuffer errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FramebufferError {
    /// Buffer length is not `width * height * 2`
    BufferSize,
    /// Image row wider than the framebuffer or the row scratch
    RowTooWide,
    /// The image source failed
    Read,
}

/// RGB565 framebuffer over a caller-provided buffer
pub struct Framebuffer<'b> {
    buf: &'b mut [u8],
    width: u16,
    height: u16,
    dirty: bool,
}

impl<'b> Framebuffer<'b> {
    /// Create a new framebuffer; `buf` must hold exactly `width * height` pixels
    pub fn new(buf: &'b mut [u8], width: u16, height: u16) -> Result<Self, FramebufferError> {
        if buf.len() != usize::from(width) * usize::from(height) * 2 {
            return Err(FramebufferError::BufferSize);
        }
        Ok(Self {
            buf,
            width,
            height,
            dirty: false,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Raw pixel bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.buf
    }

    /// Whether anything was drawn since the last flush
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= i32::from(self.width) || y >= i32::from(self.height) {
            return None;
        }
        Some((y as usize * usize::from(self.width) + x as usize) * 2)
    }

    /// Fill every pixel
    pub fn fill(&mut self, color: Rgb565) {
        let bytes = color.to_be_bytes();
        for px in self.buf.chunks_exact_mut(2) {
            px.copy_from_slice(&bytes);
        }
        self.dirty = true;
    }

    /// Set one pixel; points outside the buffer are ignored
    pub fn pixel(&mut self, x: i32, y: i32, color: Rgb565) {
        if let Some(i) = self.offset(x, y) {
            self.buf[i..i + 2].copy_from_slice(&color.to_be_bytes());
            self.dirty = true;
        }
    }

    /// Read one pixel back
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Rgb565> {
        self.offset(x, y)
            .map(|i| Rgb565::from_be_bytes([self.buf[i], self.buf[i + 1]]))
    }

    /// Draw a glyph rotated a quarter turn
    ///
    /// `glyph` rows are stored bottom first with the MSB as bit 0. Glyph
    /// row `r` (counted from the top) lands in buffer column `x + r` and bit
    /// `i` lands in buffer row `y + i`. Clear bits get `background` when one
    /// is given and are left alone otherwise.
    pub fn blit_glyph(
        &mut self,
        x: i32,
        y: i32,
        glyph: &[u8],
        foreground: Rgb565,
        background: Option<Rgb565>,
    ) {
        let rows = glyph.len();
        for bit in 0..GLYPH_WIDTH {
            let mask = 0x80u8 >> bit;
            for r in 0..rows {
                let bits = glyph[rows - r - 1];
                let (px, py) = (x + r as i32, y + bit as i32);
                if bits & mask != 0 {
                    self.pixel(px, py, foreground);
                } else if let Some(bg) = background {
                    self.pixel(px, py, bg);
                }
            }
        }
    }

    /// Write a string reading top to bottom, one rotated glyph per 8 rows
    pub fn text_vertical(
        &mut self,
        font: &Font<'_>,
        x: i32,
        y: i32,
        text: &str,
        foreground: Rgb565,
        background: Option<Rgb565>,
    ) {
        let mut y = y;
        for c in text.chars() {
            self.blit_glyph(x, y, font.lookup(c), foreground, background);
            y += GLYPH_WIDTH as i32;
        }
    }

    /// Write an upright string left to right, 8x16 per character
    pub fn text_horizontal(
        &mut self,
        font: &Font<'_>,
        x: i32,
        y: i32,
        text: &str,
        foreground: Rgb565,
        background: Option<Rgb565>,
    ) {
        let mut x = x;
        for c in text.chars() {
            let glyph = font.lookup(c);
            for row in 0..GLYPH_HEIGHT {
                let bits = glyph[GLYPH_HEIGHT - row - 1];
                for bit in 0..GLYPH_WIDTH {
                    let (px, py) = (x + bit as i32, y + row as i32);
                    if bits & (0x80 >> bit) != 0 {
                        self.pixel(px, py, foreground);
                    } else if let Some(bg) = background {
                        self.pixel(px, py, bg);
                    }
                }
            }
            x += GLYPH_WIDTH as i32;
        }
    }

    /// Blit a little-endian raw image with its top-left corner at (x, y)
    ///
    /// Rows of `width` pixels are read until the source runs short; a
    /// partial row is dropped. Pixels outside the buffer are clipped.
    /// Returns the number of rows drawn.
    pub fn blit_image_at<R: Read>(
        &mut self,
        reader: &mut R,
        x: i32,
        y: i32,
        width: u16,
    ) -> Result<usize, FramebufferError> {
        if usize::from(width) > MAX_ROW_PIXELS {
            return Err(FramebufferError::RowTooWide);
        }
        if width == 0 {
            return Ok(0);
        }

        let row_bytes = usize::from(width) * 2;

        let mut scratch = [0u8; MAX_ROW_PIXELS * 2];
        let row = &mut scratch[..row_bytes];
        let mut rows = 0;

        while read_full(reader, row)? == row_bytes {
            for (i, word) in row.chunks_exact(2).enumerate() {
                let color = Rgb565(u16::from_le_bytes([word[0], word[1]]));
                self.pixel(x + i as i32, y + rows as i32, color);
            }
            rows += 1;
        }

        Ok(rows)
    }

    /// Copy big-endian rows of `width` pixels into the buffer from the top
    ///
    /// Stops at the first short read or when the buffer is full. Returns the
    /// number of rows copied.
    pub fn blit_image_stream<R: Read>(
        &mut self,
        reader: &mut R,
        width: u16,
    ) -> Result<usize, FramebufferError> {
        if width > self.width || usize::from(width) > MAX_ROW_PIXELS {
            return Err(FramebufferError::RowTooWide);
        }
        if width == 0 {
            return Ok(0);
        }

        let row_bytes = usize::from(width) * 2;
        let stride = usize::from(self.width) * 2;
        let mut scratch = [0u8; MAX_ROW_PIXELS * 2];
        let row = &mut scratch[..row_bytes];
        let mut rows = 0;

        while rows < usize::from(self.height) && read_full(reader, row)? == row_bytes {
            let start = rows * stride;
            self.buf[start..start + row_bytes].copy_from_slice(row);
            rows += 1;
        }

        if rows > 0 {
            self.dirty = true;
        }
        Ok(rows)
    }

    /// Write the whole buffer to the panel with its corner at `origin`
    ///
    /// Pixels that fall off the panel are clipped.
    pub fn flush<DI, RST, D>(
        &mut self,
        tft: &mut St7735<DI, RST, D>,
        origin: Point,
    ) -> Result<(), DisplayError>
    where
        DI: DisplayInterface,
        RST: OutputPin,
        D: DelayNs,
    {
        tft.image_clipped(origin, self.width, self.buf)?;
        self.dirty = false;
        trace!("framebuffer: flushed {} bytes", self.buf.len());
        Ok(())
    }

    /// Flush only when something changed; returns whether it did
    pub fn flush_if_dirty<DI, RST, D>(
        &mut self,
        tft: &mut St7735<DI, RST, D>,
        origin: Point,
    ) -> Result<bool, DisplayError>
    where
        DI: DisplayInterface,
        RST: OutputPin,
        D: DelayNs,
    {
        if !self.dirty {
            return Ok(false);
        }
        self.flush(tft, origin)?;
        Ok(true)
    }

    /// Write a band of full-width rows to the panel
    ///
    /// The band is clipped to the buffer and the panel. The dirty flag is
    /// left as is.
    pub fn flush_rows<DI, RST, D>(
        &self,
        tft: &mut St7735<DI, RST, D>,
        origin: Point,
        first_row: u16,
        rows: u16,
    ) -> Result<(), DisplayError>
    where
        DI: DisplayInterface,
        RST: OutputPin,
        D: DelayNs,
    {
        let first = first_row.min(self.height);
        let last = first_row.saturating_add(rows).min(self.height);
        if first == last {
            return Ok(());
        }

        let stride = usize::from(self.width) * 2;
        let bytes = &self.buf[usize::from(first) * stride..usize::from(last) * stride];
        let corner = Point::new(origin.x, origin.y.saturating_add(i32::from(first)));
        tft.image_clipped(corner, self.width, bytes)
    }
}

/// Read until `buf` is full or the source ends
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, FramebufferError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(_) => return Err(FramebufferError::Read),
        }
    }
    Ok(filled)
}
