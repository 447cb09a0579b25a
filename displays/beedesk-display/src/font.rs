//! 8x16 bitmap font
//!
//! The font table is a flat run of 16-byte glyphs, one per entry of
//! [`CHARSET`], in the same order. Each byte is one glyph row, MSB on the
//! left, stored bottom row first.
//!
//! Lookup is best effort: a character that is not in the set renders as the
//! first known character that sorts at or after it, or the last glyph when
//! it sorts after everything. No character is ever rejected.

use crate::color::Rgb565;

/// Rows per glyph
pub const GLYPH_HEIGHT: usize = 16;

/// Bits per glyph row
pub const GLYPH_WIDTH: usize = 8;

/// Bytes of one glyph in the table
pub const GLYPH_BYTES: usize = GLYPH_HEIGHT;

/// Bytes of one rendered glyph image (RGB565)
pub const GLYPH_IMAGE_BYTES: usize = GLYPH_WIDTH * GLYPH_HEIGHT * 2;

/// Characters in table order (printable ASCII)
pub const CHARSET: &str = " !\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~";

/// Font errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FontError {
    /// Table holds fewer glyphs than the character set
    TableTooShort,
    /// Output buffer cannot hold the rendered string
    BufferTooSmall,
}

/// Borrowed font table
#[derive(Debug, Clone, Copy)]
pub struct Font<'a> {
    table: &'a [u8],
}

impl<'a> Font<'a> {
    /// Create a new font over a glyph table
    pub fn new(table: &'a [u8]) -> Result<Self, FontError> {
        if table.len() < CHARSET.len() * GLYPH_BYTES {
            return Err(FontError::TableTooShort);
        }
        Ok(Self { table })
    }

    /// Table position of the glyph used for `c`
    pub fn index_of(c: char) -> usize {
        CHARSET
            .chars()
            .position(|known| known >= c)
            .unwrap_or(CHARSET.len() - 1)
    }

    /// Glyph rows for `c`, bottom row first
    pub fn lookup(&self, c: char) -> &'a [u8] {
        let start = Self::index_of(c) * GLYPH_BYTES;
        &self.table[start..start + GLYPH_BYTES]
    }

    /// Bytes `render_string` produces for `text`
    pub fn image_len(text: &str) -> usize {
        text.chars().count() * GLYPH_IMAGE_BYTES
    }

    /// Render `text` into `out` as consecutive glyph images
    ///
    /// Each glyph is streamed column by column: for every bit position the
    /// 16 rows are emitted top to bottom. Returns the number of bytes used.
    pub fn render_string(
        &self,
        text: &str,
        background: Rgb565,
        foreground: Rgb565,
        out: &mut [u8],
    ) -> Result<usize, FontError> {
        let needed = Self::image_len(text);
        if out.len() < needed {
            return Err(FontError::BufferTooSmall);
        }

        let fg = foreground.to_be_bytes();
        let bg = background.to_be_bytes();
        let mut pos = 0;

        for c in text.chars() {
            let glyph = self.lookup(c);
            for bit in 0..GLYPH_WIDTH {
                let mask = 0x80 >> bit;
                for row in 0..GLYPH_HEIGHT {
                    let bits = glyph[GLYPH_HEIGHT - row - 1];
                    let color = if bits & mask != 0 { fg } else { bg };
                    out[pos..pos + 2].copy_from_slice(&color);
                    pos += 2;
                }
            }
        }

        Ok(pos)
    }
}

#[cfg(test)]
mod tests {
    use std::vec;
    use std::vec::Vec;

    use super::*;

    /// Table where every row of glyph `i` holds the byte `i`
    fn indexed_table() -> Vec<u8> {
        let mut table = Vec::new();
        for i in 0..CHARSET.len() {
            table.extend(core::iter::repeat(i as u8).take(GLYPH_BYTES));
        }
        table
    }

    #[test]
    fn test_charset_is_sorted() {
        let chars: Vec<char> = CHARSET.chars().collect();
        assert_eq!(chars.len(), 95);
        assert!(chars.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_short_table_rejected() {
        let table = vec![0u8; 10];
        assert_eq!(Font::new(&table).err(), Some(FontError::TableTooShort));
    }

    #[test]
    fn test_lookup_known_characters() {
        let table = indexed_table();
        let font = Font::new(&table).unwrap();
        assert_eq!(font.lookup(' ')[0], 0);
        assert_eq!(font.lookup('0')[0], 16);
        assert_eq!(font.lookup('A')[0], 33);
        assert_eq!(font.lookup('~')[0], 94);
    }

    #[test]
    fn test_lookup_fallback() {
        // Sorts before everything: first entry
        assert_eq!(Font::index_of('\n'), 0);
        // Sorts after everything: last entry
        assert_eq!(Font::index_of('\u{7f}'), CHARSET.len() - 1);
        assert_eq!(Font::index_of('é'), CHARSET.len() - 1);
    }

    #[test]
    fn test_render_single_bit() {
        let mut table = vec![0u8; CHARSET.len() * GLYPH_BYTES];
        // Bottom row of ' ' has the leftmost bit set
        table[0] = 0x80;
        let font = Font::new(&table).unwrap();

        let mut out = [0u8; GLYPH_IMAGE_BYTES];
        let used = font
            .render_string(" ", Rgb565::BLACK, Rgb565::WHITE, &mut out)
            .unwrap();
        assert_eq!(used, GLYPH_IMAGE_BYTES);

        // Column 0, last row in stream order is the bottom glyph row
        let lit: Vec<usize> = out
            .chunks(2)
            .enumerate()
            .filter(|(_, px)| *px == Rgb565::WHITE.to_be_bytes())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(lit, [GLYPH_HEIGHT - 1]);
    }

    #[test]
    fn test_render_concatenates() {
        let table = vec![0xFFu8; CHARSET.len() * GLYPH_BYTES];
        let font = Font::new(&table).unwrap();
        let mut out = [0u8; 3 * GLYPH_IMAGE_BYTES];
        let used = font
            .render_string("12:", Rgb565::BLACK, Rgb565::RED, &mut out)
            .unwrap();
        assert_eq!(used, 3 * GLYPH_IMAGE_BYTES);
        assert!(out.chunks(2).all(|px| px == Rgb565::RED.to_be_bytes()));
    }

    #[test]
    fn test_render_buffer_too_small() {
        let table = indexed_table();
        let font = Font::new(&table).unwrap();
        let mut out = [0u8; GLYPH_IMAGE_BYTES];
        assert_eq!(
            font.render_string("ab", Rgb565::BLACK, Rgb565::WHITE, &mut out),
            Err(FontError::BufferTooSmall)
        );
    }
}
