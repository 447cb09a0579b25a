//! Colour and geometry primitives

/// 16-bit RGB565 colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb565(pub u16);

impl Rgb565 {
    pub const BLACK: Self = Self(0x0000);
    pub const WHITE: Self = Self::new(0xFF, 0xFF, 0xFF);
    pub const RED: Self = Self::new(0xFF, 0x00, 0x00);
    pub const GREEN: Self = Self::new(0x00, 0xFF, 0x00);
    pub const BLUE: Self = Self::new(0x00, 0x00, 0xFF);

    /// Pack 8-bit channels, keeping the top 5/6/5 bits
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self((((r & 0xF8) as u16) << 8) | (((g & 0xFC) as u16) << 3) | ((b >> 3) as u16))
    }

    /// Wire order expected by the controller
    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    pub const fn from_be_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(bytes))
    }

    /// Raw value
    pub const fn raw(self) -> u16 {
        self.0
    }
}

/// Signed pixel coordinate; negative values clamp to the panel edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Clamp both ends of a range into `0..len`, swapping them if reversed
///
/// Returns `None` for an empty axis.
pub fn clamp_span(a: i32, b: i32, len: u16) -> Option<(u16, u16)> {
    if len == 0 {
        return None;
    }
    let max = i32::from(len) - 1;
    let a = a.clamp(0, max) as u16;
    let b = b.clamp(0, max) as u16;
    Some(if b < a { (b, a) } else { (a, b) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_packing() {
        assert_eq!(Rgb565::WHITE.raw(), 0xFFFF);
        assert_eq!(Rgb565::RED.raw(), 0xF800);
        assert_eq!(Rgb565::GREEN.raw(), 0x07E0);
        assert_eq!(Rgb565::BLUE.raw(), 0x001F);
        // Low bits are discarded
        assert_eq!(Rgb565::new(0x07, 0x03, 0x07), Rgb565::BLACK);
        assert_eq!(Rgb565::new(0x12, 0x34, 0x56).to_be_bytes(), [0x11, 0xAA]);
    }

    #[test]
    fn test_clamp_span_edges() {
        assert_eq!(clamp_span(-5, 200, 80), Some((0, 79)));
        assert_eq!(clamp_span(10, 3, 80), Some((3, 10)));
        assert_eq!(clamp_span(0, 0, 0), None);
    }

    proptest! {
        #[test]
        fn clamp_span_is_ordered_and_in_bounds(a in -500i32..500, b in -500i32..500, len in 1u16..300) {
            let (lo, hi) = clamp_span(a, b, len).unwrap();
            prop_assert!(lo <= hi);
            prop_assert!(hi < len);
        }
    }
}
