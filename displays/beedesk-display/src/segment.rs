//! NeoPixel seven-segment digits
//!
//! Each digit is seven segments of three LEDs, segment `a` first. A
//! [`ColorRule`] decides the three colours of every lit segment; unlit
//! segments are black. A [`ScreenGroup`] drives one strip of digits and an
//! [`IndicatorScreen`] drives the two-element colon between the groups.
//!
//! Unknown characters are not an error: the digit keeps its previous
//! pattern and one error is logged.

use smart_leds::SmartLedsWrite;

pub use smart_leds::RGB8;

/// Segments per digit
pub const SEGMENTS: usize = 7;

/// LEDs per segment
pub const LEDS_PER_SEGMENT: usize = 3;

/// LEDs per digit
pub const LEDS_PER_DIGIT: usize = SEGMENTS * LEDS_PER_SEGMENT;

/// LEDs on the indicator strip
pub const INDICATOR_LEDS: usize = 2 * LEDS_PER_SEGMENT;

/// Unlit colour
pub const OFF: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

const DIM: RGB8 = RGB8 { r: 1, g: 1, b: 1 };

/// Segment pattern for a character, MSB is segment `a`
pub fn segment_code(c: char) -> Option<u8> {
    let code = match c {
        '0' => 0xFC,
        '1' => 0x60,
        '2' => 0xDA,
        '3' => 0xF2,
        '4' => 0x66,
        '5' => 0xB6,
        '6' => 0xBE,
        '7' => 0xE0,
        '8' => 0xFE,
        '9' => 0xF6,
        ' ' => 0x00,
        _ => return None,
    };
    Some(code)
}

/// Colour strategy for the three LEDs of a segment
pub trait ColorRule {
    /// Colours for segment `index` (0 = `a`)
    fn get_color(&self, index: usize) -> [RGB8; 3];
}

/// Same three colours on every segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedColorRule {
    colors: [RGB8; 3],
}

impl Default for FixedColorRule {
    fn default() -> Self {
        Self { colors: [DIM; 3] }
    }
}

impl FixedColorRule {
    /// Create a new rule from three colours
    pub const fn new(a: RGB8, b: RGB8, c: RGB8) -> Self {
        Self { colors: [a, b, c] }
    }

    pub fn set_color(&mut self, a: RGB8, b: RGB8, c: RGB8) {
        self.colors = [a, b, c];
    }
}

impl ColorRule for FixedColorRule {
    fn get_color(&self, _index: usize) -> [RGB8; 3] {
        self.colors
    }
}

/// Palette slot for each LED of each segment
const GRADIENT_MAP: [[usize; 3]; SEGMENTS] = [
    [0, 0, 0],
    [1, 2, 3],
    [5, 6, 7],
    [8, 8, 8],
    [7, 6, 5],
    [3, 2, 1],
    [4, 4, 4],
];

/// Palette entries of a gradient rule
pub const GRADIENT_PALETTE: usize = 9;

/// Colours picked from a nine-entry palette that sweeps around the digit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradientColorRule {
    palette: [RGB8; GRADIENT_PALETTE],
}

impl Default for GradientColorRule {
    fn default() -> Self {
        Self {
            palette: [DIM; GRADIENT_PALETTE],
        }
    }
}

impl GradientColorRule {
    /// Create a new rule over a palette
    pub const fn new(palette: [RGB8; GRADIENT_PALETTE]) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> &[RGB8; GRADIENT_PALETTE] {
        &self.palette
    }

    /// Shift every colour one slot towards the start
    pub fn roll(&mut self) {
        self.palette.rotate_left(1);
    }
}

impl ColorRule for GradientColorRule {
    fn get_color(&self, index: usize) -> [RGB8; 3] {
        let slots = GRADIENT_MAP.get(index).copied().unwrap_or([0; 3]);
        slots.map(|slot| self.palette[slot])
    }
}

/// Rule chosen at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnyColorRule {
    Fixed(FixedColorRule),
    Gradient(GradientColorRule),
}

impl Default for AnyColorRule {
    fn default() -> Self {
        Self::Fixed(FixedColorRule::default())
    }
}

impl ColorRule for AnyColorRule {
    fn get_color(&self, index: usize) -> [RGB8; 3] {
        match self {
            Self::Fixed(rule) => rule.get_color(index),
            Self::Gradient(rule) => rule.get_color(index),
        }
    }
}

impl From<FixedColorRule> for AnyColorRule {
    fn from(rule: FixedColorRule) -> Self {
        Self::Fixed(rule)
    }
}

impl From<GradientColorRule> for AnyColorRule {
    fn from(rule: GradientColorRule) -> Self {
        Self::Gradient(rule)
    }
}

/// One seven-segment digit
#[derive(Debug, Clone)]
pub struct SegScreen<R> {
    code: u8,
    rule: R,
    leds: [RGB8; LEDS_PER_DIGIT],
}

impl<R: ColorRule> SegScreen<R> {
    /// Create a new blank digit
    pub fn new(rule: R) -> Self {
        Self {
            code: 0,
            rule,
            leds: [OFF; LEDS_PER_DIGIT],
        }
    }

    /// Current segment pattern
    pub fn code(&self) -> u8 {
        self.code
    }

    /// LED colours, segment `a` first
    pub fn leds(&self) -> &[RGB8; LEDS_PER_DIGIT] {
        &self.leds
    }

    /// Show a character; returns false and keeps the old pattern if unknown
    pub fn render(&mut self, c: char) -> bool {
        let Some(code) = segment_code(c) else {
            error!("segment: no pattern for {}", c);
            return false;
        };

        self.code = code;
        for (i, seg) in self.leds.chunks_exact_mut(LEDS_PER_SEGMENT).enumerate() {
            let colors = if code & (0x80 >> i) != 0 {
                self.rule.get_color(i)
            } else {
                [OFF; 3]
            };
            seg.copy_from_slice(&colors);
        }
        true
    }

    /// Replace the rule; colours change on the next render
    pub fn set_color_rule(&mut self, rule: R) {
        self.rule = rule;
    }
}

/// A strip of `DIGITS` digits showing a right-aligned, zero-padded string
pub struct ScreenGroup<W, R, const DIGITS: usize> {
    strip: W,
    screens: [SegScreen<R>; DIGITS],
}

impl<W, R, const DIGITS: usize> ScreenGroup<W, R, DIGITS>
where
    W: SmartLedsWrite<Color = RGB8>,
    R: ColorRule + Clone,
{
    /// Create a new group with every digit blank
    pub fn new(strip: W, rule: R) -> Self {
        Self {
            strip,
            screens: core::array::from_fn(|_| SegScreen::new(rule.clone())),
        }
    }

    pub fn screens(&self) -> &[SegScreen<R>; DIGITS] {
        &self.screens
    }

    pub fn strip_mut(&mut self) -> &mut W {
        &mut self.strip
    }

    /// Show the rightmost `DIGITS` characters of `"0" * DIGITS + text`
    ///
    /// The strip is written twice; the LEDs on this board only latch
    /// reliably on the second frame.
    pub fn render(&mut self, text: &str) -> Result<(), W::Error> {
        let skip = text.chars().count();
        let padded = core::iter::repeat('0').take(DIGITS).chain(text.chars()).skip(skip);
        for (screen, c) in self.screens.iter_mut().zip(padded) {
            screen.render(c);
        }

        self.commit()?;
        self.commit()
    }

    fn commit(&mut self) -> Result<(), W::Error> {
        self.strip
            .write(self.screens.iter().flat_map(|s| s.leds.iter().copied()))
    }

    /// Hand a rule to every digit
    pub fn set_color_rule(&mut self, rule: &R) {
        for screen in self.screens.iter_mut() {
            screen.set_color_rule(rule.clone());
        }
    }
}

/// The two-element colon between the digit groups
pub struct IndicatorScreen<W, R> {
    strip: W,
    rule: R,
    visible: bool,
}

impl<W, R> IndicatorScreen<W, R>
where
    W: SmartLedsWrite<Color = RGB8>,
    R: ColorRule,
{
    /// Create a new hidden indicator
    pub fn new(strip: W, rule: R) -> Self {
        Self {
            strip,
            rule,
            visible: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn strip_mut(&mut self) -> &mut W {
        &mut self.strip
    }

    pub fn set_color_rule(&mut self, rule: R) {
        self.rule = rule;
    }

    /// Light both elements with the rule's first two segment colours
    pub fn show(&mut self) -> Result<(), W::Error> {
        let [a, b] = [self.rule.get_color(0), self.rule.get_color(1)];
        self.strip.write(a.into_iter().chain(b))?;
        self.visible = true;
        Ok(())
    }

    pub fn hide(&mut self) -> Result<(), W::Error> {
        self.strip.write([OFF; INDICATOR_LEDS])?;
        self.visible = false;
        Ok(())
    }
}
