//! ST7735 TFT controller protocol
//!
//! Drives a 16-bit colour ST7735 over a [`DisplayInterface`]. Every drawing
//! call selects an addressing window first; the controller then fills that
//! window in row-major order from the pixel bytes that follow RAMWR.
//!
//! All coordinates are panel-relative and clamped to the panel before use.
//! Reversed ranges are swapped. The panel origin offsets are added when the
//! window is sent.

use beedesk_hal::OutputPin;
use embedded_hal::delay::DelayNs;

use crate::color::{clamp_span, Point, Rgb565};
use crate::interface::{DisplayError, DisplayInterface, Transfer};

/// ST7735 commands
pub mod cmd {
    pub const NOP: u8 = 0x00;
    pub const SWRESET: u8 = 0x01;
    pub const RDDID: u8 = 0x04;
    pub const RDDST: u8 = 0x09;
    pub const SLPIN: u8 = 0x10;
    pub const SLPOUT: u8 = 0x11;
    pub const PTLON: u8 = 0x12;
    pub const NORON: u8 = 0x13;
    pub const INVOFF: u8 = 0x20;
    pub const INVON: u8 = 0x21;
    pub const DISPOFF: u8 = 0x28;
    pub const DISPON: u8 = 0x29;
    pub const CASET: u8 = 0x2A;
    pub const RASET: u8 = 0x2B;
    pub const RAMWR: u8 = 0x2C;
    pub const RAMRD: u8 = 0x2E;
    pub const VSCRDEF: u8 = 0x33;
    pub const MADCTL: u8 = 0x36;
    pub const VSCSAD: u8 = 0x37;
    pub const COLMOD: u8 = 0x3A;
    pub const FRMCTR1: u8 = 0xB1;
    pub const FRMCTR2: u8 = 0xB2;
    pub const FRMCTR3: u8 = 0xB3;
    pub const INVCTR: u8 = 0xB4;
    pub const DISSET5: u8 = 0xB6;
    pub const PWCTR1: u8 = 0xC0;
    pub const PWCTR2: u8 = 0xC1;
    pub const PWCTR3: u8 = 0xC2;
    pub const PWCTR4: u8 = 0xC3;
    pub const PWCTR5: u8 = 0xC4;
    pub const VMCTR1: u8 = 0xC5;
    pub const RDID1: u8 = 0xDA;
    pub const RDID2: u8 = 0xDB;
    pub const RDID3: u8 = 0xDC;
    pub const RDID4: u8 = 0xDD;
    pub const GMCTRP1: u8 = 0xE0;
    pub const GMCTRN1: u8 = 0xE1;
    pub const PWCTR6: u8 = 0xFC;
}

/// MADCTL values for the four rotations
pub const ROTATIONS: [u8; 4] = [0x00, 0x60, 0xC0, 0xA0];

/// MADCTL bit selecting BGR subpixel order
pub const MADCTL_BGR: u8 = 0x08;

/// Pixels per bus write when streaming a solid colour
pub const CHUNK_PIXELS: usize = 32;

/// Hold time for each reset line level
const RESET_HOLD_US: u32 = 500;

/// Parameter bytes of one init step
#[derive(Debug, Clone, Copy)]
enum InitData {
    None,
    Fixed(&'static [u8]),
    /// Full column range of the panel
    Columns,
    /// Full row range of the panel
    Rows,
}

#[derive(Debug, Clone, Copy)]
struct InitStep {
    cmd: u8,
    data: InitData,
    delay_us: u32,
}

const fn step(cmd: u8, data: InitData, delay_us: u32) -> InitStep {
    InitStep { cmd, data, delay_us }
}

/// Vendor power-up sequence; order and delays must not change
const INIT_SEQUENCE: [InitStep; 21] = [
    step(cmd::SWRESET, InitData::None, 150),
    step(cmd::SLPOUT, InitData::None, 500),
    step(cmd::FRMCTR1, InitData::Fixed(&[0x01, 0x2C, 0x2D]), 0),
    step(cmd::FRMCTR2, InitData::Fixed(&[0x01, 0x2C, 0x2D]), 0),
    step(
        cmd::FRMCTR3,
        InitData::Fixed(&[0x01, 0x2C, 0x2D, 0x01, 0x2C, 0x2D]),
        10,
    ),
    step(cmd::INVCTR, InitData::Fixed(&[0x07]), 0),
    step(cmd::PWCTR1, InitData::Fixed(&[0xA2, 0x02, 0x84]), 0),
    step(cmd::PWCTR2, InitData::Fixed(&[0xC5]), 0),
    step(cmd::PWCTR3, InitData::Fixed(&[0x0A, 0x00]), 0),
    step(cmd::PWCTR4, InitData::Fixed(&[0x8A, 0x2A]), 0),
    step(cmd::PWCTR5, InitData::Fixed(&[0x8A, 0xEE]), 0),
    step(cmd::VMCTR1, InitData::Fixed(&[0x0E]), 0),
    step(cmd::INVOFF, InitData::None, 0),
    step(cmd::MADCTL, InitData::Fixed(&[0xC8]), 0),
    step(cmd::COLMOD, InitData::Fixed(&[0x05]), 0),
    step(cmd::CASET, InitData::Columns, 0),
    step(cmd::RASET, InitData::Rows, 0),
    step(
        cmd::GMCTRP1,
        InitData::Fixed(&[
            0x0F, 0x1A, 0x0F, 0x18, 0x2F, 0x28, 0x20, 0x22, 0x1F, 0x1B, 0x23, 0x37, 0x00, 0x07,
            0x02, 0x10,
        ]),
        0,
    ),
    step(
        cmd::GMCTRN1,
        InitData::Fixed(&[
            0x0F, 0x1B, 0x0F, 0x17, 0x33, 0x2C, 0x29, 0x2E, 0x30, 0x30, 0x39, 0x3F, 0x00, 0x07,
            0x03, 0x10,
        ]),
        10,
    ),
    step(cmd::DISPON, InitData::None, 100),
    step(cmd::NORON, InitData::None, 10),
];

/// A clamped, ordered window in panel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub x0: u16,
    pub y0: u16,
    pub x1: u16,
    pub y1: u16,
}

impl Window {
    /// Number of pixels the window covers
    pub fn area(&self) -> usize {
        (self.x1 - self.x0 + 1) as usize * (self.y1 - self.y0 + 1) as usize
    }
}

/// ST7735 driver
pub struct St7735<DI, RST, D> {
    iface: DI,
    rst: RST,
    delay: D,
    width: u16,
    height: u16,
    col_offset: u16,
    row_offset: u16,
    rotation: u8,
    rgb: bool,
}

impl<DI, RST, D> St7735<DI, RST, D>
where
    DI: DisplayInterface,
    RST: OutputPin,
    D: DelayNs,
{
    /// Create a new driver for a `width` x `height` panel
    pub fn new(iface: DI, rst: RST, delay: D, width: u16, height: u16) -> Self {
        Self {
            iface,
            rst,
            delay,
            width,
            height,
            col_offset: 0,
            row_offset: 0,
            rotation: 0,
            rgb: true,
        }
    }

    /// Set the controller RAM position of the panel's first column and row
    pub fn with_offset(mut self, col: u16, row: u16) -> Self {
        self.col_offset = col;
        self.row_offset = row;
        self
    }

    /// Panel size in the current rotation
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Release the transport, reset pin and delay
    pub fn release(self) -> (DI, RST, D) {
        (self.iface, self.rst, self.delay)
    }

    /// Pulse the hardware reset line
    ///
    /// The controller resets on the low level; the line idles high.
    pub fn reset(&mut self) {
        self.rst.set_high();
        self.delay.delay_us(RESET_HOLD_US);
        self.rst.set_low();
        self.delay.delay_us(RESET_HOLD_US);
        self.rst.set_high();
        self.delay.delay_us(RESET_HOLD_US);
    }

    /// Send the power-up command sequence
    pub fn initialize(&mut self) -> Result<(), DisplayError> {
        for s in INIT_SEQUENCE.iter() {
            self.iface.write_command(s.cmd)?;
            match s.data {
                InitData::None => {}
                InitData::Fixed(bytes) => self.iface.write_data(bytes)?,
                InitData::Columns => self.iface.write_data(&range_bytes(0, self.width.saturating_sub(1)))?,
                InitData::Rows => self.iface.write_data(&range_bytes(0, self.height.saturating_sub(1)))?,
            }
            if s.delay_us > 0 {
                self.delay.delay_us(s.delay_us);
            }
        }
        debug!("st7735: initialized {}x{}", self.width, self.height);
        Ok(())
    }

    /// Reset and initialize in one go
    pub fn init(&mut self) -> Result<(), DisplayError> {
        self.reset();
        self.initialize()
    }

    /// Clamp a pair of corners into an ordered window
    pub fn clamp_window(&self, a: Point, b: Point) -> Option<Window> {
        let (x0, x1) = clamp_span(a.x, b.x, self.width)?;
        let (y0, y1) = clamp_span(a.y, b.y, self.height)?;
        Some(Window { x0, y0, x1, y1 })
    }

    /// Select the addressing window and start a RAM write
    ///
    /// Every data byte sent afterwards is pixel data for this window.
    pub fn set_window(&mut self, a: Point, b: Point) -> Result<Window, DisplayError> {
        let w = self.clamp_window(a, b).ok_or(DisplayError::BufferSize)?;
        self.select(w)?;
        Ok(w)
    }

    fn select(&mut self, w: Window) -> Result<(), DisplayError> {
        self.iface.write_command(cmd::CASET)?;
        self.iface
            .write_data(&range_bytes(self.col_offset + w.x0, self.col_offset + w.x1))?;
        self.iface.write_command(cmd::RASET)?;
        self.iface
            .write_data(&range_bytes(self.row_offset + w.y0, self.row_offset + w.y1))?;
        self.iface.write_command(cmd::RAMWR)
    }

    /// Stream `count` pixels of one colour into the current window
    pub fn write_pixels(&mut self, color: Rgb565, count: usize) -> Result<(), DisplayError> {
        let mut chunk = [0u8; CHUNK_PIXELS * 2];
        for px in chunk.chunks_exact_mut(2) {
            px.copy_from_slice(&color.to_be_bytes());
        }

        self.iface.begin(Transfer::Data)?;
        for _ in 0..count / CHUNK_PIXELS {
            self.iface.send(&chunk)?;
        }
        let rest = count % CHUNK_PIXELS;
        if rest > 0 {
            self.iface.send(&chunk[..rest * 2])?;
        }
        self.iface.end()
    }

    /// Stream pre-encoded big-endian pixel bytes into the current window
    pub fn write_region(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.iface.write_data(bytes)
    }

    /// Stream a buffer in several sends within one transfer
    pub fn write_region_chunks<'b>(
        &mut self,
        chunks: impl IntoIterator<Item = &'b [u8]>,
    ) -> Result<(), DisplayError> {
        self.iface.begin(Transfer::Data)?;
        for c in chunks {
            self.iface.send(c)?;
        }
        self.iface.end()
    }

    /// Write a raw image into the window spanned by two corners
    ///
    /// `bytes` must cover the clamped window exactly; nothing is sent
    /// otherwise.
    pub fn image(&mut self, a: Point, b: Point, bytes: &[u8]) -> Result<(), DisplayError> {
        let w = self.clamp_window(a, b).ok_or(DisplayError::BufferSize)?;
        if bytes.len() != w.area() * 2 {
            return Err(DisplayError::BufferSize);
        }
        self.select(w)?;
        self.write_region(bytes)
    }

    /// Write row-major pixel bytes `width` pixels wide with their corner at `origin`
    ///
    /// Only the part that lands on the panel is streamed, row by row.
    /// Nothing is sent when no pixel is visible.
    pub fn image_clipped(
        &mut self,
        origin: Point,
        width: u16,
        bytes: &[u8],
    ) -> Result<(), DisplayError> {
        let stride = usize::from(width) * 2;
        if stride == 0 || bytes.len() % stride != 0 {
            return Err(DisplayError::BufferSize);
        }
        let rows = bytes.len() / stride;

        let (ox, oy) = (i64::from(origin.x), i64::from(origin.y));
        let x0 = ox.max(0);
        let y0 = oy.max(0);
        let x1 = (ox + i64::from(width)).min(i64::from(self.width));
        let y1 = (oy + rows as i64).min(i64::from(self.height));
        if x0 >= x1 || y0 >= y1 {
            return Ok(());
        }

        self.select(Window {
            x0: x0 as u16,
            y0: y0 as u16,
            x1: (x1 - 1) as u16,
            y1: (y1 - 1) as u16,
        })?;

        let skip = (x0 - ox) as usize * 2;
        let span = (x1 - x0) as usize * 2;
        let first = (y0 - oy) as usize;
        let last = (y1 - oy) as usize;
        self.write_region_chunks(
            bytes
                .chunks_exact(stride)
                .take(last)
                .skip(first)
                .map(|row| &row[skip..skip + span]),
        )
    }

    fn fill_window(&mut self, a: Point, b: Point, color: Rgb565) -> Result<(), DisplayError> {
        let w = self.set_window(a, b)?;
        self.write_pixels(color, w.area())
    }

    /// Panel columns or rows `[lo, hi]` clipped to `len`, if any are visible
    fn visible(lo: i64, hi: i64, len: u16) -> Option<(u16, u16)> {
        let max = i64::from(len) - 1;
        if hi < 0 || lo > max || lo > hi {
            return None;
        }
        Some((lo.max(0) as u16, hi.min(max) as u16))
    }

    /// Fill the whole panel
    pub fn fill(&mut self, color: Rgb565) -> Result<(), DisplayError> {
        self.fill_window(
            Point::new(0, 0),
            Point::new(i32::from(self.width) - 1, i32::from(self.height) - 1),
            color,
        )
    }

    /// Set one pixel; points off the panel are skipped
    pub fn set_pixel(&mut self, p: Point, color: Rgb565) -> Result<(), DisplayError> {
        if !self.contains(p) {
            return Ok(());
        }
        self.set_window(p, p)?;
        self.iface.write_data(&color.to_be_bytes())
    }

    fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < i32::from(self.width) && p.y < i32::from(self.height)
    }

    /// Horizontal line of `len` pixels starting at `p`
    pub fn hline(&mut self, p: Point, len: i32, color: Rgb565) -> Result<(), DisplayError> {
        if len <= 0 {
            return Ok(());
        }
        self.fill_window(p, Point::new(p.x.saturating_add(len - 1), p.y), color)
    }

    /// Vertical line of `len` pixels starting at `p`
    pub fn vline(&mut self, p: Point, len: i32, color: Rgb565) -> Result<(), DisplayError> {
        if len <= 0 {
            return Ok(());
        }
        self.fill_window(p, Point::new(p.x, p.y.saturating_add(len - 1)), color)
    }

    /// Line between two points
    ///
    /// Axis-aligned lines become a single window fill; others are plotted
    /// point by point with integer Bresenham.
    pub fn line(&mut self, a: Point, b: Point, color: Rgb565) -> Result<(), DisplayError> {
        if a.x == b.x || a.y == b.y {
            return self.fill_window(a, b, color);
        }
        if Self::visible(i64::from(a.x.min(b.x)), i64::from(a.x.max(b.x)), self.width).is_none()
            || Self::visible(i64::from(a.y.min(b.y)), i64::from(a.y.max(b.y)), self.height)
                .is_none()
        {
            return Ok(());
        }

        let (ax, ay) = (i64::from(a.x), i64::from(a.y));
        let (bx, by) = (i64::from(b.x), i64::from(b.y));
        let dx = (bx - ax).abs();
        let dy = -(by - ay).abs();
        let sx = if ax < bx { 1 } else { -1 };
        let sy = if ay < by { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (ax, ay);

        loop {
            // x and y stay between the endpoints, so they fit an i32
            self.set_pixel(Point::new(x as i32, y as i32), color)?;
            if x == bx && y == by {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
        Ok(())
    }

    /// Rectangle outline with top-left `p`
    pub fn rect(&mut self, p: Point, w: i32, h: i32, color: Rgb565) -> Result<(), DisplayError> {
        if w <= 0 || h <= 0 {
            return Ok(());
        }
        self.hline(p, w, color)?;
        self.hline(Point::new(p.x, p.y.saturating_add(h - 1)), w, color)?;
        self.vline(p, h, color)?;
        self.vline(Point::new(p.x.saturating_add(w - 1), p.y), h, color)
    }

    /// Filled rectangle with top-left `p`
    pub fn fill_rect(&mut self, p: Point, w: i32, h: i32, color: Rgb565) -> Result<(), DisplayError> {
        if w <= 0 || h <= 0 {
            return Ok(());
        }
        self.fill_window(
            p,
            Point::new(p.x.saturating_add(w - 1), p.y.saturating_add(h - 1)),
            color,
        )
    }

    /// Squared distances from `c` to the nearest and farthest panel pixel
    fn reach(&self, c: Point) -> (i64, i64) {
        let axis = |v: i32, len: u16| {
            let (v, max) = (i64::from(v), i64::from(len) - 1);
            let near = v - v.clamp(0, max);
            let far = v.abs().max((v - max).abs());
            (near.saturating_mul(near), far.saturating_mul(far))
        };
        let (nx, fx) = axis(c.x, self.width);
        let (ny, fy) = axis(c.y, self.height);
        (nx.saturating_add(ny), fx.saturating_add(fy))
    }

    /// Circle outline using the midpoint algorithm
    ///
    /// Circles that cannot touch the panel are skipped without plotting.
    pub fn circle(&mut self, c: Point, r: i32, color: Rgb565) -> Result<(), DisplayError> {
        if r < 0 {
            return Ok(());
        }
        let r = i64::from(r);
        let (near, far) = self.reach(c);
        if (r + 1) * (r + 1) < near || (r > 0 && (r - 1) * (r - 1) > far) {
            return Ok(());
        }

        let (cx, cy) = (i64::from(c.x), i64::from(c.y));
        let mut x = r;
        let mut y = 0;
        let mut err = 1 - r;

        while x >= y {
            for (px, py) in [
                (x, y),
                (y, x),
                (-y, x),
                (-x, y),
                (-x, -y),
                (-y, -x),
                (y, -x),
                (x, -y),
            ] {
                if let (Ok(px), Ok(py)) = (i32::try_from(cx + px), i32::try_from(cy + py)) {
                    self.set_pixel(Point::new(px, py), color)?;
                }
            }
            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
        Ok(())
    }

    /// Filled circle drawn as one vertical run per visible column
    pub fn fill_circle(&mut self, c: Point, r: i32, color: Rgb565) -> Result<(), DisplayError> {
        if r < 0 {
            return Ok(());
        }
        let r = i64::from(r);
        let (cx, cy) = (i64::from(c.x), i64::from(c.y));
        let Some((left, right)) = Self::visible(cx - r, cx + r, self.width) else {
            return Ok(());
        };

        let rsq = r * r;
        for x in left..=right {
            let dx = i64::from(x) - cx;
            let h = isqrt(rsq - dx * dx);
            if let Some((top, bottom)) = Self::visible(cy - h, cy + h, self.height) {
                let w = Window {
                    x0: x,
                    y0: top,
                    x1: x,
                    y1: bottom,
                };
                self.select(w)?;
                self.write_pixels(color, w.area())?;
            }
        }
        Ok(())
    }

    /// Select one of the four MADCTL rotations
    ///
    /// Odd rotations swap the panel width and height.
    pub fn set_rotation(&mut self, rotation: u8) -> Result<(), DisplayError> {
        let rotation = rotation % 4;
        if (rotation & 1) != (self.rotation & 1) {
            core::mem::swap(&mut self.width, &mut self.height);
            core::mem::swap(&mut self.col_offset, &mut self.row_offset);
        }
        self.rotation = rotation;
        self.write_madctl()
    }

    /// Choose RGB (`true`) or BGR subpixel order
    pub fn set_rgb(&mut self, rgb: bool) -> Result<(), DisplayError> {
        self.rgb = rgb;
        self.write_madctl()
    }

    fn write_madctl(&mut self) -> Result<(), DisplayError> {
        let order = if self.rgb { 0x00 } else { MADCTL_BGR };
        self.iface.write_command(cmd::MADCTL)?;
        self.iface
            .write_data(&[ROTATIONS[self.rotation as usize] | order])
    }

    /// Turn the panel output on or off
    pub fn set_display_on(&mut self, on: bool) -> Result<(), DisplayError> {
        self.iface
            .write_command(if on { cmd::DISPON } else { cmd::DISPOFF })
    }

    /// Invert all colours
    pub fn set_inverted(&mut self, inverted: bool) -> Result<(), DisplayError> {
        self.iface
            .write_command(if inverted { cmd::INVON } else { cmd::INVOFF })
    }

    /// Set the vertical scroll start address
    pub fn set_scroll_start(&mut self, line: u16) -> Result<(), DisplayError> {
        self.iface.write_command(cmd::VSCSAD)?;
        self.iface.write_data(&line.to_be_bytes())
    }

    /// Enter or leave sleep mode
    pub fn set_sleep(&mut self, sleep: bool) -> Result<(), DisplayError> {
        self.iface
            .write_command(if sleep { cmd::SLPIN } else { cmd::SLPOUT })
    }
}

/// Two big-endian 16-bit addresses, start then end
fn range_bytes(start: u16, end: u16) -> [u8; 4] {
    let s = start.to_be_bytes();
    let e = end.to_be_bytes();
    [s[0], s[1], e[0], e[1]]
}

fn isqrt(n: i64) -> i64 {
    if n <= 0 {
        return 0;
    }
    let mut x = n;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}
