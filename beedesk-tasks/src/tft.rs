//! TFT panel task
//!
//! Owns the ST7735, its backlight and the framebuffer. A `tft_enable`
//! request wakes the backlight; it goes dark again after the configured
//! timeout. While lit, a `tft_flush` request composes the background
//! image, the title and three vertical text columns and pushes the frame
//! to the panel. Requests made while dark wait for the next wake.

use beedesk_core::config::DisplayConfig;
use beedesk_core::traits::{AssetError, AssetId, AssetStore, MonotonicClock};
use beedesk_core::{Context, Task, TaskError, TaskStatus, TICKS_MS};
use beedesk_display::font::{CHARSET, GLYPH_BYTES};
use beedesk_display::{
    DisplayError, DisplayInterface, Font, Framebuffer, FramebufferError, Point, Rgb565, St7735,
};
use beedesk_hal::OutputPin;
use embedded_hal::delay::DelayNs;

use crate::keys;

/// Bytes of the font asset
pub const FONT_TABLE_BYTES: usize = CHARSET.len() * GLYPH_BYTES;

/// Title line, upright along the bottom edge
const TITLE_ORIGIN: (i32, i32) = (0, 144);
const TITLE_COLOR: Rgb565 = Rgb565::BLACK;

/// Vertical text columns, first to third
const TEXT_COLUMNS: [(&str, i32); 3] = [
    (keys::TFT_TEXT_1, 60),
    (keys::TFT_TEXT_2, 40),
    (keys::TFT_TEXT_3, 20),
];
const TEXT_TOP: i32 = 6;
const TEXT_COLOR: Rgb565 = Rgb565(0x00FF);

fn display_err(e: DisplayError) -> TaskError {
    warn!("tft: display error {:?}", e);
    TaskError::Display
}

fn framebuffer_err(e: FramebufferError) -> TaskError {
    warn!("tft: framebuffer error {:?}", e);
    TaskError::Display
}

/// Composes and flushes the TFT panel
pub struct TftTask<'b, DI, RST, D, BL, A, C> {
    tft: St7735<DI, RST, D>,
    backlight: BL,
    fb: Framebuffer<'b>,
    assets: A,
    clock: C,
    font: [u8; FONT_TABLE_BYTES],
    config: DisplayConfig,
    last_wake: i64,
}

impl<'b, DI, RST, D, BL, A, C> TftTask<'b, DI, RST, D, BL, A, C>
where
    DI: DisplayInterface,
    RST: OutputPin,
    D: DelayNs,
    BL: OutputPin,
    A: AssetStore,
    C: MonotonicClock,
{
    /// Create a new task; the panel is initialized in `setup`
    pub fn new(
        tft: St7735<DI, RST, D>,
        backlight: BL,
        fb: Framebuffer<'b>,
        assets: A,
        clock: C,
        config: DisplayConfig,
    ) -> Self {
        Self {
            tft,
            backlight,
            fb,
            assets,
            clock,
            font: [0; FONT_TABLE_BYTES],
            config,
            last_wake: 0,
        }
    }

    pub fn framebuffer(&self) -> &Framebuffer<'b> {
        &self.fb
    }

    pub fn backlight(&self) -> &BL {
        &self.backlight
    }

    fn load_font(&mut self) -> Result<(), TaskError> {
        let n = self.assets.read_at(AssetId::Font, 0, &mut self.font)?;
        if n < FONT_TABLE_BYTES {
            error!("tft: font asset holds {} of {} bytes", n, FONT_TABLE_BYTES);
            return Err(AssetError::Truncated.into());
        }
        Ok(())
    }

    /// Apply wake requests and the backlight timeout
    fn update_backlight(&mut self, ctx: &mut Context, now: i64) -> Result<(), TaskError> {
        if ctx.get_bool(keys::TFT_ENABLE, false) {
            ctx.set(keys::TFT_ENABLE, false)?;
            self.last_wake = now;
            if !self.backlight.is_set_high() {
                debug!("tft: backlight on");
                self.backlight.set_high();
            }
        } else if self.backlight.is_set_high()
            && now - self.last_wake > i64::from(self.config.backlight_timeout_ms)
        {
            debug!("tft: backlight off");
            self.backlight.set_low();
        }
        Ok(())
    }

    /// The framebuffer must sit wholly on the panel at the configured window
    fn check_window(&self) -> Result<(), TaskError> {
        let (panel_w, panel_h) = self.tft.size();
        let right = u32::from(self.config.window_x) + u32::from(self.fb.width());
        let bottom = u32::from(self.config.window_y) + u32::from(self.fb.height());
        if right > u32::from(panel_w) || bottom > u32::from(panel_h) {
            error!(
                "tft: {}x{} frame at ({}, {}) does not fit the {}x{} panel",
                self.fb.width(),
                self.fb.height(),
                self.config.window_x,
                self.config.window_y,
                panel_w,
                panel_h
            );
            return Err(TaskError::Display);
        }
        Ok(())
    }

    fn draw_background(&mut self, ctx: &Context) -> Result<(), TaskError> {
        let id = u8::try_from(ctx.get_int(keys::TFT_BC, -1))
            .ok()
            .and_then(AssetId::from_u8)
            .filter(|id| *id != AssetId::Font);

        let Some(id) = id else {
            self.fb.fill(Rgb565::BLACK);
            return Ok(());
        };

        let width = self.fb.width();
        match self.assets.open(id) {
            Ok(mut reader) => {
                let rows = self
                    .fb
                    .blit_image_stream(&mut reader, width)
                    .map_err(framebuffer_err)?;
                trace!("tft: background {} rows", rows);
            }
            Err(e) => {
                warn!("tft: background {} unavailable: {:?}", id.as_u8(), e);
                self.fb.fill(Rgb565::BLACK);
            }
        }
        Ok(())
    }

    fn compose(&mut self, ctx: &Context) -> Result<(), TaskError> {
        self.draw_background(ctx)?;

        let font = Font::new(&self.font).map_err(|_| TaskError::Display)?;
        let (x, y) = TITLE_ORIGIN;
        self.fb.text_horizontal(
            &font,
            x,
            y,
            ctx.get_text(keys::TFT_TITLE, ""),
            TITLE_COLOR,
            None,
        );
        for (key, x) in TEXT_COLUMNS {
            self.fb
                .text_vertical(&font, x, TEXT_TOP, ctx.get_text(key, ""), TEXT_COLOR, None);
        }
        Ok(())
    }
}

impl<DI, RST, D, BL, A, C> Task for TftTask<'_, DI, RST, D, BL, A, C>
where
    DI: DisplayInterface,
    RST: OutputPin,
    D: DelayNs,
    BL: OutputPin,
    A: AssetStore,
    C: MonotonicClock,
{
    fn name(&self) -> Option<&'static str> {
        Some(keys::names::TFT)
    }

    fn setup(&mut self) -> Result<(), TaskError> {
        self.tft.init().map_err(display_err)?;
        self.tft
            .set_inverted(self.config.inverted)
            .map_err(display_err)?;
        if let Some(rotation) = self.config.rotation {
            self.tft.set_rotation(rotation).map_err(display_err)?;
        }
        self.check_window()?;
        self.load_font()?;
        self.backlight.set_high();
        info!("tft: ready");
        Ok(())
    }

    fn run(&mut self, ctx: &mut Context) -> Result<TaskStatus, TaskError> {
        let now = ctx.get_int(TICKS_MS, 0);
        self.update_backlight(ctx, now)?;

        if !self.backlight.is_set_high() || !ctx.get_bool(keys::TFT_FLUSH, false) {
            return Ok(TaskStatus::Running);
        }
        ctx.set(keys::TFT_FLUSH, false)?;

        let start = self.clock.now_ms();
        self.compose(ctx)?;
        let composed = self.clock.now_ms();
        let origin = Point::new(
            i32::from(self.config.window_x),
            i32::from(self.config.window_y),
        );
        self.fb.flush(&mut self.tft, origin).map_err(display_err)?;
        let done = self.clock.now_ms();

        debug!(
            "tft: compose {} ms, flush {} ms",
            composed - start,
            done - composed
        );
        Ok(TaskStatus::Running)
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;
    use std::vec;
    use std::vec::Vec;

    use beedesk_core::traits::StaticAssets;
    use beedesk_display::Transfer;

    use super::*;

    const W: u16 = 80;
    const H: u16 = 160;
    const BACKGROUND: Rgb565 = Rgb565(0x1111);

    #[derive(Default)]
    struct CountingInterface {
        commands: Vec<u8>,
        data_bytes: usize,
        in_command: bool,
    }

    impl DisplayInterface for &mut CountingInterface {
        fn begin(&mut self, kind: Transfer) -> Result<(), DisplayError> {
            self.in_command = kind == Transfer::Command;
            Ok(())
        }

        fn send(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
            if self.in_command {
                self.commands.extend_from_slice(bytes);
            } else {
                self.data_bytes += bytes.len();
            }
            Ok(())
        }

        fn end(&mut self) -> Result<(), DisplayError> {
            Ok(())
        }
    }

    struct Pin<'a> {
        level: &'a Cell<bool>,
    }

    impl OutputPin for Pin<'_> {
        fn set_high(&mut self) {
            self.level.set(true);
        }

        fn set_low(&mut self) {
            self.level.set(false);
        }

        fn is_set_high(&self) -> bool {
            self.level.get()
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    struct FixedClock;

    impl MonotonicClock for FixedClock {
        fn now_ms(&self) -> u64 {
            0
        }
    }

    struct Fixture {
        iface: CountingInterface,
        rst: Cell<bool>,
        backlight: Cell<bool>,
        buf: Vec<u8>,
        font: Vec<u8>,
        background: Vec<u8>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                iface: CountingInterface::default(),
                rst: Cell::new(false),
                backlight: Cell::new(false),
                buf: vec![0; usize::from(W) * usize::from(H) * 2],
                // Every glyph is a solid block
                font: vec![0xFF; FONT_TABLE_BYTES],
                background: BACKGROUND
                    .to_be_bytes()
                    .repeat(usize::from(W) * usize::from(H)),
            }
        }

        fn task(
            &mut self,
        ) -> TftTask<'_, &mut CountingInterface, Pin<'_>, NoDelay, Pin<'_>, StaticAssets<'_>, FixedClock>
        {
            self.task_with(DisplayConfig::default())
        }

        fn task_with(
            &mut self,
            config: DisplayConfig,
        ) -> TftTask<'_, &mut CountingInterface, Pin<'_>, NoDelay, Pin<'_>, StaticAssets<'_>, FixedClock>
        {
            let tft = St7735::new(&mut self.iface, Pin { level: &self.rst }, NoDelay, W, H)
                .with_offset(26, 1);
            let fb = Framebuffer::new(&mut self.buf, W, H).unwrap();
            let assets = StaticAssets {
                font: &self.font,
                clock_background: &self.background,
                climate_background: &[],
            };
            TftTask::new(
                tft,
                Pin {
                    level: &self.backlight,
                },
                fb,
                assets,
                FixedClock,
                config,
            )
        }
    }

    fn ctx_at(now: i64) -> Context {
        let mut ctx = Context::new();
        ctx.set(TICKS_MS, now).unwrap();
        ctx
    }

    #[test]
    fn test_setup_lights_backlight() {
        let mut fx = Fixture::new();
        let mut task = fx.task();
        task.setup().unwrap();
        assert!(task.backlight().is_set_high());
    }

    #[test]
    fn test_setup_rejects_short_font() {
        let mut fx = Fixture::new();
        fx.font.truncate(100);
        let mut task = fx.task();
        assert_eq!(task.setup(), Err(TaskError::Asset(AssetError::Truncated)));
    }

    #[test]
    fn test_setup_rejects_rotation_that_swaps_the_panel() {
        let mut fx = Fixture::new();
        let config = DisplayConfig {
            rotation: Some(1),
            ..DisplayConfig::default()
        };
        let mut task = fx.task_with(config);
        assert_eq!(task.setup(), Err(TaskError::Display));
        assert!(!task.backlight().is_set_high());
    }

    #[test]
    fn test_setup_rejects_window_past_the_panel() {
        let mut fx = Fixture::new();
        let config = DisplayConfig {
            window_x: 10,
            ..DisplayConfig::default()
        };
        let mut task = fx.task_with(config);
        assert_eq!(task.setup(), Err(TaskError::Display));
    }

    #[test]
    fn test_setup_accepts_half_turn() {
        let mut fx = Fixture::new();
        let config = DisplayConfig {
            rotation: Some(2),
            ..DisplayConfig::default()
        };
        let mut task = fx.task_with(config);
        assert_eq!(task.setup(), Ok(()));
    }

    #[test]
    fn test_flush_composes_frame() {
        let mut fx = Fixture::new();
        let mut task = fx.task();
        task.setup().unwrap();

        let mut ctx = ctx_at(0);
        ctx.set(keys::TFT_BC, i64::from(AssetId::ClockBackground.as_u8()))
            .unwrap();
        ctx.set_text(keys::TFT_TITLE, "Clock").unwrap();
        ctx.set_text(keys::TFT_TEXT_1, "12:34").unwrap();
        ctx.set(keys::TFT_FLUSH, true).unwrap();

        task.run(&mut ctx).unwrap();
        assert!(!ctx.get_bool(keys::TFT_FLUSH, true));

        let fb = task.framebuffer();
        assert!(!fb.is_dirty());
        assert_eq!(fb.get_pixel(79, 0), Some(BACKGROUND));
        // Title block starts at the bottom-left
        assert_eq!(fb.get_pixel(0, 144), Some(TITLE_COLOR));
        // First column: 16 wide from x = 60, 8 tall per character from y = 6
        assert_eq!(fb.get_pixel(60, 6), Some(TEXT_COLOR));
        assert_eq!(fb.get_pixel(75, 45), Some(TEXT_COLOR));
        assert_eq!(fb.get_pixel(75, 46), Some(BACKGROUND));
        // Empty columns leave the background
        assert_eq!(fb.get_pixel(40, 6), Some(BACKGROUND));

        drop(task);
        assert!(fx.iface.data_bytes >= fx.buf.len());
        assert_eq!(fx.iface.commands.last(), Some(&0x2C));
    }

    #[test]
    fn test_missing_background_fills_black() {
        let mut fx = Fixture::new();
        let mut task = fx.task();
        task.setup().unwrap();

        let mut ctx = ctx_at(0);
        ctx.set(keys::TFT_BC, i64::from(AssetId::ClimateBackground.as_u8()))
            .unwrap();
        ctx.set(keys::TFT_FLUSH, true).unwrap();
        task.run(&mut ctx).unwrap();

        assert_eq!(task.framebuffer().get_pixel(10, 10), Some(Rgb565::BLACK));
    }

    #[test]
    fn test_backlight_timeout_and_wake() {
        let mut fx = Fixture::new();
        let mut task = fx.task();
        task.setup().unwrap();

        let mut ctx = ctx_at(0);
        ctx.set(keys::TFT_ENABLE, true).unwrap();
        task.run(&mut ctx).unwrap();
        assert!(!ctx.get_bool(keys::TFT_ENABLE, true));

        ctx.set(TICKS_MS, 20_000i64).unwrap();
        task.run(&mut ctx).unwrap();
        assert!(task.backlight().is_set_high());

        ctx.set(TICKS_MS, 20_001i64).unwrap();
        task.run(&mut ctx).unwrap();
        assert!(!task.backlight().is_set_high());

        // Dark: the request waits
        ctx.set(keys::TFT_FLUSH, true).unwrap();
        task.run(&mut ctx).unwrap();
        assert!(ctx.get_bool(keys::TFT_FLUSH, false));

        ctx.set(keys::TFT_ENABLE, true).unwrap();
        task.run(&mut ctx).unwrap();
        assert!(task.backlight().is_set_high());
        assert!(!ctx.get_bool(keys::TFT_FLUSH, true));
    }
}
