//! Context key catalogue
//!
//! Tasks never call each other. Every interaction goes through one of these
//! keys, with the value type noted beside it. Reading a key that was never
//! written yields the stated default.

use beedesk_core::{Context, ContextError};
use beedesk_display::segment::RGB8;
use beedesk_display::{AnyColorRule, FixedColorRule, GradientColorRule};

/// Display mode (`Int`, [`Mode`])
pub const MODE: &str = "mode";

/// Left digit group text (`Text`)
pub const DISPLAY_STR_1: &str = "display_str_1";
/// Right digit group text (`Text`)
pub const DISPLAY_STR_2: &str = "display_str_2";
/// Colon indicator lit (`Bool`)
pub const DISPLAY_SEG_VISIBLE: &str = "display_seg_visible";
/// LED refresh request, cleared by the LED task (`Bool`)
pub const DISPLAY_FLUSH: &str = "display_flush";
/// Colour rule handle (`Int`, see [`rule`])
pub const DISPLAY_COLOR_RULE: &str = "display_color_rule";
/// Redraw every LED group on the next flush (`Bool`)
pub const DISPLAY_FORCE_FLUSH: &str = "display_force_flush";

/// Beep sequence handle (`Int`, see [`beep`])
pub const BEEP_SEQ: &str = "beep_seq";
/// Start the selected sequence (`Bool`)
pub const BEEP_FLUSH: &str = "beep_flush";

/// Background asset (`Int`, an `AssetId` code)
pub const TFT_BC: &str = "tft_bc";
/// TFT redraw request (`Bool`)
pub const TFT_FLUSH: &str = "tft_flush";
/// Title line along the bottom edge (`Text`)
pub const TFT_TITLE: &str = "tft_title";
/// Vertical text columns (`Text`)
pub const TFT_TEXT_1: &str = "tft_text1";
pub const TFT_TEXT_2: &str = "tft_text2";
pub const TFT_TEXT_3: &str = "tft_text3";
/// Wake the backlight, cleared by the TFT task (`Bool`)
pub const TFT_ENABLE: &str = "tft_enable";

/// Time fetched from the network, to be written to the RTC (`Text`, `Y-M-D h:m:s`)
pub const TIME_SYNC: &str = "time_sync";
/// Network link up (`Bool`)
pub const WIFI_CONNECTED: &str = "wifi_connected";

/// Status LED ticks per toggle (`Int`)
pub const STATUS_INTERVAL: &str = "status_interval";
/// Keep the status LED lit (`Bool`)
pub const STATUS_ALWAYS_ON: &str = "status_always_on";

/// Heap bytes in use (`Int`)
pub const MEM_USED: &str = "mem_used";
/// Heap bytes free (`Int`)
pub const MEM_FREE: &str = "mem_free";

/// Well-known task names
pub mod names {
    pub const LED: &str = "led_task";
    pub const SENSOR: &str = "th_task";
    pub const BEEP: &str = "beep_task";
    pub const TFT: &str = "tft_task";
    pub const WIFI: &str = "wifi_task";
}

/// What the digits show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Hours and minutes
    Time,
    /// Temperature and humidity
    Climate,
}

impl Mode {
    pub const COUNT: i64 = 2;

    pub const fn code(self) -> i64 {
        match self {
            Self::Time => 0,
            Self::Climate => 1,
        }
    }

    /// Unknown codes fall back to [`Mode::Time`]
    pub const fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Climate,
            _ => Self::Time,
        }
    }

    pub const fn next(self) -> Self {
        Self::from_code((self.code() + 1) % Self::COUNT)
    }

    /// Current mode in the context
    pub fn read(ctx: &Context) -> Self {
        Self::from_code(ctx.get_int(MODE, Self::Time.code()))
    }
}

/// Colour rule handles
pub mod rule {
    use super::*;

    /// Dim white, used while nobody is near
    pub const INACTIVE: i64 = 0;
    /// Red/green/blue, used after the wake sensor fires
    pub const ACTIVE: i64 = 1;
    /// Palette sweep
    pub const GRADIENT: i64 = 2;

    const GRADIENT_PALETTE: [RGB8; 9] = [
        RGB8 { r: 6, g: 0, b: 0 },
        RGB8 { r: 5, g: 1, b: 0 },
        RGB8 { r: 4, g: 2, b: 0 },
        RGB8 { r: 2, g: 4, b: 0 },
        RGB8 { r: 0, g: 5, b: 1 },
        RGB8 { r: 0, g: 4, b: 2 },
        RGB8 { r: 0, g: 2, b: 4 },
        RGB8 { r: 1, g: 0, b: 5 },
        RGB8 { r: 3, g: 0, b: 3 },
    ];

    /// Resolve a handle; unknown handles map to [`INACTIVE`]
    pub fn resolve(handle: i64) -> AnyColorRule {
        match handle {
            ACTIVE => FixedColorRule::new(
                RGB8 { r: 5, g: 0, b: 0 },
                RGB8 { r: 0, g: 5, b: 0 },
                RGB8 { r: 0, g: 0, b: 5 },
            )
            .into(),
            GRADIENT => GradientColorRule::new(GRADIENT_PALETTE).into(),
            _ => FixedColorRule::default().into(),
        }
    }
}

/// Beep sequence handles
pub mod beep {
    /// One note: frequency in Hz and duration in ms
    pub type Note = (u32, u32);

    /// Rising chirp, played on press
    pub const SEQ_A: i64 = 0;
    /// Falling chirp, played on release
    pub const SEQ_B: i64 = 1;

    const RISING: [Note; 3] = [(2500, 100), (2900, 100), (3000, 100)];
    const FALLING: [Note; 3] = [(3000, 100), (2900, 100), (2500, 100)];

    /// Resolve a handle; unknown handles play [`SEQ_A`]
    pub fn resolve(handle: i64) -> &'static [Note] {
        match handle {
            SEQ_B => &FALLING,
            _ => &RISING,
        }
    }
}

/// Write the boot-time values: time mode and a greeting chirp
pub fn seed(ctx: &mut Context) -> Result<(), ContextError> {
    ctx.set(MODE, Mode::Time.code())?;
    ctx.set(DISPLAY_COLOR_RULE, rule::INACTIVE)?;
    ctx.set(BEEP_SEQ, beep::SEQ_A)?;
    ctx.set(BEEP_FLUSH, true)?;
    ctx.set(TFT_ENABLE, true)
}

#[cfg(test)]
mod tests {
    use beedesk_display::ColorRule;

    use super::*;

    #[test]
    fn test_mode_cycles() {
        assert_eq!(Mode::Time.next(), Mode::Climate);
        assert_eq!(Mode::Climate.next(), Mode::Time);
        assert_eq!(Mode::from_code(7), Mode::Time);
    }

    #[test]
    fn test_mode_defaults_to_time() {
        let ctx = Context::new();
        assert_eq!(Mode::read(&ctx), Mode::Time);
    }

    #[test]
    fn test_rule_handles() {
        assert_eq!(rule::resolve(rule::INACTIVE), AnyColorRule::default());
        assert_eq!(rule::resolve(42), AnyColorRule::default());
        let active = rule::resolve(rule::ACTIVE);
        assert_eq!(active.get_color(3)[0], RGB8 { r: 5, g: 0, b: 0 });
        assert!(matches!(
            rule::resolve(rule::GRADIENT),
            AnyColorRule::Gradient(_)
        ));
    }

    #[test]
    fn test_beep_sequences_mirror() {
        let a = beep::resolve(beep::SEQ_A);
        let b = beep::resolve(beep::SEQ_B);
        assert_eq!(a.len(), 3);
        assert!(a.iter().rev().eq(b.iter()));
    }

    #[test]
    fn test_seed() {
        let mut ctx = Context::new();
        seed(&mut ctx).unwrap();
        assert_eq!(Mode::read(&ctx), Mode::Time);
        assert!(ctx.get_bool(BEEP_FLUSH, false));
    }
}
