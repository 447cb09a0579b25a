//! LED digit task
//!
//! Owns both digit strips and the colon. Nothing is redrawn until another
//! task raises `display_flush`; then the colour rule is re-read, changed
//! strings are re-rendered and the colon is shown or hidden. A forced
//! flush redraws everything once.

use beedesk_core::{Context, Task, TaskError, TaskStatus};
use beedesk_display::segment::RGB8;
use beedesk_display::{AnyColorRule, IndicatorScreen, ScreenGroup};
use heapless::String;
use smart_leds::SmartLedsWrite;

use crate::keys::{self, rule};

/// Digits per strip
pub const DIGITS: usize = 2;

/// Drives the two digit groups and the colon
pub struct LedTask<W1, W2, W3> {
    left: ScreenGroup<W1, AnyColorRule, DIGITS>,
    right: ScreenGroup<W2, AnyColorRule, DIGITS>,
    colon: IndicatorScreen<W3, AnyColorRule>,
    shown_1: String<32>,
    shown_2: String<32>,
    colon_visible: bool,
}

impl<W1, W2, W3> LedTask<W1, W2, W3>
where
    W1: SmartLedsWrite<Color = RGB8>,
    W2: SmartLedsWrite<Color = RGB8>,
    W3: SmartLedsWrite<Color = RGB8>,
{
    /// Create a new task over the left group, right group and colon strips
    pub fn new(left: W1, right: W2, colon: W3) -> Self {
        let rule = AnyColorRule::default();
        Self {
            left: ScreenGroup::new(left, rule),
            right: ScreenGroup::new(right, rule),
            colon: IndicatorScreen::new(colon, rule),
            shown_1: String::new(),
            shown_2: String::new(),
            colon_visible: false,
        }
    }

    pub fn left(&self) -> &ScreenGroup<W1, AnyColorRule, DIGITS> {
        &self.left
    }

    pub fn right(&self) -> &ScreenGroup<W2, AnyColorRule, DIGITS> {
        &self.right
    }

    pub fn colon_visible(&self) -> bool {
        self.colon_visible
    }

    fn apply_rule(&mut self, rule: AnyColorRule) {
        self.left.set_color_rule(&rule);
        self.right.set_color_rule(&rule);
        self.colon.set_color_rule(rule);
    }
}

/// Replace `shown` with `text` if they differ; returns whether it changed
fn remember(shown: &mut String<32>, text: &str) -> bool {
    if shown.as_str() == text {
        return false;
    }
    shown.clear();
    let _ = shown.push_str(text);
    true
}

impl<W1, W2, W3> Task for LedTask<W1, W2, W3>
where
    W1: SmartLedsWrite<Color = RGB8>,
    W2: SmartLedsWrite<Color = RGB8>,
    W3: SmartLedsWrite<Color = RGB8>,
{
    fn name(&self) -> Option<&'static str> {
        Some(keys::names::LED)
    }

    fn run(&mut self, ctx: &mut Context) -> Result<TaskStatus, TaskError> {
        if !ctx.get_bool(keys::DISPLAY_FLUSH, false) {
            return Ok(TaskStatus::Running);
        }
        ctx.set(keys::DISPLAY_FLUSH, false)?;

        let force = ctx.get_bool(keys::DISPLAY_FORCE_FLUSH, false);
        if force {
            ctx.set(keys::DISPLAY_FORCE_FLUSH, false)?;
        }

        self.apply_rule(rule::resolve(
            ctx.get_int(keys::DISPLAY_COLOR_RULE, rule::INACTIVE),
        ));

        let text = ctx.get_text(keys::DISPLAY_STR_1, "");
        if remember(&mut self.shown_1, text) || force {
            self.left
                .render(text)
                .map_err(|_| TaskError::Peripheral)?;
        }

        let text = ctx.get_text(keys::DISPLAY_STR_2, "");
        if remember(&mut self.shown_2, text) || force {
            self.right
                .render(text)
                .map_err(|_| TaskError::Peripheral)?;
        }

        let visible = ctx.get_bool(keys::DISPLAY_SEG_VISIBLE, false);
        if visible != self.colon_visible || force {
            self.colon_visible = visible;
            let result = if visible {
                self.colon.show()
            } else {
                self.colon.hide()
            };
            result.map_err(|_| TaskError::Peripheral)?;
        }

        Ok(TaskStatus::Running)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    use super::*;

    type Frames = Rc<RefCell<Vec<Vec<RGB8>>>>;

    struct Strip {
        frames: Frames,
    }

    impl SmartLedsWrite for Strip {
        type Error = ();
        type Color = RGB8;

        fn write<T, I>(&mut self, iterator: T) -> Result<(), ()>
        where
            T: IntoIterator<Item = I>,
            I: Into<RGB8>,
        {
            self.frames
                .borrow_mut()
                .push(iterator.into_iter().map(Into::into).collect());
            Ok(())
        }
    }

    fn strips() -> ([Frames; 3], LedTask<Strip, Strip, Strip>) {
        let frames: [Frames; 3] = Default::default();
        let task = LedTask::new(
            Strip {
                frames: frames[0].clone(),
            },
            Strip {
                frames: frames[1].clone(),
            },
            Strip {
                frames: frames[2].clone(),
            },
        );
        (frames, task)
    }

    fn request(ctx: &mut Context, s1: &str, s2: &str, colon: bool) {
        ctx.set_text(keys::DISPLAY_STR_1, s1).unwrap();
        ctx.set_text(keys::DISPLAY_STR_2, s2).unwrap();
        ctx.set(keys::DISPLAY_SEG_VISIBLE, colon).unwrap();
        ctx.set(keys::DISPLAY_FLUSH, true).unwrap();
    }

    #[test]
    fn test_idle_without_flush() {
        let (frames, mut task) = strips();
        let mut ctx = Context::new();
        ctx.set_text(keys::DISPLAY_STR_1, "12").unwrap();

        assert_eq!(task.run(&mut ctx), Ok(TaskStatus::Running));
        assert!(frames.iter().all(|f| f.borrow().is_empty()));
    }

    #[test]
    fn test_flush_renders_and_clears_flag() {
        let (frames, mut task) = strips();
        let mut ctx = Context::new();
        request(&mut ctx, "7", "12", true);

        task.run(&mut ctx).unwrap();
        assert!(!ctx.get_bool(keys::DISPLAY_FLUSH, true));
        assert_eq!(frames[0].borrow().len(), 2);
        assert_eq!(frames[1].borrow().len(), 2);
        assert_eq!(frames[2].borrow().len(), 1);
        assert!(task.colon_visible());

        // "7" is zero padded to "07"
        assert_eq!(task.left().screens()[0].code(), 0xFC);
        assert_eq!(task.left().screens()[1].code(), 0xE0);
    }

    #[test]
    fn test_unchanged_strings_not_redrawn() {
        let (frames, mut task) = strips();
        let mut ctx = Context::new();
        request(&mut ctx, "10", "20", false);
        task.run(&mut ctx).unwrap();

        request(&mut ctx, "10", "21", false);
        task.run(&mut ctx).unwrap();

        assert_eq!(frames[0].borrow().len(), 2);
        assert_eq!(frames[1].borrow().len(), 4);
        // Colon starts hidden and stays hidden
        assert!(frames[2].borrow().is_empty());
    }

    #[test]
    fn test_force_flush_redraws_once() {
        let (frames, mut task) = strips();
        let mut ctx = Context::new();
        request(&mut ctx, "10", "20", false);
        task.run(&mut ctx).unwrap();

        ctx.set(keys::DISPLAY_COLOR_RULE, rule::ACTIVE).unwrap();
        ctx.set(keys::DISPLAY_FORCE_FLUSH, true).unwrap();
        ctx.set(keys::DISPLAY_FLUSH, true).unwrap();
        task.run(&mut ctx).unwrap();

        assert!(!ctx.get_bool(keys::DISPLAY_FORCE_FLUSH, true));
        assert_eq!(frames[0].borrow().len(), 4);
        assert_eq!(frames[2].borrow().len(), 1);
        let last = frames[0].borrow().last().cloned().unwrap();
        assert!(last.contains(&RGB8 { r: 5, g: 0, b: 0 }));

        ctx.set(keys::DISPLAY_FLUSH, true).unwrap();
        task.run(&mut ctx).unwrap();
        assert_eq!(frames[0].borrow().len(), 4);
    }
}
