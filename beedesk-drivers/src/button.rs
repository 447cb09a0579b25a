//! Button bank with edge detection
//!
//! Buttons are sampled by polling. Each sample is compared with the last
//! reported level and an event is produced only when the level changes and
//! has stayed changed for `debounce` consecutive polls.

use beedesk_hal::InputPin;
use heapless::Vec;

/// Front panel buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Left,
    Bottom,
    Right,
}

impl Button {
    /// Stable numeric code, used when buttons travel through the context
    pub const fn code(self) -> u8 {
        match self {
            Self::Left => 0,
            Self::Bottom => 1,
            Self::Right => 2,
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Left),
            1 => Some(Self::Bottom),
            2 => Some(Self::Right),
            _ => None,
        }
    }
}

/// A level change on one button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEvent {
    pub button: Button,
    /// True when the input went high
    pub pressed: bool,
}

struct Channel<P> {
    button: Button,
    pin: P,
    level: bool,
    pending: u8,
}

/// A fixed set of buttons sampled together
pub struct ButtonBank<P, const N: usize> {
    channels: [Channel<P>; N],
    debounce: u8,
}

impl<P: InputPin, const N: usize> ButtonBank<P, N> {
    /// Create a new bank; the current levels are the starting state
    pub fn new(pins: [(Button, P); N]) -> Self {
        Self {
            channels: pins.map(|(button, pin)| Channel {
                level: pin.is_high(),
                button,
                pin,
                pending: 0,
            }),
            debounce: 1,
        }
    }

    /// Require a new level on this many consecutive polls before reporting
    pub fn with_debounce(mut self, polls: u8) -> Self {
        self.debounce = polls.max(1);
        self
    }

    /// Last reported level of a button
    pub fn is_pressed(&self, button: Button) -> bool {
        self.channels
            .iter()
            .find(|c| c.button == button)
            .map_or(false, |c| c.level)
    }

    /// Sample every button and return the changes, in bank order
    pub fn poll(&mut self) -> Vec<ButtonEvent, N> {
        let mut events = Vec::new();
        for ch in self.channels.iter_mut() {
            let level = ch.pin.is_high();
            if level == ch.level {
                ch.pending = 0;
                continue;
            }

            ch.pending += 1;
            if ch.pending < self.debounce {
                continue;
            }

            ch.pending = 0;
            ch.level = level;
            trace!("button: {} -> {}", ch.button.code(), level);
            let _ = events.push(ButtonEvent {
                button: ch.button,
                pressed: level,
            });
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;

    struct MockInput<'a> {
        level: &'a Cell<bool>,
    }

    impl InputPin for MockInput<'_> {
        fn is_high(&self) -> bool {
            self.level.get()
        }
    }

    #[test]
    fn test_initial_levels_are_not_events() {
        let left = Cell::new(true);
        let right = Cell::new(false);
        let mut bank = ButtonBank::new([
            (Button::Left, MockInput { level: &left }),
            (Button::Right, MockInput { level: &right }),
        ]);

        assert!(bank.poll().is_empty());
        assert!(bank.is_pressed(Button::Left));
        assert!(!bank.is_pressed(Button::Bottom));
    }

    #[test]
    fn test_press_and_release_reported_once() {
        let left = Cell::new(false);
        let right = Cell::new(false);
        let mut bank = ButtonBank::new([
            (Button::Left, MockInput { level: &left }),
            (Button::Right, MockInput { level: &right }),
        ]);

        right.set(true);
        assert_eq!(
            bank.poll().as_slice(),
            &[ButtonEvent {
                button: Button::Right,
                pressed: true
            }]
        );
        assert!(bank.poll().is_empty());

        right.set(false);
        left.set(true);
        let events = bank.poll();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].button, Button::Left);
        assert!(events[0].pressed);
        assert_eq!(events[1].button, Button::Right);
        assert!(!events[1].pressed);
    }

    #[test]
    fn test_debounce_filters_glitches() {
        let pin = Cell::new(false);
        let mut bank = ButtonBank::new([(Button::Bottom, MockInput { level: &pin })]).with_debounce(3);

        pin.set(true);
        assert!(bank.poll().is_empty());
        pin.set(false);
        assert!(bank.poll().is_empty());

        pin.set(true);
        assert!(bank.poll().is_empty());
        assert!(bank.poll().is_empty());
        assert_eq!(bank.poll().len(), 1);
        assert!(bank.is_pressed(Button::Bottom));
    }

    #[test]
    fn test_button_codes_round_trip() {
        for b in [Button::Left, Button::Bottom, Button::Right] {
            assert_eq!(Button::from_code(b.code()), Some(b));
        }
        assert_eq!(Button::from_code(9), None);
    }
}
