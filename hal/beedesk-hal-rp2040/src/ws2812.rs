//! WS2812 strips on PIO as blocking `SmartLedsWrite`
//!
//! The segment digits are redrawn from the suspend loop, which never
//! yields, so each frame is pushed out with `block_on`. A frame of 42 LEDs
//! takes about 1.3 ms on the wire.

use embassy_futures::block_on;
use embassy_rp::pio::Instance;
use embassy_rp::pio_programs::ws2812::PioWs2812;
use smart_leds::{SmartLedsWrite, RGB8};

/// One PIO state machine driving an `N`-LED strip
pub struct BlockingWs2812<'d, P: Instance, const S: usize, const N: usize> {
    strip: PioWs2812<'d, P, S, N>,
    frame: [RGB8; N],
}

impl<'d, P: Instance, const S: usize, const N: usize> BlockingWs2812<'d, P, S, N> {
    pub fn new(strip: PioWs2812<'d, P, S, N>) -> Self {
        Self {
            strip,
            frame: [RGB8::default(); N],
        }
    }
}

impl<P: Instance, const S: usize, const N: usize> SmartLedsWrite for BlockingWs2812<'_, P, S, N> {
    type Error = core::convert::Infallible;
    type Color = RGB8;

    /// Missing trailing colours are sent dark; extra ones are dropped
    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        let mut colors = iterator.into_iter();
        for slot in self.frame.iter_mut() {
            *slot = colors.next().map_or(RGB8::default(), Into::into);
        }
        block_on(self.strip.write(&self.frame));
        Ok(())
    }
}
