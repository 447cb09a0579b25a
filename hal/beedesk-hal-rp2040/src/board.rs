//! Board pin map
//!
//! Splits the embassy `Peripherals` into named groups so the firmware
//! never refers to raw pin numbers.
//!
//! | Function | GPIO |
//! |----------|------|
//! | LED strip, minutes | 2 |
//! | LED strip, hours | 3 |
//! | LED strip, colon | 4 |
//! | TFT DC / CS / SCK / MOSI / RST / backlight | 8 / 9 / 10 / 11 / 12 / 13 |
//! | Beeper (PWM 7A) | 14 |
//! | Buttons left / bottom / right | 16 / 17 / 18 |
//! | Wake sensor | 19 |
//! | DHT11 data | 20 |
//! | Status LED | 25 |

use embassy_rp::peripherals::{
    DMA_CH0, DMA_CH1, DMA_CH2, FLASH, PIN_10, PIN_11, PIN_12, PIN_13, PIN_14, PIN_16,
    PIN_17, PIN_18, PIN_19, PIN_2, PIN_20, PIN_25, PIN_3, PIN_4, PIN_8, PIN_9, PIO0, PWM_SLICE7,
    RTC, SPI1,
};
use embassy_rp::{Peri, Peripherals};

/// TFT panel on SPI1
pub struct TftPins {
    pub spi: Peri<'static, SPI1>,
    pub sck: Peri<'static, PIN_10>,
    pub mosi: Peri<'static, PIN_11>,
    pub dc: Peri<'static, PIN_8>,
    pub cs: Peri<'static, PIN_9>,
    pub rst: Peri<'static, PIN_12>,
    pub backlight: Peri<'static, PIN_13>,
}

/// Three WS2812 strips on PIO0
pub struct LedPins {
    pub pio: Peri<'static, PIO0>,
    pub minutes: Peri<'static, PIN_2>,
    pub hours: Peri<'static, PIN_3>,
    pub colon: Peri<'static, PIN_4>,
    pub dma: (
        Peri<'static, DMA_CH0>,
        Peri<'static, DMA_CH1>,
        Peri<'static, DMA_CH2>,
    ),
}

pub struct ButtonPins {
    pub left: Peri<'static, PIN_16>,
    pub bottom: Peri<'static, PIN_17>,
    pub right: Peri<'static, PIN_18>,
}

/// Everything the firmware uses, by function
pub struct Board {
    pub tft: TftPins,
    pub leds: LedPins,
    pub buttons: ButtonPins,
    pub beeper_pwm: Peri<'static, PWM_SLICE7>,
    pub beeper: Peri<'static, PIN_14>,
    pub wake: Peri<'static, PIN_19>,
    pub dht: Peri<'static, PIN_20>,
    pub status_led: Peri<'static, PIN_25>,
    pub rtc: Peri<'static, RTC>,
    pub flash: Peri<'static, FLASH>,
}

impl Board {
    /// Take the board's peripherals out of the embassy singleton
    pub fn split(p: Peripherals) -> Self {
        Self {
            tft: TftPins {
                spi: p.SPI1,
                sck: p.PIN_10,
                mosi: p.PIN_11,
                dc: p.PIN_8,
                cs: p.PIN_9,
                rst: p.PIN_12,
                backlight: p.PIN_13,
            },
            leds: LedPins {
                pio: p.PIO0,
                minutes: p.PIN_2,
                hours: p.PIN_3,
                colon: p.PIN_4,
                dma: (p.DMA_CH0, p.DMA_CH1, p.DMA_CH2),
            },
            buttons: ButtonPins {
                left: p.PIN_16,
                bottom: p.PIN_17,
                right: p.PIN_18,
            },
            beeper_pwm: p.PWM_SLICE7,
            beeper: p.PIN_14,
            wake: p.PIN_19,
            dht: p.PIN_20,
            status_led: p.PIN_25,
            rtc: p.RTC,
            flash: p.FLASH,
        }
    }
}
