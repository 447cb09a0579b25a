//! Beedesk - Desk Clock Firmware
//!
//! Main firmware binary for the RP2040 desk clock board.
//!
//! Two cooperative kernels share one context:
//!
//! - The periodic kernel runs from an interrupt-priority executor and ticks
//!   the clock and the status LED at the configured period.
//! - The suspend kernel owns the main thread and runs the LED digits,
//!   climate sensor, beeper, wake sensor, buttons, TFT panel, network and
//!   heap report in round-robin order, forever.

#![no_std]
#![no_main]

extern crate alloc;

mod heap;
mod net;

use cortex_m_rt::entry;
use defmt::*;
use embassy_executor::InterruptExecutor;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Flex, Input, Level, Output, Pull};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::{FLASH, PIO0, RTC, SPI1};
use embassy_rp::pio::{InterruptHandler as PioInterruptHandler, Pio};
use embassy_rp::pio_programs::ws2812::{PioWs2812, PioWs2812Program};
use embassy_rp::pwm::{self, Pwm};
use embassy_rp::rtc::Rtc;
use embassy_rp::spi::Spi;
use embassy_rp::Peri;
use embassy_time::{Delay, Duration, Ticker};
use static_cell::{ConstStaticCell, StaticCell};
use {defmt_rtt as _, panic_probe as _};

use beedesk_core::config::{parse_config, DeviceConfig};
use beedesk_core::traits::{DateTime, RealTimeClock};
use beedesk_core::{Context, PeriodicScheduler, RunFlag, SharedContext, SuspendScheduler};
use beedesk_display::segment::{INDICATOR_LEDS, LEDS_PER_DIGIT};
use beedesk_display::{Framebuffer, SpiInterface, St7735};
use beedesk_drivers::{Button, ButtonBank, Dht11, PwmBeeper, StatusLed};
use beedesk_hal::spi::SpiConfig;
use beedesk_hal_rp2040::board::{Board, TftPins};
use beedesk_hal_rp2040::pwm::PwmChannel;
use beedesk_hal_rp2040::{
    spi, BlockingWs2812, FlashAssets, RpFlex, RpInput, RpOutput, RpPwm, RpRtc, RpSpi, UptimeClock,
};
use beedesk_tasks::led::DIGITS;
use beedesk_tasks::{
    keys, BeepTask, ButtonTask, ClockTask, LedTask, MemStatsTask, SensorTask, StatusLedTask,
    TftTask, WakeupTask, WifiTask,
};

use crate::heap::HeapStats;
use crate::net::OfflineNetwork;

/// Embedded configuration (compiled into firmware)
/// Edit device.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../device.toml");

const PERIODIC_TASKS: usize = 2;
const SUSPEND_TASKS: usize = 8;

/// Largest panel the framebuffer is sized for
const FB_BYTES: usize = 80 * 160 * 2;

const DIGIT_LEDS: usize = DIGITS * LEDS_PER_DIGIT;

/// Beeper carrier before the first note
const BEEPER_IDLE_HZ: u32 = 2500;

/// Heap report interval
const MEM_REPORT_MS: u32 = 60_000;

/// Calendar time after a cold start, until the network sets it
const RTC_EPOCH: DateTime = DateTime {
    year: 2000,
    month: 1,
    day: 1,
    hour: 0,
    minute: 0,
    second: 0,
};

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
});

type Strip<const S: usize, const N: usize> = BlockingWs2812<'static, PIO0, S, N>;
type Leds = LedTask<Strip<0, DIGIT_LEDS>, Strip<1, DIGIT_LEDS>, Strip<2, INDICATOR_LEDS>>;
type Sensor = SensorTask<Dht11<RpFlex<'static>, Delay, UptimeClock>>;
type Beep = BeepTask<PwmBeeper<RpPwm<'static>>>;
type Buttons = ButtonTask<RpInput<'static>, 3>;
type TftIface = SpiInterface<RpSpi<'static, SPI1>, RpOutput<'static>, RpOutput<'static>>;
type Tft = TftTask<
    'static,
    TftIface,
    RpOutput<'static>,
    Delay,
    RpOutput<'static>,
    FlashAssets<'static>,
    UptimeClock,
>;
type Periodic = PeriodicScheduler<'static, UptimeClock, PERIODIC_TASKS>;

static CONTEXT: StaticCell<SharedContext> = StaticCell::new();
static RUN_FLAG: RunFlag = RunFlag::new();
static PERIODIC: StaticCell<Periodic> = StaticCell::new();
static FRAMEBUFFER: ConstStaticCell<[u8; FB_BYTES]> = ConstStaticCell::new([0; FB_BYTES]);

static CLOCK_TASK: StaticCell<ClockTask<RpRtc<'static, RTC>>> = StaticCell::new();
static STATUS_TASK: StaticCell<StatusLedTask<RpOutput<'static>>> = StaticCell::new();
static LED_TASK: StaticCell<Leds> = StaticCell::new();
static SENSOR_TASK: StaticCell<Sensor> = StaticCell::new();
static BEEP_TASK: StaticCell<Beep> = StaticCell::new();
static WAKEUP_TASK: StaticCell<WakeupTask<RpInput<'static>>> = StaticCell::new();
static BUTTON_TASK: StaticCell<Buttons> = StaticCell::new();
static TFT_TASK: StaticCell<Tft> = StaticCell::new();
static WIFI_TASK: StaticCell<WifiTask<OfflineNetwork>> = StaticCell::new();
static MEM_TASK: StaticCell<MemStatsTask<HeapStats>> = StaticCell::new();

static EXECUTOR_TICK: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_TICK.on_interrupt()
}

/// Drives the periodic kernel at its configured period
#[embassy_executor::task]
async fn periodic_task(kernel: &'static mut Periodic) {
    let mut ticker = Ticker::every(Duration::from_millis(u64::from(kernel.period_ms())));
    kernel.start();

    loop {
        ticker.next().await;
        kernel.tick();
    }
}

#[entry]
fn main() -> ! {
    info!("Beedesk firmware starting...");

    heap::init();

    let p = embassy_rp::init(Default::default());
    let board = Board::split(p);
    info!("Peripherals initialized");

    let config = load_config();

    let ctx: &'static SharedContext = CONTEXT.init(SharedContext::new(Context::new()));
    if let Err(e) = ctx.with(keys::seed) {
        error!("Failed to seed context: {:?}", e);
    }

    // LED digits on PIO0, one state machine per strip
    let Pio {
        mut common,
        sm0,
        sm1,
        sm2,
        ..
    } = Pio::new(board.leds.pio, Irqs);
    let program = PioWs2812Program::new(&mut common);
    let (dma0, dma1, dma2) = board.leds.dma;
    let minutes = PioWs2812::new(&mut common, sm0, dma0, board.leds.minutes, &program);
    let hours = PioWs2812::new(&mut common, sm1, dma1, board.leds.hours, &program);
    let colon = PioWs2812::new(&mut common, sm2, dma2, board.leds.colon, &program);
    let leds = LED_TASK.init(LedTask::new(
        BlockingWs2812::new(minutes),
        BlockingWs2812::new(hours),
        BlockingWs2812::new(colon),
    ));
    info!("LED strips initialized");

    // Calendar clock
    let mut rtc = RpRtc::new(Rtc::new(board.rtc));
    if rtc.now().is_err() {
        warn!("RTC not running, starting from epoch");
        if let Err(e) = rtc.set(&RTC_EPOCH) {
            error!("Failed to start RTC: {:?}", e);
        }
    }
    let clock = CLOCK_TASK.init(ClockTask::new(rtc));

    // Status LED
    let status_pin = RpOutput(Output::new(board.status_led, Level::Low));
    let status = STATUS_TASK.init(StatusLedTask::new(
        StatusLed::new(status_pin),
        config.status_led.disconnected_interval,
    ));

    // Climate sensor
    let dht = Dht11::new(RpFlex::new(Flex::new(board.dht)), Delay, UptimeClock);
    let sensor = SENSOR_TASK.init(SensorTask::new(dht, config.sensor.poll_interval_ms));

    // Beeper on PWM slice 7, channel A
    let pwm = Pwm::new_output_a(board.beeper_pwm, board.beeper, pwm::Config::default());
    let beeper = PwmBeeper::new(
        RpPwm::new(pwm, PwmChannel::A, BEEPER_IDLE_HZ),
        config.beeper.volume_permille,
    );
    let beep = BEEP_TASK.init(BeepTask::new(beeper));

    // Inputs: buttons close to 3V3, wake sensor drives high on presence
    let wakeup = WAKEUP_TASK.init(WakeupTask::new(RpInput(Input::new(board.wake, Pull::Down))));
    let bank = ButtonBank::new([
        (Button::Left, RpInput(Input::new(board.buttons.left, Pull::Down))),
        (Button::Bottom, RpInput(Input::new(board.buttons.bottom, Pull::Down))),
        (Button::Right, RpInput(Input::new(board.buttons.right, Pull::Down))),
    ])
    .with_debounce(3);
    let buttons = BUTTON_TASK.init(ButtonTask::new(bank));

    let tft = init_tft(board.tft, board.flash, &config);

    let wifi = WIFI_TASK.init(WifiTask::new(
        OfflineNetwork,
        config.wifi.clone(),
        config.status_led,
    ));
    let mem = MEM_TASK.init(MemStatsTask::new(HeapStats, MEM_REPORT_MS));

    // Periodic kernel
    let periodic = PERIODIC.init(PeriodicScheduler::new(
        ctx,
        UptimeClock,
        config.kernel.tick_period_ms,
    ));
    if let Err(e) = periodic.exec(clock) {
        error!("clock task not scheduled: {:?}", e);
    }
    if let Err(e) = periodic.exec(status) {
        error!("status task not scheduled: {:?}", e);
    }

    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let spawner = EXECUTOR_TICK.start(interrupt::SWI_IRQ_1);
    spawner.spawn(unwrap!(periodic_task(periodic)));
    info!("Periodic kernel running");

    // Suspend kernel
    let mut kernel: SuspendScheduler<'static, UptimeClock, SUSPEND_TASKS> =
        SuspendScheduler::new(ctx, UptimeClock, &RUN_FLAG);
    if let Err(e) = kernel.exec(leds) {
        error!("led task not scheduled: {:?}", e);
    }
    if let Err(e) = kernel.exec(sensor) {
        error!("sensor task not scheduled: {:?}", e);
    }
    if let Err(e) = kernel.exec(beep) {
        error!("beep task not scheduled: {:?}", e);
    }
    if let Err(e) = kernel.exec(wakeup) {
        error!("wakeup task not scheduled: {:?}", e);
    }
    if let Err(e) = kernel.exec(buttons) {
        error!("button task not scheduled: {:?}", e);
    }
    if let Some(tft) = tft {
        if let Err(e) = kernel.exec(tft) {
            error!("tft task not scheduled: {:?}", e);
        }
    }
    if let Err(e) = kernel.exec(wifi) {
        error!("wifi task not scheduled: {:?}", e);
    }
    if let Err(e) = kernel.exec(mem) {
        error!("memory task not scheduled: {:?}", e);
    }

    info!("All tasks scheduled, firmware running");
    kernel.setup_os();
    kernel.run_forever();

    warn!("Suspend kernel stopped");
    loop {
        cortex_m::asm::wfi();
    }
}

/// Parse the embedded device.toml, falling back to stock defaults
fn load_config() -> DeviceConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            // build.rs validates the file, so this only happens when the
            // on-target reader disagrees with it
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using default configuration");
            DeviceConfig::default()
        }
    }
}

/// Bring up the TFT transport and asset partition
///
/// Returns `None` when the panel cannot work at all: no asset partition or
/// a configured size larger than the framebuffer.
fn init_tft(
    pins: TftPins,
    flash: Peri<'static, FLASH>,
    config: &DeviceConfig,
) -> Option<&'static mut Tft> {
    let display = config.display;

    let assets = match FlashAssets::new(flash) {
        Ok(assets) => assets,
        Err(e) => {
            error!("Asset partition unusable: {:?}", e);
            return None;
        }
    };

    let fb_len = usize::from(display.width) * usize::from(display.height) * 2;
    let buf = FRAMEBUFFER.take();
    let Some(buf) = buf.get_mut(..fb_len) else {
        error!(
            "Panel {}x{} exceeds the framebuffer",
            display.width, display.height
        );
        return None;
    };
    let fb = match Framebuffer::new(buf, display.width, display.height) {
        Ok(fb) => fb,
        Err(e) => {
            error!("Framebuffer: {:?}", e);
            return None;
        }
    };

    let spi_config = spi::config(&SpiConfig::default());
    let bus = Spi::new_blocking_txonly(pins.spi, pins.sck, pins.mosi, spi_config);
    let iface = SpiInterface::new(
        RpSpi::new(bus),
        RpOutput(Output::new(pins.dc, Level::Low)),
        RpOutput(Output::new(pins.cs, Level::High)),
    );
    let rst = RpOutput(Output::new(pins.rst, Level::High));
    let panel = St7735::new(iface, rst, Delay, display.width, display.height)
        .with_offset(display.col_offset, display.row_offset);
    let backlight = RpOutput(Output::new(pins.backlight, Level::Low));

    info!("TFT initialized");
    Some(TFT_TASK.init(TftTask::new(
        panel,
        backlight,
        fb,
        assets,
        UptimeClock,
        display,
    )))
}
