// SPDX-License-Identifier: Apache-2.0

//! Persistence-of-vision clock on a spinning hard-drive platter, for an RP2040 board.
#![no_std]
#![no_main]
#![doc(html_playground_url = "https://play.rust-lang.org/")]
#![warn(missing_docs)]

use cortex_m::peripheral::NVIC;
use defmt::{debug, info, warn};
use embedded_hal::digital::InputPin;
#[allow(unused_imports)]
use defmt_rtt as _;
#[allow(unused_imports)]
use panic_probe as _;
use rp2040_hal::{
    clocks::init_clocks_and_plls,
    entry,
    fugit::{MicrosDurationU32, RateExtU32},
    gpio::{
        FunctionI2C,
        Interrupt::{EdgeHigh, EdgeLow},
        Pin, Pins, PullUp,
    },
    pac,
    pac::interrupt,
    prelude::*,
    timer::Alarm,
    Sio, Timer, Watchdog, I2C,
};

use platter_pov::{
    components::{Led, Polarity, TimerCounter},
    config::DisplayConfig,
    interrupt::{ALIGNMENT_LED, ANIMATION, ANIMATION_ALARM, INDEX_SENSOR, ROTATION},
    pattern::{Advance, Pattern, PatternSelector},
    render::Renderer,
    rotation::RotationTracker,
};

/// Second-stage bootloader, from [rp2040-boot2](https://docs.rs/rp2040-boot2)
#[link_section = ".boot2"]
#[used]
pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_W25Q080;
/// External high-speed crystal on the pico board is 12Mhz
pub const XOSC_FREQ_HZ: u32 = 12_000_000;
/// Animation phase advances every 20 ms: a full 256-step cycle takes about 5 s
pub const ANIMATION_TICK: MicrosDurationU32 = MicrosDurationU32::millis(20);
/// Display geometry of the reference build
pub const CONFIG: DisplayConfig = DisplayConfig::DEFAULT;
/// Patterns shown in turn, one per animation cycle
pub static PLAYLIST: [Pattern; 4] = [
    Pattern::ClockFace,
    Pattern::Progress,
    Pattern::Radar,
    Pattern::MagicEye,
];

/// Main operation loop
#[entry]
fn main() -> ! {
    info!("Display startup");
    let mut pac = pac::Peripherals::take().unwrap();
    let mut core = cortex_m::Peripherals::take().unwrap();
    let mut watchdog = Watchdog::new(pac.WATCHDOG);
    let sio = Sio::new(pac.SIO);

    let clocks = init_clocks_and_plls(
        XOSC_FREQ_HZ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();
    let pins = Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    // LED on the arm
    let mut led = Led::new(pins.gpio16.into_push_pull_output(), Polarity::ActiveHigh);
    // On-board LED echoes the index sensor, for lining it up by hand
    let alignment_led = Led::new(pins.gpio25.into_push_pull_output(), Polarity::ActiveHigh);
    debug!("critical_section: init alignment LED");
    critical_section::with(|cs| ALIGNMENT_LED.replace(cs, Some(alignment_led)));

    // Real-time clock
    let sda: Pin<_, FunctionI2C, PullUp> = pins.gpio4.reconfigure();
    let scl: Pin<_, FunctionI2C, PullUp> = pins.gpio5.reconfigure();
    let mut rtc_bus = I2C::i2c0(
        pac.I2C0,
        sda,
        scl,
        100.kHz(),
        &mut pac.RESETS,
        &clocks.system_clock,
    );

    // Counter service: 1 MHz system timer, reset on every index pulse
    let mut timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);
    ROTATION.install(TimerCounter::new(timer), RotationTracker::new(&CONFIG));

    // Index sensor pulls the line low once per revolution. The rising edge only updates the
    // alignment LED.
    let index_sensor = pins.gpio15.into_pull_up_input();
    index_sensor.set_interrupt_enabled(EdgeLow, true);
    index_sensor.set_interrupt_enabled(EdgeHigh, true);
    debug!("critical_section: init index sensor");
    critical_section::with(|cs| INDEX_SENSOR.replace(cs, Some(index_sensor)));

    // Animation clock
    let mut alarm = timer.alarm_0().unwrap();
    alarm.schedule(ANIMATION_TICK).unwrap();
    alarm.enable_interrupt();
    debug!("critical_section: init animation alarm");
    critical_section::with(|cs| ANIMATION_ALARM.replace(cs, Some(alarm)));

    let mut renderer = Renderer::new(CONFIG, PatternSelector::new(&PLAYLIST, Advance::OnPhaseWrap));
    match renderer.clock().refresh(&mut rtc_bus) {
        Ok(()) => info!("RTC time is {}", renderer.clock().reading()),
        Err(err) => warn!("RTC not readable at startup: {}", err),
    }

    // SAFETY: the handlers only touch statics guarded by critical sections or atomics. The index
    // sensor may preempt the animation alarm, so pulse timing does not wait for it.
    unsafe {
        core.NVIC.set_priority(pac::Interrupt::IO_IRQ_BANK0, 0x00);
        core.NVIC.set_priority(pac::Interrupt::TIMER_IRQ_0, 0x40);
        NVIC::unmask(pac::Interrupt::IO_IRQ_BANK0);
        NVIC::unmask(pac::Interrupt::TIMER_IRQ_0);
    }
    info!("Waiting for the platter to spin up");

    loop {
        renderer.step(ROTATION.snapshot(), &ANIMATION, &mut rtc_bus, &mut led);
    }
}

/// Index sensor edge: measure the revolution that just finished, and echo the sensor level
#[interrupt]
fn IO_IRQ_BANK0() {
    critical_section::with(|cs| {
        let mut sensor = INDEX_SENSOR.borrow_ref_mut(cs);
        let Some(sensor) = sensor.as_mut() else {
            return;
        };
        let falling = sensor.interrupt_status(EdgeLow);
        sensor.clear_interrupt(EdgeLow);
        sensor.clear_interrupt(EdgeHigh);
        let mark_present = InputPin::is_low(sensor).unwrap_or(false);
        ROTATION.on_sensor_edge(
            falling,
            mark_present,
            ALIGNMENT_LED.borrow_ref_mut(cs).as_mut(),
        );
    });
}

/// Animation alarm: advance the phase and re-arm
#[interrupt]
fn TIMER_IRQ_0() {
    critical_section::with(|cs| {
        if let Some(alarm) = ANIMATION_ALARM.borrow_ref_mut(cs).as_mut() {
            alarm.clear_interrupt();
            if let Err(err) = alarm.schedule(ANIMATION_TICK) {
                warn!("Animation alarm not re-armed: {}", defmt::Debug2Format(&err));
            }
        }
    });
    ANIMATION.tick();
}
