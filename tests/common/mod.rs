//! Host-side stand-ins for the counter, LED and RTC bus.
#![allow(dead_code)]

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use platter_pov::{
    clock::bcd_encode,
    components::{Actuator, RtcBus, TickCounter},
    Error, Result,
};

/// Counter whose value is set by the test
#[derive(Default)]
pub struct MockCounter {
    pub ticks: u32,
    pub resets: u32,
}

impl MockCounter {
    pub fn at(ticks: u32) -> Self {
        Self { ticks, resets: 0 }
    }
}

impl TickCounter for MockCounter {
    fn ticks(&self) -> u32 {
        self.ticks
    }

    fn reset(&mut self) {
        self.ticks = 0;
        self.resets += 1;
    }
}

/// RTC serving fixed BCD time registers
#[derive(Default)]
pub struct MockRtc {
    /// Hundredths, seconds, minutes, hours as BCD
    pub registers: [u8; 4],
    pub reads: u32,
    pub fail: bool,
    pub last_write: Option<(u8, [u8; 5])>,
}

impl MockRtc {
    pub fn at(hours: u8, minutes: u8, seconds: u8, centiseconds: u8) -> Self {
        Self {
            registers: [
                bcd_encode(centiseconds),
                bcd_encode(seconds),
                bcd_encode(minutes),
                bcd_encode(hours),
            ],
            ..Self::default()
        }
    }
}

impl RtcBus for MockRtc {
    fn write_then_read(&mut self, _address: u8, register: u8, buffer: &mut [u8]) -> Result<()> {
        self.reads += 1;
        if self.fail {
            return Err(Error::Bus);
        }
        assert_eq!(register, 0x01, "time registers start at hundredths");
        buffer.copy_from_slice(&self.registers[..buffer.len()]);
        Ok(())
    }

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<()> {
        if self.fail {
            return Err(Error::Bus);
        }
        let mut written = [0u8; 5];
        written.copy_from_slice(bytes);
        self.last_write = Some((address, written));
        self.registers.copy_from_slice(&bytes[1..]);
        Ok(())
    }
}

/// LED recording what was written to it
#[derive(Default)]
pub struct MockLed {
    pub lit: Option<bool>,
    pub writes: u32,
}

impl Actuator for MockLed {
    fn set_lit(&mut self, lit: bool) {
        self.lit = Some(lit);
        self.writes += 1;
    }
}

/// Output pin recording its level
#[derive(Default)]
pub struct MockPin {
    pub high: Option<bool>,
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.high = Some(false);
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        self.high = Some(true);
        Ok(())
    }
}
