// SPDX-License-Identifier: Apache-2.0

//! Hardware the display core talks to: tick counter, LED, real-time-clock bus.
//!
//! Each is a narrow trait so the core can run against mocks on the host. Adapters for
//! [`embedded_hal`] pins and I2C buses are provided here; the RP2040 counter is behind the `rp2040`
//! feature.
use core::convert::Infallible;

use embedded_hal::{digital::OutputPin, i2c::I2c};

use crate::error::{Error, Result};

/// Free-running tick counter, zeroed on every accepted index pulse
pub trait TickCounter {
    /// Ticks elapsed since the last reset
    fn ticks(&self) -> u32;
    /// Restart counting from zero
    fn reset(&mut self);
}

/// The LED on the spinning arm
pub trait Actuator {
    /// Switch the LED on (`true`) or off
    fn set_lit(&mut self, lit: bool);
}

/// Request/response transactions with the real-time-clock chip
pub trait RtcBus {
    /// Write `register` to the device at `address`, then read `buffer.len()` bytes back
    fn write_then_read(&mut self, address: u8, register: u8, buffer: &mut [u8]) -> Result<()>;
    /// Write `bytes` (register address first) to the device at `address`
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<()>;
}

impl<B: I2c> RtcBus for B {
    fn write_then_read(&mut self, address: u8, register: u8, buffer: &mut [u8]) -> Result<()> {
        self.write_read(address, &[register], buffer)
            .map_err(|_| Error::Bus)
    }

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<()> {
        I2c::write(self, address, bytes).map_err(|_| Error::Bus)
    }
}

/// Which pin level lights the LED
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// LED anode on the pin
    ActiveHigh,
    /// LED cathode on the pin
    ActiveLow,
}

/// LED driven by a GPIO output pin whose writes cannot fail
pub struct Led<P> {
    pin: P,
    polarity: Polarity,
}

impl<P: OutputPin<Error = Infallible>> Led<P> {
    /// Wrap `pin` and switch the LED off
    pub fn new(pin: P, polarity: Polarity) -> Self {
        let mut led = Self { pin, polarity };
        led.set_lit(false);
        led
    }

    /// Consume the wrapper and return the underlying pin
    pub fn free(self) -> P {
        self.pin
    }
}

impl<P: OutputPin<Error = Infallible>> Actuator for Led<P> {
    fn set_lit(&mut self, lit: bool) {
        let high = match self.polarity {
            Polarity::ActiveHigh => lit,
            Polarity::ActiveLow => !lit,
        };
        self.pin
            .set_state(high.into())
            .unwrap_or_else(|never| match never {});
    }
}

#[cfg(feature = "rp2040")]
pub use rp2040::TimerCounter;

#[cfg(feature = "rp2040")]
mod rp2040 {
    use rp2040_hal::Timer;

    use super::TickCounter;

    /// Counter service on the RP2040's 1 MHz system timer.
    ///
    /// The hardware timer cannot be cleared, so a reset records the current count as the new epoch.
    pub struct TimerCounter {
        timer: Timer,
        epoch: u32,
    }

    impl TimerCounter {
        /// Start counting from now
        pub fn new(timer: Timer) -> Self {
            let epoch = timer.get_counter_low();
            Self { timer, epoch }
        }
    }

    impl TickCounter for TimerCounter {
        fn ticks(&self) -> u32 {
            self.timer.get_counter_low().wrapping_sub(self.epoch)
        }

        fn reset(&mut self) {
            self.epoch = self.timer.get_counter_low();
        }
    }
}
