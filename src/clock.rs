// SPDX-License-Identifier: Apache-2.0

//! Real-time-clock reading and the clock-face hand angles derived from it.
//!
//! The clock chip is only read while the LED is in the hidden sector, once per revolution. Hand
//! angles are recomputed lazily, the first time they are asked for after the reading changes.

#[cfg(feature = "defmt")]
use defmt::{debug, warn};

use crate::{
    components::RtcBus,
    config::DisplayConfig,
    error::{Error, Result},
    rotation::{Position, Sector},
};

/// First time register on the clock chip (hundredths of a second)
const TIME_REGISTER: u8 = 0x01;
/// Hours register: bits 0..=5 hold the BCD hour in 24-hour mode
const HOURS_MASK: u8 = 0x3F;

/// Time of day as read from the real-time clock
#[derive(Default, Debug, Eq, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockReading {
    /// 0-23
    pub hours: u8,
    /// 0-59
    pub minutes: u8,
    /// 0-59
    pub seconds: u8,
    /// 0-99
    pub centiseconds: u8,
}

impl ClockReading {
    /// Build a reading, rejecting fields outside their range
    pub fn new(hours: u8, minutes: u8, seconds: u8, centiseconds: u8) -> Result<Self> {
        let reading = Self {
            hours,
            minutes,
            seconds,
            centiseconds,
        };
        if reading.is_valid() {
            Ok(reading)
        } else {
            Err(Error::TimeOutOfRange)
        }
    }

    /// All fields within range
    pub fn is_valid(&self) -> bool {
        self.hours < 24 && self.minutes < 60 && self.seconds < 60 && self.centiseconds < 100
    }

    /// Seconds since midnight
    pub fn seconds_of_day(&self) -> u32 {
        u32::from(self.hours) * 3600 + u32::from(self.minutes) * 60 + u32::from(self.seconds)
    }

    /// Decode the four time registers, starting at hundredths of a second
    fn from_registers(registers: &[u8; 4]) -> Result<Self> {
        let [centis, secs, mins, hours] = *registers;
        Ok(Self {
            centiseconds: bcd_decode(TIME_REGISTER, centis, 0xFF, 99)?,
            seconds: bcd_decode(TIME_REGISTER + 1, secs, 0x7F, 59)?,
            minutes: bcd_decode(TIME_REGISTER + 2, mins, 0x7F, 59)?,
            hours: bcd_decode(TIME_REGISTER + 3, hours, HOURS_MASK, 23)?,
        })
    }

    /// Encode as a register write: start register, then the four time registers
    fn to_registers(self) -> [u8; 5] {
        [
            TIME_REGISTER,
            bcd_encode(self.centiseconds),
            bcd_encode(self.seconds),
            bcd_encode(self.minutes),
            // 24-hour mode: format bits left clear
            bcd_encode(self.hours),
        ]
    }
}

/// Decode the BCD digits of `value & mask`, rejecting non-decimal nibbles and values above `max`
pub fn bcd_decode(register: u8, value: u8, mask: u8, max: u8) -> Result<u8> {
    let digits = value & mask;
    let (tens, units) = (digits >> 4, digits & 0x0F);
    if tens > 9 || units > 9 || tens * 10 + units > max {
        return Err(Error::InvalidBcd { register, value });
    }
    Ok(tens * 10 + units)
}

/// Encode a value below 100 as two BCD digits
pub fn bcd_encode(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Angles of the clock hands, scaled onto the visible sector
#[derive(Default, Debug, Eq, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HandAngles {
    /// Hour hand, from `hours % 12`
    pub hour: Position,
    /// Minute hand
    pub minute: Position,
    /// Second hand
    pub second: Position,
    /// Centisecond hand
    pub centisecond: Position,
    /// Reading is at or after noon; the hour band is drawn from the hand to the end of the dial
    pub afternoon: bool,
}

impl HandAngles {
    /// Hand angles for `reading` on a dial spanning `visible_span` positions
    pub fn from_reading(reading: &ClockReading, visible_span: u8) -> Self {
        let scale = |value: u8, max: u32| {
            Position::new((u32::from(visible_span) * u32::from(value) / max) as u8)
        };
        Self {
            hour: scale(reading.hours % 12, 12),
            minute: scale(reading.minutes, 60),
            second: scale(reading.seconds, 60),
            centisecond: scale(reading.centiseconds, 100),
            afternoon: reading.hours >= 12,
        }
    }
}

/// Last reading from the real-time clock plus memoized hand angles.
///
/// Owned by the render loop; no interrupt touches it.
pub struct ClockCache {
    reading: ClockReading,
    hands: HandAngles,
    /// `(seconds of day, centiseconds)` the hands were last computed from
    hands_key: Option<(u32, u8)>,
    /// Set on entry to the hidden sector, cleared on leaving it
    refresh_armed: bool,
    recompute_count: u32,
    visible_span: u8,
    rtc_address: u8,
}

impl ClockCache {
    /// Cache showing midnight until the first refresh
    pub const fn new(config: &DisplayConfig) -> Self {
        Self {
            reading: ClockReading {
                hours: 0,
                minutes: 0,
                seconds: 0,
                centiseconds: 0,
            },
            hands: HandAngles {
                hour: Position::new(0),
                minute: Position::new(0),
                second: Position::new(0),
                centisecond: Position::new(0),
                afternoon: false,
            },
            hands_key: None,
            refresh_armed: false,
            recompute_count: 0,
            visible_span: config.visible_span,
            rtc_address: config.rtc_address,
        }
    }

    /// Fetch the time once per entry into the hidden sector.
    ///
    /// Returns `Ok(true)` when a new reading was fetched. On a bus or decode error the previous
    /// reading is kept; the next revolution tries again.
    pub fn refresh_if_entering(&mut self, sector: Sector, bus: &mut impl RtcBus) -> Result<bool> {
        match sector {
            Sector::Visible => {
                self.disarm();
                Ok(false)
            }
            Sector::Hidden if self.refresh_armed => Ok(false),
            Sector::Hidden => {
                self.refresh_armed = true;
                self.refresh(bus).map(|()| true)
            }
        }
    }

    /// LED has left the hidden sector: the next entry fetches the time again
    pub fn disarm(&mut self) {
        self.refresh_armed = false;
    }

    /// Read and decode the time registers
    pub fn refresh(&mut self, bus: &mut impl RtcBus) -> Result<()> {
        let mut registers = [0u8; 4];
        bus.write_then_read(self.rtc_address, TIME_REGISTER, &mut registers)
            .and_then(|()| ClockReading::from_registers(&registers))
            .map(|reading| self.reading = reading)
            .inspect_err(|_err| {
                #[cfg(feature = "defmt")]
                warn!("Keeping previous time, RTC read failed: {}", _err);
            })
    }

    /// Write `reading` to the real-time clock and show it immediately
    pub fn set_time(&mut self, reading: ClockReading, bus: &mut impl RtcBus) -> Result<()> {
        if !reading.is_valid() {
            return Err(Error::TimeOutOfRange);
        }
        bus.write(self.rtc_address, &reading.to_registers())?;
        #[cfg(feature = "defmt")]
        debug!("RTC set to {}", reading);
        self.reading = reading;
        Ok(())
    }

    /// Replace the cached reading without touching the clock chip
    pub fn replace_reading(&mut self, reading: ClockReading) {
        self.reading = reading;
    }

    /// Most recent reading
    pub fn reading(&self) -> ClockReading {
        self.reading
    }

    /// Hand angles for the current reading, recomputed only if the reading changed
    pub fn hand_angles(&mut self) -> HandAngles {
        let key = (self.reading.seconds_of_day(), self.reading.centiseconds);
        if self.hands_key != Some(key) {
            self.hands = HandAngles::from_reading(&self.reading, self.visible_span);
            self.hands_key = Some(key);
            self.recompute_count = self.recompute_count.wrapping_add(1);
        }
        self.hands
    }

    /// Number of times the hand angles have been recomputed
    pub fn recompute_count(&self) -> u32 {
        self.recompute_count
    }
}
