// SPDX-License-Identifier: Apache-2.0

//! Rotation tracking: index-pulse debounce, period averaging and angular position.

#[cfg(feature = "defmt")]
use defmt::{debug, Format, Formatter};

use crate::{components::TickCounter, config::DisplayConfig};

/// Location around the platter, 256 steps per revolution. Arithmetic wraps at a full turn.
#[derive(Default, Debug, Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Hash)]
pub struct Position(u8);

impl Position {
    /// Wrap a raw angle
    pub const fn new(angle: u8) -> Self {
        Self(angle)
    }

    /// Get the raw angle
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Shortest distance around the circle between two positions, in either direction
    pub fn distance(&self, other: Position) -> u8 {
        let forward = self.0.wrapping_sub(other.0);
        let backward = other.0.wrapping_sub(self.0);
        forward.min(backward)
    }

    /// Sector of the revolution this position lies in
    pub fn sector(&self, visible_span: u8) -> Sector {
        if self.0 < visible_span {
            Sector::Visible
        } else {
            Sector::Hidden
        }
    }
}

#[cfg(feature = "defmt")]
impl Format for Position {
    fn format(&self, fmt: Formatter) {
        defmt::write!(fmt, "{=u8}/256", self.0)
    }
}

/// Part of the revolution the LED is currently passing
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sector {
    /// The LED can be seen; patterns are drawn
    Visible,
    /// The LED is behind the mount; output is forced off
    Hidden,
}

/// Result of offering an index pulse to the [`RotationTracker`]
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pulse {
    /// Pulse accepted; carries the new average period
    Accepted(u32),
    /// Pulse arrived too soon after the previous one and was ignored
    Bounce,
}

/// Ring buffer of the most recent revolution periods, in counter ticks.
///
/// Slots are filled oldest-first; once full, each new period overwrites the oldest.
#[derive(Debug, Clone)]
pub struct PeriodHistory<const N: usize> {
    periods: [u32; N],
    /// Next slot to write
    head: usize,
    /// Number of slots written so far, saturating at `N`
    filled: usize,
}

impl<const N: usize> PeriodHistory<N> {
    /// Empty history
    pub const fn new() -> Self {
        assert!(N > 0, "period history needs at least one slot");
        Self {
            periods: [0; N],
            head: 0,
            filled: 0,
        }
    }

    /// Record a new period, overwriting the oldest once the buffer is full
    pub fn insert(&mut self, period: u32) {
        self.periods[self.head] = period;
        self.head = (self.head + 1) % N;
        if self.filled < N {
            self.filled += 1;
        }
    }

    /// Integer mean of the recorded periods, or 0 before the first one
    pub fn average(&self) -> u32 {
        if self.filled == 0 {
            return 0;
        }
        let sum: u64 = self.recorded().iter().map(|&period| u64::from(period)).sum();
        // Mean of u32 values always fits in a u32
        (sum / self.filled as u64) as u32
    }

    /// Periods recorded so far, in slot order
    pub fn recorded(&self) -> &[u32] {
        &self.periods[..self.filled]
    }

    /// Number of slots
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for PeriodHistory<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns index pulses into an averaged revolution period.
///
/// Owned by the index-pulse interrupt, which is the only writer of the history. The render loop
/// only ever sees [`RotationTracker::average`], published through
/// [`RotationCell`](crate::interrupt::RotationCell).
#[derive(Debug, Clone)]
pub struct RotationTracker<const N: usize> {
    history: PeriodHistory<N>,
    average: u32,
    debounce_ticks: u32,
}

impl<const N: usize> RotationTracker<N> {
    /// Tracker with no measured revolution
    pub const fn new(config: &DisplayConfig) -> Self {
        Self {
            history: PeriodHistory::new(),
            average: 0,
            debounce_ticks: config.debounce_ticks,
        }
    }

    /// Handle an index pulse with the counter value `raw` ticks since the last accepted pulse.
    ///
    /// Pulses at or below the debounce threshold leave the history and the counter untouched.
    /// Accepted pulses record `raw` as a period, refresh the average and reset `counter`.
    pub fn on_index_pulse(&mut self, raw: u32, counter: &mut impl TickCounter) -> Pulse {
        if raw <= self.debounce_ticks {
            #[cfg(feature = "trace_periods")]
            defmt::trace!("Index pulse after {=u32} ticks rejected as bounce", raw);
            return Pulse::Bounce;
        }

        #[cfg(feature = "defmt")]
        if self.average == 0 {
            debug!("First revolution measured: {=u32} ticks", raw);
        }
        self.history.insert(raw);
        self.average = self.history.average();
        counter.reset();

        #[cfg(feature = "trace_periods")]
        defmt::trace!(
            "Index pulse: period {=u32} ticks, average {=u32}",
            raw,
            self.average
        );
        Pulse::Accepted(self.average)
    }

    /// Average revolution period in ticks; 0 until the first accepted pulse
    pub fn average(&self) -> u32 {
        self.average
    }

    /// Recorded periods
    pub fn history(&self) -> &PeriodHistory<N> {
        &self.history
    }
}

/// Position of the LED `ticks` after the index pulse, for a revolution lasting `average` ticks.
///
/// Returns `None` while no revolution has been measured (`average == 0`). The counter is allowed
/// to run past `average` when the platter slows down; the position then wraps around.
///
/// The angle is measured against the direction of rotation, and shifted by `mount_offset` to line
/// up with the LED rather than the sensor.
pub fn compute_position(ticks: u32, average: u32, mount_offset: u8) -> Option<Position> {
    if average == 0 {
        return None;
    }
    // 16 fractional bits of a revolution
    let fraction = (u64::from(ticks) << 16) / u64::from(average);
    let angle = ((fraction * u64::from(u8::MAX)) >> 16) as u8;
    let offset_angle = angle.wrapping_add(mount_offset);
    let position = Position(0u8.wrapping_sub(offset_angle));

    #[cfg(feature = "trace_positions")]
    defmt::trace!("{=u32}/{=u32} ticks -> {}", ticks, average, position);
    Some(position)
}
