// SPDX-License-Identifier: Apache-2.0

//! State shared between interrupt handlers and the render loop, plus the firmware's statics.
//!
//! Index-pulse state sits behind a [`Mutex`]: the interrupt is its only writer, and the render
//! loop reads the counter and the average period together in one critical section so it never
//! sees a half-updated pair.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::{
    components::{Actuator, TickCounter},
    config::DisplayConfig,
    rotation::{compute_position, Position, Pulse, RotationTracker},
};

/// Counter and average period captured together
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RotationSnapshot {
    /// Ticks since the last accepted index pulse
    pub ticks: u32,
    /// Average revolution period; 0 while unmeasured
    pub average: u32,
}

impl RotationSnapshot {
    /// LED position at the moment of the snapshot, `None` while no revolution has been measured
    pub fn position(&self, config: &DisplayConfig) -> Option<Position> {
        compute_position(self.ticks, self.average, config.mount_offset)
    }
}

/// Counter service and rotation tracker, owned by the index-pulse interrupt
struct RotationState<C, const N: usize> {
    counter: C,
    tracker: RotationTracker<N>,
}

/// Index-pulse state shared between the pulse interrupt (writer) and the render loop (reader)
pub struct RotationCell<C, const N: usize> {
    inner: Mutex<RefCell<Option<RotationState<C, N>>>>,
}

impl<C: TickCounter, const N: usize> RotationCell<C, N> {
    /// Empty cell; index pulses are ignored until [`RotationCell::install`]
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Hand the counter and tracker over to the cell
    pub fn install(&self, counter: C, tracker: RotationTracker<N>) {
        #[cfg(feature = "defmt")]
        defmt::debug!("critical_section: install rotation state");
        critical_section::with(|cs| {
            self.inner
                .replace(cs, Some(RotationState { counter, tracker }));
        });
    }

    /// Index-pulse interrupt entry point. `None` if nothing has been installed yet.
    pub fn on_index_pulse(&self) -> Option<Pulse> {
        critical_section::with(|cs| {
            let mut state = self.inner.borrow_ref_mut(cs);
            let RotationState { counter, tracker } = state.as_mut()?;
            let raw = counter.ticks();
            Some(tracker.on_index_pulse(raw, counter))
        })
    }

    /// Sensor interrupt firing on both edges, with an optional LED mirroring the sensor.
    ///
    /// Only a `falling` edge measures a revolution. The echo shows `mark_present` afterwards, so
    /// the sensor can be aligned by eye while the platter turns by hand.
    pub fn on_sensor_edge(
        &self,
        falling: bool,
        mark_present: bool,
        echo: Option<&mut impl Actuator>,
    ) -> Option<Pulse> {
        let pulse = if falling { self.on_index_pulse() } else { None };
        if let Some(echo) = echo {
            echo.set_lit(mark_present);
        }
        pulse
    }

    /// Read the counter and the average period with interrupts masked
    pub fn snapshot(&self) -> Option<RotationSnapshot> {
        critical_section::with(|cs| {
            self.inner
                .borrow_ref(cs)
                .as_ref()
                .map(|state| RotationSnapshot {
                    ticks: state.counter.ticks(),
                    average: state.tracker.average(),
                })
        })
    }

    /// Run `f` on the installed tracker
    pub fn with_tracker<R>(&self, f: impl FnOnce(&RotationTracker<N>) -> R) -> Option<R> {
        critical_section::with(|cs| self.inner.borrow_ref(cs).as_ref().map(|state| f(&state.tracker)))
    }
}

impl<C: TickCounter, const N: usize> Default for RotationCell<C, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "rp2040")]
pub use firmware::*;

/// Statics used by the RP2040 interrupt handlers
#[cfg(feature = "rp2040")]
mod firmware {
    use core::cell::RefCell;

    use critical_section::Mutex;
    use rp2040_hal::{
        gpio::{
            bank0::{Gpio15, Gpio25},
            FunctionSioInput, FunctionSioOutput, Pin, PullDown, PullUp,
        },
        timer::Alarm0,
    };

    use super::RotationCell;
    use crate::{
        animation::AnimationClock,
        components::{Led, TimerCounter},
        config::DEFAULT_HISTORY,
    };

    /// Index sensor input, active low
    pub type IndexSensor = Pin<Gpio15, FunctionSioInput, PullUp>;
    /// On-board LED mirroring the index sensor
    pub type AlignmentLed = Led<Pin<Gpio25, FunctionSioOutput, PullDown>>;

    /// Rotation state for the index-pulse interrupt and the render loop
    pub static ROTATION: RotationCell<TimerCounter, DEFAULT_HISTORY> = RotationCell::new();
    /// Animation phase advanced by the timer interrupt
    pub static ANIMATION: AnimationClock = AnimationClock::new();
    /// Index sensor pin, for clearing its edge interrupt
    pub static INDEX_SENSOR: Mutex<RefCell<Option<IndexSensor>>> = Mutex::new(RefCell::new(None));
    /// Lit while the index mark is under the sensor
    pub static ALIGNMENT_LED: Mutex<RefCell<Option<AlignmentLed>>> = Mutex::new(RefCell::new(None));
    /// Alarm driving the animation clock
    pub static ANIMATION_ALARM: Mutex<RefCell<Option<Alarm0>>> = Mutex::new(RefCell::new(None));
}
