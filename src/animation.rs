// SPDX-License-Identifier: Apache-2.0

//! Free-running animation phase, advanced by a fixed-rate timer interrupt.
//!
//! Animations driven by the phase run at wall-clock speed, whatever the platter is doing.

use core::sync::atomic::{AtomicU8, Ordering};

/// Byte-wide phase counter shared between the timer interrupt and the render loop.
///
/// The timer interrupt is the only context that calls [`AnimationClock::tick`]. Byte loads and
/// stores are single instructions, so only the read-modify-write in
/// [`AnimationClock::restart`] needs a critical section.
pub struct AnimationClock {
    phase: AtomicU8,
}

impl AnimationClock {
    /// Clock starting at phase 0
    pub const fn new() -> Self {
        Self {
            phase: AtomicU8::new(0),
        }
    }

    /// Advance the phase by one, wrapping at 256. Call from the animation timer interrupt only.
    pub fn tick(&self) {
        // Plain load/store: thumbv6m has no atomic read-modify-write
        let next = self.phase.load(Ordering::Relaxed).wrapping_add(1);
        self.phase.store(next, Ordering::Relaxed);
    }

    /// Current phase
    pub fn phase(&self) -> u8 {
        self.phase.load(Ordering::Relaxed)
    }

    /// Restart the phase at 1 from outside the timer interrupt
    pub fn restart(&self) {
        critical_section::with(|_| self.phase.store(1, Ordering::Relaxed));
    }
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new()
    }
}
