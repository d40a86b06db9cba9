// SPDX-License-Identifier: Apache-2.0

//! The render loop: one iteration per call to [`Renderer::step`].
//!
//! Each iteration derives the LED position from a rotation snapshot. In the visible sector the
//! active pattern is drawn; in the hidden sector the LED is switched off and the real-time clock
//! is read once per entry.

#[cfg(feature = "defmt")]
use defmt::debug;

use crate::{
    animation::AnimationClock,
    clock::{ClockCache, HandAngles},
    components::{Actuator, RtcBus},
    config::DisplayConfig,
    interrupt::RotationSnapshot,
    pattern::{Bounce, Pattern, PatternEngine, PatternSelector},
    rotation::{Position, Sector},
};

/// What a render iteration did
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Frame {
    /// No revolution measured yet; the LED was left alone
    Suspended,
    /// `pattern` was drawn at `position`
    Visible {
        /// LED position
        position: Position,
        /// Pattern drawn
        pattern: Pattern,
        /// LED state written
        lit: bool,
    },
    /// LED forced off at `position`
    Hidden {
        /// LED position
        position: Position,
        /// A new clock reading was fetched this iteration
        refreshed: bool,
    },
}

/// Render loop state: pattern engine, selector and clock cache
pub struct Renderer {
    config: DisplayConfig,
    engine: PatternEngine,
    selector: PatternSelector,
    clock: ClockCache,
    /// Sector of the previous iteration, for logging transitions
    last_sector: Option<Sector>,
}

impl Renderer {
    /// Renderer for `config`, drawing patterns chosen by `selector`
    pub const fn new(config: DisplayConfig, selector: PatternSelector) -> Self {
        Self {
            engine: PatternEngine::new(&config),
            clock: ClockCache::new(&config),
            config,
            selector,
            last_sector: None,
        }
    }

    /// Run one iteration of the render loop.
    ///
    /// `snapshot` is `None` before the rotation state is installed, which is treated the same as an
    /// unmeasured revolution.
    pub fn step(
        &mut self,
        snapshot: Option<RotationSnapshot>,
        animation: &AnimationClock,
        bus: &mut impl RtcBus,
        led: &mut impl Actuator,
    ) -> Frame {
        let Some(position) = snapshot.and_then(|snapshot| snapshot.position(&self.config)) else {
            return Frame::Suspended;
        };
        let pattern = self.selector.update(animation.phase());
        let sector = position.sector(self.config.visible_span);

        #[cfg(feature = "defmt")]
        if self.last_sector.is_none() {
            debug!("Rendering started at {}", position);
        }
        self.last_sector = Some(sector);

        match sector {
            Sector::Visible => {
                self.clock.disarm();
                let hands = if pattern.needs_clock() {
                    self.clock.hand_angles()
                } else {
                    HandAngles::default()
                };
                let lit = self.engine.is_lit(pattern, position, animation, &hands);
                led.set_lit(lit);
                self.settle_bounce(animation);
                Frame::Visible {
                    position,
                    pattern,
                    lit,
                }
            }
            Sector::Hidden => {
                led.set_lit(false);
                let refreshed = self.clock.refresh_if_entering(sector, bus).unwrap_or(false);
                Frame::Hidden {
                    position,
                    refreshed,
                }
            }
        }
    }

    /// Fill the precalculated bitmap from `source`, using the current clock hands
    pub fn precalculate(&mut self, source: Pattern, animation: &AnimationClock) {
        let hands = self.clock.hand_angles();
        self.engine.precalculate(source, animation, &hands);
        self.settle_bounce(animation);
    }

    /// Tell the selector about a radar restart so it is not mistaken for a phase wrap
    fn settle_bounce(&mut self, animation: &AnimationClock) {
        if let Some(bounce) = self.engine.take_bounce() {
            self.selector
                .on_restart(animation.phase(), bounce == Bounce::Returned);
        }
    }

    /// Clock cache, for reading or setting the time
    pub fn clock(&mut self) -> &mut ClockCache {
        &mut self.clock
    }

    /// Pattern currently selected
    pub fn pattern(&self) -> Pattern {
        self.selector.current()
    }

    /// Sector the LED was in on the last rendered iteration
    pub fn sector(&self) -> Option<Sector> {
        self.last_sector
    }

    /// Display geometry
    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }
}
