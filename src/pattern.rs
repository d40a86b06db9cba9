// SPDX-License-Identifier: Apache-2.0

//! Patterns: functions from angular position to LED on/off.
//!
//! Most patterns are pure functions of the position plus the animation phase or the clock hands.
//! The radar sweep keeps a direction flag, and the precalculated pattern reads a bitmap, so both
//! live on [`PatternEngine`].

#[cfg(feature = "defmt")]
use defmt::debug;

use crate::{
    animation::AnimationClock,
    clock::HandAngles,
    config::{DisplayConfig, POSITIONS},
    rotation::Position,
};

/// All available patterns
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pattern {
    /// Arc growing with the animation phase
    Progress,
    /// Window bouncing back and forth across the visible sector
    Radar,
    /// Dark window opening around a fixed centre
    MagicEye,
    /// First half of the revolution lit
    Half,
    /// Every odd position lit, for calibration
    EveryOther,
    /// Clock hands from the real-time clock
    ClockFace,
    /// Lookup in the bitmap filled by [`PatternEngine::precalculate`]
    Precalculated,
}

impl Pattern {
    /// Pattern reads the clock hands
    pub fn needs_clock(&self) -> bool {
        matches!(self, Self::ClockFace)
    }
}

/// Lit iff `position < phase`: `phase` positions out of 256
pub fn progress(position: Position, phase: u8) -> bool {
    position.get() < phase
}

/// Lit on the first half of the revolution
pub fn half(position: Position) -> bool {
    position.get() < 128
}

/// Lit on odd positions
pub fn every_other(position: Position) -> bool {
    position.get() % 2 == 1
}

/// Dark within `phase / 2` positions of `center` (exclusive), lit elsewhere
pub fn magic_eye(position: Position, phase: u8, center: Position) -> bool {
    position.distance(center) >= phase / 2
}

/// Clock face built from four hand bands combined with XOR.
///
/// Where two bands overlap they cancel out, so crossing hands blink dark rather than merging.
pub fn clock_face(position: Position, hands: &HandAngles, hand_width: u8) -> bool {
    let hour_band = if hands.afternoon {
        position > hands.hour
    } else {
        position < hands.hour
    };
    hour_band
        ^ (position.distance(hands.minute) <= hand_width)
        ^ (position.distance(hands.second) <= hand_width)
        ^ (position.distance(hands.centisecond) <= 1)
}

/// Radar sweep turned round at an end of the visible sector and restarted the animation
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bounce {
    /// Forward leg done, now sweeping back towards position 0
    Reversed,
    /// Reverse leg done: one full out-and-back sweep
    Returned,
}

/// Evaluates patterns, holding the state the stateful ones need
pub struct PatternEngine {
    /// Radar is sweeping away from position 0
    radar_forward: bool,
    /// Set by the radar when it restarts the animation, cleared by [`PatternEngine::take_bounce`]
    bounce: Option<Bounce>,
    /// One bit per position
    bitmap: [u32; POSITIONS / 32],
    visible_span: u8,
    radar_width: u8,
    eye_center: Position,
    hand_width: u8,
}

impl PatternEngine {
    /// Engine with an empty precalculated bitmap
    pub const fn new(config: &DisplayConfig) -> Self {
        Self {
            radar_forward: true,
            bounce: None,
            bitmap: [0; POSITIONS / 32],
            visible_span: config.visible_span,
            radar_width: config.radar_width,
            eye_center: Position::new(config.eye_center),
            hand_width: config.hand_width,
        }
    }

    /// Whether `pattern` lights the LED at `position`
    pub fn is_lit(
        &mut self,
        pattern: Pattern,
        position: Position,
        animation: &AnimationClock,
        hands: &HandAngles,
    ) -> bool {
        match pattern {
            Pattern::Progress => progress(position, animation.phase()),
            Pattern::Radar => self.radar(position, animation),
            Pattern::MagicEye => magic_eye(position, animation.phase(), self.eye_center),
            Pattern::Half => half(position),
            Pattern::EveryOther => every_other(position),
            Pattern::ClockFace => clock_face(position, hands, self.hand_width),
            Pattern::Precalculated => self.precalculated(position),
        }
    }

    /// Radar sweep of `radar_width` positions bouncing inside the visible sector.
    ///
    /// When the leading edge would pass the end of the sector the animation restarts at phase 1
    /// and the sweep reverses.
    fn radar(&mut self, position: Position, animation: &AnimationClock) -> bool {
        let arc_bound = u16::from(self.visible_span);
        let width = u16::from(self.radar_width);
        let mut phase = u16::from(animation.phase());
        if phase + width > arc_bound {
            animation.restart();
            self.radar_forward = !self.radar_forward;
            self.bounce = Some(if self.radar_forward {
                Bounce::Returned
            } else {
                Bounce::Reversed
            });
            phase = 1;
        }
        let start = if self.radar_forward {
            phase
        } else {
            arc_bound.saturating_sub(phase + width)
        };
        let position = u16::from(position.get());
        start <= position && position < start + width
    }

    /// Radar is currently sweeping forward
    pub fn radar_forward(&self) -> bool {
        self.radar_forward
    }

    /// Bounce since the last call, if the radar restarted the animation
    pub fn take_bounce(&mut self) -> Option<Bounce> {
        self.bounce.take()
    }

    fn precalculated(&self, position: Position) -> bool {
        let index = usize::from(position.get());
        self.bitmap[index / 32] & (1 << (index % 32)) != 0
    }

    /// Fill the bitmap read by [`Pattern::Precalculated`] by evaluating `source` at every position.
    ///
    /// Animated sources are frozen at the current phase. Precalculating
    /// [`Pattern::Precalculated`] itself leaves the bitmap unchanged.
    pub fn precalculate(&mut self, source: Pattern, animation: &AnimationClock, hands: &HandAngles) {
        if source == Pattern::Precalculated {
            return;
        }
        let mut bitmap = [0u32; POSITIONS / 32];
        for angle in 0..=u8::MAX {
            if self.is_lit(source, Position::new(angle), animation, hands) {
                let index = usize::from(angle);
                bitmap[index / 32] |= 1 << (index % 32);
            }
        }
        self.bitmap = bitmap;
        #[cfg(feature = "defmt")]
        debug!("Precalculated {} into bitmap", source);
    }
}

/// When the selector moves to the next pattern in its playlist
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Advance {
    /// Stay on the first pattern
    Fixed,
    /// Move on when the animation phase wraps around. The radar never wraps, so it hands over
    /// after a full out-and-back sweep instead.
    OnPhaseWrap,
}

/// Chooses the active pattern from a playlist
pub struct PatternSelector {
    playlist: &'static [Pattern],
    index: usize,
    advance: Advance,
    last_phase: u8,
}

impl PatternSelector {
    /// Shown when the playlist is empty
    const FALLBACK: Pattern = Pattern::Half;

    /// Selector starting at the first pattern of `playlist`
    pub const fn new(playlist: &'static [Pattern], advance: Advance) -> Self {
        Self {
            playlist,
            index: 0,
            advance,
            last_phase: 0,
        }
    }

    /// Selector that always shows `pattern`
    pub const fn fixed(pattern: &'static Pattern) -> Self {
        Self::new(core::slice::from_ref(pattern), Advance::Fixed)
    }

    /// Active pattern
    pub fn current(&self) -> Pattern {
        self.playlist
            .get(self.index)
            .copied()
            .unwrap_or(Self::FALLBACK)
    }

    /// Observe the animation phase and return the pattern to draw this cycle
    pub fn update(&mut self, phase: u8) -> Pattern {
        let wrapped = phase < self.last_phase;
        self.last_phase = phase;
        if wrapped {
            self.next();
        }
        self.current()
    }

    /// The active pattern restarted the animation, which now reads `phase`.
    ///
    /// The drop in phase is not a wrap. The playlist only moves on when `cycle_done` is set.
    pub fn on_restart(&mut self, phase: u8, cycle_done: bool) {
        self.last_phase = phase;
        if cycle_done {
            self.next();
        }
    }

    fn next(&mut self) {
        if self.advance == Advance::OnPhaseWrap && !self.playlist.is_empty() {
            self.index = (self.index + 1) % self.playlist.len();
            #[cfg(feature = "defmt")]
            debug!("Switching to pattern {}", self.current());
        }
    }
}
