//! Persistence-of-vision display for an RP2040-driven LED spinning on a hard-drive
//! platter.
//!
//! An index sensor fires once per revolution. The time between pulses gives the revolution period,
//! and a free-running counter since the last pulse gives the LED's angle. The LED is switched
//! on and off many times per revolution so the blinking resolves into a picture: a progress arc,
//! a radar sweep, or a clock face read from an external real-time clock.
//!
//! ## Crate layout
//!
//! | Module | Purpose |
//! | ------ | ------- |
//! | [`rotation`] | Index-pulse debounce, period averaging, angular position |
//! | [`animation`] | Timer-driven animation phase |
//! | [`clock`] | Real-time-clock reading and memoized hand angles |
//! | [`pattern`] | Position → lit patterns and the pattern selector |
//! | [`render`] | The render loop |
//! | [`interrupt`] | State shared with interrupt handlers |
//! | [`components`] | Counter, LED and RTC bus interfaces |
//!
//! ## Crate features
//!
//! - `rp2040`: Builds the firmware binary for an RP2040 board. Implies `defmt`.
//! - `defmt`: Logs through `defmt`. Off by default so the core can be tested on the host.
//! - `trace_periods`: Logs every index pulse, accepted or rejected. See
//!   [`rotation::RotationTracker::on_index_pulse`].
//! - `trace_positions`: Logs every computed position. Very noisy! See
//!   [`rotation::compute_position`].
//!
//! ## Demo
//!
//! The render loop can run anywhere the three hardware traits are implemented:
//!
//! ```no_run
//! use platter_pov::{
//!     animation::AnimationClock,
//!     components::{Actuator, RtcBus, TickCounter},
//!     config::{DisplayConfig, DEFAULT_HISTORY},
//!     interrupt::RotationCell,
//!     pattern::{Advance, Pattern, PatternSelector},
//!     render::Renderer,
//!     rotation::RotationTracker,
//! };
//!
//! static PLAYLIST: [Pattern; 2] = [Pattern::ClockFace, Pattern::Radar];
//!
//! fn run<C: TickCounter>(
//!     rotation: &RotationCell<C, DEFAULT_HISTORY>,
//!     animation: &AnimationClock,
//!     counter: C,
//!     bus: &mut impl RtcBus,
//!     led: &mut impl Actuator,
//! ) -> ! {
//!     let config = DisplayConfig::DEFAULT;
//!     rotation.install(counter, RotationTracker::new(&config));
//!     let mut renderer = Renderer::new(config, PatternSelector::new(&PLAYLIST, Advance::OnPhaseWrap));
//!     loop {
//!         // Interrupts call rotation.on_index_pulse() and animation.tick()
//!         renderer.step(rotation.snapshot(), animation, bus, led);
//!     }
//! }
//! ```

// Copyright 2026 platter_pov contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![no_std]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg), feature(doc_auto_cfg), feature(doc_cfg_hide))]

pub mod animation;
pub mod clock;
pub mod components;
pub mod config;
pub mod error;
pub mod interrupt;
pub mod pattern;
pub mod render;
pub mod rotation;

pub use error::{Error, Result};
