// SPDX-License-Identifier: Apache-2.0

//! Crate error type.
//!
//! Nothing in the display core is fatal: every error here is reported to the caller, which keeps
//! its previous state and tries again on the next revolution.

use derive_more::derive::{Display, Error};

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors raised while talking to the real-time clock.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The bus transaction with the real-time clock did not complete
    #[display("RTC bus transaction failed")]
    Bus,

    /// A time register held a byte that is not valid BCD, or a field out of range
    #[display("RTC register {register:#04x} holds invalid BCD value {value:#04x}")]
    InvalidBcd {
        /// Register address on the RTC
        register: u8,
        /// Raw byte read from the register
        value: u8,
    },

    /// A clock reading to be written is outside 24h/60m/60s/100cs
    #[display("clock reading out of range")]
    TimeOutOfRange,
}
