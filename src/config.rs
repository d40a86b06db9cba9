// SPDX-License-Identifier: Apache-2.0

//! Display geometry and timing constants.

/// Number of distinct angular positions around the platter
pub const POSITIONS: usize = 256;

/// Number of periods averaged by default. A single slot uses the latest period directly.
pub const DEFAULT_HISTORY: usize = 1;

/// Physical layout of the display and tuning of the rotation filter.
///
/// All angles are in [`Position`](crate::rotation::Position) units, 256 per revolution.
///
/// ```
/// use platter_pov::config::DisplayConfig;
///
/// const CONFIG: DisplayConfig = DisplayConfig::DEFAULT.with_debounce_ticks(2_000);
/// assert_eq!(CONFIG.visible_span, 192);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// Index pulses with a raw counter at or below this many ticks are treated as sensor bounce
    pub debounce_ticks: u32,
    /// Angular distance between the index sensor and the LED on the arm
    pub mount_offset: u8,
    /// Size of the visible sector, starting at position 0. The remainder of the revolution is
    /// hidden behind the mounting hardware.
    pub visible_span: u8,
    /// Width of the radar sweep window
    pub radar_width: u8,
    /// Centre of the magic eye window
    pub eye_center: u8,
    /// Minute and second hands are drawn this many positions either side of the hand angle
    pub hand_width: u8,
    /// 7-bit I2C address of the real-time clock
    pub rtc_address: u8,
}

impl DisplayConfig {
    /// Geometry of the reference build: LED mounted 1/8 turn from the sensor, 3/4 of the
    /// revolution visible, PCF8583 clock on the default address.
    pub const DEFAULT: Self = Self {
        debounce_ticks: 1_000,
        mount_offset: 32,
        visible_span: 192,
        radar_width: 16,
        eye_center: 96,
        hand_width: 2,
        rtc_address: 0x50,
    };

    /// Set the debounce threshold for index pulses
    pub const fn with_debounce_ticks(mut self, ticks: u32) -> Self {
        self.debounce_ticks = ticks;
        self
    }

    /// Set the sensor-to-LED offset
    pub const fn with_mount_offset(mut self, offset: u8) -> Self {
        self.mount_offset = offset;
        self
    }

    /// Set the size of the visible sector
    pub const fn with_visible_span(mut self, span: u8) -> Self {
        self.visible_span = span;
        self
    }

    /// Set the radar window width
    pub const fn with_radar_width(mut self, width: u8) -> Self {
        self.radar_width = width;
        self
    }

    /// Set the centre of the magic eye window
    pub const fn with_eye_center(mut self, center: u8) -> Self {
        self.eye_center = center;
        self
    }

    /// Set how far either side of its angle a minute or second hand is drawn
    pub const fn with_hand_width(mut self, width: u8) -> Self {
        self.hand_width = width;
        self
    }

    /// Set the RTC bus address
    pub const fn with_rtc_address(mut self, address: u8) -> Self {
        self.rtc_address = address;
        self
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
