//! Chip configuration
//!
//! Everything a host needs to bring up a chip before streaming register
//! writes: input clock, ROM pre-allocation, initial banks and muting.

use serde::{Deserialize, Serialize};

/// Clock of the MultiPCM on Sega System 32 and Model 1 boards, in Hz.
pub const DEFAULT_CLOCK: u32 = 8_053_975;

/// MultiPCM chip configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiPcmConfig {
    /// Input clock in Hz (output rate is clock / 180)
    pub clock: u32,
    /// Sample ROM size to allocate at creation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rom_size: Option<u32>,
    /// Muted voices, bit n = voice n
    pub mute_mask: u32,
    /// Initial left bank base address
    pub left_bank: u32,
    /// Initial right bank base address
    pub right_bank: u32,
}

impl Default for MultiPcmConfig {
    fn default() -> Self {
        Self {
            clock: DEFAULT_CLOCK,
            rom_size: None,
            mute_mask: 0,
            left_bank: 0,
            right_bank: 0,
        }
    }
}

impl MultiPcmConfig {
    /// Default configuration at another clock
    pub fn with_clock(clock: u32) -> Self {
        Self {
            clock,
            ..Default::default()
        }
    }
}
