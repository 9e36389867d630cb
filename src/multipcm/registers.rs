//! MultiPCM Register Definitions
//!
//! The host sees three byte ports (data, slot select, register select) plus a
//! 16-bit bank port. Each voice has eight sub-registers reached through the
//! data port.

use std::fmt;

use bitflags::bitflags;

use super::constants::VOICE_COUNT;

/// Host-visible byte ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Port {
    /// Data write to the selected voice/sub-register - port 0
    Data = 0x00,
    /// Voice select - port 1
    SlotSelect = 0x01,
    /// Sub-register select - port 2
    RegisterSelect = 0x02,
}

impl Port {
    /// Convert a raw port number to Port enum
    pub fn from_addr(addr: u8) -> Option<Self> {
        match addr {
            0x00 => Some(Port::Data),
            0x01 => Some(Port::SlotSelect),
            0x02 => Some(Port::RegisterSelect),
            _ => None,
        }
    }
}

/// Per-voice sub-register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SlotRegister {
    /// Pan code in bits 4..7 - R0
    #[default]
    Pan = 0x00,
    /// Sample number - R1
    Sample = 0x01,
    /// Pitch low bits (bits 2..7) - R2
    PitchLow = 0x02,
    /// Octave (bits 4..7) and pitch high bits (bits 0..3) - R3
    PitchHigh = 0x03,
    /// Key on (bit 7) / key off - R4
    KeyControl = 0x04,
    /// Total level (bits 1..7) and direct-set flag (bit 0) - R5
    TotalLevel = 0x05,
    /// LFO frequency (bits 3..5) and vibrato depth (bits 0..2) - R6
    LfoVibrato = 0x06,
    /// Tremolo depth (bits 0..2) - R7
    LfoTremolo = 0x07,
}

impl SlotRegister {
    /// Convert a raw sub-register number, clamping values above 7 to 7
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => SlotRegister::Pan,
            1 => SlotRegister::Sample,
            2 => SlotRegister::PitchLow,
            3 => SlotRegister::PitchHigh,
            4 => SlotRegister::KeyControl,
            5 => SlotRegister::TotalLevel,
            6 => SlotRegister::LfoVibrato,
            _ => SlotRegister::LfoTremolo,
        }
    }

    /// Index into the voice's raw register array
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SlotRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotRegister::Pan => write!(f, "R0 (Pan)"),
            SlotRegister::Sample => write!(f, "R1 (Sample)"),
            SlotRegister::PitchLow => write!(f, "R2 (Pitch Low)"),
            SlotRegister::PitchHigh => write!(f, "R3 (Octave/Pitch High)"),
            SlotRegister::KeyControl => write!(f, "R4 (Key On/Off)"),
            SlotRegister::TotalLevel => write!(f, "R5 (Total Level)"),
            SlotRegister::LfoVibrato => write!(f, "R6 (LFO Freq/Vibrato)"),
            SlotRegister::LfoTremolo => write!(f, "R7 (Tremolo)"),
        }
    }
}

bitflags! {
    /// Bank port selector bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BankSelect: u8 {
        /// Update the left bank base
        const LEFT = 0x01;
        /// Update the right bank base
        const RIGHT = 0x02;
    }
}

/// Key-on bit of register 4
pub const KEY_ON: u8 = 0x80;

/// Total level register bit that skips the attenuation ramp
pub const TOTAL_LEVEL_DIRECT: u8 = 0x01;

/// Map a slot-select value to a voice.
///
/// The 5-bit select space has one unused code at the end of each group of
/// eight, leaving 28 voices.
pub fn voice_from_select(value: u8) -> Option<usize> {
    let value = (value & 0x1F) as usize;
    let group = value / 8;
    let lane = value % 8;
    if lane == 7 {
        None
    } else {
        let voice = group * 7 + lane;
        debug_assert!(voice < VOICE_COUNT);
        Some(voice)
    }
}

/// Slot-select code for a voice (inverse of [`voice_from_select`])
pub fn select_from_voice(voice: usize) -> Option<u8> {
    (voice < VOICE_COUNT).then(|| ((voice / 7) * 8 + voice % 7) as u8)
}

/// Split a quick-write address into voice and sub-register
pub fn decode_quick_address(address: u8) -> (Option<usize>, SlotRegister) {
    (
        voice_from_select(address >> 3),
        SlotRegister::from_index(address & 0x07),
    )
}

/// Signed octave from register 3 (stored biased by one)
pub fn octave(pitch_high: u8) -> i8 {
    let raw = (pitch_high >> 4).wrapping_sub(1) & 0x0F;
    if raw & 0x08 != 0 {
        raw as i8 - 16
    } else {
        raw as i8
    }
}

/// 10-bit pitch fraction from registers 2 and 3
pub fn pitch_fraction(pitch_low: u8, pitch_high: u8) -> usize {
    (((pitch_high & 0x0F) as usize) << 6) | (pitch_low >> 2) as usize
}

/// Pan code from register 0
pub fn pan_code(value: u8) -> u8 {
    (value >> 4) & 0x0F
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_select_map() {
        let voices: Vec<_> = (0u8..32).filter_map(voice_from_select).collect();
        assert_eq!(voices, (0..VOICE_COUNT).collect::<Vec<_>>());
        for group in 0..4u8 {
            assert_eq!(voice_from_select(group * 8 + 7), None);
        }
        assert_eq!(voice_from_select(8), Some(7));
        assert_eq!(voice_from_select(0x20), Some(0));
    }

    #[test]
    fn test_select_round_trip() {
        for voice in 0..VOICE_COUNT {
            let code = select_from_voice(voice).unwrap();
            assert_eq!(voice_from_select(code), Some(voice));
        }
        assert_eq!(select_from_voice(VOICE_COUNT), None);
    }

    #[test]
    fn test_quick_address() {
        assert_eq!(decode_quick_address(0x00), (Some(0), SlotRegister::Pan));
        assert_eq!(decode_quick_address(0x0C), (Some(1), SlotRegister::KeyControl));
        assert_eq!(decode_quick_address(0x3B), (None, SlotRegister::PitchHigh));
        assert_eq!(decode_quick_address(0xFF), (None, SlotRegister::LfoTremolo));
        assert_eq!(decode_quick_address(0xF7), (Some(27), SlotRegister::LfoTremolo));
    }

    #[test]
    fn test_register_clamp() {
        assert_eq!(SlotRegister::from_index(5), SlotRegister::TotalLevel);
        assert_eq!(SlotRegister::from_index(8), SlotRegister::LfoTremolo);
        assert_eq!(SlotRegister::from_index(0xFF), SlotRegister::LfoTremolo);
    }

    #[test]
    fn test_octave_decoding() {
        assert_eq!(octave(0x10), 0);
        assert_eq!(octave(0x20), 1);
        assert_eq!(octave(0x80), 7);
        assert_eq!(octave(0x90), -8);
        assert_eq!(octave(0x00), -1);
        assert_eq!(octave(0xF0), -2);
    }

    #[test]
    fn test_pitch_fraction() {
        assert_eq!(pitch_fraction(0x00, 0x10), 0);
        assert_eq!(pitch_fraction(0xFC, 0x1F), 0x3FF);
        assert_eq!(pitch_fraction(0x04, 0x11), 0x41);
    }

    #[test]
    fn test_port_decode() {
        assert_eq!(Port::from_addr(0), Some(Port::Data));
        assert_eq!(Port::from_addr(2), Some(Port::RegisterSelect));
        assert_eq!(Port::from_addr(3), None);
    }
}
