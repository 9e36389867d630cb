//! Sample descriptor table
//!
//! The first 512 * 12 bytes of ROM describe every sample:
//!
//! | bytes | content                                         |
//! |-------|-------------------------------------------------|
//! | 0..3  | start offset, big endian                        |
//! | 3..5  | loop offset, big endian                         |
//! | 5..7  | two's complement of the sample length           |
//! | 7     | default LFO register (6)                        |
//! | 8     | attack rate (hi nibble), decay 1 rate (lo)      |
//! | 9     | decay level (hi nibble), decay 2 rate (lo)      |
//! | 10    | key rate scaling (hi nibble), release rate (lo) |
//! | 11    | default tremolo register (7)                    |

use log::debug;

use super::constants::{SAMPLE_COUNT, SAMPLE_HEADER_SIZE};
use super::rom::SampleRom;

/// Release rate value that stops the voice at key-off instead of releasing
pub const RELEASE_INSTANT: u8 = 0x0F;

/// Key rate scaling value that disables scaling
pub const KEY_RATE_SCALING_OFF: u8 = 0x0F;

/// Decoded sample header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampleDescriptor {
    /// Start offset in ROM (24 bits)
    pub start: u32,
    /// Loop point, relative to start
    pub loop_start: u32,
    /// End point, relative to start
    pub end: u32,
    /// Attack rate (0..15)
    pub attack_rate: u8,
    /// Decay 1 rate (0..15)
    pub decay1_rate: u8,
    /// Decay 2 rate (0..15)
    pub decay2_rate: u8,
    /// Decay level (0..15)
    pub decay_level: u8,
    /// Release rate (0..15)
    pub release_rate: u8,
    /// Key rate scaling (0..15)
    pub key_rate_scaling: u8,
    /// Value copied to register 6 on sample select
    pub lfo_vibrato: u8,
    /// Value copied to register 7 on sample select
    pub lfo_tremolo: u8,
}

impl SampleDescriptor {
    /// Decode one 12-byte header record
    pub fn decode(b: &[u8; SAMPLE_HEADER_SIZE]) -> Self {
        let length = u16::from_be_bytes([b[5], b[6]]) as u32;
        Self {
            start: u32::from_be_bytes([0, b[0], b[1], b[2]]),
            loop_start: u16::from_be_bytes([b[3], b[4]]) as u32,
            end: 0xFFFF - length,
            lfo_vibrato: b[7],
            decay1_rate: b[8] & 0x0F,
            attack_rate: b[8] >> 4,
            decay2_rate: b[9] & 0x0F,
            decay_level: b[9] >> 4,
            release_rate: b[10] & 0x0F,
            key_rate_scaling: b[10] >> 4,
            lfo_tremolo: b[11],
        }
    }

    /// Encode back into a 12-byte header record
    pub fn encode(&self) -> [u8; SAMPLE_HEADER_SIZE] {
        let start = self.start.to_be_bytes();
        let loop_start = (self.loop_start as u16).to_be_bytes();
        let length = (0xFFFFu32.wrapping_sub(self.end) as u16).to_be_bytes();
        [
            start[1],
            start[2],
            start[3],
            loop_start[0],
            loop_start[1],
            length[0],
            length[1],
            self.lfo_vibrato,
            (self.attack_rate << 4) | (self.decay1_rate & 0x0F),
            (self.decay_level << 4) | (self.decay2_rate & 0x0F),
            (self.key_rate_scaling << 4) | (self.release_rate & 0x0F),
            self.lfo_tremolo,
        ]
    }
}

/// All 512 descriptors
#[derive(Debug, Clone)]
pub struct SampleTable {
    descriptors: Vec<SampleDescriptor>,
}

impl SampleTable {
    /// Table of zeroed descriptors
    pub fn new() -> Self {
        Self {
            descriptors: vec![SampleDescriptor::default(); SAMPLE_COUNT],
        }
    }

    /// Descriptor by index (wraps at 512)
    #[inline]
    pub fn get(&self, index: usize) -> &SampleDescriptor {
        &self.descriptors[index % SAMPLE_COUNT]
    }

    /// Decode every descriptor from the ROM header
    pub fn rebuild(&mut self, rom: &SampleRom) {
        for (index, descriptor) in self.descriptors.iter_mut().enumerate() {
            let base = index * SAMPLE_HEADER_SIZE;
            let mut record = [0u8; SAMPLE_HEADER_SIZE];
            for (i, byte) in record.iter_mut().enumerate() {
                *byte = rom.header_byte(base + i);
            }
            *descriptor = SampleDescriptor::decode(&record);
        }
        debug!("rebuilt {SAMPLE_COUNT} sample descriptors");
    }
}

impl Default for SampleTable {
    fn default() -> Self {
        Self::new()
    }
}
