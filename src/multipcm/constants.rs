//! MultiPCM Hardware Constants
//!
//! Chip geometry and the timing schedules every derived table is built from.

/// Input clock divider: one output sample every 180 master clocks.
pub const CLOCK_DIVIDER: f64 = 180.0;

/// Number of playback voices (slots).
pub const VOICE_COUNT: usize = 28;

/// Number of per-voice sub-registers.
pub const SLOT_REGISTER_COUNT: usize = 8;

/// Number of sample descriptors in the ROM header.
pub const SAMPLE_COUNT: usize = 0x200;

/// Size of one descriptor record in the ROM header.
pub const SAMPLE_HEADER_SIZE: usize = 12;

/// Bytes at the start of ROM holding the descriptor table.
pub const SAMPLE_HEADER_BYTES: usize = SAMPLE_COUNT * SAMPLE_HEADER_SIZE;

/// Sample starts at or above this address go through a bank window.
pub const DIRECT_ADDRESS_RANGE: u32 = 0x10_0000;

/// Address bits kept from the sample start when a bank window applies.
pub const DIRECT_ADDRESS_MASK: u32 = DIRECT_ADDRESS_RANGE - 1;

/// Fill value for freshly allocated or missing ROM bytes.
pub const ROM_FILL_BYTE: u8 = 0xFF;

/// Envelope timings in milliseconds at a 44.1 kHz timebase, indexed by rate (0..63).
pub const ENVELOPE_BASE_TIMES: [f64; 64] = [
    0.0, 0.0, 0.0, 0.0, 6222.95, 4978.37, 4148.66, 3556.01, 3111.47, 2489.21, 2074.33, 1778.00,
    1555.74, 1244.63, 1037.19, 889.02, 777.87, 622.31, 518.59, 444.54, 388.93, 311.16, 259.32,
    222.27, 194.47, 155.60, 129.66, 111.16, 97.23, 77.82, 64.85, 55.60, 48.62, 38.91, 32.43,
    27.80, 24.31, 19.46, 16.24, 13.92, 12.15, 9.75, 8.12, 6.98, 6.08, 4.90, 4.08, 3.49, 3.04,
    2.49, 2.13, 1.90, 1.72, 1.41, 1.18, 1.04, 0.91, 0.73, 0.59, 0.50, 0.45, 0.45, 0.45, 0.45,
];

/// Decay phases run this much slower than attack at the same rate.
pub const ATTACK_TO_DECAY: f64 = 14.32833;

/// Time in milliseconds for a full-range attenuation ramp downwards.
/// Upward ramps take twice as long.
pub const ATTENUATION_RAMP_MS: f64 = 78.2;

/// LFO frequencies in Hz, selected by register 6 bits 3..5.
pub const LFO_FREQUENCIES: [f32; 8] = [0.168, 2.019, 3.196, 4.206, 5.215, 5.888, 6.224, 7.066];

/// Vibrato depths in cents, selected by register 6 bits 0..2.
pub const PITCH_LFO_DEPTHS: [f32; 8] = [0.0, 3.378, 5.065, 6.750, 10.114, 20.170, 40.180, 79.307];

/// Tremolo depths in dB, selected by register 7 bits 0..2.
pub const AMPLITUDE_LFO_DEPTHS: [f32; 8] = [0.0, 0.4, 0.8, 1.5, 3.0, 6.0, 12.0, 24.0];

/// Value returned by every register read.
pub const READ_STUB: u8 = 0x00;
