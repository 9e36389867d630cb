//! Clock-dependent tables
//!
//! Pitch steps, envelope rate steps, attenuation ramp steps and LFO phase
//! increments all depend on the output sample rate, so each chip instance
//! builds its own set at creation.

use super::constants::{ATTENUATION_RAMP_MS, CLOCK_DIVIDER};
use super::envelope::EnvelopeRates;
use super::fixed::{Attenuation, SamplePosition, SAMPLE_FRAC_BITS};
use super::lfo::lfo_phase_steps;
use super::registers::pitch_fraction;

/// Entries in the pitch table (one per 10-bit pitch fraction)
pub const PITCH_TABLE_SIZE: usize = 0x400;

/// Output sample rate for an input clock, in single precision like the hardware tables.
pub fn sample_rate_for_clock(clock: u32) -> f32 {
    (clock as f32 as f64 / CLOCK_DIVIDER) as f32
}

/// Per-instance tables derived from the sample rate
#[derive(Debug, Clone)]
pub struct ChipTiming {
    sample_rate: f32,
    pitch_table: Vec<u32>,
    envelope: EnvelopeRates,
    attenuation_down: i32,
    attenuation_up: i32,
    lfo_steps: [u32; 8],
}

impl ChipTiming {
    /// Build every table for `sample_rate`
    pub fn new(sample_rate: f32) -> Self {
        let pitch_table = (0..PITCH_TABLE_SIZE)
            .map(|i| {
                let freq =
                    (sample_rate as f64 * (1024.0 + i as f32 as f64) / 1024.0) as f32;
                ((1u32 << SAMPLE_FRAC_BITS) as f32 * freq) as u32
            })
            .collect();

        let full_range = (0x80u32 << SAMPLE_FRAC_BITS) as f32 as f64;
        let samples_per_ms = sample_rate as f64 / 1000.0;
        let attenuation_down = (-full_range / (ATTENUATION_RAMP_MS * samples_per_ms)) as i32;
        let attenuation_up = (full_range / (ATTENUATION_RAMP_MS * 2.0 * samples_per_ms)) as i32;

        Self {
            sample_rate,
            pitch_table,
            envelope: EnvelopeRates::new(sample_rate),
            attenuation_down,
            attenuation_up,
            lfo_steps: lfo_phase_steps(sample_rate),
        }
    }

    /// Output sample rate in Hz
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Envelope step tables
    pub fn envelope(&self) -> &EnvelopeRates {
        &self.envelope
    }

    /// Per-sample attenuation ramp step towards a lower target
    pub fn attenuation_down(&self) -> i32 {
        self.attenuation_down
    }

    /// Per-sample attenuation ramp step towards a higher target
    pub fn attenuation_up(&self) -> i32 {
        self.attenuation_up
    }

    /// Ramp step for moving from `current` to `target`
    pub fn attenuation_step(&self, current: Attenuation, target: u8) -> i32 {
        if current.int_part() > target as u32 {
            self.attenuation_down
        } else {
            self.attenuation_up
        }
    }

    /// LFO phase increment for frequency index 0..7
    pub fn lfo_step(&self, frequency: u8) -> u32 {
        self.lfo_steps[(frequency & 0x07) as usize]
    }

    /// Playback step per output sample for pitch registers 2 and 3
    pub fn pitch_step(&self, pitch_low: u8, pitch_high: u8) -> SamplePosition {
        let oct = ((pitch_high >> 4).wrapping_sub(1) & 0x0F) as u32;
        let base = self.pitch_table[pitch_fraction(pitch_low, pitch_high)];
        let scaled = if oct & 0x08 != 0 {
            base >> (16 - oct)
        } else {
            base << oct
        };
        SamplePosition::from_raw((scaled as f32 / self.sample_rate) as u32)
    }
}
