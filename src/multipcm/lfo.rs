//! MultiPCM LFOs
//!
//! Each voice has a vibrato LFO scaling its pitch step and a tremolo LFO
//! scaling its amplitude. Both run a 16-bit phase accumulator (8 fractional
//! bits) through a shared triangle table, then map the wave value through a
//! depth table to a Q12 multiplier.

use super::constants::LFO_FREQUENCIES;
use super::fixed::{Gain, LFO_FRAC_BITS};
use super::tables::GlobalTables;

/// What an LFO modulates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LfoTarget {
    /// Pitch step multiplier (vibrato)
    #[default]
    Pitch,
    /// Sample amplitude multiplier (tremolo)
    Amplitude,
}

/// Phase increments for the eight LFO frequencies at one sample rate
pub fn lfo_phase_steps(sample_rate: f32) -> [u32; 8] {
    let mut steps = [0u32; 8];
    for (step, &freq) in steps.iter_mut().zip(LFO_FREQUENCIES.iter()) {
        let per_sample = freq as f64 * 256.0 / sample_rate as f64;
        *step = ((1u32 << LFO_FRAC_BITS) as f32 as f64 * per_sample) as u32;
    }
    steps
}

/// One LFO
#[derive(Debug, Clone, Default)]
pub struct Lfo {
    target: LfoTarget,
    phase: u16,
    phase_step: u32,
    depth: usize,
}

impl Lfo {
    /// Create an LFO for `target`
    pub fn new(target: LfoTarget) -> Self {
        Self {
            target,
            ..Default::default()
        }
    }

    /// Set phase increment and depth table (0..7)
    pub fn configure(&mut self, phase_step: u32, depth: u8) {
        self.phase_step = phase_step;
        self.depth = (depth & 0x07) as usize;
    }

    /// Current phase accumulator
    pub fn phase(&self) -> u16 {
        self.phase
    }

    /// Phase increment per sample
    pub fn phase_step(&self) -> u32 {
        self.phase_step
    }

    /// Selected depth (0..7)
    pub fn depth(&self) -> u8 {
        self.depth as u8
    }

    /// Advance one sample and return the multiplier for it
    #[inline]
    pub fn advance(&mut self, tables: &GlobalTables) -> Gain {
        self.phase = self.phase.wrapping_add(self.phase_step as u16);
        let index = ((self.phase >> LFO_FRAC_BITS) & 0xFF) as usize;
        let q8 = match self.target {
            LfoTarget::Pitch => {
                let wave = tables.pitch_wave[index];
                tables.pitch_depths[self.depth][(wave + 128) as usize]
            }
            LfoTarget::Amplitude => {
                let wave = tables.amplitude_wave[index];
                tables.amplitude_depths[self.depth][wave as usize]
            }
        };
        Gain::from_q8(q8)
    }
}
