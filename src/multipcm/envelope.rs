//! MultiPCM Envelope Generator
//!
//! Four-phase amplitude state machine: attack rises linearly to full level,
//! decay 1 falls to the sample's decay level, decay 2 keeps falling until
//! key-off, release falls to silence and ends the voice. The linear level is
//! turned into gain through a -96 dB exponential curve.
//!
//! Rate steps are derived from the chip's actual sample rate so envelope
//! timings hold across clock configurations.

use std::fmt;

use super::constants::{ATTACK_TO_DECAY, ENVELOPE_BASE_TIMES};
use super::fixed::{EnvelopeLevel, Gain};
use super::registers::octave;
use super::sample::{SampleDescriptor, KEY_RATE_SCALING_OFF};
use super::tables::GlobalTables;

/// Number of envelope rates
pub const RATE_COUNT: usize = 64;

/// Decay 1 step at or above this skips straight to decay 2
const DECAY1_SKIP: i32 = 0x400 << EnvelopeLevel::FRAC_BITS;

/// Envelope phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopePhase {
    /// Rising to full level
    #[default]
    Attack,
    /// Falling to the decay level
    Decay1,
    /// Falling until key-off
    Decay2,
    /// Falling to silence after key-off
    Release,
}

impl fmt::Display for EnvelopePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvelopePhase::Attack => write!(f, "Attack"),
            EnvelopePhase::Decay1 => write!(f, "Decay 1"),
            EnvelopePhase::Decay2 => write!(f, "Decay 2"),
            EnvelopePhase::Release => write!(f, "Release"),
        }
    }
}

/// Per-rate level steps for one sample rate
#[derive(Debug, Clone)]
pub struct EnvelopeRates {
    attack: [i32; RATE_COUNT],
    decay: [i32; RATE_COUNT],
}

impl EnvelopeRates {
    /// Build step tables for `sample_rate`
    pub fn new(sample_rate: f32) -> Self {
        let full_scale = (0x400u32 << EnvelopeLevel::FRAC_BITS) as f32 as f64;
        let samples_per_ms = sample_rate as f64 / 1000.0;

        let mut attack = [0i32; RATE_COUNT];
        let mut decay = [0i32; RATE_COUNT];
        for (i, &time) in ENVELOPE_BASE_TIMES.iter().enumerate() {
            attack[i] = (full_scale / (time * samples_per_ms)) as u32 as i32;
            decay[i] = (full_scale / (time * ATTACK_TO_DECAY * samples_per_ms)) as u32 as i32;
        }

        // Rates 0..3 never move; rate 63 attacks in one sample
        attack[..4].fill(0);
        decay[..4].fill(0);
        attack[RATE_COUNT - 1] = DECAY1_SKIP;

        Self { attack, decay }
    }

    /// Attack step table
    pub fn attack(&self) -> &[i32; RATE_COUNT] {
        &self.attack
    }

    /// Decay/release step table
    pub fn decay(&self) -> &[i32; RATE_COUNT] {
        &self.decay
    }
}

/// Pick the step for a 4-bit rate value at a key-scaled rate offset
fn rate_step(steps: &[i32; RATE_COUNT], rate_offset: i32, value: u8) -> i32 {
    match value {
        0 => steps[0],
        0x0F => steps[RATE_COUNT - 1],
        _ => {
            let index = (4 * value as i32 + rate_offset).clamp(0, RATE_COUNT as i32 - 1);
            steps[index as usize]
        }
    }
}

/// Key-scaled rate offset from the pitch register and the sample's KRS
pub fn key_rate_offset(pitch_high: u8, key_rate_scaling: u8) -> i32 {
    if key_rate_scaling == KEY_RATE_SCALING_OFF {
        return 0;
    }
    let oct = octave(pitch_high) as i32;
    (oct + key_rate_scaling as i32) * 2 + ((pitch_high >> 3) & 1) as i32
}

/// Envelope generator state for one voice
#[derive(Debug, Clone, Default)]
pub struct Envelope {
    phase: EnvelopePhase,
    level: EnvelopeLevel,
    attack: i32,
    decay1: i32,
    decay2: i32,
    release: i32,
    /// Decay 1 ends once the 10-bit level falls to this
    decay_level: i32,
}

impl Envelope {
    /// Create an idle envelope
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute rates for `sample` and restart the attack from silence
    pub fn key_on(&mut self, rates: &EnvelopeRates, sample: &SampleDescriptor, pitch_high: u8) {
        let offset = key_rate_offset(pitch_high, sample.key_rate_scaling);

        self.attack = rate_step(&rates.attack, offset, sample.attack_rate);
        self.decay1 = rate_step(&rates.decay, offset, sample.decay1_rate);
        self.decay2 = rate_step(&rates.decay, offset, sample.decay2_rate);
        self.release = rate_step(&rates.decay, offset, sample.release_rate);
        self.decay_level = (0x0F - (sample.decay_level & 0x0F) as i32) << (10 - 4);

        self.phase = EnvelopePhase::Attack;
        self.level = EnvelopeLevel::ZERO;
    }

    /// Enter the release phase
    pub fn key_off(&mut self) {
        self.phase = EnvelopePhase::Release;
    }

    /// Current phase
    pub fn phase(&self) -> EnvelopePhase {
        self.phase
    }

    /// Current level accumulator
    pub fn level(&self) -> EnvelopeLevel {
        self.level
    }

    /// True once the release phase has reached silence
    pub fn is_finished(&self) -> bool {
        self.phase == EnvelopePhase::Release && self.level == EnvelopeLevel::ZERO
    }

    /// Advance one sample and return the gain for it
    pub fn advance(&mut self, tables: &GlobalTables) -> Gain {
        match self.phase {
            EnvelopePhase::Attack => {
                if self.level.rise(self.attack) {
                    self.phase = if self.decay1 >= DECAY1_SKIP {
                        EnvelopePhase::Decay2
                    } else {
                        EnvelopePhase::Decay1
                    };
                }
            }
            EnvelopePhase::Decay1 => {
                self.level.fall(self.decay1);
                if self.level.level() <= self.decay_level {
                    self.phase = EnvelopePhase::Decay2;
                }
            }
            EnvelopePhase::Decay2 => {
                self.level.fall(self.decay2);
            }
            EnvelopePhase::Release => {
                self.level.fall(self.release);
            }
        }

        Gain::from_raw(tables.envelope_curve[(self.level.level() & 0x3FF) as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multipcm::tables::global_tables;

    fn rates() -> EnvelopeRates {
        EnvelopeRates::new(44_100.0)
    }

    fn sample(ar: u8, d1r: u8, dl: u8, d2r: u8, rr: u8) -> SampleDescriptor {
        SampleDescriptor {
            attack_rate: ar,
            decay1_rate: d1r,
            decay_level: dl,
            decay2_rate: d2r,
            release_rate: rr,
            key_rate_scaling: KEY_RATE_SCALING_OFF,
            ..Default::default()
        }
    }

    #[test]
    fn test_rate_tables() {
        let r = rates();
        assert!(r.attack()[..4].iter().all(|&s| s == 0));
        assert!(r.decay()[..4].iter().all(|&s| s == 0));
        assert_eq!(r.attack()[63], 0x400 << 16);
        for i in 5..63 {
            assert!(r.attack()[i] >= r.attack()[i - 1]);
            assert!(r.decay()[i] >= r.decay()[i - 1]);
            assert!(r.decay()[i] < r.attack()[i]);
        }
    }

    #[test]
    fn test_faster_clock_gives_smaller_steps() {
        let slow = EnvelopeRates::new(22_050.0);
        let fast = EnvelopeRates::new(44_100.0);
        assert!(fast.attack()[32] < slow.attack()[32]);
        assert!(fast.decay()[32] < slow.decay()[32]);
    }

    #[test]
    fn test_rate_step_special_values() {
        let r = rates();
        assert_eq!(rate_step(r.attack(), 20, 0), 0);
        assert_eq!(rate_step(r.attack(), -20, 0x0F), 0x400 << 16);
        assert_eq!(rate_step(r.decay(), 0, 5), r.decay()[20]);
        assert_eq!(rate_step(r.decay(), 100, 5), r.decay()[63]);
        assert_eq!(rate_step(r.decay(), -100, 5), r.decay()[0]);
    }

    #[test]
    fn test_key_rate_offset() {
        // octave nibble 1 = octave 0
        assert_eq!(key_rate_offset(0x10, KEY_RATE_SCALING_OFF), 0);
        assert_eq!(key_rate_offset(0x10, 0), 0);
        assert_eq!(key_rate_offset(0x18, 0), 1);
        assert_eq!(key_rate_offset(0x30, 2), 8);
        // nibble 0 = octave -1
        assert_eq!(key_rate_offset(0x00, 3), 4);
    }

    #[test]
    fn test_instant_attack_then_decay1() {
        let tables = global_tables();
        let mut env = Envelope::new();
        env.key_on(&rates(), &sample(0x0F, 0, 0, 0, 0), 0x10);
        assert_eq!(env.phase(), EnvelopePhase::Attack);
        let gain = env.advance(tables);
        assert_eq!(env.level(), EnvelopeLevel::MAX);
        assert_eq!(env.phase(), EnvelopePhase::Decay1);
        assert_eq!(gain.raw(), tables.envelope_curve[0x3FF]);
    }

    #[test]
    fn test_instant_decay1_skips_to_decay2() {
        let tables = global_tables();
        // at 100 Hz the fastest decay step covers the whole range
        let slow = EnvelopeRates::new(100.0);
        assert!(slow.decay()[63] >= DECAY1_SKIP);

        let mut env = Envelope::new();
        env.key_on(&slow, &sample(0x0F, 0x0F, 0, 0, 0), 0x10);
        env.advance(tables);
        assert_eq!(env.phase(), EnvelopePhase::Decay2);
        assert_eq!(env.level(), EnvelopeLevel::MAX);
    }

    #[test]
    fn test_attack_rises_monotonically() {
        let tables = global_tables();
        let mut env = Envelope::new();
        env.key_on(&rates(), &sample(10, 0, 0, 0, 0), 0x10);
        let mut last = env.level();
        let mut ticks = 0;
        while env.phase() == EnvelopePhase::Attack {
            env.advance(tables);
            assert!(env.level() >= last);
            assert!(env.level() <= EnvelopeLevel::MAX);
            last = env.level();
            ticks += 1;
            assert!(ticks < 1_000_000);
        }
        assert_eq!(env.level(), EnvelopeLevel::MAX);
        assert_eq!(env.phase(), EnvelopePhase::Decay1);
    }

    #[test]
    fn test_decay1_stops_at_decay_level() {
        let tables = global_tables();
        let mut env = Envelope::new();
        // DL 4 -> threshold (15 - 4) << 6 = 704
        env.key_on(&rates(), &sample(0x0F, 12, 4, 0, 0), 0x10);
        env.advance(tables);
        while env.phase() == EnvelopePhase::Decay1 {
            env.advance(tables);
        }
        assert_eq!(env.phase(), EnvelopePhase::Decay2);
        assert!(env.level().level() <= 704);
        assert!(env.level().level() > 600);
        // D2R 0 holds the level
        let held = env.level();
        for _ in 0..1000 {
            env.advance(tables);
        }
        assert_eq!(env.level(), held);
    }

    #[test]
    fn test_release_reaches_silence() {
        let tables = global_tables();
        let mut env = Envelope::new();
        env.key_on(&rates(), &sample(0x0F, 0, 0, 0, 8), 0x10);
        env.advance(tables);
        env.key_off();
        let mut ticks = 0;
        while !env.is_finished() {
            let before = env.level();
            env.advance(tables);
            assert!(env.level() <= before);
            assert!(env.level() >= EnvelopeLevel::ZERO);
            ticks += 1;
            assert!(ticks < 10_000_000);
        }
        assert_eq!(env.phase(), EnvelopePhase::Release);
    }
}
