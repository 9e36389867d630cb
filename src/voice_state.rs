//! Per-voice state snapshots.
//!
//! Read-only views of what each voice is doing, for hosts that draw channel
//! meters or debug register streams.
//!
//! # Example
//!
//! ```
//! use multipcm::MultiPcm;
//!
//! let chip = MultiPcm::new(8_053_975).unwrap();
//! for voice in chip.voice_states().iter().filter(|v| v.playing) {
//!     println!("voice {}: sample {} level {}", voice.voice, voice.sample, voice.envelope_level);
//! }
//! ```

use crate::multipcm::envelope::EnvelopePhase;
use crate::multipcm::registers::{octave, pitch_fraction, SlotRegister};
use crate::multipcm::slot::Slot;

/// State of a single voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoiceState {
    /// Voice index (0-27).
    pub voice: usize,
    /// Whether the voice is producing sound.
    pub playing: bool,
    /// Whether the voice is left out of the mix.
    pub muted: bool,
    /// Sample number bound at the last key-on.
    pub sample: usize,
    /// Envelope phase.
    pub envelope_phase: EnvelopePhase,
    /// 10-bit envelope level (0-1023).
    pub envelope_level: u16,
    /// Current 7-bit attenuation.
    pub attenuation: u8,
    /// Attenuation the ramp is heading to.
    pub target_attenuation: u8,
    /// Pan code (0-15).
    pub pan: u8,
    /// Signed octave (-8..7).
    pub octave: i8,
    /// 10-bit pitch fraction.
    pub pitch: u16,
    /// Resolved ROM address of the sample start.
    pub base: u32,
    /// Integer playback position relative to the sample start.
    pub position: u32,
    /// Playback step per sample, Q12.
    pub step: u32,
    /// Whether vibrato is enabled (nonzero depth).
    pub vibrato: bool,
    /// Whether tremolo is enabled (nonzero depth).
    pub tremolo: bool,
}

impl VoiceState {
    pub(crate) fn from_slot(voice: usize, slot: &Slot, muted: bool) -> Self {
        let regs = slot.registers();
        let pitch_low = regs[SlotRegister::PitchLow.index()];
        let pitch_high = regs[SlotRegister::PitchHigh.index()];
        Self {
            voice,
            playing: slot.is_playing(),
            muted,
            sample: slot.sample_index(),
            envelope_phase: slot.envelope().phase(),
            envelope_level: slot.envelope().level().level() as u16,
            attenuation: (slot.attenuation().int_part() & 0x7F) as u8,
            target_attenuation: slot.target_attenuation(),
            pan: slot.pan(),
            octave: octave(pitch_high),
            pitch: pitch_fraction(pitch_low, pitch_high) as u16,
            base: slot.base(),
            position: slot.position().int_part(),
            step: slot.step().raw(),
            vibrato: regs[SlotRegister::LfoVibrato.index()] & 0x07 != 0,
            tremolo: regs[SlotRegister::LfoTremolo.index()] & 0x07 != 0,
        }
    }

    /// Envelope level normalized to 0.0-1.0.
    pub fn level_normalized(&self) -> f32 {
        self.envelope_level as f32 / 1023.0
    }

    /// Whether the voice is audible in the mix.
    pub fn is_audible(&self) -> bool {
        self.playing && !self.muted
    }
}
