//! MultiPCM voice (slot)
//!
//! Holds the eight raw sub-registers of one voice together with the playback
//! state they drive, and produces that voice's stereo contribution one output
//! sample at a time.

use log::trace;

use super::constants::SLOT_REGISTER_COUNT;
use super::envelope::Envelope;
use super::fixed::{Attenuation, SamplePosition};
use super::lfo::{Lfo, LfoTarget};
use super::registers::{pan_code, SlotRegister, KEY_ON, TOTAL_LEVEL_DIRECT};
use super::rom::{Banks, SampleRom};
use super::sample::{SampleTable, RELEASE_INSTANT};
use super::tables::GlobalTables;
use super::timing::ChipTiming;

/// Envelope gain is Q12 but the mix keeps two extra bits of headroom
const ENVELOPE_OUTPUT_SHIFT: u32 = 10;

/// Chip state a register write may read
#[derive(Debug, Clone, Copy)]
pub struct SlotContext<'a> {
    /// Clock-dependent tables
    pub timing: &'a ChipTiming,
    /// Decoded sample headers
    pub samples: &'a SampleTable,
    /// Bank bases
    pub banks: Banks,
}

/// One of the 28 voices
#[derive(Debug, Clone)]
pub struct Slot {
    regs: [u8; SLOT_REGISTER_COUNT],
    playing: bool,
    sample: usize,
    base: u32,
    position: SamplePosition,
    step: SamplePosition,
    /// Last ROM sample before the current position (interpolation history)
    previous: i32,
    pan: u8,
    attenuation: Attenuation,
    target_attenuation: u8,
    attenuation_step: i32,
    envelope: Envelope,
    pitch_lfo: Lfo,
    amplitude_lfo: Lfo,
}

impl Slot {
    /// Create a silent voice
    pub fn new() -> Self {
        Self {
            regs: [0; SLOT_REGISTER_COUNT],
            playing: false,
            sample: 0,
            base: 0,
            position: SamplePosition::ZERO,
            step: SamplePosition::ZERO,
            previous: 0,
            pan: 0,
            attenuation: Attenuation::ZERO,
            target_attenuation: 0,
            attenuation_step: 0,
            envelope: Envelope::new(),
            pitch_lfo: Lfo::new(LfoTarget::Pitch),
            amplitude_lfo: Lfo::new(LfoTarget::Amplitude),
        }
    }

    /// Stop playback without touching registers
    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Write a sub-register and apply its side effects
    pub fn write(&mut self, reg: SlotRegister, data: u8, ctx: &SlotContext<'_>) {
        self.regs[reg.index()] = data;

        match reg {
            SlotRegister::Pan => {
                self.pan = pan_code(data);
            }
            SlotRegister::Sample => {
                self.apply_sample_defaults(ctx);
            }
            SlotRegister::PitchLow | SlotRegister::PitchHigh => {
                self.step = ctx.timing.pitch_step(
                    self.regs[SlotRegister::PitchLow.index()],
                    self.regs[SlotRegister::PitchHigh.index()],
                );
            }
            SlotRegister::KeyControl => {
                if data & KEY_ON != 0 {
                    self.key_on(ctx);
                } else {
                    self.key_off(ctx);
                }
            }
            SlotRegister::TotalLevel => {
                self.target_attenuation = (data >> 1) & 0x7F;
                if data & TOTAL_LEVEL_DIRECT == 0 {
                    self.attenuation_step = ctx
                        .timing
                        .attenuation_step(self.attenuation, self.target_attenuation);
                } else {
                    self.attenuation = Attenuation::from_int(self.target_attenuation as u32);
                }
            }
            SlotRegister::LfoVibrato | SlotRegister::LfoTremolo => {
                if data != 0 {
                    self.update_lfos(ctx.timing);
                }
            }
        }
    }

    /// Load the selected sample's default LFO registers (6 and 7).
    ///
    /// Runs on every sample select, playing or not.
    fn apply_sample_defaults(&mut self, ctx: &SlotContext<'_>) {
        let sample = ctx.samples.get(self.regs[SlotRegister::Sample.index()] as usize);
        self.regs[SlotRegister::LfoVibrato.index()] = sample.lfo_vibrato;
        self.regs[SlotRegister::LfoTremolo.index()] = sample.lfo_tremolo;
        if sample.lfo_vibrato != 0 || sample.lfo_tremolo != 0 {
            self.update_lfos(ctx.timing);
        }
    }

    fn update_lfos(&mut self, timing: &ChipTiming) {
        let vibrato = self.regs[SlotRegister::LfoVibrato.index()];
        let tremolo = self.regs[SlotRegister::LfoTremolo.index()];
        let step = timing.lfo_step((vibrato >> 3) & 0x07);
        self.pitch_lfo.configure(step, vibrato & 0x07);
        self.amplitude_lfo.configure(step, tremolo & 0x07);
    }

    fn key_on(&mut self, ctx: &SlotContext<'_>) {
        self.sample = self.regs[SlotRegister::Sample.index()] as usize;
        let sample = ctx.samples.get(self.sample);

        self.playing = true;
        self.base = ctx.banks.resolve(sample.start, self.pan);
        self.position = SamplePosition::ZERO;
        self.previous = 0;
        self.attenuation = Attenuation::from_int(self.target_attenuation as u32);

        self.envelope.key_on(
            ctx.timing.envelope(),
            sample,
            self.regs[SlotRegister::PitchHigh.index()],
        );

        trace!(
            "key on: sample {} base {:#08x} loop {:#06x} end {:#06x}",
            self.sample,
            self.base,
            sample.loop_start,
            sample.end
        );
    }

    fn key_off(&mut self, ctx: &SlotContext<'_>) {
        if !self.playing {
            return;
        }
        if ctx.samples.get(self.sample).release_rate != RELEASE_INSTANT {
            self.envelope.key_off();
        } else {
            self.playing = false;
        }
        trace!("key off: sample {} playing {}", self.sample, self.playing);
    }

    /// Produce this voice's (left, right) contribution for one output sample
    /// and advance its position, attenuation ramp, LFOs and envelope.
    ///
    /// Must only be called while the voice is playing.
    pub fn render(
        &mut self,
        rom: &SampleRom,
        samples: &SampleTable,
        tables: &GlobalTables,
    ) -> (i32, i32) {
        let descriptor = samples.get(self.sample);
        let volume_index =
            ((self.attenuation.int_part() & 0x7F) | ((self.pan as u32) << 7)) as usize;

        // Linear interpolation between the previous and current ROM sample
        let address = self.position.int_part();
        let current = (rom.read_sample(self.base.wrapping_add(address)) as i32) << 8;
        let frac = self.position.frac_part() as i32;
        let mut sample =
            (current * frac + self.previous * (SamplePosition::ONE as i32 - frac)) >> 12;

        let mut step = self.step;
        if self.regs[SlotRegister::LfoVibrato.index()] & 0x07 != 0 {
            step = step.scale(self.pitch_lfo.advance(tables));
        }

        self.position = self.position.wrapping_add(step);
        if self.position.raw() >= SamplePosition::from_int(descriptor.end).raw() {
            self.position = SamplePosition::from_int(descriptor.loop_start);
        }
        if address != self.position.int_part() {
            self.previous = current;
        }

        if self.attenuation.int_part() != self.target_attenuation as u32 {
            self.attenuation = self.attenuation.wrapping_add_signed(self.attenuation_step);
        }

        if self.regs[SlotRegister::LfoTremolo.index()] & 0x07 != 0 {
            sample = self.amplitude_lfo.advance(tables).apply(sample);
        }

        let gain = self.envelope.advance(tables);
        sample = sample.wrapping_mul(gain.raw()) >> ENVELOPE_OUTPUT_SHIFT;
        if self.envelope.is_finished() {
            self.playing = false;
        }

        (
            tables.left_pan[volume_index].wrapping_mul(sample) >> 12,
            tables.right_pan[volume_index].wrapping_mul(sample) >> 12,
        )
    }

    /// True while the voice produces sound
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Raw sub-register values
    pub fn registers(&self) -> [u8; SLOT_REGISTER_COUNT] {
        self.regs
    }

    /// Descriptor index bound at the last key-on
    pub fn sample_index(&self) -> usize {
        self.sample
    }

    /// Resolved ROM base address of the playing sample
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Playback position relative to the sample start
    pub fn position(&self) -> SamplePosition {
        self.position
    }

    /// Playback step per output sample (before vibrato)
    pub fn step(&self) -> SamplePosition {
        self.step
    }

    /// Pan code (0..15)
    pub fn pan(&self) -> u8 {
        self.pan
    }

    /// Current attenuation
    pub fn attenuation(&self) -> Attenuation {
        self.attenuation
    }

    /// Attenuation the ramp is heading to
    pub fn target_attenuation(&self) -> u8 {
        self.target_attenuation
    }

    /// Envelope generator
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Vibrato LFO
    pub fn pitch_lfo(&self) -> &Lfo {
        &self.pitch_lfo
    }

    /// Tremolo LFO
    pub fn amplitude_lfo(&self) -> &Lfo {
        &self.amplitude_lfo
    }
}

impl Default for Slot {
    fn default() -> Self {
        Self::new()
    }
}
