//! MultiPCM chip
//!
//! Register interface, ROM/bank management and the 28-voice render loop.

use std::fmt;

use log::{debug, trace};

use super::constants::{READ_STUB, SLOT_REGISTER_COUNT, VOICE_COUNT};
use super::registers::{decode_quick_address, voice_from_select, BankSelect, Port, SlotRegister};
use super::rom::{Banks, SampleRom};
use super::sample::{SampleDescriptor, SampleTable};
use super::slot::{Slot, SlotContext};
use super::tables::{global_tables, GlobalTables};
use super::timing::{sample_rate_for_clock, ChipTiming};
use crate::config::MultiPcmConfig;
use crate::voice_state::VoiceState;
use crate::{MultiPcmError, Result};

/// Mask covering all 28 voices
const ALL_VOICES: u32 = (1 << VOICE_COUNT) - 1;

/// Sega 315-5560 MultiPCM emulator
#[derive(Clone)]
pub struct MultiPcm {
    clock: u32,
    timing: ChipTiming,
    tables: &'static GlobalTables,
    rom: SampleRom,
    samples: SampleTable,
    banks: Banks,
    slots: [Slot; VOICE_COUNT],
    mute_mask: u32,
    selected_voice: Option<usize>,
    selected_register: SlotRegister,
}

impl MultiPcm {
    /// Create a chip running from `clock` Hz, with an empty ROM.
    ///
    /// The output sample rate is `clock / 180`.
    pub fn new(clock: u32) -> Result<Self> {
        let sample_rate = sample_rate_for_clock(clock);
        if sample_rate < 1.0 {
            return Err(MultiPcmError::InvalidClock { clock });
        }

        let chip = Self {
            clock,
            timing: ChipTiming::new(sample_rate),
            tables: global_tables(),
            rom: SampleRom::new(),
            samples: SampleTable::new(),
            banks: Banks::default(),
            slots: std::array::from_fn(|_| Slot::new()),
            mute_mask: 0,
            selected_voice: None,
            selected_register: SlotRegister::Pan,
        };
        debug!("MultiPCM created: clock {clock} Hz, sample rate {sample_rate:.2} Hz");
        Ok(chip)
    }

    /// Create a chip and apply ROM size, banks and mute mask from `config`
    pub fn from_config(config: &MultiPcmConfig) -> Result<Self> {
        let mut chip = Self::new(config.clock)?;
        if let Some(size) = config.rom_size {
            chip.set_rom_size(size)?;
        }
        chip.set_bank(config.left_bank, config.right_bank);
        chip.set_mute_mask(config.mute_mask);
        Ok(chip)
    }

    /// Input clock in Hz
    pub fn clock(&self) -> u32 {
        self.clock
    }

    /// Output sample rate in Hz, rounded down
    pub fn sample_rate(&self) -> u32 {
        self.timing.sample_rate() as u32
    }

    /// Output sample rate in Hz, unrounded
    pub fn sample_rate_exact(&self) -> f32 {
        self.timing.sample_rate()
    }

    /// Stop every voice and clear the voice selection.
    ///
    /// ROM, descriptors, banks, mute mask and raw voice registers are kept.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.stop();
        }
        self.selected_voice = None;
        self.selected_register = SlotRegister::Pan;
        debug!("MultiPCM reset");
    }

    /// Write one of the three byte ports (0 = data, 1 = voice select, 2 = sub-register).
    ///
    /// Other port numbers are ignored.
    pub fn write(&mut self, port: u8, data: u8) {
        match Port::from_addr(port) {
            Some(Port::Data) => match self.selected_voice {
                Some(voice) => self.write_slot(voice, self.selected_register, data),
                None => trace!("data write {data:#04x} dropped: no voice selected"),
            },
            Some(Port::SlotSelect) => {
                self.selected_voice = voice_from_select(data);
            }
            Some(Port::RegisterSelect) => {
                self.selected_register = SlotRegister::from_index(data);
            }
            None => {}
        }
    }

    /// Write a sub-register directly: bits 3..7 of `address` select the voice,
    /// bits 0..2 the sub-register.
    ///
    /// The decoded voice and sub-register become the selection used by later
    /// [`MultiPcm::write`] data writes, including a reserved voice code.
    pub fn write_quick(&mut self, address: u8, data: u8) {
        let (voice, reg) = decode_quick_address(address);
        self.selected_voice = voice;
        self.selected_register = reg;
        match voice {
            Some(voice) => self.write_slot(voice, reg, data),
            None => trace!("quick write to {address:#04x} dropped: no voice"),
        }
    }

    fn write_slot(&mut self, voice: usize, reg: SlotRegister, data: u8) {
        trace!("voice {voice:2} {reg} <- {data:#04x}");
        let ctx = SlotContext {
            timing: &self.timing,
            samples: &self.samples,
            banks: self.banks,
        };
        self.slots[voice].write(reg, data, &ctx);
    }

    /// Register read. The chip has no readable status, so this is always 0.
    pub fn read(&self, _port: u8) -> u8 {
        READ_STUB
    }

    /// Set both bank bases directly
    pub fn set_bank(&mut self, left: u32, right: u32) {
        self.banks = Banks { left, right };
        debug!("banks set: left {left:#010x} right {right:#010x}");
    }

    /// Bank port write: `value << 16` replaces the left base when bit 0 of
    /// `select` is set and the right base when bit 1 is set.
    ///
    /// The base is replaced, not OR-ed into the previous value.
    pub fn write_bank(&mut self, select: u8, value: u16) {
        let select = BankSelect::from_bits_truncate(select);
        let base = (value as u32) << 16;
        if select.contains(BankSelect::LEFT) {
            self.banks.left = base;
        }
        if select.contains(BankSelect::RIGHT) {
            self.banks.right = base;
        }
        debug!(
            "bank write {select:?} {value:#06x}: left {:#010x} right {:#010x}",
            self.banks.left, self.banks.right
        );
    }

    /// Current bank bases
    pub fn banks(&self) -> Banks {
        self.banks
    }

    /// Reallocate the sample ROM to `size` bytes filled with 0xFF.
    ///
    /// A no-op when the size is unchanged. Descriptors are not re-decoded until
    /// the next header write.
    pub fn set_rom_size(&mut self, size: u32) -> Result<()> {
        self.rom.resize(size)
    }

    /// Copy `bytes` into ROM at `offset`.
    ///
    /// Writes starting past the end are ignored and writes running past it are
    /// truncated. Touching the first 6144 bytes re-decodes all 512 descriptors.
    pub fn write_rom(&mut self, offset: u32, bytes: &[u8]) {
        if self.rom.write(offset, bytes) {
            self.samples.rebuild(&self.rom);
        }
    }

    /// Sample ROM
    pub fn rom(&self) -> &SampleRom {
        &self.rom
    }

    /// Address mask applied to sample fetches
    pub fn rom_mask(&self) -> u32 {
        self.rom.mask()
    }

    /// Decoded descriptor `index` (wraps at 512)
    pub fn descriptor(&self, index: usize) -> &SampleDescriptor {
        self.samples.get(index)
    }

    /// Mute voices by bit (bit n = voice n). Bits above 27 are ignored.
    pub fn set_mute_mask(&mut self, mask: u32) {
        self.mute_mask = mask & ALL_VOICES;
    }

    /// Current mute mask
    pub fn mute_mask(&self) -> u32 {
        self.mute_mask
    }

    /// Mute or unmute a single voice. Out-of-range voices are ignored.
    pub fn set_voice_mute(&mut self, voice: usize, muted: bool) {
        if voice >= VOICE_COUNT {
            return;
        }
        if muted {
            self.mute_mask |= 1 << voice;
        } else {
            self.mute_mask &= !(1 << voice);
        }
    }

    /// True when `voice` is muted
    pub fn is_voice_muted(&self, voice: usize) -> bool {
        voice < VOICE_COUNT && self.mute_mask & (1 << voice) != 0
    }

    /// Render `min(left.len(), right.len())` frames, adding each voice's
    /// output to the existing buffer contents.
    ///
    /// Every playing voice advances every frame; muted voices are only left
    /// out of the sum. Output is not clipped.
    pub fn render(&mut self, left: &mut [i32], right: &mut [i32]) {
        let tables = self.tables;
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let mut sum_l = 0i32;
            let mut sum_r = 0i32;
            for (voice, slot) in self.slots.iter_mut().enumerate() {
                if !slot.is_playing() {
                    continue;
                }
                let (vl, vr) = slot.render(&self.rom, &self.samples, tables);
                if self.mute_mask & (1 << voice) == 0 {
                    sum_l = sum_l.wrapping_add(vl);
                    sum_r = sum_r.wrapping_add(vr);
                }
            }
            *l = l.wrapping_add(sum_l);
            *r = r.wrapping_add(sum_r);
        }
    }

    /// Raw sub-registers of `voice`
    pub fn voice_registers(&self, voice: usize) -> Result<[u8; SLOT_REGISTER_COUNT]> {
        self.slot(voice).map(Slot::registers)
    }

    /// Snapshot of `voice`
    pub fn voice_state(&self, voice: usize) -> Result<VoiceState> {
        let slot = self.slot(voice)?;
        Ok(VoiceState::from_slot(voice, slot, self.is_voice_muted(voice)))
    }

    /// Snapshots of all 28 voices
    pub fn voice_states(&self) -> Vec<VoiceState> {
        self.slots
            .iter()
            .enumerate()
            .map(|(voice, slot)| VoiceState::from_slot(voice, slot, self.is_voice_muted(voice)))
            .collect()
    }

    /// Number of voices currently playing
    pub fn active_voices(&self) -> usize {
        self.slots.iter().filter(|s| s.is_playing()).count()
    }

    fn slot(&self, voice: usize) -> Result<&Slot> {
        self.slots
            .get(voice)
            .ok_or(MultiPcmError::InvalidVoice { voice })
    }
}

impl fmt::Debug for MultiPcm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiPcm")
            .field("clock", &self.clock)
            .field("sample_rate", &self.timing.sample_rate())
            .field("rom_size", &self.rom.len())
            .field("rom_mask", &format_args!("{:#x}", self.rom.mask()))
            .field("banks", &self.banks)
            .field("active_voices", &self.active_voices())
            .field("mute_mask", &format_args!("{:#09x}", self.mute_mask))
            .field("selected_voice", &self.selected_voice)
            .field("selected_register", &self.selected_register)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multipcm::envelope::EnvelopePhase;
    use crate::multipcm::registers::KEY_ON;

    const CLOCK: u32 = 8_053_975;

    fn descriptor(start: u32, loop_start: u32, end: u32) -> SampleDescriptor {
        SampleDescriptor {
            start,
            loop_start,
            end,
            attack_rate: 0x0F,
            release_rate: 0x0F,
            ..Default::default()
        }
    }

    /// Chip with a 64 KiB ROM, sample 0 a square wave at 0x2000
    fn chip_with_sample() -> MultiPcm {
        let mut chip = MultiPcm::new(CLOCK).unwrap();
        chip.set_rom_size(0x1_0000).unwrap();
        chip.write_rom(0, &descriptor(0x2000, 0, 64).encode());
        let wave: Vec<u8> = (0..64).map(|i| if i < 32 { 0x60 } else { 0xA0 }).collect();
        chip.write_rom(0x2000, &wave);
        chip
    }

    fn key_on(chip: &mut MultiPcm, voice_select: u8) {
        chip.write(1, voice_select);
        chip.write(2, 1);
        chip.write(0, 0);
        chip.write(2, 3);
        chip.write(0, 0x10);
        chip.write(2, 4);
        chip.write(0, KEY_ON);
    }

    #[test]
    fn test_sample_rate_from_clock() {
        let chip = MultiPcm::new(CLOCK).unwrap();
        assert_eq!(chip.sample_rate(), 44_744);
        assert_eq!(MultiPcm::new(9_000).unwrap().sample_rate(), 50);
    }

    #[test]
    fn test_zero_clock_rejected() {
        assert!(matches!(
            MultiPcm::new(0),
            Err(MultiPcmError::InvalidClock { clock: 0 })
        ));
        assert!(MultiPcm::new(100).is_err());
    }

    #[test]
    fn test_data_write_without_voice_is_dropped() {
        let mut chip = chip_with_sample();
        chip.write(2, 4);
        chip.write(0, KEY_ON);
        assert_eq!(chip.active_voices(), 0);
        // reserved select code
        chip.write(1, 7);
        chip.write(0, KEY_ON);
        assert_eq!(chip.active_voices(), 0);
    }

    #[test]
    fn test_key_on_and_render() {
        let mut chip = chip_with_sample();
        key_on(&mut chip, 0);
        assert_eq!(chip.active_voices(), 1);

        let mut left = vec![0i32; 256];
        let mut right = vec![0i32; 256];
        chip.render(&mut left, &mut right);
        assert!(left.iter().any(|&s| s != 0));
        assert_eq!(left, right);
    }

    #[test]
    fn test_render_accumulates() {
        let mut a = chip_with_sample();
        key_on(&mut a, 0);
        let mut b = a.clone();

        let mut base_l = vec![0i32; 64];
        let mut base_r = vec![0i32; 64];
        a.render(&mut base_l, &mut base_r);

        let mut left = vec![1000i32; 64];
        let mut right = vec![-1000i32; 64];
        b.render(&mut left, &mut right);
        for i in 0..64 {
            assert_eq!(left[i], base_l[i] + 1000);
            assert_eq!(right[i], base_r[i] - 1000);
        }
    }

    #[test]
    fn test_render_block_size_independent() {
        let mut a = chip_with_sample();
        key_on(&mut a, 0);
        let mut b = a.clone();

        let mut block_l = vec![0i32; 300];
        let mut block_r = vec![0i32; 300];
        a.render(&mut block_l, &mut block_r);

        let mut single_l = Vec::new();
        for _ in 0..300 {
            let mut l = [0i32];
            let mut r = [0i32];
            b.render(&mut l, &mut r);
            single_l.push(l[0]);
        }
        assert_eq!(block_l, single_l);
    }

    #[test]
    fn test_render_uses_shorter_buffer() {
        let mut chip = chip_with_sample();
        key_on(&mut chip, 0);
        let mut left = vec![0i32; 8];
        let mut right = vec![0i32; 4];
        chip.render(&mut left, &mut right);
        assert!(left[4..].iter().all(|&s| s == 0));
    }

    #[test]
    fn test_quick_write_matches_port_protocol() {
        let mut a = chip_with_sample();
        key_on(&mut a, 9); // voice 8

        let mut b = chip_with_sample();
        b.write_quick((9 << 3) | 1, 0);
        b.write_quick((9 << 3) | 3, 0x10);
        b.write_quick((9 << 3) | 4, KEY_ON);

        assert_eq!(a.voice_registers(8).unwrap(), b.voice_registers(8).unwrap());
        assert!(b.voice_state(8).unwrap().playing);
    }

    #[test]
    fn test_quick_write_sets_selection() {
        let mut chip = chip_with_sample();
        chip.write_quick((5 << 3) | 1, 0);
        chip.write_quick((5 << 3) | 4, 0x00);
        assert_eq!(chip.selected_voice, Some(5));
        assert_eq!(chip.selected_register, SlotRegister::KeyControl);

        // data port lands on the quick-written voice and register
        chip.write(0, KEY_ON);
        assert!(chip.voice_state(5).unwrap().playing);
        assert_eq!(chip.active_voices(), 1);

        // a reserved voice code clears the selection
        chip.write_quick((7 << 3) | 4, 0x00);
        assert_eq!(chip.selected_voice, None);
        chip.write(0, 0x00);
        assert!(chip.voice_state(5).unwrap().playing);
    }

    #[test]
    fn test_reset_stops_voices_keeps_rom() {
        let mut chip = chip_with_sample();
        key_on(&mut chip, 0);
        chip.reset();
        assert_eq!(chip.active_voices(), 0);
        assert_eq!(chip.selected_voice, None);
        assert_eq!(chip.descriptor(0).start, 0x2000);
        assert_eq!(chip.rom().len(), 0x1_0000);

        let mut left = vec![0i32; 16];
        let mut right = vec![0i32; 16];
        chip.render(&mut left, &mut right);
        assert!(left.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_read_is_stub() {
        let mut chip = chip_with_sample();
        key_on(&mut chip, 0);
        for port in 0..4 {
            assert_eq!(chip.read(port), 0);
        }
    }

    #[test]
    fn test_bank_write() {
        let mut chip = MultiPcm::new(CLOCK).unwrap();
        chip.write_bank(BankSelect::LEFT.bits(), 0x0010);
        assert_eq!(chip.banks(), Banks { left: 0x0010_0000, right: 0 });
        chip.write_bank(0x03, 0x0020);
        assert_eq!(chip.banks(), Banks { left: 0x0020_0000, right: 0x0020_0000 });
        chip.write_bank(BankSelect::RIGHT.bits(), 0x0030);
        assert_eq!(chip.banks(), Banks { left: 0x0020_0000, right: 0x0030_0000 });
        chip.write_bank(0, 0xFFFF);
        assert_eq!(chip.banks(), Banks { left: 0x0020_0000, right: 0x0030_0000 });
    }

    #[test]
    fn test_header_write_rebuilds_descriptors() {
        let mut chip = chip_with_sample();
        chip.write_rom(12 * 5, &descriptor(0x3000, 2, 8).encode());
        assert_eq!(chip.descriptor(5).start, 0x3000);
        assert_eq!(chip.descriptor(5).end, 8);

        // writes outside the header leave descriptors alone
        let before = *chip.descriptor(0);
        chip.write_rom(0x1800, &[0u8; 12]);
        assert_eq!(*chip.descriptor(0), before);
    }

    #[test]
    fn test_mute_helpers() {
        let mut chip = MultiPcm::new(CLOCK).unwrap();
        chip.set_mute_mask(0xFFFF_FFFF);
        assert_eq!(chip.mute_mask(), ALL_VOICES);
        chip.set_voice_mute(3, false);
        assert!(!chip.is_voice_muted(3));
        assert!(chip.is_voice_muted(27));
        assert!(!chip.is_voice_muted(28));
        chip.set_mute_mask(0);
        chip.set_voice_mute(40, true);
        assert_eq!(chip.mute_mask(), 0);
    }

    #[test]
    fn test_voice_queries_reject_bad_index() {
        let chip = MultiPcm::new(CLOCK).unwrap();
        assert!(matches!(
            chip.voice_registers(28),
            Err(MultiPcmError::InvalidVoice { voice: 28 })
        ));
        assert!(chip.voice_state(100).is_err());
        assert_eq!(chip.voice_states().len(), VOICE_COUNT);
    }

    #[test]
    fn test_release_ends_voice() {
        let mut chip = MultiPcm::new(CLOCK).unwrap();
        chip.set_rom_size(0x1_0000).unwrap();
        let mut d = descriptor(0x2000, 0, 64);
        d.release_rate = 0x0E;
        chip.write_rom(0, &d.encode());
        key_on(&mut chip, 0);
        chip.write(0, 0x00); // key off, register 4 still selected
        assert_eq!(
            chip.voice_state(0).unwrap().envelope_phase,
            EnvelopePhase::Release
        );

        let mut left = vec![0i32; 4096];
        let mut right = vec![0i32; 4096];
        chip.render(&mut left, &mut right);
        assert_eq!(chip.active_voices(), 0);
    }
}
