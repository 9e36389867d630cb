//! Backend trait abstraction for MultiPCM implementations
//!
//! This module defines the device contract a host (VGM player, arcade driver,
//! offline renderer) programs against, so the emulator can be swapped or
//! wrapped without touching the host.

use crate::multipcm::MultiPcm;
use crate::Result;

/// Device id of the MultiPCM in the VGM chip list.
pub const DEVICE_ID: u8 = 0x15;

/// Human-readable device name.
pub const DEVICE_NAME: &str = "MultiPCM";

/// Common interface for MultiPCM backends
///
/// # Example
///
/// ```
/// use multipcm::{MultiPcm, MultiPcmBackend};
///
/// fn key_on<B: MultiPcmBackend>(chip: &mut B, voice_select: u8, sample: u8) {
///     chip.write(1, voice_select); // voice
///     chip.write(2, 1);            // sample number
///     chip.write(0, sample);
///     chip.write(2, 4);            // key on
///     chip.write(0, 0x80);
/// }
///
/// let mut chip = MultiPcm::new(8_053_975).unwrap();
/// key_on(&mut chip, 0, 0);
/// let (left, right) = chip.render_frames(64);
/// assert_eq!(left.len(), right.len());
/// ```
pub trait MultiPcmBackend: Send {
    /// Output sample rate in Hz
    fn sample_rate(&self) -> u32;

    /// Stop all voices and clear the voice selection
    ///
    /// ROM contents and descriptors are kept.
    fn reset(&mut self);

    /// Write one of the byte ports
    ///
    /// # Arguments
    ///
    /// * `port` - 0 = data, 1 = voice select, 2 = sub-register select
    /// * `data` - Value to write
    ///
    /// Other port numbers are ignored.
    fn write(&mut self, port: u8, data: u8);

    /// Write a voice sub-register in one step
    ///
    /// The decoded voice and sub-register also become the current selection.
    ///
    /// # Arguments
    ///
    /// * `address` - Voice select code in bits 3..7, sub-register in bits 0..2
    /// * `data` - Value to write
    fn write_quick(&mut self, address: u8, data: u8);

    /// Read a port. Always returns the stub value 0.
    fn read(&self, port: u8) -> u8;

    /// Bank port write
    ///
    /// # Arguments
    ///
    /// * `select` - Bit 0 updates the left bank, bit 1 the right bank
    /// * `value` - Bank number, placed in address bits 16..31
    fn write_bank(&mut self, select: u8, value: u16);

    /// Set both bank base addresses
    fn set_bank(&mut self, left: u32, right: u32);

    /// Reallocate the sample ROM, filled with 0xFF
    fn set_rom_size(&mut self, size: u32) -> Result<()>;

    /// Copy bytes into the sample ROM at `offset`
    fn write_rom(&mut self, offset: u32, bytes: &[u8]);

    /// Mute voices by bit (bit n = voice n)
    fn set_mute_mask(&mut self, mask: u32);

    /// Render frames, adding into the caller's buffers
    ///
    /// The frame count is the shorter of the two buffer lengths.
    fn render(&mut self, left: &mut [i32], right: &mut [i32]);

    /// Render `count` frames into fresh buffers
    fn render_frames(&mut self, count: usize) -> (Vec<i32>, Vec<i32>) {
        let mut left = vec![0; count];
        let mut right = vec![0; count];
        self.render(&mut left, &mut right);
        (left, right)
    }
}

impl MultiPcmBackend for MultiPcm {
    fn sample_rate(&self) -> u32 {
        MultiPcm::sample_rate(self)
    }

    fn reset(&mut self) {
        MultiPcm::reset(self);
    }

    fn write(&mut self, port: u8, data: u8) {
        MultiPcm::write(self, port, data);
    }

    fn write_quick(&mut self, address: u8, data: u8) {
        MultiPcm::write_quick(self, address, data);
    }

    fn read(&self, port: u8) -> u8 {
        MultiPcm::read(self, port)
    }

    fn write_bank(&mut self, select: u8, value: u16) {
        MultiPcm::write_bank(self, select, value);
    }

    fn set_bank(&mut self, left: u32, right: u32) {
        MultiPcm::set_bank(self, left, right);
    }

    fn set_rom_size(&mut self, size: u32) -> Result<()> {
        MultiPcm::set_rom_size(self, size)
    }

    fn write_rom(&mut self, offset: u32, bytes: &[u8]) {
        MultiPcm::write_rom(self, offset, bytes);
    }

    fn set_mute_mask(&mut self, mask: u32) {
        MultiPcm::set_mute_mask(self, mask);
    }

    fn render(&mut self, left: &mut [i32], right: &mut [i32]) {
        MultiPcm::render(self, left, right);
    }
}
