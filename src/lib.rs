//! Sega 315-5560 MultiPCM Emulator
//!
//! A sample-accurate emulator of the Sega MultiPCM wavetable sound chip used on
//! System 32, Model 1 and Model 2 boards. The chip plays 8-bit PCM samples from a
//! bank-switched ROM on 28 independent voices, each with its own envelope
//! generator and pitch/amplitude LFOs.
//!
//! # Features
//! - All 28 voices with linear sample interpolation and looping
//! - 4-phase envelope generator with key rate scaling
//! - Vibrato and tremolo LFOs with 8 frequencies and 8 depths each
//! - Sample descriptor table decoded from the ROM header
//! - Left/right bank windows for ROMs larger than 1 MiB
//! - Per-voice muting that keeps voice state running
//!
//! # Crate feature flags
//! - `export-wav` (opt-in): offline rendering to WAV files (enables optional `hound` dep)
//!
//! # Quick start
//! ```no_run
//! use multipcm::{MultiPcm, MultiPcmBackend};
//!
//! let mut chip = MultiPcm::new(8_053_975).unwrap();
//! chip.set_rom_size(0x20_0000).unwrap();
//! chip.write_rom(0, &std::fs::read("multipcm.bin").unwrap());
//!
//! chip.write(1, 0x00); // select voice 0
//! chip.write(2, 0x01); // sample number
//! chip.write(0, 0x00);
//! chip.write(2, 0x03); // octave 0, pitch 0
//! chip.write(0, 0x10);
//! chip.write(2, 0x04); // key on
//! chip.write(0, 0x80);
//!
//! let mut left = vec![0i32; 512];
//! let mut right = vec![0i32; 512];
//! chip.render(&mut left, &mut right);
//! ```

#![warn(missing_docs)]

pub mod backend; // Host device contract
pub mod config; // Chip configuration
#[cfg(feature = "export-wav")]
pub mod export; // Offline rendering
pub mod multipcm; // MultiPCM emulation (core)
pub mod voice_state; // Per-voice snapshots

/// Error types for MultiPCM emulator operations
#[derive(thiserror::Error, Debug)]
pub enum MultiPcmError {
    /// Input clock too low to produce a usable sample rate
    #[error("Invalid clock: {clock} Hz yields no usable sample rate")]
    InvalidClock {
        /// Clock that was rejected
        clock: u32,
    },

    /// Sample ROM buffer could not be allocated
    #[error("Failed to allocate {size} bytes of sample ROM")]
    RomAllocation {
        /// Requested ROM size in bytes
        size: u32,
    },

    /// Voice index outside 0..28
    #[error("Invalid voice index: {voice}")]
    InvalidVoice {
        /// Rejected voice index
        voice: usize,
    },

    /// IO error from filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error writing audio file
    #[error("Audio file write error: {0}")]
    AudioFileError(String),
}

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, MultiPcmError>;

// Public API exports
pub use backend::{MultiPcmBackend, DEVICE_ID, DEVICE_NAME};
pub use config::MultiPcmConfig;
pub use multipcm::{MultiPcm, SampleDescriptor, CLOCK_DIVIDER, VOICE_COUNT};
pub use voice_state::VoiceState;

#[cfg(feature = "export-wav")]
pub use export::render_to_wav;
