//! MultiPCM Emulation Domain
//!
//! Core Sega 315-5560 emulation: ROM and bank handling, sample descriptors,
//! envelope generation, LFO modulation and the 28-voice mixer.
//!
//! Implementation:
//! - `chip` - register interface and render loop
//! - `slot` - per-voice state and register side effects

// Internal modules
pub mod chip;
pub mod constants;
pub mod envelope;
pub mod fixed;
pub mod lfo;
pub mod registers;
pub mod rom;
pub mod sample;
pub mod slot;
pub mod tables;
pub mod timing;

// Re-export public API
pub use chip::MultiPcm;
pub use constants::{CLOCK_DIVIDER, VOICE_COUNT};
pub use envelope::EnvelopePhase;
pub use registers::{BankSelect, Port, SlotRegister};
pub use sample::SampleDescriptor;
