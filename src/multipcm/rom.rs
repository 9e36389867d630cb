//! Sample ROM and bank windows
//!
//! The chip addresses one flat byte buffer. Sample starts below 1 MiB are used
//! as-is; higher starts keep their low 20 bits and take the upper bits from
//! one of two relocatable bank bases.

use log::debug;

use super::constants::{
    DIRECT_ADDRESS_MASK, DIRECT_ADDRESS_RANGE, ROM_FILL_BYTE, SAMPLE_HEADER_BYTES,
};
use crate::{MultiPcmError, Result};

/// Sample ROM buffer with power-of-two address wrapping
#[derive(Debug, Clone, Default)]
pub struct SampleRom {
    data: Vec<u8>,
    mask: u32,
}

/// Smallest power of two >= `size`, minus one.
pub fn address_mask(size: u32) -> u32 {
    size.checked_next_power_of_two()
        .map_or(u32::MAX, |p| p - 1)
}

impl SampleRom {
    /// Create an empty ROM
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocated size in bytes
    pub fn len(&self) -> u32 {
        self.data.len() as u32
    }

    /// True when no ROM has been allocated
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Address mask applied to every sample fetch
    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// Raw ROM contents
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Reallocate the buffer to `size` bytes filled with 0xFF.
    ///
    /// Does nothing when the size is unchanged. On allocation failure the
    /// current contents are kept.
    pub fn resize(&mut self, size: u32) -> Result<()> {
        if self.len() == size {
            return Ok(());
        }

        let mut data = Vec::new();
        data.try_reserve_exact(size as usize)
            .map_err(|_| MultiPcmError::RomAllocation { size })?;
        data.resize(size as usize, ROM_FILL_BYTE);

        self.data = data;
        self.mask = address_mask(size);
        debug!("sample ROM resized to {size:#x} bytes (mask {:#x})", self.mask);
        Ok(())
    }

    /// Copy `bytes` to `offset`, truncating at the end of the buffer.
    ///
    /// Returns true when the write started inside the descriptor header, in
    /// which case the caller must rebuild the descriptor table. Writes starting
    /// past the end are ignored.
    pub fn write(&mut self, offset: u32, bytes: &[u8]) -> bool {
        let size = self.len();
        if offset > size {
            return false;
        }

        let length = (bytes.len() as u64).min((size - offset) as u64) as usize;
        let start = offset as usize;
        self.data[start..start + length].copy_from_slice(&bytes[..length]);

        (offset as usize) < SAMPLE_HEADER_BYTES
    }

    /// Fetch a signed sample byte, wrapping the address by the ROM mask.
    ///
    /// Addresses inside the mask but past a non power-of-two ROM read as the
    /// fill byte.
    #[inline]
    pub fn read_sample(&self, address: u32) -> i8 {
        let index = (address & self.mask) as usize;
        self.data.get(index).copied().unwrap_or(ROM_FILL_BYTE) as i8
    }

    /// Header byte at `offset`, or the fill byte past the end of ROM
    #[inline]
    pub fn header_byte(&self, offset: usize) -> u8 {
        self.data.get(offset).copied().unwrap_or(ROM_FILL_BYTE)
    }
}

/// Left and right bank base addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Banks {
    /// Base used by voices whose pan code has bit 3 set
    pub left: u32,
    /// Base used by voices whose pan code has bit 3 clear
    pub right: u32,
}

impl Banks {
    /// Resolve a sample start address for a voice with the given pan code.
    pub fn resolve(&self, start: u32, pan: u8) -> u32 {
        if start < DIRECT_ADDRESS_RANGE {
            return start;
        }
        let bank = if pan & 0x8 != 0 { self.left } else { self.right };
        (start & DIRECT_ADDRESS_MASK) | bank
    }
}
