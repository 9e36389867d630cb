//! Fixed-point types used by the render path
//!
//! Every quantity that the hardware keeps as a shifted integer gets a type
//! that carries its fractional bit count, so mixing up scales is a type error
//! rather than a silent magnitude bug.

/// Fractional bits of playback positions, pitch steps, attenuation and gains.
pub const SAMPLE_FRAC_BITS: u32 = 12;

/// Fractional bits of the envelope level accumulator.
pub const ENVELOPE_FRAC_BITS: u32 = 16;

/// Fractional bits of the LFO phase accumulator and depth tables.
pub const LFO_FRAC_BITS: u32 = 8;

/// Unsigned fixed-point value with `FRAC` fractional bits.
///
/// Arithmetic wraps at 32 bits, like the hardware counters it models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct UFixed<const FRAC: u32> {
    raw: u32,
}

impl<const FRAC: u32> UFixed<FRAC> {
    /// Number of fractional bits
    pub const FRAC_BITS: u32 = FRAC;
    /// Raw value of 1.0
    pub const ONE: u32 = 1 << FRAC;
    const FRAC_MASK: u32 = Self::ONE - 1;

    /// Zero
    pub const ZERO: Self = Self { raw: 0 };

    /// Create from raw value
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self { raw }
    }

    /// Create from integer value (upper bits are shifted out)
    #[inline]
    pub const fn from_int(value: u32) -> Self {
        Self {
            raw: value.wrapping_shl(FRAC),
        }
    }

    /// Raw value
    #[inline]
    pub const fn raw(self) -> u32 {
        self.raw
    }

    /// Integer part
    #[inline]
    pub const fn int_part(self) -> u32 {
        self.raw >> FRAC
    }

    /// Fractional part, in units of 1/2^FRAC
    #[inline]
    pub const fn frac_part(self) -> u32 {
        self.raw & Self::FRAC_MASK
    }

    /// Wrapping addition
    #[inline]
    pub const fn wrapping_add(self, other: Self) -> Self {
        Self {
            raw: self.raw.wrapping_add(other.raw),
        }
    }

    /// Wrapping addition of a signed raw delta
    #[inline]
    pub const fn wrapping_add_signed(self, delta: i32) -> Self {
        Self {
            raw: self.raw.wrapping_add_signed(delta),
        }
    }

    /// Multiply by a Q12 gain, wrapping at 32 bits
    #[inline]
    pub const fn scale(self, gain: Gain) -> Self {
        Self {
            raw: self.raw.wrapping_mul(gain.raw() as u32) >> Gain::FRAC_BITS,
        }
    }
}

/// Playback position / pitch step: integer part is a ROM byte offset.
pub type SamplePosition = UFixed<SAMPLE_FRAC_BITS>;

/// Current voice attenuation: integer part is the 7-bit total level.
pub type Attenuation = UFixed<SAMPLE_FRAC_BITS>;

/// Signed Q12 multiplier (4096 = unity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Gain {
    raw: i32,
}

impl Gain {
    /// Number of fractional bits
    pub const FRAC_BITS: u32 = SAMPLE_FRAC_BITS;

    /// Unity gain
    pub const UNITY: Self = Self {
        raw: 1 << Self::FRAC_BITS,
    };

    /// Create from raw Q12 value
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self { raw }
    }

    /// Promote a Q8 value (LFO depth tables) to Q12
    #[inline]
    pub const fn from_q8(raw: i32) -> Self {
        Self {
            raw: raw << (SAMPLE_FRAC_BITS - LFO_FRAC_BITS),
        }
    }

    /// Raw Q12 value
    #[inline]
    pub const fn raw(self) -> i32 {
        self.raw
    }

    /// Apply to a sample: `(sample * gain) >> 12`
    #[inline]
    pub const fn apply(self, sample: i32) -> i32 {
        sample.wrapping_mul(self.raw) >> Self::FRAC_BITS
    }
}

/// Envelope level: a 10-bit linear level with 16 fractional bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct EnvelopeLevel {
    raw: i32,
}

impl EnvelopeLevel {
    /// Number of fractional bits
    pub const FRAC_BITS: u32 = ENVELOPE_FRAC_BITS;

    /// Silence
    pub const ZERO: Self = Self { raw: 0 };

    /// Highest reachable level (0x3FF)
    pub const MAX: Self = Self {
        raw: 0x3FF << ENVELOPE_FRAC_BITS,
    };

    /// Create from raw value
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self { raw }
    }

    /// Raw value
    #[inline]
    pub const fn raw(self) -> i32 {
        self.raw
    }

    /// Integer 10-bit level
    #[inline]
    pub const fn level(self) -> i32 {
        self.raw >> ENVELOPE_FRAC_BITS
    }

    /// Add a rate step, saturating at `MAX`. Returns true when saturated.
    #[inline]
    pub fn rise(&mut self, step: i32) -> bool {
        self.raw = self.raw.saturating_add(step);
        if self.raw >= Self::MAX.raw {
            self.raw = Self::MAX.raw;
            true
        } else {
            false
        }
    }

    /// Subtract a rate step, flooring at zero. Returns true when floored.
    #[inline]
    pub fn fall(&mut self, step: i32) -> bool {
        self.raw = self.raw.saturating_sub(step);
        if self.raw <= 0 {
            self.raw = 0;
            true
        } else {
            false
        }
    }
}
