//! Offline rendering
//!
//! Renders a configured chip to audio files. The chip mix is an unclipped
//! `i32` sum of up to 28 voices, so every exporter saturates to the output
//! sample format.

mod wav;

pub use wav::render_to_wav;

/// Frames rendered per block while exporting
pub const EXPORT_BLOCK_FRAMES: usize = 1024;

/// Clamp a mixed sample to the 16-bit output range
#[inline]
pub fn saturate_i16(sample: i32) -> i16 {
    sample.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturate_i16() {
        assert_eq!(saturate_i16(0), 0);
        assert_eq!(saturate_i16(-1234), -1234);
        assert_eq!(saturate_i16(40_000), i16::MAX);
        assert_eq!(saturate_i16(-40_000), i16::MIN);
    }
}
