//! Process-wide lookup tables
//!
//! Pan/attenuation curves, the linear-to-exponential envelope curve and the
//! LFO waveform/depth tables do not depend on the chip clock. They are built
//! once behind a `OnceLock` and shared by every chip instance.

use std::sync::OnceLock;

use super::constants::{AMPLITUDE_LFO_DEPTHS, PITCH_LFO_DEPTHS};
use super::fixed::{LFO_FRAC_BITS, SAMPLE_FRAC_BITS};

/// Entries in each pan table: 7-bit attenuation | 4-bit pan code << 7.
pub const PAN_TABLE_SIZE: usize = 0x800;

/// Entries in the envelope curve (one per 10-bit level).
pub const ENVELOPE_CURVE_SIZE: usize = 0x400;

/// Entries in each LFO waveform and depth table.
pub const LFO_TABLE_SIZE: usize = 256;

/// Number of selectable LFO depths.
pub const LFO_DEPTH_COUNT: usize = 8;

/// Shared lookup tables
#[derive(Debug)]
pub struct GlobalTables {
    /// Left channel gain (Q12) by `attenuation | pan << 7`
    pub left_pan: [i32; PAN_TABLE_SIZE],
    /// Right channel gain (Q12) by `attenuation | pan << 7`
    pub right_pan: [i32; PAN_TABLE_SIZE],
    /// Envelope level to gain (Q12), -96 dB .. 0 dB
    pub envelope_curve: [i32; ENVELOPE_CURVE_SIZE],
    /// Signed triangle for vibrato, -127..127
    pub pitch_wave: [i32; LFO_TABLE_SIZE],
    /// Unsigned triangle for tremolo, 0..255
    pub amplitude_wave: [i32; LFO_TABLE_SIZE],
    /// Pitch multipliers (Q8) by depth, indexed by wave value + 128
    pub pitch_depths: [[i32; LFO_TABLE_SIZE]; LFO_DEPTH_COUNT],
    /// Amplitude multipliers (Q8) by depth, indexed by wave value
    pub amplitude_depths: [[i32; LFO_TABLE_SIZE]; LFO_DEPTH_COUNT],
}

static GLOBAL_TABLES: OnceLock<GlobalTables> = OnceLock::new();

/// Build the shared tables if needed and return them.
///
/// Safe to call any number of times from any thread; the tables are built once.
pub fn global_tables() -> &'static GlobalTables {
    GLOBAL_TABLES.get_or_init(GlobalTables::build)
}

/// Float to Q12, truncating like the hardware tables.
#[inline]
fn fix12(v: f32) -> i32 {
    ((1u32 << SAMPLE_FRAC_BITS) as f32 * v) as u32 as i32
}

/// Double to Q8, truncating.
#[inline]
fn fix8(v: f64) -> i32 {
    ((1u32 << LFO_FRAC_BITS) as f32 as f64 * v) as u32 as i32
}

/// Convert dB to a linear factor.
#[inline]
fn db_to_linear(db: f32) -> f32 {
    10f64.powf(db as f64 / 20.0) as f32
}

impl GlobalTables {
    fn build() -> Self {
        let (left_pan, right_pan) = build_pan_tables();
        let (pitch_wave, amplitude_wave) = build_lfo_waves();
        let (pitch_depths, amplitude_depths) = build_lfo_depths();
        Self {
            left_pan,
            right_pan,
            envelope_curve: build_envelope_curve(),
            pitch_wave,
            amplitude_wave,
            pitch_depths,
            amplitude_depths,
        }
    }
}

fn build_pan_tables() -> ([i32; PAN_TABLE_SIZE], [i32; PAN_TABLE_SIZE]) {
    let mut left = [0i32; PAN_TABLE_SIZE];
    let mut right = [0i32; PAN_TABLE_SIZE];

    for i in 0..PAN_TABLE_SIZE {
        let total_level = (i & 0x7F) as u8;
        let mut pan = ((i >> 7) & 0x0F) as u8;

        // 0.375 dB per attenuation step
        let tl_db = (total_level as f32 as f64 * -24.0 / 64.0) as f32;
        let tl = db_to_linear(tl_db);

        let (lpan, rpan) = if pan == 0x8 {
            (0.0f32, 0.0f32)
        } else if pan == 0x0 {
            (1.0, 1.0)
        } else if pan & 0x8 != 0 {
            pan = 0x10 - pan;
            let pan_db = (pan as f32 as f64 * -12.0 / 4.0) as f32;
            let rpan = if pan & 0x7 == 7 {
                0.0
            } else {
                db_to_linear(pan_db)
            };
            (1.0, rpan)
        } else {
            let pan_db = (pan as f32 as f64 * -12.0 / 4.0) as f32;
            let lpan = if pan & 0x7 == 7 {
                0.0
            } else {
                db_to_linear(pan_db)
            };
            (lpan, 1.0)
        };

        let tl = tl / 4.0;
        left[i] = fix12(lpan * tl);
        right[i] = fix12(rpan * tl);
    }

    (left, right)
}

fn build_envelope_curve() -> [i32; ENVELOPE_CURVE_SIZE] {
    let mut curve = [0i32; ENVELOPE_CURVE_SIZE];
    for (i, entry) in curve.iter_mut().enumerate() {
        let db = (-(96.0 - (96.0 * i as f32 as f64 / ENVELOPE_CURVE_SIZE as f64))) as f32;
        *entry = (10f64.powf(db as f64 / 20.0) * (1u32 << SAMPLE_FRAC_BITS) as f64) as i32;
    }
    curve
}

fn build_lfo_waves() -> ([i32; LFO_TABLE_SIZE], [i32; LFO_TABLE_SIZE]) {
    let mut pitch = [0i32; LFO_TABLE_SIZE];
    let mut amplitude = [0i32; LFO_TABLE_SIZE];

    for i in 0..LFO_TABLE_SIZE as i32 {
        amplitude[i as usize] = if i < 128 { 255 - i * 2 } else { i * 2 - 256 };
        pitch[i as usize] = if i < 64 {
            i * 2
        } else if i < 128 {
            255 - i * 2
        } else if i < 192 {
            256 - i * 2
        } else {
            i * 2 - 511
        };
    }

    (pitch, amplitude)
}

type DepthTables = [[i32; LFO_TABLE_SIZE]; LFO_DEPTH_COUNT];

fn build_lfo_depths() -> (DepthTables, DepthTables) {
    let mut pitch = [[0i32; LFO_TABLE_SIZE]; LFO_DEPTH_COUNT];
    let mut amplitude = [[0i32; LFO_TABLE_SIZE]; LFO_DEPTH_COUNT];

    for depth in 0..LFO_DEPTH_COUNT {
        let cents_limit = PITCH_LFO_DEPTHS[depth];
        for i in -128i32..128 {
            let cents = (cents_limit * i as f32) as f64 / 128.0;
            pitch[depth][(i + 128) as usize] = fix8(2f64.powf(cents / 1200.0));
        }

        let db_limit = -AMPLITUDE_LFO_DEPTHS[depth];
        for i in 0..LFO_TABLE_SIZE as i32 {
            let db = (db_limit * i as f32) as f64 / 256.0;
            amplitude[depth][i as usize] = fix8(10f64.powf(db / 20.0));
        }
    }

    (pitch, amplitude)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tables_are_shared() {
        let a = global_tables() as *const GlobalTables;
        let b = global_tables() as *const GlobalTables;
        assert_eq!(a, b);
    }

    #[test]
    fn test_center_pan_full_level() {
        let t = global_tables();
        // TL 0, pan 0: 1/4 of unity on both sides
        assert_eq!(t.left_pan[0], 1024);
        assert_eq!(t.right_pan[0], 1024);
    }

    #[test]
    fn test_pan_code_8_is_silent() {
        let t = global_tables();
        for tl in 0..0x80 {
            assert_eq!(t.left_pan[tl | (0x8 << 7)], 0);
            assert_eq!(t.right_pan[tl | (0x8 << 7)], 0);
        }
    }

    #[test]
    fn test_hard_pans() {
        let t = global_tables();
        // pan 7 silences left, pan 9 silences right
        assert_eq!(t.left_pan[0x7 << 7], 0);
        assert_eq!(t.right_pan[0x7 << 7], 1024);
        assert_eq!(t.left_pan[0x9 << 7], 1024);
        assert_eq!(t.right_pan[0x9 << 7], 0);
    }

    #[test]
    fn test_pan_attenuation_monotonic() {
        let t = global_tables();
        for tl in 1..0x80 {
            assert!(t.left_pan[tl] <= t.left_pan[tl - 1]);
        }
        for pan in 1..7usize {
            assert!(t.left_pan[(pan + 1) << 7] < t.left_pan[pan << 7]);
            assert_eq!(t.right_pan[pan << 7], 1024);
        }
    }

    #[test]
    fn test_envelope_curve_shape() {
        let t = global_tables();
        assert_eq!(t.envelope_curve[0], 0);
        for i in 1..ENVELOPE_CURVE_SIZE {
            assert!(t.envelope_curve[i] >= t.envelope_curve[i - 1]);
        }
        let top = t.envelope_curve[ENVELOPE_CURVE_SIZE - 1] as f64 / 4096.0;
        assert_relative_eq!(top, 10f64.powf(-0.09375 / 20.0), epsilon = 1e-3);
    }

    #[test]
    fn test_lfo_waves() {
        let t = global_tables();
        assert_eq!(t.pitch_wave[0], 0);
        assert_eq!(t.pitch_wave[63], 126);
        assert_eq!(t.pitch_wave[64], 127);
        assert_eq!(t.pitch_wave[128], 0);
        assert_eq!(t.pitch_wave[192], -127);
        assert_eq!(t.amplitude_wave[0], 255);
        assert_eq!(t.amplitude_wave[127], 1);
        assert_eq!(t.amplitude_wave[128], 0);
        for i in 0..LFO_TABLE_SIZE {
            assert!((-128..128).contains(&t.pitch_wave[i]));
            assert!((0..256).contains(&t.amplitude_wave[i]));
        }
    }

    #[test]
    fn test_depth_zero_is_unity() {
        let t = global_tables();
        assert!(t.pitch_depths[0].iter().all(|&v| v == 256));
        assert!(t.amplitude_depths[0].iter().all(|&v| v == 256));
    }

    #[test]
    fn test_depth_extremes() {
        let t = global_tables();
        // +79.3 cents at the top of the deepest vibrato
        let top = t.pitch_depths[7][255] as f64 / 256.0;
        assert_relative_eq!(top, 2f64.powf(79.307 * 127.0 / 128.0 / 1200.0), epsilon = 1e-2);
        // -24 dB * 255/256 at the bottom of the deepest tremolo
        let bottom = t.amplitude_depths[7][255] as f64 / 256.0;
        assert_relative_eq!(bottom, 10f64.powf(-24.0 * 255.0 / 256.0 / 20.0), epsilon = 1e-2);
    }
}
