//! WAV file export functionality

use std::path::Path;

use log::debug;

use super::{saturate_i16, EXPORT_BLOCK_FRAMES};
use crate::backend::MultiPcmBackend;
use crate::{MultiPcmError, Result};

/// Render `frames` stereo frames from `device` into a 16-bit WAV file
///
/// The file runs at the device's sample rate. Samples outside the 16-bit
/// range are clipped.
///
/// # Arguments
///
/// * `device` - Chip with ROM loaded and voices keyed on
/// * `frames` - Number of stereo frames to render
/// * `output_path` - Path where the WAV file will be written
///
/// # Examples
///
/// ```no_run
/// use multipcm::{render_to_wav, MultiPcm};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut chip = MultiPcm::new(8_053_975)?;
/// chip.set_rom_size(0x20_0000)?;
/// chip.write_rom(0, &std::fs::read("multipcm.bin")?);
/// chip.write_quick(0x01, 0x00);
/// chip.write_quick(0x04, 0x80);
///
/// render_to_wav(&mut chip, 44_744, "voice0.wav")?;
/// # Ok(())
/// # }
/// ```
pub fn render_to_wav<B: MultiPcmBackend, P: AsRef<Path>>(
    device: &mut B,
    frames: usize,
    output_path: P,
) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: device.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(output_path.as_ref(), spec)
        .map_err(|e| wav_error("Failed to create WAV file", e))?;

    let mut left = vec![0i32; EXPORT_BLOCK_FRAMES];
    let mut right = vec![0i32; EXPORT_BLOCK_FRAMES];
    let mut remaining = frames;
    while remaining > 0 {
        let count = remaining.min(EXPORT_BLOCK_FRAMES);
        left[..count].fill(0);
        right[..count].fill(0);
        device.render(&mut left[..count], &mut right[..count]);

        for (&l, &r) in left[..count].iter().zip(&right[..count]) {
            writer
                .write_sample(saturate_i16(l))
                .and_then(|_| writer.write_sample(saturate_i16(r)))
                .map_err(|e| wav_error("Failed to write sample", e))?;
        }
        remaining -= count;
    }

    writer
        .finalize()
        .map_err(|e| wav_error("Failed to finalize WAV file", e))?;

    debug!(
        "wrote {frames} frames at {} Hz to {}",
        spec.sample_rate,
        output_path.as_ref().display()
    );
    Ok(())
}

/// Filesystem failures keep their `io::Error`; encoder failures become `AudioFileError`
fn wav_error(context: &str, err: hound::Error) -> MultiPcmError {
    match err {
        hound::Error::IoError(io) => MultiPcmError::Io(io),
        other => MultiPcmError::AudioFileError(format!("{context}: {other}")),
    }
}
