use crate::{AudioError, CoreResult, audio::TARGET_SAMPLE_RATE};

use std::{panic::Location, path::Path};

use error_location::ErrorLocation;
use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::{debug, instrument};

/// Write 16 kHz mono samples as 16-bit PCM WAV.
///
/// Samples are clamped to [-1.0, 1.0] before scaling so clipped input
/// cannot wrap around during the integer conversion.
#[track_caller]
#[instrument(skip(samples))]
pub(crate) fn write_recording(path: &Path, samples: &[f32]) -> CoreResult<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: TARGET_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(|e| AudioError::WavWriteFailed {
        reason: format!("Failed to create {:?}: {}", path, e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        writer
            .write_sample(value)
            .map_err(|e| AudioError::WavWriteFailed {
                reason: format!("Failed to write sample: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;
    }

    writer.finalize().map_err(|e| AudioError::WavWriteFailed {
        reason: format!("Failed to finalize {:?}: {}", path, e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    debug!(path = ?path, sample_count = samples.len(), "Recording written");

    Ok(())
}
