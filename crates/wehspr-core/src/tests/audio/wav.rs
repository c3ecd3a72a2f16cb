use crate::{TARGET_SAMPLE_RATE, audio::wav};

use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

/// WHAT: Written WAV carries the fixed mono/16kHz/16-bit spec
/// WHY: The engine and any external player rely on this exact format
#[test]
#[allow(clippy::unwrap_used)]
fn given_samples_when_writing_wav_then_spec_and_length_match() {
    // Given: One second of a quiet tone
    let dir = std::env::temp_dir().join(format!(
        "wehspr_wav_{}",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("tone.wav");
    let samples: Vec<f32> = (0..TARGET_SAMPLE_RATE as usize)
        .map(|i| (i as f32 * 0.02).sin() * 0.3)
        .collect();

    // When: Writing the recording
    wav::write_recording(&path, &samples).unwrap();

    // Then: The file reads back with the fixed spec and full length
    let reader = hound::WavReader::open(&path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, TARGET_SAMPLE_RATE);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, hound::SampleFormat::Int);
    assert_eq!(reader.duration(), TARGET_SAMPLE_RATE);

    let _ = fs::remove_dir_all(&dir);
}

/// WHAT: Out-of-range samples are clamped, not wrapped
/// WHY: Clipped input must degrade gracefully in the integer conversion
#[test]
#[allow(clippy::unwrap_used)]
fn given_clipped_samples_when_writing_wav_then_values_clamped_to_i16_range() {
    // Given: Samples beyond [-1.0, 1.0]
    let dir = std::env::temp_dir().join(format!(
        "wehspr_wav_clip_{}",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("clip.wav");
    let samples = vec![2.0f32, -2.0, 0.0];

    // When: Writing the recording
    wav::write_recording(&path, &samples).unwrap();

    // Then: Extremes land on the i16 bounds
    let mut reader = hound::WavReader::open(&path).unwrap();
    let values: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(values[0], i16::MAX);
    assert_eq!(values[1], -i16::MAX);
    assert_eq!(values[2], 0);

    let _ = fs::remove_dir_all(&dir);
}
