use crate::{AudioError, AudioPipeline, CoreResult, SpeechToText, TARGET_SAMPLE_RATE};

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Scripted engine so pipeline tests run without a model file.
struct ScriptedEngine {
    text: &'static str,
}

impl SpeechToText for ScriptedEngine {
    fn transcribe(&mut self, _samples: &[f32]) -> CoreResult<String> {
        Ok(self.text.to_string())
    }
}

#[allow(clippy::unwrap_used)]
fn scratch_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "wehspr_pipeline_{}_{}",
        label,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn three_seconds_of_tone() -> Vec<f32> {
    (0..TARGET_SAMPLE_RATE as usize * 3)
        .map(|i| (i as f32 * 0.05).sin() * 0.4)
        .collect()
}

/// WHAT: AudioPipeline rejects non-existent model path
/// WHY: Early validation prevents runtime failures
#[test]
fn given_invalid_model_path_when_creating_pipeline_then_model_not_found_error() {
    // Given: Path to non-existent Whisper model
    let invalid_path = std::path::PathBuf::from("/nonexistent/model.bin");

    // When: Attempting to create AudioPipeline
    let result = AudioPipeline::new(&invalid_path, std::env::temp_dir(), false);

    // Then: Returns ModelNotFound error
    assert!(result.is_err());
    assert!(matches!(result, Err(AudioError::ModelNotFound { .. })));
}

/// WHAT: Three seconds of captured audio finalize to a timestamped WAV and
///       transcribe to the engine's text
/// WHY: Validates the full stop-to-transcript path end to end
#[test]
#[allow(clippy::unwrap_used)]
fn given_three_seconds_of_audio_when_finalizing_and_transcribing_then_file_and_text_produced() {
    // Given: A pipeline with a scripted engine and 3s of 16kHz samples
    let dir = scratch_dir("scenario");
    let mut pipeline = AudioPipeline::with_engine(
        Box::new(ScriptedEngine {
            text: "hello world",
        }),
        dir.clone(),
    );
    let samples = three_seconds_of_tone();

    // When: Finalizing and transcribing
    let finalized = pipeline.finalize(samples).unwrap();
    let text = pipeline.transcribe(&finalized.samples).unwrap();

    // Then: File name matches recording_<YYYYMMDD-HHMMSS>.wav
    let name = finalized.file.path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("recording_"), "got {name}");
    assert!(name.ends_with(".wav"), "got {name}");
    let stamp = name
        .strip_prefix("recording_")
        .unwrap()
        .strip_suffix(".wav")
        .unwrap();
    assert_eq!(stamp.len(), "YYYYMMDD-HHMMSS".len());
    assert_eq!(stamp.as_bytes()[8], b'-');

    // Then: The file holds 3 seconds of 16kHz mono 16-bit audio
    let reader = hound::WavReader::open(&finalized.file.path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, TARGET_SAMPLE_RATE);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.duration(), TARGET_SAMPLE_RATE * 3);

    // Then: The recording is registered and the transcript matches
    assert_eq!(pipeline.history_len(), 1);
    assert_eq!(
        pipeline.latest_recording().unwrap().path,
        finalized.file.path
    );
    assert_eq!(text, "hello world");

    let _ = fs::remove_dir_all(&dir);
}

/// WHAT: Empty audio samples cause NoAudioCaptured error on finalize
/// WHY: A recording with no frames must be dropped, not written
#[test]
fn given_empty_samples_when_finalizing_then_no_audio_captured_error() {
    // Given: A pipeline with a scripted engine
    let dir = scratch_dir("empty");
    let mut pipeline = AudioPipeline::with_engine(
        Box::new(ScriptedEngine { text: "unused" }),
        dir.clone(),
    );

    // When: Finalizing with no samples
    let result = pipeline.finalize(Vec::new());

    // Then: Returns NoAudioCaptured error and nothing is registered
    assert!(matches!(result, Err(AudioError::NoAudioCaptured { .. })));
    assert_eq!(pipeline.history_len(), 0);

    let _ = fs::remove_dir_all(&dir);
}

/// WHAT: stop_capture before any start_capture is a state violation
/// WHY: Lifecycle misuse must surface as a contract error, not silence
#[test]
fn given_fresh_pipeline_when_stopping_capture_then_state_violation() {
    // Given: A pipeline that never started capturing
    let dir = scratch_dir("violation");
    let mut pipeline = AudioPipeline::with_engine(
        Box::new(ScriptedEngine { text: "unused" }),
        dir.clone(),
    );

    // When: Stopping capture without a start
    let result = pipeline.stop_capture();

    // Then: Returns StateViolation error
    assert!(matches!(result, Err(AudioError::StateViolation { .. })));

    let _ = fs::remove_dir_all(&dir);
}
