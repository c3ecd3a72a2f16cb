use crate::{AudioError, CoreResult};

use std::{panic::Location, path::Path};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Speech-to-text seam: one blocking call from 16 kHz mono samples to text.
///
/// [`SttEngine`] is the production implementation; tests substitute a
/// scripted engine so the session pipeline can run without a model file.
pub trait SpeechToText: Send {
    /// Transcribe 16 kHz mono samples. Blocks until text is available.
    fn transcribe(&mut self, samples: &[f32]) -> CoreResult<String>;
}

/// Whisper-backed transcription engine.
pub struct SttEngine {
    ctx: WhisperContext,
}

impl SttEngine {
    /// Load the Whisper model at `model_path`.
    #[track_caller]
    #[instrument(skip(model_path))]
    pub fn new<P: AsRef<Path>>(model_path: P, use_gpu: bool) -> CoreResult<Self> {
        let path = model_path.as_ref();

        if !path.exists() {
            return Err(AudioError::ModelNotFound {
                path: path.to_path_buf(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut ctx_params = WhisperContextParameters::default();
        ctx_params.use_gpu(use_gpu);

        let ctx = WhisperContext::new_with_params(
            path.to_str().ok_or(AudioError::ModelNotFound {
                path: path.to_path_buf(),
                location: ErrorLocation::from(Location::caller()),
            })?,
            ctx_params,
        )
        .map_err(|e| AudioError::TranscriptionFailed {
            source: Box::new(e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(model_path = ?path, use_gpu = use_gpu, "Whisper model loaded");

        Ok(Self { ctx })
    }
}

impl SpeechToText for SttEngine {
    #[instrument(skip(self, samples))]
    fn transcribe(&mut self, samples: &[f32]) -> CoreResult<String> {
        if samples.is_empty() {
            return Err(AudioError::NoAudioCaptured {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });

        // Configure for English transcription
        params.set_language(Some("en"));
        params.set_print_progress(false);
        params.set_print_special(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_suppress_blank(true);
        params.set_suppress_nst(true);

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| AudioError::TranscriptionFailed {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        state
            .full(params, samples)
            .map_err(|e| AudioError::TranscriptionFailed {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let num_segments = state.full_n_segments();

        // Pre-allocate result string to avoid repeated reallocations.
        // Average English speech is ~150 words/min, ~5 chars/word.
        // Conservative estimate: 256 bytes per segment covers most cases
        // with a single allocation.
        let mut result = String::with_capacity(num_segments as usize * 256);

        for i in 0..num_segments {
            let segment = state
                .get_segment(i)
                .ok_or_else(|| AudioError::TranscriptionFailed {
                    source: format!("Failed to get segment {}", i).into(),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            result.push_str(&segment.to_string());
            result.push(' ');
        }

        let transcription = result.trim().to_string();

        debug!(
            sample_count = samples.len(),
            segment_count = num_segments,
            text_len = transcription.len(),
            "Transcription complete"
        );

        Ok(transcription)
    }
}
