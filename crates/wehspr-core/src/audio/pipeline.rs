use crate::{
    audio::AudioCapturer,
    audio::Resampler,
    audio::SttEngine,
    audio::TARGET_SAMPLE_RATE,
    audio::wav,
    history::{HISTORY_CAPACITY, RecordingFile, RecordingHistory},
    {AudioError, CoreResult, SpeechToText},
};

use std::{fs, panic::Location, path::Path, path::PathBuf};

use chrono::Local;
use error_location::ErrorLocation;
use tracing::{debug, info, instrument};

/// A recording flushed to durable storage.
pub struct FinalizedRecording {
    /// Descriptor of the file written to the recordings directory.
    pub file: RecordingFile,
    /// The 16 kHz samples that were written, ready for transcription.
    pub samples: Vec<f32>,
}

/// Orchestrates the audio pipeline: capture, resample, finalize, transcribe.
///
/// # Memory Footprint
///
/// The pipeline holds all captured audio in memory. At maximum recording
/// duration (5 minutes at 48kHz), the peak is the capture buffer (~58MB)
/// plus one resampled copy (~19MB). Acceptable for a desktop tool with
/// short dictation sessions.
///
/// # Thread Safety
///
/// The pipeline is NOT thread-safe. It owns its components and is accessed
/// through a single shared lock by the session controller; the blocking
/// `transcribe` call runs off the input-hook thread.
pub struct AudioPipeline {
    /// Built lazily on the first `start_capture` so pipelines used only
    /// for finalize/transcribe never touch an audio device.
    capturer: Option<AudioCapturer>,
    resampler: Option<Resampler>,
    engine: Box<dyn SpeechToText>,
    history: RecordingHistory,
    recordings_dir: PathBuf,
}

impl AudioPipeline {
    /// Create a pipeline backed by the Whisper model at `model_path`.
    ///
    /// # Errors
    ///
    /// Returns error if the model file doesn't exist or fails to load.
    #[track_caller]
    #[instrument(skip(model_path, recordings_dir))]
    pub fn new<P: AsRef<Path>>(
        model_path: P,
        recordings_dir: PathBuf,
        use_gpu: bool,
    ) -> CoreResult<Self> {
        let engine = SttEngine::new(model_path, use_gpu)?;

        info!(recordings_dir = ?recordings_dir, "AudioPipeline initialized");

        Ok(Self::with_engine(Box::new(engine), recordings_dir))
    }

    /// Create a pipeline with a caller-supplied transcription engine.
    pub fn with_engine(engine: Box<dyn SpeechToText>, recordings_dir: PathBuf) -> Self {
        Self {
            capturer: None,
            resampler: None,
            engine,
            history: RecordingHistory::new(HISTORY_CAPACITY),
            recordings_dir,
        }
    }

    /// Start capturing from the default input device.
    ///
    /// Configures a resampler when the device rate differs from 16 kHz.
    ///
    /// # Errors
    ///
    /// Returns error if no device is available or the stream fails to open.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start_capture(&mut self) -> CoreResult<()> {
        if self.capturer.is_none() {
            self.capturer = Some(AudioCapturer::new()?);
        }

        // Borrow checked above; unreachable otherwise.
        let Some(capturer) = self.capturer.as_mut() else {
            return Err(AudioError::StateViolation {
                reason: "capturer missing after initialization".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let sample_rate = capturer.sample_rate();
        if sample_rate != TARGET_SAMPLE_RATE {
            self.resampler = Some(Resampler::new(sample_rate, TARGET_SAMPLE_RATE)?);
            debug!(
                input_rate = sample_rate,
                output_rate = TARGET_SAMPLE_RATE,
                "Resampler configured"
            );
        }

        capturer.start()?;

        info!("Capture started");

        Ok(())
    }

    /// Stop capturing and take ownership of the raw samples.
    ///
    /// # Errors
    ///
    /// Returns error if no audio was captured or no capture is live.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn stop_capture(&mut self) -> CoreResult<Vec<f32>> {
        let Some(capturer) = self.capturer.as_mut() else {
            return Err(AudioError::StateViolation {
                reason: "stop_capture() called before any capture started".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let samples = capturer.stop()?;

        if samples.is_empty() {
            return Err(AudioError::NoAudioCaptured {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        info!(sample_count = samples.len(), "Capture stopped");

        Ok(samples)
    }

    /// Flush captured samples to a timestamped WAV file and register it
    /// with the recording history (evicting the oldest beyond capacity).
    ///
    /// Consumes the samples; the returned [`FinalizedRecording`] carries
    /// the resampled 16 kHz data for the transcription step.
    ///
    /// # Errors
    ///
    /// Returns error on empty input, resampling failure, or write failure.
    #[track_caller]
    #[instrument(skip(self, samples))]
    pub fn finalize(&mut self, samples: Vec<f32>) -> CoreResult<FinalizedRecording> {
        if samples.is_empty() {
            return Err(AudioError::NoAudioCaptured {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let prepared = if let Some(ref mut resampler) = self.resampler {
            let resampled = resampler.resample(&samples)?;
            debug!(
                original_len = samples.len(),
                resampled_len = resampled.len(),
                "Audio resampled"
            );
            resampled
        } else {
            samples
        };

        fs::create_dir_all(&self.recordings_dir).map_err(|e| AudioError::WavWriteFailed {
            reason: format!("Failed to create recordings dir: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let created_at = Local::now();
        let file_name = format!("recording_{}.wav", created_at.format("%Y%m%d-%H%M%S"));
        let path = self.recordings_dir.join(file_name);

        wav::write_recording(&path, &prepared)?;

        let file = RecordingFile { path, created_at };
        self.history.record(file.clone());

        info!(path = ?file.path, "Recording finalized");

        Ok(FinalizedRecording {
            file,
            samples: prepared,
        })
    }

    /// Transcribe finalized 16 kHz samples.
    ///
    /// **WARNING**: This blocks for 1-10 seconds. Do NOT call from the
    /// input-hook path; the session controller runs it on a background
    /// task while holding the session lock.
    #[track_caller]
    #[instrument(skip(self, samples))]
    pub fn transcribe(&mut self, samples: &[f32]) -> CoreResult<String> {
        if samples.is_empty() {
            return Err(AudioError::NoAudioCaptured {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let start = std::time::Instant::now();
        let transcription = self.engine.transcribe(samples)?;
        let duration = start.elapsed();

        info!(
            duration_ms = duration.as_millis(),
            text_len = transcription.len(),
            "Transcription complete"
        );

        Ok(transcription)
    }

    /// Number of recordings currently tracked by the history.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Most recently finalized recording, if any.
    pub fn latest_recording(&self) -> Option<&RecordingFile> {
        self.history.latest()
    }
}
