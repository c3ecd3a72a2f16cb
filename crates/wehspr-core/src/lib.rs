//! Wehspr Core Library
//!
//! Capture-to-transcript audio pipeline using CPAL, Rubato, Hound, and
//! Whisper: record from the default microphone, finalize to a bounded
//! on-disk recording history, and transcribe to text.
//!
//! # Example
//!
//! ```no_run
//! use wehspr_core::{AudioPipeline, CoreResult};
//!
//! use std::{path::PathBuf, thread::sleep, time::Duration};
//!
//! fn main() -> CoreResult<()> {
//!     let model_path = PathBuf::from("models/ggml-tiny.bin");
//!     let mut pipeline = AudioPipeline::new(&model_path, PathBuf::from("recordings"), true)?;
//!
//!     pipeline.start_capture()?;
//!     sleep(Duration::from_secs(3));
//!     let samples = pipeline.stop_capture()?;
//!     let finalized = pipeline.finalize(samples)?;
//!     let transcription = pipeline.transcribe(&finalized.samples)?;
//!
//!     println!("Transcribed: {}", transcription);
//!     Ok(())
//! }
//! ```

mod audio;
mod error;
mod history;

pub use {
    audio::{AudioPipeline, FinalizedRecording, SpeechToText, SttEngine, TARGET_SAMPLE_RATE},
    error::{AudioError, Result as CoreResult},
    history::{HISTORY_CAPACITY, RecordingFile, RecordingHistory},
};

#[cfg(test)]
mod tests;
