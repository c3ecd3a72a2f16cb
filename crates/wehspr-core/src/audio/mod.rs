pub(crate) mod capture;
mod engine;
mod pipeline;
mod resampler;
pub(crate) mod wav;

/// Sample rate expected by the transcription engine and written to disk.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

pub(crate) use {capture::AudioCapturer, resampler::Resampler};

pub use {
    engine::{SpeechToText, SttEngine},
    pipeline::{AudioPipeline, FinalizedRecording},
};
