use crate::{AudioError, CoreResult};

use std::{
    collections::VecDeque,
    panic::Location,
    sync::{
        atomic::{AtomicBool, Ordering},
        {Arc, Mutex},
    },
};

use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument};

/// Maximum samples to buffer (5 minutes at 48kHz mono).
/// Prevents unbounded memory growth during long recordings.
///
/// **Memory footprint at max capacity:**
/// - 48,000 Hz * 60s * 5 min * 4 bytes/f32 = ~58MB
/// - This is a hard upper bound; typical recordings are shorter
pub(crate) const MAX_BUFFER_SAMPLES: usize = 48_000 * 60 * 5;

/// Microphone capture with an exclusively owned sample buffer.
///
/// One capture session at a time: `start()` opens the input stream and
/// `stop()` closes it and moves the buffered samples out. The buffer is
/// owned by the audio callback between those two points and handed off
/// (not shared) at stop time.
pub struct AudioCapturer {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    samples: Arc<Mutex<VecDeque<f32>>>,
    /// Signals the audio callback to stop writing. Set to `true` before
    /// dropping the stream to ensure no in-flight callback writes after
    /// the lock is acquired in `stop()`.
    shutdown: Arc<AtomicBool>,
}

impl AudioCapturer {
    /// Open the default input device without starting a stream.
    #[track_caller]
    #[instrument]
    pub fn new() -> CoreResult<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or(AudioError::NoMicrophoneFound {
                location: ErrorLocation::from(Location::caller()),
            })?;

        let config = device
            .default_input_config()
            .map_err(|e| AudioError::DeviceError {
                reason: format!("Failed to get config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(
            device_id = ?device.id(),
            sample_rate = config.sample_rate(),
            channels = config.channels(),
            "AudioCapturer initialized"
        );

        Ok(Self {
            device,
            config: config.into(),
            stream: None,
            samples: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_BUFFER_SAMPLES))),
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Start capturing into a fresh buffer.
    ///
    /// Calling this while a stream is already live breaks the session
    /// lifecycle contract and returns [`AudioError::StateViolation`].
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start(&mut self) -> CoreResult<()> {
        if self.stream.is_some() {
            return Err(AudioError::StateViolation {
                reason: "start() called while a capture stream is live".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let samples = Arc::clone(&self.samples);
        let shutdown = Arc::clone(&self.shutdown);

        // Reset shutdown flag for new recording session
        self.shutdown.store(false, Ordering::Release);

        // Clear previous samples
        samples
            .lock()
            .map_err(|e| AudioError::DeviceError {
                reason: format!("Failed to lock samples: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .clear();

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Check shutdown flag before acquiring lock. This provides
                    // explicit synchronization: once stop() sets this flag,
                    // no new samples will be written even if CPAL fires one
                    // more callback before the stream is dropped.
                    if shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    // Recover from lock poison rather than silently dropping audio.
                    // A poisoned mutex means a previous holder panicked, but the
                    // VecDeque data is still valid and usable.
                    let mut buf = samples.lock().unwrap_or_else(|e| {
                        error!("Sample buffer lock poisoned, recovering: {}", e);
                        e.into_inner()
                    });
                    buf.extend(data.iter().copied());
                    // Ring buffer: O(1) amortized drop of oldest samples via VecDeque
                    while buf.len() > MAX_BUFFER_SAMPLES {
                        buf.pop_front();
                    }
                },
                |err| {
                    error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| AudioError::DeviceError {
                reason: format!("Failed to build stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        stream.play().map_err(|e| AudioError::DeviceError {
            reason: format!("Failed to start stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.stream = Some(stream);
        info!("Audio capture started");

        Ok(())
    }

    /// Stop capturing and move the buffered samples out.
    ///
    /// Consumes the session's buffer: a second `stop()` without a new
    /// `start()` returns [`AudioError::StateViolation`].
    #[track_caller]
    #[instrument(skip(self))]
    pub fn stop(&mut self) -> CoreResult<Vec<f32>> {
        let Some(stream) = self.stream.take() else {
            return Err(AudioError::StateViolation {
                reason: "stop() called with no live capture stream".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        // Signal callback to stop writing BEFORE dropping the stream.
        // Even if CPAL's Stream::drop() is asynchronous on some backend,
        // the callback observes this flag and returns early, preventing
        // writes after we acquire the lock below.
        self.shutdown.store(true, Ordering::Release);
        drop(stream);

        // Brief yield so any in-flight callback observes the shutdown flag
        // and completes. On most CPAL backends drop() joins the audio
        // thread, making this redundant, but it guarantees correctness on
        // backends where drop() returns before the final callback.
        std::thread::sleep(std::time::Duration::from_millis(5));
        info!("Audio capture stopped");

        // Ownership handoff: drain the buffer rather than copying it so a
        // stale session can never leak frames into the next one.
        let samples: Vec<f32> = self
            .samples
            .lock()
            .map_err(|e| AudioError::DeviceError {
                reason: format!("Failed to lock samples: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .drain(..)
            .collect();

        debug!(sample_count = samples.len(), "Captured audio samples");

        Ok(samples)
    }

    /// Sample rate of the underlying device stream.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }
}
