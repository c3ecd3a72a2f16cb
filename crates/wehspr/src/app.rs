use crate::{
    AppCommand, AppResult, KeystrokeSimulator, PasteMacro, PasteOutcome,
    display::{DisplaySurface, StateColor},
    session::{Session, SessionPhase},
};

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, mpsc, watch};
use tracing::{debug, error, info, instrument, warn};
use wehspr_core::AudioPipeline;

/// Session controller.
///
/// Runs on the async runtime thread and is the only writer of the session
/// phase. The stop path keeps the session lock held across the spawned
/// finalize/transcribe task, which is what makes the paste macro's
/// non-blocking acquire skip cleanly while a transcript is in flight.
pub struct App {
    pub(crate) session: Arc<Mutex<Session>>,
    pub(crate) pipeline: Arc<Mutex<AudioPipeline>>,
    pub(crate) display: Arc<dyn DisplaySurface>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    pub(crate) simulator: Option<KeystrokeSimulator>,
}

impl App {
    /// Run the main command loop until shutdown.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Wehspr starting");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                AppCommand::StartRecording => {
                    if let Err(e) = self.start_recording().await {
                        error!(error = ?e, "Failed to start recording");
                    }
                }
                AppCommand::StopRecording => {
                    self.stop_and_transcribe().await;
                }
                AppCommand::Paste => {
                    // Runs off the command loop so a queued start/stop is
                    // not stuck behind the paste choreography.
                    let session = Arc::clone(&self.session);
                    tokio::spawn(async move {
                        match PasteMacro::run(session).await {
                            Ok(PasteOutcome::Pasted | PasteOutcome::Skipped) => {}
                            Err(e) => error!(error = ?e, "Paste macro failed"),
                        }
                    });
                }
                AppCommand::Shutdown => {
                    info!("Shutdown requested");
                    break;
                }
            }
        }

        if let Some(simulator) = self.simulator.take() {
            simulator.stop().await;
        }

        // Escape can land mid-recording; close the capture stream before
        // exiting instead of leaving it to the process teardown. A held
        // lock means finalize/transcribe owns the session and no stream
        // is live.
        if let Ok(mut session) = self.session.try_lock()
            && session.is_recording()
        {
            let mut pipeline = self.pipeline.lock().await;
            match pipeline.stop_capture() {
                Ok(samples) => {
                    info!(sample_count = samples.len(), "Recording discarded at shutdown");
                }
                Err(e) => warn!(error = ?e, "Failed to release capture at shutdown"),
            }
            session.phase = SessionPhase::Ready;
        }

        let _ = self.shutdown_tx.send(true);
        info!("Wehspr shut down successfully");

        Ok(())
    }

    /// Begin a recording session.
    ///
    /// Samples the chat-mode toggle once, here; the same flag drives both
    /// the keystroke heartbeat and the eventual paste choreography.
    #[instrument(skip(self))]
    async fn start_recording(&mut self) -> AppResult<()> {
        let chat_mode = self.display.is_chat_mode_enabled();

        // Non-blocking acquire: while finalize/transcribe holds the lock a
        // start is a no-op, and waiting here would park the command loop
        // (and any queued stop/shutdown) behind the engine call. Worse,
        // a queued acquire would fire once the guard drops, beginning a
        // phantom session from a stale press.
        let mut session = match self.session.try_lock() {
            Ok(session) => session,
            Err(_) => {
                debug!("Session busy, start ignored");
                return Ok(());
            }
        };
        if !session.try_begin(chat_mode) {
            return Ok(());
        }
        let session_id = session.session_id;

        let start_result = {
            let mut pipeline = self.pipeline.lock().await;
            pipeline.start_capture()
        };

        if let Err(e) = start_result {
            // The session never got off the ground; reopen for the next
            // press instead of wedging in Recording.
            session.phase = SessionPhase::Ready;
            self.display
                .report_state(StateColor::Grey, "Microphone unavailable");
            return Err(e.into());
        }

        drop(session);

        if chat_mode {
            self.simulator = Some(KeystrokeSimulator::spawn());
        }

        self.display.report_state(StateColor::Yellow, "Recording...");
        info!(session_id = %session_id, chat_mode, "Recording started");

        Ok(())
    }

    /// Stop the live recording and transcribe it in the background.
    #[instrument(skip(self))]
    async fn stop_and_transcribe(&mut self) {
        // Same non-blocking discipline as start: a held lock means no
        // recording is live, so the stop is a no-op either way.
        let mut session = match Arc::clone(&self.session).try_lock_owned() {
            Ok(session) => session,
            Err(_) => {
                debug!("Session busy, stop ignored");
                return;
            }
        };

        if !session.is_recording() {
            debug!(phase = ?session.phase, "Stop ignored, no recording in flight");
            return;
        }

        session.phase = SessionPhase::Finalizing;
        if let Some(started_at) = session.started_at {
            debug!(
                session_id = %session.session_id,
                duration_ms = started_at.elapsed().as_millis() as u64,
                "Recording stopped"
            );
        }
        self.display
            .report_state(StateColor::Yellow, "Stopping...");

        // Heartbeat first: no synthetic keystroke may land after the user
        // released the shortcut.
        if let Some(simulator) = self.simulator.take() {
            simulator.stop().await;
        }

        let samples = {
            let mut pipeline = self.pipeline.lock().await;
            match pipeline.stop_capture() {
                Ok(samples) => samples,
                Err(e) => {
                    error!(session_id = %session.session_id, error = ?e, "Failed to stop capture");
                    Self::close_session(&mut session, &*self.display);
                    return;
                }
            }
        };

        let pipeline = Arc::clone(&self.pipeline);
        let display = Arc::clone(&self.display);

        // The owned session guard moves into the task and is held until
        // the transcript cache is settled.
        tokio::spawn(Self::finalize_and_transcribe(
            session, samples, pipeline, display,
        ));
    }

    /// Flush samples to disk, transcribe, and settle the transcript cache.
    ///
    /// Any failure leaves the cache empty and the phase `Ready`; the next
    /// press starts cleanly.
    pub(crate) async fn finalize_and_transcribe(
        mut session: OwnedMutexGuard<Session>,
        samples: Vec<f32>,
        pipeline: Arc<Mutex<AudioPipeline>>,
        display: Arc<dyn DisplaySurface>,
    ) {
        display.report_state(StateColor::Orange, "Preparing audio...");

        let finalized = {
            let mut pipeline = pipeline.lock().await;
            match pipeline.finalize(samples) {
                Ok(finalized) => finalized,
                Err(e) => {
                    error!(session_id = %session.session_id, error = ?e, "Failed to finalize recording");
                    Self::close_session(&mut session, &*display);
                    return;
                }
            }
        };

        session.phase = SessionPhase::Transcribing;
        display.report_state(StateColor::Purple, "Transcribing...");

        let result = {
            let mut pipeline = pipeline.lock().await;
            pipeline.transcribe(&finalized.samples)
        };

        match result {
            Ok(text) => {
                info!(
                    session_id = %session.session_id,
                    text_len = text.len(),
                    "Transcript cached"
                );
                session.transcript = text;
                session.phase = SessionPhase::Ready;
                display.flash_acknowledgment();
                display.show_transcript(&session.transcript);
                display.report_state(StateColor::Grey, "Ready");
            }
            Err(e) => {
                error!(session_id = %session.session_id, error = ?e, "Transcription failed");
                Self::close_session(&mut session, &*display);
            }
        }
    }

    /// Settle a failed session: empty cache, `Ready` phase.
    fn close_session(session: &mut Session, display: &dyn DisplaySurface) {
        session.transcript.clear();
        session.phase = SessionPhase::Ready;
        display.report_state(StateColor::Grey, "Ready");
    }
}
