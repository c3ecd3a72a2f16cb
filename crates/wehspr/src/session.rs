use std::time::Instant;

use tracing::debug;
use uuid::Uuid;

/// Lifecycle phase of the single recording/transcription session.
///
/// Transitions are strictly sequential; `Ready` and `Idle` are both
/// acceptance states for a new recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No session has run yet.
    Idle,
    /// Audio capture (and, in chat mode, the keystroke heartbeat) is live.
    Recording,
    /// Workers are stopping and the buffer is being flushed to disk.
    Finalizing,
    /// The engine is producing text from the finalized recording.
    Transcribing,
    /// A session completed; the transcript cache reflects its outcome.
    Ready,
}

impl SessionPhase {
    /// Whether a new recording may begin from this phase.
    pub fn accepts_start(self) -> bool {
        matches!(self, Self::Idle | Self::Ready)
    }
}

/// The one shared, authoritative session record.
///
/// Lives in a single `Arc<tokio::sync::Mutex<Session>>`. The transcript
/// cache and phase are only ever read or written under that lock; the
/// paste macro acquires it non-blockingly so it can never race a stop or
/// transcription holding it.
#[derive(Debug)]
pub struct Session {
    /// Current lifecycle phase.
    pub phase: SessionPhase,
    /// Most recent transcript; cleared when a new recording begins.
    pub transcript: String,
    /// Chat-mode flag sampled once when the recording began.
    pub chat_mode: bool,
    /// Unique id of the current/last recording, for log correlation.
    pub session_id: Uuid,
    /// When the current/last recording began.
    pub started_at: Option<Instant>,
}

impl Session {
    /// A fresh, idle session record.
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            transcript: String::new(),
            chat_mode: false,
            session_id: Uuid::nil(),
            started_at: None,
        }
    }

    /// Begin a new recording if the phase accepts one.
    ///
    /// Clears the transcript cache, samples the chat-mode flag, and
    /// assigns a fresh session id. Returns `false` (state unchanged) when
    /// a session is already in flight — duplicate start events, e.g. key
    /// auto-repeat, are no-ops rather than errors.
    pub fn try_begin(&mut self, chat_mode: bool) -> bool {
        if !self.phase.accepts_start() {
            debug!(phase = ?self.phase, "start ignored, session in flight");
            return false;
        }

        self.phase = SessionPhase::Recording;
        self.transcript.clear();
        self.chat_mode = chat_mode;
        self.session_id = Uuid::new_v4();
        self.started_at = Some(Instant::now());

        true
    }

    /// Whether a `stop` request applies right now.
    ///
    /// `stop` while not recording is a no-op (duplicate release events).
    pub fn is_recording(&self) -> bool {
        self.phase == SessionPhase::Recording
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
