//! The display surface the session controller reports into.
//!
//! The actual window is an external collaborator; this module defines the
//! consumed capability plus a headless implementation that narrates state
//! over `tracing` so the binary runs standalone.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

/// Indicator colors, matching the reference palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateColor {
    /// Ready / idle.
    Grey,
    /// Recording starting or ending.
    Yellow,
    /// Preparing audio for transcription.
    Orange,
    /// Transcription in progress.
    Purple,
    /// Completed.
    Green,
}

/// Rendering surface for session state and transcripts.
///
/// Implementations must be cheap to call from the session controller's
/// async context; none of these methods may block.
pub trait DisplaySurface: Send + Sync {
    /// Update the state indicator.
    fn report_state(&self, color: StateColor, label: &str);

    /// Transient visual acknowledgment that a transcript just completed.
    fn flash_acknowledgment(&self);

    /// Present the final transcript text.
    fn show_transcript(&self, text: &str);

    /// User's chat-mode toggle, sampled at recording start.
    fn is_chat_mode_enabled(&self) -> bool;
}

/// Headless display surface that reports through the log.
pub struct StatusDisplay {
    chat_mode: AtomicBool,
}

impl StatusDisplay {
    /// Create a surface with chat mode initially off.
    pub fn new(chat_mode: bool) -> Self {
        Self {
            chat_mode: AtomicBool::new(chat_mode),
        }
    }

    /// Flip the chat-mode toggle.
    pub fn set_chat_mode(&self, enabled: bool) {
        self.chat_mode.store(enabled, Ordering::Release);
        info!(chat_mode = enabled, "Chat mode toggled");
    }
}

impl DisplaySurface for StatusDisplay {
    fn report_state(&self, color: StateColor, label: &str) {
        info!(color = ?color, label = label, "Session state");
    }

    fn flash_acknowledgment(&self) {
        info!("Transcription complete");
    }

    fn show_transcript(&self, text: &str) {
        info!(text_len = text.len(), "Transcript: {}", text);
    }

    fn is_chat_mode_enabled(&self) -> bool {
        self.chat_mode.load(Ordering::Acquire)
    }
}
