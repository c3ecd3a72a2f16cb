//! Clipboard paste choreography for the cached transcript.
//!
//! The macro acquires the session lock non-blockingly: if a stop or
//! transcription currently holds it, or a recording is live, or the cache
//! is empty, the trigger is a logged no-op. It can therefore never paste a
//! half-written transcript and never blocks the input path.

use crate::{
    AppError, AppResult, PasteKeyGuard,
    session::{Session, SessionPhase},
};

use std::{panic::Location, sync::Arc, time::Duration};

use arboard::Clipboard;
use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use error_location::ErrorLocation;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// Delay between clipboard write and paste simulation.
///
/// This gives the OS clipboard manager time to process the write before
/// we simulate the paste chord. Too short and the paste may get stale
/// content; too long and the user perceives lag. 50ms is empirically
/// reliable across Windows, macOS, and Linux desktop environments.
const CLIPBOARD_SETTLE_DELAY: Duration = Duration::from_millis(50);

/// Delay between key events in the paste simulation.
///
/// Some applications and input method editors need a small gap between
/// key_down, key_click, and key_up to register events correctly. 10ms is
/// the minimum reliable interval.
const KEY_EVENT_DELAY: Duration = Duration::from_millis(10);

/// Pause around the chat-field open and the final send keystroke, giving
/// the host application time to focus its input field.
const CHAT_STEP_DELAY: Duration = Duration::from_millis(100);

/// What a paste trigger ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteOutcome {
    /// The transcript was written to the clipboard and the chord sent.
    Pasted,
    /// Nothing happened: busy session, live recording, or empty cache.
    Skipped,
}

/// Entry point for the paste shortcut.
pub struct PasteMacro;

impl PasteMacro {
    /// Paste the cached transcript into the focused window.
    ///
    /// Holds the session lock for the whole choreography so the cache
    /// cannot change mid-paste, which is also what makes a concurrent
    /// stop/transcribe cause a clean skip instead of a wait.
    #[instrument(skip(session))]
    pub async fn run(session: Arc<Mutex<Session>>) -> AppResult<PasteOutcome> {
        let guard = match session.try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("Session lock held, paste skipped");
                return Ok(PasteOutcome::Skipped);
            }
        };

        if guard.phase == SessionPhase::Recording {
            debug!("Recording in progress, paste skipped");
            return Ok(PasteOutcome::Skipped);
        }

        if guard.transcript.is_empty() {
            debug!("Transcript cache empty, paste skipped");
            return Ok(PasteOutcome::Skipped);
        }

        let text = guard.transcript.clone();
        let chat = guard.chat_mode;

        // Clipboard and Enigo are created inside spawn_blocking: neither is
        // Send, and construction is cheap. The owned guard moves in with
        // them so the lock spans the key timing sleeps.
        let result = tokio::task::spawn_blocking(move || {
            let _session = guard;
            paste_choreography(&text, chat)?;
            Ok::<usize, AppError>(text.len())
        })
        .await
        .map_err(|e| AppError::KeyInjectionFailed {
            reason: format!("Paste task panicked: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let text_len = result?;
        info!(text_len, chat, "Transcript pasted");

        Ok(PasteOutcome::Pasted)
    }
}

fn paste_choreography(text: &str, chat: bool) -> AppResult<()> {
    let mut clipboard = Clipboard::new().map_err(|e| AppError::ClipboardError {
        reason: format!("Failed to initialize clipboard: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    if chat {
        // Open the chat input field, then paste and send.
        let mut enigo = new_enigo()?;

        tap(&mut enigo, Key::Unicode('t'))?;
        std::thread::sleep(CHAT_STEP_DELAY);

        set_clipboard(&mut clipboard, text)?;
        std::thread::sleep(CLIPBOARD_SETTLE_DELAY);

        paste_chord()?;

        std::thread::sleep(CHAT_STEP_DELAY);
        tap(&mut enigo, Key::Return)?;
    } else {
        set_clipboard(&mut clipboard, text)?;
        std::thread::sleep(CLIPBOARD_SETTLE_DELAY);

        paste_chord()?;
    }

    Ok(())
}

/// One modifier+V chord, with the modifier held via the RAII guard so it
/// is released even when the V press fails.
#[track_caller]
fn paste_chord() -> AppResult<()> {
    let mut guard = PasteKeyGuard::new()?;

    std::thread::sleep(KEY_EVENT_DELAY);

    guard
        .enigo_mut()
        .key(Key::Unicode('v'), Direction::Click)
        .map_err(|e| AppError::KeyInjectionFailed {
            reason: format!("Failed to press V: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    std::thread::sleep(KEY_EVENT_DELAY);

    // Guard drops here, releasing the modifier.
    Ok(())
}

#[track_caller]
fn new_enigo() -> AppResult<Enigo> {
    Enigo::new(&Settings::default()).map_err(|e| AppError::KeyInjectionFailed {
        reason: format!("Failed to create Enigo: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })
}

#[track_caller]
fn tap(enigo: &mut Enigo, key: Key) -> AppResult<()> {
    enigo
        .key(key, Direction::Click)
        .map_err(|e| AppError::KeyInjectionFailed {
            reason: format!("Failed to tap {:?}: {}", key, e),
            location: ErrorLocation::from(Location::caller()),
        })
}

#[track_caller]
fn set_clipboard(clipboard: &mut Clipboard, text: &str) -> AppResult<()> {
    clipboard
        .set_text(text)
        .map_err(|e| AppError::ClipboardError {
            reason: format!("Failed to set clipboard: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    debug!(text_len = text.len(), "Text copied to clipboard");
    Ok(())
}
