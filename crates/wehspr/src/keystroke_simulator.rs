//! Chat-mode keystroke heartbeat.
//!
//! While a chat-mode recording is live, a remote chat client's input field
//! goes inactive unless it sees typing. The simulator taps a key to open
//! the chat field, then cycles space/backspace on a fixed period until the
//! session stops. It carries no data; its only contract is "still running"
//! and "emits nothing after stop() returns".

use crate::{AppError, AppResult};

use std::{
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use enigo::{Direction, Enigo, Keyboard, Settings};
use error_location::ErrorLocation;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Delay after the open-chat tap before the heartbeat loop begins.
const OPEN_CHAT_DELAY: Duration = Duration::from_millis(500);

/// Gap between the space tap and the backspace tap that erases it.
const TAP_GAP: Duration = Duration::from_millis(100);

/// Rest after each space/backspace pair (~1s total period).
const HEARTBEAT_REST: Duration = Duration::from_millis(900);

/// Granularity at which sleeps observe the stop flag, keeping `stop()`
/// joins prompt without busy-waiting.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Keys the heartbeat is allowed to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChatKey {
    /// The key that focuses/opens the chat input field (`t`).
    OpenChat,
    /// A visible keep-alive character.
    Space,
    /// Erases the keep-alive character.
    Backspace,
}

/// Key-tap seam so the heartbeat can run against a recording double in
/// tests instead of the OS keyboard.
pub(crate) trait ChatKeys {
    /// Emit one tap (press + release) of `key`.
    fn tap(&mut self, key: ChatKey) -> AppResult<()>;
}

/// Production tap implementation backed by enigo.
///
/// Constructed inside the worker because `Enigo` is not `Send`.
pub(crate) struct EnigoChatKeys {
    enigo: Enigo,
}

impl EnigoChatKeys {
    #[track_caller]
    pub(crate) fn new() -> AppResult<Self> {
        let enigo = Enigo::new(&Settings::default()).map_err(|e| AppError::KeyInjectionFailed {
            reason: format!("Failed to create Enigo: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(Self { enigo })
    }
}

impl ChatKeys for EnigoChatKeys {
    fn tap(&mut self, key: ChatKey) -> AppResult<()> {
        use enigo::Key;

        let key = match key {
            ChatKey::OpenChat => Key::Unicode('t'),
            ChatKey::Space => Key::Space,
            ChatKey::Backspace => Key::Backspace,
        };

        self.enigo
            .key(key, Direction::Click)
            .map_err(|e| AppError::KeyInjectionFailed {
                reason: format!("Failed to tap {:?}: {}", key, e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

/// Handle to a running heartbeat worker.
///
/// The stop flag is checked before every tap, so once `stop()` has joined
/// the worker no further keystrokes can reach the host application.
pub struct KeystrokeSimulator {
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl KeystrokeSimulator {
    /// Spawn the heartbeat against the OS keyboard.
    pub fn spawn() -> Self {
        Self::spawn_with(EnigoChatKeys::new)
    }

    /// Spawn the heartbeat with a caller-supplied tap implementation.
    ///
    /// The factory runs on the worker thread, which is what lets the
    /// production implementation hold a non-`Send` enigo handle.
    pub(crate) fn spawn_with<K, F>(make_keys: F) -> Self
    where
        K: ChatKeys + 'static,
        F: FnOnce() -> AppResult<K> + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let worker_flag = Arc::clone(&running);

        let handle = tokio::task::spawn_blocking(move || {
            let mut keys = match make_keys() {
                Ok(k) => k,
                Err(e) => {
                    warn!(error = ?e, "Keystroke simulator unavailable, heartbeat disabled");
                    return;
                }
            };

            info!("Keystroke heartbeat started");
            heartbeat(&mut keys, &worker_flag);
            debug!("Keystroke heartbeat stopped");
        });

        Self { running, handle }
    }

    /// Signal the worker and wait for it to exit.
    ///
    /// After this returns, no further synthetic keystrokes are emitted.
    pub async fn stop(self) {
        self.running.store(false, Ordering::Release);

        if let Err(e) = self.handle.await {
            warn!(error = ?e, "Keystroke heartbeat worker panicked");
        }
    }
}

fn heartbeat<K: ChatKeys>(keys: &mut K, running: &AtomicBool) {
    if tap_or_bail(keys, ChatKey::OpenChat).is_err() {
        return;
    }
    if !rest(running, OPEN_CHAT_DELAY) {
        return;
    }

    while running.load(Ordering::Acquire) {
        if tap_or_bail(keys, ChatKey::Space).is_err() {
            return;
        }
        if !rest(running, TAP_GAP) {
            return;
        }
        if tap_or_bail(keys, ChatKey::Backspace).is_err() {
            return;
        }
        if !rest(running, HEARTBEAT_REST) {
            return;
        }
    }
}

/// One tap; a failing injector ends the heartbeat rather than hammering
/// a broken input path every second.
fn tap_or_bail<K: ChatKeys>(keys: &mut K, key: ChatKey) -> Result<(), ()> {
    match keys.tap(key) {
        Ok(()) => Ok(()),
        Err(e) => {
            warn!(error = ?e, "Keystroke tap failed, stopping heartbeat");
            Err(())
        }
    }
}

/// Sleep in slices, returning `false` as soon as the stop flag clears.
fn rest(running: &AtomicBool, total: Duration) -> bool {
    let mut remaining = total;
    while !remaining.is_zero() {
        if !running.load(Ordering::Acquire) {
            return false;
        }
        let slice = remaining.min(STOP_POLL_INTERVAL);
        std::thread::sleep(slice);
        remaining = remaining.saturating_sub(slice);
    }
    running.load(Ordering::Acquire)
}
