//! Routes global input events to application commands.
//!
//! One task owns the shortcut bindings and the capture state, so a
//! rebinding can never race a match. Escape is checked before anything
//! else: it always means "quit", even while a capture is armed or a
//! recording is in flight.

use crate::{
    AppCommand, AppError,
    config::{Config, ShortcutBinding},
    display::{DisplaySurface, StateColor},
    input_event::{InputAction, InputEvent, InputKey},
};

use std::{
    panic::Location,
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// How long paste-binding events are ignored after dispatching a paste.
///
/// The paste chord synthesizes a `v` press/release that the global hook
/// observes like any other key; without this window the macro's own
/// keystroke routes back as a fresh `Paste` and the macro loops. Sized to
/// cover the chat choreography (~300ms) plus hook and channel latency.
const PASTE_ECHO_COOLDOWN: Duration = Duration::from_millis(500);

/// Which binding an armed capture will overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTarget {
    /// The push-to-talk record shortcut.
    Record,
    /// The paste-macro shortcut.
    Paste,
}

/// Control messages for the router, sent by the UI surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterControl {
    /// Consume the next press verbatim as the new binding for `target`.
    ArmCapture(CaptureTarget),
}

/// Owns the shortcut bindings and translates raw input into commands.
pub struct ShortcutRouter {
    config: Config,
    record_key: InputKey,
    paste_key: InputKey,
    armed_capture: Option<CaptureTarget>,
    pending_capture_release: Option<InputKey>,
    paste_echo_until: Option<Instant>,
    event_rx: mpsc::Receiver<InputEvent>,
    control_rx: mpsc::Receiver<RouterControl>,
    control_closed: bool,
    config_path: Option<PathBuf>,
    command_tx: mpsc::Sender<AppCommand>,
    shutdown_rx: watch::Receiver<bool>,
    display: Arc<dyn DisplaySurface>,
}

impl ShortcutRouter {
    /// Create a router over the given channels, with bindings taken from
    /// `config`.
    pub fn new(
        config: Config,
        event_rx: mpsc::Receiver<InputEvent>,
        control_rx: mpsc::Receiver<RouterControl>,
        command_tx: mpsc::Sender<AppCommand>,
        shutdown_rx: watch::Receiver<bool>,
        display: Arc<dyn DisplaySurface>,
    ) -> Self {
        let record_key = config.record_key();
        let paste_key = config.paste_key();

        info!(record = %record_key, paste = %paste_key, "Shortcut router ready");

        Self {
            config,
            record_key,
            paste_key,
            armed_capture: None,
            pending_capture_release: None,
            paste_echo_until: None,
            event_rx,
            control_rx,
            control_closed: false,
            config_path: None,
            command_tx,
            shutdown_rx,
            display,
        }
    }

    /// Persist rebound shortcuts to an explicit file instead of the
    /// default config path.
    #[cfg(test)]
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Run until the shutdown signal fires or the event source closes.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                event = self.event_rx.recv() => {
                    match event {
                        Some(event) => self.handle_event(event).await,
                        None => {
                            warn!("Input hook channel closed, router exiting");
                            break;
                        }
                    }
                }
                // Latched off once the sender is gone so a closed control
                // channel cannot spin the loop.
                control = self.control_rx.recv(), if !self.control_closed => {
                    match control {
                        Some(control) => self.handle_control(control),
                        None => self.control_closed = true,
                    }
                }
                result = self.shutdown_rx.changed() => {
                    if result.is_err() || *self.shutdown_rx.borrow() {
                        debug!("Shutdown signal received, router exiting");
                        break;
                    }
                }
            }
        }
    }

    async fn handle_event(&mut self, event: InputEvent) {
        // Escape outranks everything, including an armed capture, so the
        // user can always quit and Escape can never become a binding.
        if event.key.is_escape() && event.action == InputAction::Press {
            info!("Escape pressed, requesting shutdown");
            self.send(AppCommand::Shutdown).await;
            return;
        }

        if let Some(target) = self.armed_capture {
            if event.action == InputAction::Press {
                self.capture_binding(target, &event.key);
            }
            return;
        }

        // The release paired with a captured press is swallowed; a capture
        // never doubles as a shortcut activation.
        if let Some(pending) = &self.pending_capture_release
            && event.key == *pending
            && event.action == InputAction::Release
        {
            self.pending_capture_release = None;
            return;
        }

        if event.key == self.record_key {
            match event.action {
                InputAction::Press => self.send(AppCommand::StartRecording).await,
                InputAction::Release => self.send(AppCommand::StopRecording).await,
            }
        } else if event.key == self.paste_key && event.action == InputAction::Release {
            if self.in_paste_echo_window() {
                debug!("Paste key event within echo window, ignored");
                return;
            }
            self.paste_echo_until = Some(Instant::now() + PASTE_ECHO_COOLDOWN);
            self.send(AppCommand::Paste).await;
        }
    }

    /// Whether the last paste dispatch is still recent enough that a
    /// paste-binding event is its synthetic echo.
    fn in_paste_echo_window(&mut self) -> bool {
        match self.paste_echo_until {
            Some(until) if Instant::now() < until => true,
            Some(_) => {
                self.paste_echo_until = None;
                false
            }
            None => false,
        }
    }

    fn handle_control(&mut self, control: RouterControl) {
        match control {
            RouterControl::ArmCapture(target) => {
                info!(?target, "Shortcut capture armed, press the new binding");
                self.armed_capture = Some(target);
                self.display
                    .report_state(StateColor::Yellow, "Press new shortcut...");
            }
        }
    }

    /// Bind `key` verbatim to the armed target and persist the config.
    fn capture_binding(&mut self, target: CaptureTarget, key: &InputKey) {
        let binding = ShortcutBinding::from_input_key(key);

        match target {
            CaptureTarget::Record => {
                self.record_key = key.clone();
                self.config.record_shortcut = binding;
            }
            CaptureTarget::Paste => {
                self.paste_key = key.clone();
                self.config.paste_shortcut = binding;
            }
        }

        self.armed_capture = None;
        self.pending_capture_release = Some(key.clone());
        info!(?target, key = %key, "Shortcut rebound");
        self.display
            .report_state(StateColor::Green, &format!("Shortcut set: {}", key));

        // The new binding is live either way; persistence failure only
        // costs it on the next launch.
        let persisted = match &self.config_path {
            Some(path) => self.config.save_to(path),
            None => self.config.save(),
        };
        if let Err(e) = persisted {
            error!(error = ?e, "Failed to persist rebound shortcut");
        }
    }

    async fn send(&self, command: AppCommand) {
        if let Err(e) = self.command_tx.send(command).await {
            let e = AppError::ChannelSendFailed {
                message: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            };
            warn!(?command, error = %e, "Command channel closed, dropping command");
        }
    }
}
