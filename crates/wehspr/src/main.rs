//! Wehspr: push-to-talk dictation with clipboard and chat delivery.

mod app;
mod app_command;
mod config;
mod display;
mod error;
mod input_event;
mod keystroke_simulator;
mod paste_key_guard;
mod paste_macro;
mod session;
mod shortcut_router;
#[cfg(test)]
mod tests;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
    keystroke_simulator::KeystrokeSimulator,
    paste_key_guard::PasteKeyGuard,
    paste_macro::{PasteMacro, PasteOutcome},
    session::Session,
    shortcut_router::ShortcutRouter,
};

use crate::{
    config::Config,
    display::{DisplaySurface, StatusDisplay},
    input_event::InputEvent,
    shortcut_router::{CaptureTarget, RouterControl},
};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tokio::sync::{Mutex, mpsc, watch};
use tracing::{error, info, warn};
use wehspr_core::AudioPipeline;

/// Application entry point.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("wehspr=debug")
        .init();

    let config = Config::load_or_default();

    if let Err(e) = config.validate_model_path() {
        error!("Model validation failed: {:?}", e);
        std::process::exit(1);
    }

    let model_path = match config.model_path() {
        Ok(path) => path,
        Err(e) => {
            error!("Failed to resolve model path: {:?}", e);
            std::process::exit(1);
        }
    };

    let recordings_dir = match Config::recordings_dir() {
        Ok(dir) => dir,
        Err(e) => {
            error!("Failed to resolve recordings directory: {:?}", e);
            std::process::exit(1);
        }
    };

    // GPU offload is a no-op on builds without an accelerator backend.
    let pipeline = match AudioPipeline::new(&model_path, recordings_dir, true) {
        Ok(pipeline) => Arc::new(Mutex::new(pipeline)),
        Err(e) => {
            error!("Failed to create AudioPipeline: {:?}", e);
            std::process::exit(1);
        }
    };

    // Headless chat-mode toggle; a window shell embedding this binary
    // flips it at runtime instead.
    let status = StatusDisplay::new(false);
    if std::env::var_os("WEHSPR_CHAT_MODE").is_some() {
        status.set_chat_mode(true);
    }
    let display: Arc<dyn DisplaySurface> = Arc::new(status);
    let session = Arc::new(Mutex::new(Session::new()));

    let (event_tx, event_rx) = mpsc::channel(256);
    let (command_tx, command_rx) = mpsc::channel(32);
    let (control_tx, control_rx) = mpsc::channel(8);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Headless rebinding: arm a one-shot capture at startup, then press
    // the desired button or key.
    for arg in std::env::args().skip(1) {
        let control = match arg.as_str() {
            "--rebind-record" => RouterControl::ArmCapture(CaptureTarget::Record),
            "--rebind-paste" => RouterControl::ArmCapture(CaptureTarget::Paste),
            other => {
                warn!(arg = other, "Unknown argument ignored");
                continue;
            }
        };
        if control_tx.try_send(control).is_err() {
            warn!("Too many rebind requests, ignoring the rest");
        }
    }

    // Global input hook on a dedicated OS thread; rdev::listen never
    // returns and cannot be unhooked, hence the process::exit below.
    std::thread::spawn(move || {
        let result = rdev::listen(move |event| {
            if let Some(event) = InputEvent::from_rdev(&event)
                && event_tx.blocking_send(event).is_err()
            {
                warn!("Input event channel closed, event dropped");
            }
        });

        if let Err(e) = result {
            let e = AppError::InputHookFailed {
                reason: format!("{:?}", e),
                location: ErrorLocation::from(Location::caller()),
            };
            error!(error = %e, "Failed to install global input hook");
            std::process::exit(1);
        }
    });

    let router = ShortcutRouter::new(
        config,
        event_rx,
        control_rx,
        command_tx,
        shutdown_rx,
        Arc::clone(&display),
    );

    let app = App {
        session,
        pipeline,
        display,
        command_rx,
        shutdown_tx,
        simulator: None,
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    rt.block_on(async {
        tokio::join!(router.run(), async {
            if let Err(e) = app.run().await {
                error!(error = ?e, "App error");
            }
        });
    });

    drop(control_tx);

    info!("Wehspr exiting");
    std::process::exit(0);
}
