//! Configuration management for wehspr.
//!
//! Handles loading and saving the JSON configuration file with
//! cross-platform paths and atomic write operations. A missing or
//! malformed file is a recoverable condition: the hard-coded defaults
//! apply and the error is logged, never surfaced.

use crate::{
    AppError, AppResult,
    config::{
        ShortcutBinding, default_model, default_paste_key, default_paste_shortcut,
        default_record_key, default_record_shortcut,
    },
    input_event::InputKey,
};

use std::{fs, io::Write, panic::Location, path::PathBuf};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

/// Main configuration struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Shortcut that starts (press) and stops (release) recording.
    #[serde(default = "default_record_shortcut")]
    pub record_shortcut: ShortcutBinding,
    /// Shortcut whose release triggers the paste macro.
    #[serde(default = "default_paste_shortcut")]
    pub paste_shortcut: ShortcutBinding,
    /// Transcription engine model identifier (e.g. "tiny", "base.en").
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            record_shortcut: default_record_shortcut(),
            paste_shortcut: default_paste_shortcut(),
            model: default_model(),
        }
    }
}

impl Config {
    /// Load configuration from the default path, falling back to the
    /// hard-coded defaults on any failure.
    ///
    /// Per the availability policy, config problems never stop startup:
    /// they are logged at error level and the defaults apply.
    #[instrument]
    pub fn load_or_default() -> Self {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(e) => {
                error!(error = ?e, "No config directory available, using defaults");
                return Self::default();
            }
        };

        match Self::load_from(&path) {
            Ok(config) => {
                info!(config_path = ?path, "Configuration loaded");
                config
            }
            Err(e) => {
                error!(config_path = ?path, error = ?e, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from an explicit path.
    #[track_caller]
    pub fn load_from(path: &std::path::Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        serde_json::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Save configuration to the default path.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save(&self) -> AppResult<()> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        info!(config_path = ?path, "Configuration saved");
        Ok(())
    }

    /// Save configuration to an explicit path using the atomic write
    /// pattern: write a temp file, sync, then rename, so a crash mid-write
    /// cannot corrupt the existing file.
    #[track_caller]
    pub fn save_to(&self, path: &std::path::Path) -> AppResult<()> {
        let contents = serde_json::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let temp_path = path.with_extension("json.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(())
    }

    /// Typed record shortcut, falling back to the default on an
    /// unparseable (hand-edited) binding.
    pub fn record_key(&self) -> InputKey {
        self.record_shortcut.to_input_key().unwrap_or_else(|| {
            warn!(binding = ?self.record_shortcut, "Unparseable record shortcut, using default");
            default_record_key()
        })
    }

    /// Typed paste shortcut, falling back to the default on an
    /// unparseable binding.
    pub fn paste_key(&self) -> InputKey {
        self.paste_shortcut.to_input_key().unwrap_or_else(|| {
            warn!(binding = ?self.paste_shortcut, "Unparseable paste shortcut, using default");
            default_paste_key()
        })
    }

    /// Resolve the engine model file for the configured model name.
    #[track_caller]
    pub fn model_path(&self) -> AppResult<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        Ok(proj_dirs
            .data_dir()
            .join("models")
            .join(format!("ggml-{}.bin", self.model)))
    }

    /// Directory that finalized recordings are written into.
    #[track_caller]
    pub fn recordings_dir() -> AppResult<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        Ok(proj_dirs.data_dir().join("recordings"))
    }

    /// Validate that the engine model file exists at the configured path.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn validate_model_path(&self) -> AppResult<()> {
        let path = self.model_path()?;
        if !path.exists() {
            return Err(AppError::ConfigError {
                reason: format!(
                    "Model not found at: {:?}. Download a Whisper model or set \"model\" in the config.",
                    path
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(())
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.json"))
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "wehspr", "Wehspr").ok_or_else(|| AppError::ConfigError {
            reason: "Failed to get project directories".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}
