use crate::input_event::{InputKey, MouseButton};

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which device a shortcut listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Mouse button shortcut.
    Mouse,
    /// Keyboard key shortcut.
    Keyboard,
}

/// A persisted shortcut: `{"type": "mouse", "key": "ExtraButton2"}`.
///
/// The wire format keeps the key as a string for the config file; it is
/// parsed into the tagged [`InputKey`] before any matching happens, so
/// mouse names and keyboard names can never be compared across devices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutBinding {
    /// Device the shortcut listens on.
    #[serde(rename = "type")]
    pub source: SourceType,
    /// Button or key identifier.
    pub key: String,
}

impl ShortcutBinding {
    /// Binding for a mouse button.
    pub fn mouse(button: MouseButton) -> Self {
        Self {
            source: SourceType::Mouse,
            key: button.to_string(),
        }
    }

    /// Binding for a keyboard key by normalized name.
    pub fn keyboard(key: &str) -> Self {
        Self {
            source: SourceType::Keyboard,
            key: key.to_string(),
        }
    }

    /// Build the persisted form of a captured input key.
    pub fn from_input_key(key: &InputKey) -> Self {
        match key {
            InputKey::Mouse(button) => Self::mouse(*button),
            InputKey::Keyboard(name) => Self::keyboard(name),
        }
    }

    /// Parse into the typed key used for event matching.
    ///
    /// `None` when the stored mouse button name is not recognized
    /// (hand-edited config); callers fall back to the default binding.
    pub fn to_input_key(&self) -> Option<InputKey> {
        match self.source {
            SourceType::Mouse => MouseButton::from_str(&self.key).ok().map(InputKey::Mouse),
            SourceType::Keyboard => Some(InputKey::Keyboard(self.key.clone())),
        }
    }
}
