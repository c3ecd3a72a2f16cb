mod shortcut;
#[allow(clippy::module_inception)]
mod config;

pub(crate) use {
    config::Config,
    shortcut::{ShortcutBinding, SourceType},
};

use crate::input_event::{InputKey, MouseButton};

pub(crate) const DEFAULT_MODEL: &str = "tiny";

pub(crate) fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

pub(crate) fn default_record_shortcut() -> ShortcutBinding {
    ShortcutBinding::mouse(MouseButton::ExtraButton2)
}

pub(crate) fn default_paste_shortcut() -> ShortcutBinding {
    ShortcutBinding::keyboard("v")
}

pub(crate) fn default_record_key() -> InputKey {
    InputKey::Mouse(MouseButton::ExtraButton2)
}

pub(crate) fn default_paste_key() -> InputKey {
    InputKey::Keyboard("v".to_string())
}
