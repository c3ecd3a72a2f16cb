use crate::{
    config::{Config, ShortcutBinding, SourceType},
    input_event::{InputKey, MouseButton},
};

use std::{fs, path::PathBuf, time::UNIX_EPOCH};

fn scratch_dir(label: &str) -> PathBuf {
    #[allow(clippy::unwrap_used)]
    let nanos = std::time::SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    let dir = std::env::temp_dir().join(format!("wehspr_config_{}_{}", label, nanos));
    #[allow(clippy::unwrap_used)]
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// WHAT: The default config serializes to the documented wire format
/// WHY: Hand-edited config files depend on these exact field names
#[test]
#[allow(clippy::unwrap_used)]
fn given_default_config_when_serialized_then_matches_wire_format() {
    // Given: The default configuration
    let config = Config::default();

    // When: Serializing to JSON
    let value = serde_json::to_value(&config).unwrap();

    // Then: Exact wire shape
    assert_eq!(
        value,
        serde_json::json!({
            "record_shortcut": {"type": "mouse", "key": "ExtraButton2"},
            "paste_shortcut": {"type": "keyboard", "key": "v"},
            "model": "tiny",
        })
    );
}

/// WHAT: Saved config loads back identically
/// WHY: Rebinding a shortcut must survive a restart
#[test]
#[allow(clippy::unwrap_used)]
fn given_config_when_saved_and_reloaded_then_round_trips() {
    // Given: A non-default configuration and a scratch path
    let dir = scratch_dir("roundtrip");
    let path = dir.join("config.json");
    let config = Config {
        record_shortcut: ShortcutBinding::keyboard("F5"),
        paste_shortcut: ShortcutBinding::mouse(MouseButton::Middle),
        model: "base.en".to_string(),
    };

    // When: Saving and reloading
    config.save_to(&path).unwrap();
    let reloaded = Config::load_from(&path).unwrap();

    // Then: Identical, and no temp file left behind
    assert_eq!(reloaded, config);
    assert!(!dir.join("config.json.tmp").exists());

    fs::remove_dir_all(&dir).unwrap();
}

/// WHAT: Missing fields take their defaults
/// WHY: A partial hand-written config must not fail to load
#[test]
#[allow(clippy::unwrap_used)]
fn given_partial_json_when_loading_then_missing_fields_default() {
    // Given: A config file that only sets the model
    let dir = scratch_dir("partial");
    let path = dir.join("config.json");
    fs::write(&path, r#"{"model": "small"}"#).unwrap();

    // When: Loading
    let config = Config::load_from(&path).unwrap();

    // Then: Explicit field kept, the rest defaulted
    assert_eq!(config.model, "small");
    assert_eq!(
        config.record_shortcut,
        ShortcutBinding::mouse(MouseButton::ExtraButton2)
    );
    assert_eq!(config.paste_shortcut, ShortcutBinding::keyboard("v"));

    fs::remove_dir_all(&dir).unwrap();
}

/// WHAT: Malformed JSON is a load error, not a panic
/// WHY: Startup falls back to defaults on exactly this error path
#[test]
#[allow(clippy::unwrap_used)]
fn given_malformed_json_when_loading_then_error() {
    // Given: A file that is not JSON
    let dir = scratch_dir("malformed");
    let path = dir.join("config.json");
    fs::write(&path, "not json {").unwrap();

    // When/Then: Loading fails cleanly
    assert!(Config::load_from(&path).is_err());

    fs::remove_dir_all(&dir).unwrap();
}

/// WHAT: An unrecognized mouse button name falls back to the default binding
/// WHY: A typo in a hand-edited config must leave the app usable
#[test]
fn given_unparseable_mouse_binding_when_resolving_then_default_key() {
    // Given: A config with a bogus mouse button name
    let config = Config {
        record_shortcut: ShortcutBinding {
            source: SourceType::Mouse,
            key: "NotAButton".to_string(),
        },
        ..Config::default()
    };

    // When: Resolving the typed record key
    let key = config.record_key();

    // Then: The default binding applies
    assert_eq!(key, InputKey::Mouse(MouseButton::ExtraButton2));
}

/// WHAT: Captured keys round-trip through the persisted binding form
/// WHY: Rebinding writes what matching later reads
#[test]
fn given_captured_keys_when_persisted_then_round_trip() {
    let keys = [
        InputKey::Mouse(MouseButton::ExtraButton1),
        InputKey::Mouse(MouseButton::Other(12)),
        InputKey::Keyboard("F9".to_string()),
    ];

    for key in keys {
        let binding = ShortcutBinding::from_input_key(&key);
        assert_eq!(binding.to_input_key(), Some(key));
    }
}

/// WHAT: Numbered mouse buttons persist as "ButtonN"
/// WHY: Exotic side buttons must still be bindable
#[test]
fn given_numbered_button_when_persisted_then_named_button_n() {
    let binding = ShortcutBinding::from_input_key(&InputKey::Mouse(MouseButton::Other(12)));

    assert_eq!(binding.source, SourceType::Mouse);
    assert_eq!(binding.key, "Button12");
}

/// WHAT: The model name resolves to a ggml model file path
/// WHY: Model selection is by short name, not full path
#[test]
#[allow(clippy::unwrap_used)]
fn given_model_name_when_resolving_path_then_ggml_file() {
    let config = Config {
        model: "base.en".to_string(),
        ..Config::default()
    };

    let path = config.model_path().unwrap();

    assert!(path.ends_with("models/ggml-base.en.bin"));
}
