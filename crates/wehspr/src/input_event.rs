//! Typed input events delivered by the global hook.
//!
//! The OS hook reports a single stream of mouse and keyboard activity;
//! this module narrows it to the discrete press/release events the router
//! consumes, with a tagged key type so a mouse button can never be
//! compared against a keyboard key by accident.

use std::fmt;
use std::str::FromStr;

/// A physical mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Secondary button.
    Right,
    /// Wheel click.
    Middle,
    /// First side button (X11 button 8, "back").
    ExtraButton1,
    /// Second side button (X11 button 9, "forward").
    ExtraButton2,
    /// Any other numbered button.
    Other(u8),
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "Left"),
            Self::Right => write!(f, "Right"),
            Self::Middle => write!(f, "Middle"),
            Self::ExtraButton1 => write!(f, "ExtraButton1"),
            Self::ExtraButton2 => write!(f, "ExtraButton2"),
            Self::Other(code) => write!(f, "Button{}", code),
        }
    }
}

impl FromStr for MouseButton {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Left" => Ok(Self::Left),
            "Right" => Ok(Self::Right),
            "Middle" => Ok(Self::Middle),
            "ExtraButton1" => Ok(Self::ExtraButton1),
            "ExtraButton2" => Ok(Self::ExtraButton2),
            other => other
                .strip_prefix("Button")
                .and_then(|code| code.parse::<u8>().ok())
                .map(Self::Other)
                .ok_or_else(|| format!("Unknown mouse button name: {}", other)),
        }
    }
}

/// A shortcut-relevant input source, tagged by device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKey {
    /// A mouse button.
    Mouse(MouseButton),
    /// A keyboard key, by normalized name (`"v"`, `"Escape"`, `"F5"`, ...).
    Keyboard(String),
}

impl InputKey {
    /// Whether this is the application-terminating Escape key.
    pub fn is_escape(&self) -> bool {
        matches!(self, Self::Keyboard(name) if name == "Escape")
    }
}

impl fmt::Display for InputKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mouse(button) => write!(f, "mouse:{}", button),
            Self::Keyboard(name) => write!(f, "keyboard:{}", name),
        }
    }
}

/// Press or release edge of a momentary button/key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Button/key went down.
    Press,
    /// Button/key came back up.
    Release,
}

/// One discrete event from the global input hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    /// Which button or key.
    pub key: InputKey,
    /// Which edge.
    pub action: InputAction,
}

impl InputEvent {
    /// Narrow a raw hook event to a shortcut-relevant one.
    ///
    /// Mouse motion and wheel events are dropped here so the router only
    /// ever sees discrete press/release edges.
    pub fn from_rdev(event: &rdev::Event) -> Option<Self> {
        use rdev::EventType;

        match event.event_type {
            EventType::KeyPress(key) => Some(Self {
                key: InputKey::Keyboard(key_name(key)),
                action: InputAction::Press,
            }),
            EventType::KeyRelease(key) => Some(Self {
                key: InputKey::Keyboard(key_name(key)),
                action: InputAction::Release,
            }),
            EventType::ButtonPress(button) => Some(Self {
                key: InputKey::Mouse(button_name(button)),
                action: InputAction::Press,
            }),
            EventType::ButtonRelease(button) => Some(Self {
                key: InputKey::Mouse(button_name(button)),
                action: InputAction::Release,
            }),
            EventType::MouseMove { .. } | EventType::Wheel { .. } => None,
        }
    }
}

fn button_name(button: rdev::Button) -> MouseButton {
    use rdev::Button;

    match button {
        Button::Left => MouseButton::Left,
        Button::Right => MouseButton::Right,
        Button::Middle => MouseButton::Middle,
        // X11 numbering: 8/9 are the side ("back"/"forward") buttons.
        Button::Unknown(8) => MouseButton::ExtraButton1,
        Button::Unknown(9) => MouseButton::ExtraButton2,
        Button::Unknown(code) => MouseButton::Other(code),
    }
}

/// Map an rdev key to a stable name used in config files and matching.
///
/// Letters and digits collapse to their character; everything else keeps
/// a readable identifier, falling back to the debug name for keys nobody
/// is likely to bind.
fn key_name(key: rdev::Key) -> String {
    use rdev::Key;

    let name = match key {
        Key::KeyA => "a",
        Key::KeyB => "b",
        Key::KeyC => "c",
        Key::KeyD => "d",
        Key::KeyE => "e",
        Key::KeyF => "f",
        Key::KeyG => "g",
        Key::KeyH => "h",
        Key::KeyI => "i",
        Key::KeyJ => "j",
        Key::KeyK => "k",
        Key::KeyL => "l",
        Key::KeyM => "m",
        Key::KeyN => "n",
        Key::KeyO => "o",
        Key::KeyP => "p",
        Key::KeyQ => "q",
        Key::KeyR => "r",
        Key::KeyS => "s",
        Key::KeyT => "t",
        Key::KeyU => "u",
        Key::KeyV => "v",
        Key::KeyW => "w",
        Key::KeyX => "x",
        Key::KeyY => "y",
        Key::KeyZ => "z",
        Key::Num0 => "0",
        Key::Num1 => "1",
        Key::Num2 => "2",
        Key::Num3 => "3",
        Key::Num4 => "4",
        Key::Num5 => "5",
        Key::Num6 => "6",
        Key::Num7 => "7",
        Key::Num8 => "8",
        Key::Num9 => "9",
        Key::Space => "Space",
        Key::Return => "Enter",
        Key::Escape => "Escape",
        Key::Backspace => "Backspace",
        Key::Tab => "Tab",
        Key::Delete => "Delete",
        Key::F1 => "F1",
        Key::F2 => "F2",
        Key::F3 => "F3",
        Key::F4 => "F4",
        Key::F5 => "F5",
        Key::F6 => "F6",
        Key::F7 => "F7",
        Key::F8 => "F8",
        Key::F9 => "F9",
        Key::F10 => "F10",
        Key::F11 => "F11",
        Key::F12 => "F12",
        other => return format!("{:?}", other),
    };

    name.to_string()
}
