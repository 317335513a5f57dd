use ::winit::event::{ElementState, KeyEvent};
use ::winit::keyboard::{Key as LogicalKey, KeyCode, NamedKey, PhysicalKey};

use crate::input::{Key, KeyboardEventKind, KeyboardInfo};

/// Translates a winit `KeyEvent` into a scene keyboard notification.
///
/// Returns `None` for keys that have no key code (unidentified platform keys).
pub fn translate_key_event(event: &KeyEvent) -> Option<KeyboardInfo> {
    let Some(key) = map_physical_key(event.physical_key) else {
        log::trace!("ignoring unidentified key: {:?}", event.physical_key);
        return None;
    };

    let Some(key_code) = key.code() else {
        log::trace!("ignoring key without a key code: {key}");
        return None;
    };

    let kind = match event.state {
        ElementState::Pressed => KeyboardEventKind::KeyDown,
        ElementState::Released => KeyboardEventKind::KeyUp,
    };

    Some(KeyboardInfo::new(
        kind,
        key_name(&event.logical_key, key),
        key_code,
        event.repeat,
    ))
}

/// Human-readable key: the produced text when there is one, the named key otherwise.
fn key_name(logical: &LogicalKey, key: Key) -> String {
    match logical {
        LogicalKey::Character(text) => text.to_string(),
        LogicalKey::Named(NamedKey::Space) => " ".to_string(),
        LogicalKey::Named(named) => format!("{named:?}"),
        _ => key.to_string(),
    }
}

/// Maps a physical key to an engine `Key`.
///
/// `None` only for `PhysicalKey::Unidentified`; known-but-unsupported codes become
/// `Key::Unknown`.
pub fn map_physical_key(pk: PhysicalKey) -> Option<Key> {
    let PhysicalKey::Code(code) = pk else {
        return None;
    };

    let key = match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Space => Key::Space,

        KeyCode::Insert => Key::Insert,
        KeyCode::Delete => Key::Delete,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,

        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,

        KeyCode::ShiftLeft | KeyCode::ShiftRight => Key::Shift,
        KeyCode::ControlLeft | KeyCode::ControlRight => Key::Control,
        KeyCode::AltLeft | KeyCode::AltRight => Key::Alt,
        KeyCode::SuperLeft | KeyCode::SuperRight => Key::Meta,

        KeyCode::KeyA => Key::A,
        KeyCode::KeyB => Key::B,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyJ => Key::J,
        KeyCode::KeyK => Key::K,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,

        KeyCode::Digit0 => Key::Digit0,
        KeyCode::Digit1 => Key::Digit1,
        KeyCode::Digit2 => Key::Digit2,
        KeyCode::Digit3 => Key::Digit3,
        KeyCode::Digit4 => Key::Digit4,
        KeyCode::Digit5 => Key::Digit5,
        KeyCode::Digit6 => Key::Digit6,
        KeyCode::Digit7 => Key::Digit7,
        KeyCode::Digit8 => Key::Digit8,
        KeyCode::Digit9 => Key::Digit9,

        KeyCode::F1 => Key::F1,
        KeyCode::F2 => Key::F2,
        KeyCode::F3 => Key::F3,
        KeyCode::F4 => Key::F4,
        KeyCode::F5 => Key::F5,
        KeyCode::F6 => Key::F6,
        KeyCode::F7 => Key::F7,
        KeyCode::F8 => Key::F8,
        KeyCode::F9 => Key::F9,
        KeyCode::F10 => Key::F10,
        KeyCode::F11 => Key::F11,
        KeyCode::F12 => Key::F12,

        other => Key::Unknown(other as u32),
    };

    Some(key)
}

#[cfg(test)]
mod tests {
    use ::winit::keyboard::{NativeKeyCode, SmolStr};

    use super::*;

    #[test]
    fn wasd_and_space_map_to_codes() {
        let code = |kc| map_physical_key(PhysicalKey::Code(kc)).and_then(Key::code);
        assert_eq!(code(KeyCode::KeyW), Some(87));
        assert_eq!(code(KeyCode::KeyA), Some(65));
        assert_eq!(code(KeyCode::KeyS), Some(83));
        assert_eq!(code(KeyCode::KeyD), Some(68));
        assert_eq!(code(KeyCode::Space), Some(32));
    }

    #[test]
    fn left_and_right_modifiers_collapse() {
        assert_eq!(map_physical_key(PhysicalKey::Code(KeyCode::ShiftRight)), Some(Key::Shift));
        assert_eq!(map_physical_key(PhysicalKey::Code(KeyCode::ControlLeft)), Some(Key::Control));
    }

    #[test]
    fn unidentified_keys_are_rejected() {
        let pk = PhysicalKey::Unidentified(NativeKeyCode::Unidentified);
        assert_eq!(map_physical_key(pk), None);
    }

    #[test]
    fn unsupported_codes_have_no_key_code() {
        let key = map_physical_key(PhysicalKey::Code(KeyCode::NumLock));
        assert!(matches!(key, Some(Key::Unknown(_))));
        assert_eq!(key.and_then(Key::code), None);
    }

    #[test]
    fn key_names() {
        let w = LogicalKey::Character(SmolStr::new("w"));
        assert_eq!(key_name(&w, Key::W), "w");
        assert_eq!(key_name(&LogicalKey::Named(NamedKey::Space), Key::Space), " ");
        assert_eq!(key_name(&LogicalKey::Named(NamedKey::Escape), Key::Escape), "Escape");
    }
}
