use std::fmt;

/// Keyboard key identifier.
///
/// The runtime maps platform physical keys into these variants where possible.
/// For unsupported keys, use `Key::Unknown(u32)` with a stable platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    // Common control keys
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Shift,
    Control,
    Alt,
    Meta,

    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Digits
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    // Function keys
    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    /// Platform-dependent key not yet represented here.
    Unknown(u32),
}

const LETTERS: [Key; 26] = [
    Key::A, Key::B, Key::C, Key::D, Key::E, Key::F, Key::G, Key::H, Key::I,
    Key::J, Key::K, Key::L, Key::M, Key::N, Key::O, Key::P, Key::Q, Key::R,
    Key::S, Key::T, Key::U, Key::V, Key::W, Key::X, Key::Y, Key::Z,
];

const DIGITS: [Key; 10] = [
    Key::Digit0, Key::Digit1, Key::Digit2, Key::Digit3, Key::Digit4,
    Key::Digit5, Key::Digit6, Key::Digit7, Key::Digit8, Key::Digit9,
];

const FUNCTION_KEYS: [Key; 12] = [
    Key::F1, Key::F2, Key::F3, Key::F4, Key::F5, Key::F6,
    Key::F7, Key::F8, Key::F9, Key::F10, Key::F11, Key::F12,
];

impl Key {
    /// Returns the key code for this key, using the DOM `keyCode` numbering
    /// (`A` = 65, `Space` = 32, `F1` = 112, ...).
    ///
    /// `Unknown` keys have no code.
    pub fn code(self) -> Option<u32> {
        let code = match self {
            Key::Backspace => 8,
            Key::Tab => 9,
            Key::Enter => 13,
            Key::Shift => 16,
            Key::Control => 17,
            Key::Alt => 18,
            Key::Escape => 27,
            Key::Space => 32,
            Key::PageUp => 33,
            Key::PageDown => 34,
            Key::End => 35,
            Key::Home => 36,
            Key::ArrowLeft => 37,
            Key::ArrowUp => 38,
            Key::ArrowRight => 39,
            Key::ArrowDown => 40,
            Key::Insert => 45,
            Key::Delete => 46,
            Key::Meta => 91,
            Key::Unknown(_) => return None,
            other => {
                if let Some(i) = LETTERS.iter().position(|k| *k == other) {
                    65 + i as u32
                } else if let Some(i) = DIGITS.iter().position(|k| *k == other) {
                    48 + i as u32
                } else {
                    let i = FUNCTION_KEYS.iter().position(|k| *k == other)?;
                    112 + i as u32
                }
            }
        };
        Some(code)
    }

    /// Inverse of [`Key::code`]. Codes outside the known table yield `Key::Unknown(code)`.
    pub fn from_code(code: u32) -> Key {
        match code {
            8 => Key::Backspace,
            9 => Key::Tab,
            13 => Key::Enter,
            16 => Key::Shift,
            17 => Key::Control,
            18 => Key::Alt,
            27 => Key::Escape,
            32 => Key::Space,
            33 => Key::PageUp,
            34 => Key::PageDown,
            35 => Key::End,
            36 => Key::Home,
            37 => Key::ArrowLeft,
            38 => Key::ArrowUp,
            39 => Key::ArrowRight,
            40 => Key::ArrowDown,
            45 => Key::Insert,
            46 => Key::Delete,
            91 => Key::Meta,
            48..=57 => DIGITS[(code - 48) as usize],
            65..=90 => LETTERS[(code - 65) as usize],
            112..=123 => FUNCTION_KEYS[(code - 112) as usize],
            other => Key::Unknown(other),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Keyboard event category.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum KeyboardEventKind {
    KeyDown,
    KeyUp,
}

/// Raw keyboard event as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardEvent {
    /// Human-readable key (e.g. `"w"`, `" "`, `"Escape"`).
    pub key: String,
    /// Key code, see [`Key::code`].
    pub key_code: u32,
    /// True when the host generated this event by auto-repeat.
    pub repeat: bool,
}

/// A keyboard notification as emitted by a scene's keyboard observable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardInfo {
    pub kind: KeyboardEventKind,
    pub event: KeyboardEvent,
}

impl KeyboardInfo {
    pub fn new(kind: KeyboardEventKind, key: impl Into<String>, key_code: u32, repeat: bool) -> Self {
        Self {
            kind,
            event: KeyboardEvent {
                key: key.into(),
                key_code,
                repeat,
            },
        }
    }

    pub fn key_down(key: impl Into<String>, key_code: u32) -> Self {
        Self::new(KeyboardEventKind::KeyDown, key, key_code, false)
    }

    pub fn key_up(key: impl Into<String>, key_code: u32) -> Self {
        Self::new(KeyboardEventKind::KeyUp, key, key_code, false)
    }

    /// Returns the same notification flagged as an auto-repeat.
    pub fn repeated(mut self) -> Self {
        self.event.repeat = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_and_space_codes_follow_dom_numbering() {
        assert_eq!(Key::W.code(), Some(87));
        assert_eq!(Key::A.code(), Some(65));
        assert_eq!(Key::S.code(), Some(83));
        assert_eq!(Key::D.code(), Some(68));
        assert_eq!(Key::Z.code(), Some(90));
        assert_eq!(Key::Space.code(), Some(32));
    }

    #[test]
    fn digit_and_function_key_codes() {
        assert_eq!(Key::Digit0.code(), Some(48));
        assert_eq!(Key::Digit9.code(), Some(57));
        assert_eq!(Key::F1.code(), Some(112));
        assert_eq!(Key::F12.code(), Some(123));
    }

    #[test]
    fn unknown_keys_have_no_code() {
        assert_eq!(Key::Unknown(7).code(), None);
    }

    #[test]
    fn from_code_inverts_code() {
        for key in [Key::Escape, Key::Meta, Key::Q, Key::Digit4, Key::F7, Key::ArrowDown] {
            let code = key.code().unwrap();
            assert_eq!(Key::from_code(code), key);
        }
        assert_eq!(Key::from_code(250), Key::Unknown(250));
    }

    #[test]
    fn repeated_sets_flag_only() {
        let info = KeyboardInfo::key_down(" ", 32).repeated();
        assert_eq!(info.kind, KeyboardEventKind::KeyDown);
        assert_eq!(info.event.key_code, 32);
        assert!(info.event.repeat);
    }
}
