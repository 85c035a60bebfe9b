//! Input vocabulary shared by every backend: keys, buttons, modifiers, cursor shapes

use bitflags::bitflags;
use std::collections::HashMap;

use crate::types::CursorId;

/// Layout-independent key identifiers
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Unknown,
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    Num0, Num1, Num2, Num3, Num4, Num5, Num6, Num7, Num8, Num9,
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    LShift,
    RShift,
    LControl,
    RControl,
    LAlt,
    RAlt,
    LSystem,
    RSystem,
    Minus,
    Equal,
    Comma,
    Period,
    Slash,
    BackSlash,
    SemiColon,
    Apostrophe,
    LBracket,
    RBracket,
    Tilde,
}

impl Key {
    /// Keys whose printed character depends on the keyboard layout
    pub const PRINTABLE: [Key; 47] = [
        Key::A, Key::B, Key::C, Key::D, Key::E, Key::F, Key::G, Key::H, Key::I,
        Key::J, Key::K, Key::L, Key::M, Key::N, Key::O, Key::P, Key::Q, Key::R,
        Key::S, Key::T, Key::U, Key::V, Key::W, Key::X, Key::Y, Key::Z,
        Key::Num0, Key::Num1, Key::Num2, Key::Num3, Key::Num4,
        Key::Num5, Key::Num6, Key::Num7, Key::Num8, Key::Num9,
        Key::Minus, Key::Equal, Key::Comma, Key::Period, Key::Slash,
        Key::BackSlash, Key::SemiColon, Key::Apostrophe, Key::LBracket,
        Key::RBracket, Key::Tilde,
    ];

    /// Display name for keys that have no layout-dependent character.
    pub fn special_name(self) -> Option<&'static str> {
        let name = match self {
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
            Key::Space => "Space",
            Key::Enter => "Enter",
            Key::Escape => "Escape",
            Key::Tab => "Tab",
            Key::Backspace => "Backspace",
            Key::Insert => "Insert",
            Key::Delete => "Delete",
            Key::Home => "Home",
            Key::End => "End",
            Key::PageUp => "Page Up",
            Key::PageDown => "Page Down",
            Key::Up => "Up",
            Key::Down => "Down",
            Key::Left => "Left",
            Key::Right => "Right",
            Key::LShift => "Left Shift",
            Key::RShift => "Right Shift",
            Key::LControl => "Left Ctrl",
            Key::RControl => "Right Ctrl",
            Key::LAlt => "Left Alt",
            Key::RAlt => "Right Alt",
            Key::LSystem => "Left Super",
            Key::RSystem => "Right Super",
            _ => return None,
        };
        Some(name)
    }
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
    /// First extra button
    Button4,
    /// Second extra button
    Button5,
}

/// Key or button transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Went down
    Press,
    /// Went up
    Release,
    /// Held down long enough to auto-repeat
    Repeat,
}

bitflags! {
    /// Modifier keys held during an input event
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Either shift key
        const SHIFT = 1 << 0;
        /// Either control key
        const CONTROL = 1 << 1;
        /// Either alt key
        const ALT = 1 << 2;
        /// Either super/windows/command key
        const SUPER = 1 << 3;
        /// Caps lock is on
        const CAPS_LOCK = 1 << 4;
        /// Num lock is on
        const NUM_LOCK = 1 << 5;
    }
}

/// Cursor shapes every backend pre-creates at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardCursorShape {
    /// Regular arrow
    Arrow,
    /// Text insertion beam
    IBeam,
    /// Crosshair
    Crosshair,
    /// Pointing hand
    Hand,
    /// Horizontal resize arrows
    HResize,
    /// Vertical resize arrows
    VResize,
}

impl StandardCursorShape {
    /// Every standard shape, in id order
    pub const ALL: [StandardCursorShape; 6] = [
        StandardCursorShape::Arrow,
        StandardCursorShape::IBeam,
        StandardCursorShape::Crosshair,
        StandardCursorShape::Hand,
        StandardCursorShape::HResize,
        StandardCursorShape::VResize,
    ];

    /// Fixed logical id of this shape's cursor
    pub fn cursor_id(self) -> CursorId {
        CursorId(self as u32 + 1)
    }

    /// First id available to custom cursors
    pub fn first_custom_id() -> CursorId {
        CursorId(Self::ALL.len() as u32 + 1)
    }
}

/// Snapshot of the active keyboard layout, produced on the windowing thread.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyMap {
    names: HashMap<Key, String>,
    scan_codes: HashMap<Key, i32>,
}

impl KeyMap {
    /// Create an empty key map
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the layout name and scan code of a key
    pub fn insert(&mut self, key: Key, name: Option<String>, scan_code: Option<i32>) {
        if let Some(name) = name {
            self.names.insert(key, name);
        }
        if let Some(code) = scan_code {
            self.scan_codes.insert(key, code);
        }
    }

    /// Layout name of a key, as reported by the native library
    pub fn name(&self, key: Key) -> Option<&str> {
        self.names.get(&key).map(String::as_str)
    }

    /// Platform scan code of a key
    pub fn scan_code(&self, key: Key) -> Option<i32> {
        self.scan_codes.get(&key).copied()
    }

    /// Number of keys with a known name
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no key names are known
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_cursor_ids_are_contiguous() {
        for (index, shape) in StandardCursorShape::ALL.iter().enumerate() {
            assert_eq!(shape.cursor_id(), CursorId(index as u32 + 1));
        }
        assert_eq!(StandardCursorShape::first_custom_id(), CursorId(7));
    }

    #[test]
    fn test_special_names_skip_printable_keys() {
        for key in Key::PRINTABLE {
            assert!(key.special_name().is_none(), "{key:?} should be layout dependent");
        }
        assert_eq!(Key::Escape.special_name(), Some("Escape"));
    }

    #[test]
    fn test_key_map_lookup() {
        let mut map = KeyMap::new();
        map.insert(Key::Q, Some("a".to_string()), Some(16));
        map.insert(Key::W, None, Some(17));

        assert_eq!(map.name(Key::Q), Some("a"));
        assert_eq!(map.scan_code(Key::W), Some(17));
        assert_eq!(map.name(Key::W), None);
        assert_eq!(map.len(), 1);
    }
}
