//! Keyboard input primitives.
use std::ops::Add;

/// Modifier key state.
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Mods {
    /// Shift is active.
    pub shift: bool,
    /// Control is active.
    pub ctrl: bool,
    /// Alt is active.
    pub alt: bool,
}

impl Add<KeyCode> for Mods {
    type Output = Key;

    fn add(self, code: KeyCode) -> Self::Output {
        Key {
            mods: self,
            code,
            is_virtual: false,
        }
    }
}

impl Add<Self> for Mods {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self {
            shift: self.shift || other.shift,
            ctrl: self.ctrl || other.ctrl,
            alt: self.alt || other.alt,
        }
    }
}

/// No modifiers pressed.
#[allow(non_upper_case_globals)]
pub const Empty: Mods = Mods {
    shift: false,
    ctrl: false,
    alt: false,
};

/// Shift-only modifier state.
#[allow(non_upper_case_globals)]
pub const Shift: Mods = Mods {
    shift: true,
    ctrl: false,
    alt: false,
};

/// Control-only modifier state.
#[allow(non_upper_case_globals)]
pub const Ctrl: Mods = Mods {
    shift: false,
    ctrl: true,
    alt: false,
};

/// Logical key codes.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum KeyCode {
    /// Tab key.
    Tab,
    /// Escape key.
    Escape,
    /// Enter key.
    Enter,
    /// Backspace key.
    Backspace,
    /// Delete key.
    Delete,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Function key.
    F(u8),
    /// A printable character.
    Char(char),
}

impl From<char> for KeyCode {
    fn from(c: char) -> Self {
        Self::Char(c)
    }
}

/// A key with its modifier state.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Key {
    /// Modifier state.
    pub mods: Mods,
    /// Logical key.
    pub code: KeyCode,
    /// Produced by an on-screen (virtual) keyboard rather than hardware.
    ///
    /// Virtual Tab presses never start tab navigation on their own.
    pub is_virtual: bool,
}

impl Key {
    /// A key press without modifiers.
    pub fn new(code: impl Into<KeyCode>) -> Self {
        Empty + code.into()
    }

    /// Mark this key as produced by a virtual keyboard.
    pub fn virtual_key(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    /// Is this a hardware Tab key?
    pub fn is_hardware_tab(&self) -> bool {
        self.code == KeyCode::Tab && !self.is_virtual
    }
}

impl From<KeyCode> for Key {
    fn from(code: KeyCode) -> Self {
        Self::new(code)
    }
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        Self::new(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mods_compose() {
        let k = (Shift + Ctrl) + KeyCode::Tab;
        assert!(k.mods.shift && k.mods.ctrl && !k.mods.alt);
        assert!(k.is_hardware_tab());
        assert!(!k.virtual_key().is_hardware_tab());
        assert_eq!(Key::from('a').code, KeyCode::Char('a'));
    }
}
