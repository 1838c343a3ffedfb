//! Core key types: Modifiers, KeyCode, KeyPress, KeySequence

use std::fmt;

/// Modifier keys as a bitfield for efficient storage and comparison
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(0b0001);
    pub const SHIFT: Modifiers = Modifiers(0b0010);
    pub const ALT: Modifiers = Modifiers(0b0100);
    pub const META: Modifiers = Modifiers(0b1000);

    /// Create modifiers from individual flags
    pub const fn new(ctrl: bool, shift: bool, alt: bool, meta: bool) -> Self {
        let mut bits = 0u8;
        if ctrl {
            bits |= 0b0001;
        }
        if shift {
            bits |= 0b0010;
        }
        if alt {
            bits |= 0b0100;
        }
        if meta {
            bits |= 0b1000;
        }
        Modifiers(bits)
    }

    /// Check if ctrl is held
    #[inline]
    pub const fn ctrl(self) -> bool {
        self.0 & 0b0001 != 0
    }

    /// Check if shift is held
    #[inline]
    pub const fn shift(self) -> bool {
        self.0 & 0b0010 != 0
    }

    /// Check if alt is held
    #[inline]
    pub const fn alt(self) -> bool {
        self.0 & 0b0100 != 0
    }

    /// Check if meta is held
    #[inline]
    pub const fn meta(self) -> bool {
        self.0 & 0b1000 != 0
    }

    /// Check if no modifiers are held
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Combine two modifier sets
    #[inline]
    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }

    /// Check if this contains all modifiers in other
    #[inline]
    pub const fn contains(self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Lowercase modifier names, in canonical ctrl-alt-shift-meta order
    pub(crate) fn names(self) -> Vec<&'static str> {
        let mut parts = Vec::new();
        if self.ctrl() {
            parts.push("ctrl");
        }
        if self.alt() {
            parts.push("alt");
        }
        if self.shift() {
            parts.push("shift");
        }
        if self.meta() {
            parts.push("meta");
        }
        parts
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names().join("+"))
    }
}

/// A key code representing a physical or logical key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A character key (normalized to lowercase)
    Char(char),

    // Named keys
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Space,

    // Arrow keys
    Up,
    Down,
    Left,
    Right,

    // Navigation
    Home,
    End,
    PageUp,
    PageDown,
    Insert,

    // Function keys
    F(u8), // F1-F24

    // Standalone modifier presses, as delivered by GUI toolkits.
    // These never participate in chord matching.
    Shift,
    Control,
    Alt,
    Meta,
}

impl KeyCode {
    /// Whether this is a bare modifier key (Shift pressed alone, etc.)
    pub const fn is_modifier(self) -> bool {
        matches!(
            self,
            KeyCode::Shift | KeyCode::Control | KeyCode::Alt | KeyCode::Meta
        )
    }

    /// Lowercase name used inside bracketed display strings
    fn name(self) -> String {
        match self {
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Enter => "enter".into(),
            KeyCode::Escape => "escape".into(),
            KeyCode::Tab => "tab".into(),
            KeyCode::Backspace => "backspace".into(),
            KeyCode::Delete => "delete".into(),
            KeyCode::Space => "space".into(),
            KeyCode::Up => "up".into(),
            KeyCode::Down => "down".into(),
            KeyCode::Left => "left".into(),
            KeyCode::Right => "right".into(),
            KeyCode::Home => "home".into(),
            KeyCode::End => "end".into(),
            KeyCode::PageUp => "pageup".into(),
            KeyCode::PageDown => "pagedown".into(),
            KeyCode::Insert => "insert".into(),
            KeyCode::F(n) => format!("f{}", n),
            KeyCode::Shift => "shift".into(),
            KeyCode::Control => "ctrl".into(),
            KeyCode::Alt => "alt".into(),
            KeyCode::Meta => "meta".into(),
        }
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single normalized key press: a key with modifiers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub code: KeyCode,
    pub mods: Modifiers,
}

impl KeyPress {
    /// Create a new key press
    pub const fn new(code: KeyCode, mods: Modifiers) -> Self {
        Self { code, mods }
    }

    /// Create a key press with no modifiers
    pub const fn key(code: KeyCode) -> Self {
        Self {
            code,
            mods: Modifiers::NONE,
        }
    }

    /// Create a key press for a character key (normalized to lowercase)
    pub fn char(c: char) -> Self {
        Self {
            code: KeyCode::Char(c.to_ascii_lowercase()),
            mods: Modifiers::NONE,
        }
    }

    /// Create a key press for a character with modifiers
    pub fn char_with_mods(c: char, mods: Modifiers) -> Self {
        Self {
            code: KeyCode::Char(c.to_ascii_lowercase()),
            mods,
        }
    }

    /// Whether this press carries no key identity, only a modifier.
    /// Such presses are non-events for chord matching.
    pub const fn is_modifier_only(self) -> bool {
        self.code.is_modifier()
    }

    /// The digit character for an unmodified 0-9 press, if any
    pub fn as_count_digit(self) -> Option<char> {
        match self.code {
            KeyCode::Char(c) if c.is_ascii_digit() && self.mods.is_empty() => Some(c),
            _ => None,
        }
    }

    /// Display form used when rendering keystrings.
    ///
    /// Plain characters render bare ("a"), shifted characters render
    /// uppercase ("A"), everything else renders bracketed ("<ctrl+a>").
    pub fn display_string(&self) -> String {
        match self.code {
            KeyCode::Char(c) if self.mods.is_empty() => c.to_string(),
            KeyCode::Char(c) if self.mods == Modifiers::SHIFT => {
                c.to_uppercase().to_string()
            }
            code => {
                let mods = self.mods.names().join("+");
                if mods.is_empty() {
                    format!("<{}>", code.name())
                } else {
                    format!("<{}+{}>", mods, code.name())
                }
            }
        }
    }
}

impl fmt::Display for KeyPress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_string())
    }
}

/// An ordered, immutable sequence of key presses (a chord typed so far)
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeySequence {
    presses: Vec<KeyPress>,
}

impl KeySequence {
    /// Create an empty sequence
    pub const fn new() -> Self {
        Self {
            presses: Vec::new(),
        }
    }

    /// Check if the sequence is empty
    pub fn is_empty(&self) -> bool {
        self.presses.is_empty()
    }

    /// Number of presses in the sequence
    pub fn len(&self) -> usize {
        self.presses.len()
    }

    /// A new sequence with one press appended
    pub fn append(&self, press: KeyPress) -> KeySequence {
        let mut presses = self.presses.clone();
        presses.push(press);
        KeySequence { presses }
    }

    /// A new sequence with another sequence appended
    pub fn extend(&self, other: &KeySequence) -> KeySequence {
        let mut presses = self.presses.clone();
        presses.extend_from_slice(&other.presses);
        KeySequence { presses }
    }

    /// Check if this sequence is a prefix of another (equality counts)
    pub fn is_prefix_of(&self, other: &KeySequence) -> bool {
        other.presses.len() >= self.presses.len()
            && other.presses[..self.presses.len()] == self.presses[..]
    }

    /// Iterate over the presses
    pub fn iter(&self) -> impl Iterator<Item = &KeyPress> {
        self.presses.iter()
    }
}

impl From<Vec<KeyPress>> for KeySequence {
    fn from(presses: Vec<KeyPress>) -> Self {
        Self { presses }
    }
}

impl FromIterator<KeyPress> for KeySequence {
    fn from_iter<I: IntoIterator<Item = KeyPress>>(iter: I) -> Self {
        Self {
            presses: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for press in &self.presses {
            write!(f, "{}", press.display_string())?;
        }
        Ok(())
    }
}
