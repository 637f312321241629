//! Key events — the engine's input vocabulary.
//!
//! The host translates whatever raw input it receives (terminal bytes,
//! browser events, test scripts) into [`KeyEvent`]s before feeding them to
//! the engine. Printable characters use [`Key::Char`]; editing and
//! navigation keys have dedicated variants. Modifier state rides along as
//! a bitmask.
//!
//! Every event carries a monotonic `seq` marker supplied by the host. The
//! engine never schedules on it; its only consumer is double-key timing
//! (the `jk` insert-mode exit), which compares markers of adjacent events.

use bitflags::bitflags;

/// Identity of a key.
///
/// Printable characters use [`Char`](Key::Char); everything the engine
/// reacts to by name has its own variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A Unicode character (printable).
    Char(char),
    Escape,
    Enter,
    Tab,
    Backspace,
    Delete,
    // -- Navigation ---------------------------------------------------------
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

bitflags! {
    /// Keyboard modifier flags.
    ///
    /// The host sets these from its own input layer; the encoding matches
    /// the usual terminal bitmask order (Shift, Alt, Ctrl).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

/// A keyboard event: key identity, modifiers, and the host's monotonic
/// sequence marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub mods: Modifiers,
    pub seq: u64,
}

impl KeyEvent {
    /// A plain key press with no modifiers and marker 0.
    #[must_use]
    pub const fn new(key: Key) -> Self {
        Self { key, mods: Modifiers::empty(), seq: 0 }
    }

    /// A printable character press.
    #[must_use]
    pub const fn ch(ch: char) -> Self {
        Self::new(Key::Char(ch))
    }

    /// A Ctrl+character press.
    #[must_use]
    pub const fn ctrl(ch: char) -> Self {
        Self { key: Key::Char(ch), mods: Modifiers::CTRL, seq: 0 }
    }

    /// The same event with a specific sequence marker.
    #[must_use]
    pub const fn at(mut self, seq: u64) -> Self {
        self.seq = seq;
        self
    }

    /// The plain character carried by this event, if it is an unmodified
    /// (or shift-only) printable key. Ctrl/Alt chords return `None` so
    /// they never leak into literal insertion.
    #[must_use]
    pub fn plain_char(&self) -> Option<char> {
        match self.key {
            Key::Char(ch)
                if !self.mods.intersects(Modifiers::CTRL | Modifiers::ALT) =>
            {
                Some(ch)
            }
            _ => None,
        }
    }

    /// True when this is Ctrl plus the given character.
    #[must_use]
    pub fn is_ctrl(&self, ch: char) -> bool {
        self.key == Key::Char(ch) && self.mods.contains(Modifiers::CTRL)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
