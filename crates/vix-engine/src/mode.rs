//! Editor modes and the per-mode key capability table.
//!
//! | Mode      | Keys interpreted as                                    |
//! |-----------|--------------------------------------------------------|
//! | `Normal`  | command grammar (counts, operators, motions)           |
//! | `Insert`  | literal text; a fixed control set routes to the engine |
//! | `Visual`  | motions extend the selection; operators consume it     |
//! | `Replace` | literal text overwriting in place                      |
//! | `Command` | literal text on the `:`/`/`/`?` line                   |
//!
//! Transitions live in the engine dispatch; this module only describes the
//! states and which broad key categories each one accepts, so the dispatch
//! can reject out-of-place keys in one early check instead of per-arm.

/// Visual-mode selection shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisualKind {
    /// `v` — character-wise selection.
    #[default]
    Char,
    /// `V` — line-wise selection.
    Line,
    /// `Ctrl-V` — block (rectangular) selection.
    Block,
}

/// The editor's current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Command mode — keys form the editing grammar.
    #[default]
    Normal,
    /// Text entry before the cursor.
    Insert,
    /// Selection mode with a shape.
    Visual(VisualKind),
    /// Text entry overwriting characters in place.
    Replace,
    /// Typing on the command/search line.
    Command,
}

/// A broad classification of keys, used by [`Mode::accepts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCategory {
    /// Count digits, operators, motions, register prefixes.
    Grammar,
    /// A printable character taken literally.
    LiteralText,
    /// Escape, Enter, Backspace, Tab — always routed to the engine.
    Control,
}

impl Mode {
    /// Short display name for the status line.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
            Self::Visual(VisualKind::Char) => "VISUAL",
            Self::Visual(VisualKind::Line) => "VISUAL LINE",
            Self::Visual(VisualKind::Block) => "VISUAL BLOCK",
            Self::Replace => "REPLACE",
            Self::Command => "COMMAND",
        }
    }

    /// Whether this mode interprets keys of the given category.
    ///
    /// Control keys are accepted everywhere. Grammar is confined to
    /// Normal/Visual; literal text to the input modes.
    #[must_use]
    pub const fn accepts(self, category: KeyCategory) -> bool {
        match category {
            KeyCategory::Control => true,
            KeyCategory::Grammar => matches!(self, Self::Normal | Self::Visual(_)),
            KeyCategory::LiteralText => {
                matches!(self, Self::Insert | Self::Replace | Self::Command)
            }
        }
    }

    /// Whether the cursor may rest one past the last character of a line.
    /// True for the text-entry modes; normal and visual keep the cursor on
    /// a character.
    #[must_use]
    pub const fn cursor_past_end(self) -> bool {
        matches!(self, Self::Insert | Self::Replace)
    }

    /// Whether a selection is active.
    #[must_use]
    pub const fn is_visual(self) -> bool {
        matches!(self, Self::Visual(_))
    }

    /// Whether ordinary characters are literal input rather than grammar.
    #[must_use]
    pub const fn is_input(self) -> bool {
        matches!(self, Self::Insert | Self::Replace | Self::Command)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
