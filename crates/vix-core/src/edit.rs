//! Primitive reversible edits.
//!
//! Every buffer mutation decomposes into these two primitives, and every
//! primitive knows its own inverse. That closure property is what the undo
//! machinery is built on: a transaction is a list of edits, and undoing it
//! is applying each edit's [`invert`](Edit::invert) in reverse order.
//!
//! An edit records both the position *and* the text involved, which is
//! enough to replay it forward or backward without consulting any other
//! state.

use crate::position::{Position, Range};

/// A single reversible buffer edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Insert `text` at `pos`.
    Insert { pos: Position, text: String },

    /// Delete `text` starting at `pos`. The text is the content being
    /// removed — captured from the buffer before the deletion happens.
    Delete { pos: Position, text: String },
}

impl Edit {
    /// The edit that exactly reverses this one.
    ///
    /// `invert` is an involution: `e.invert().invert() == e`.
    #[must_use]
    pub fn invert(&self) -> Self {
        match self {
            Self::Insert { pos, text } => Self::Delete { pos: *pos, text: text.clone() },
            Self::Delete { pos, text } => Self::Insert { pos: *pos, text: text.clone() },
        }
    }

    /// The position where this edit starts.
    #[inline]
    #[must_use]
    pub const fn pos(&self) -> Position {
        match self {
            Self::Insert { pos, .. } | Self::Delete { pos, .. } => *pos,
        }
    }

    /// The buffer range this edit's text occupies (for an insert: after it
    /// is applied; for a delete: before it is applied).
    #[must_use]
    pub fn text_range(&self) -> Range {
        let (pos, text) = match self {
            Self::Insert { pos, text } | Self::Delete { pos, text } => (*pos, text.as_str()),
        };
        Range::new(pos, end_of_text(pos, text))
    }
}

/// The position just past `text` when it starts at `start`.
///
/// Walks the text tracking line breaks; `\n`, `\r\n`, and lone `\r` each
/// count as one line ending.
#[must_use]
pub fn end_of_text(start: Position, text: &str) -> Position {
    let mut line = start.line;
    let mut col = start.col;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\n' => {
                line += 1;
                col = 0;
            }
            '\r' => {
                line += 1;
                col = 0;
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            _ => col += 1,
        }
    }

    Position::new(line, col)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
