//! Word boundary scanning — word and WORD navigation primitives.
//!
//! The three scan directions, each parameterized by a [`WordScope`]:
//!
//! | Function | Keys | Description |
//! |----------|------|-------------|
//! | [`next_start`] | `w` / `W` | Forward to start of next word |
//! | [`prev_start`] | `b` / `B` | Backward to start of previous word |
//! | [`next_end`] | `e` / `E` | Forward to end of current/next word |
//!
//! # Words vs WORDs
//!
//! A **word** ([`WordScope::Small`]) is a run of word characters (letters,
//! digits, underscore) or a run of other non-blank characters: `hello.world`
//! contains three words (`hello`, `.`, `world`).
//!
//! A **WORD** ([`WordScope::Big`]) is a run of non-blank characters. Only
//! whitespace separates WORDs: `hello.world` is one WORD.
//!
//! In both scopes an empty line counts as a word — `w` and `b` stop on
//! empty lines, though `e` skips them.

use crate::buffer::Buffer;
use crate::position::Position;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Which boundary rules a scan uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordScope {
    /// `w`/`b`/`e` — word chars and punctuation are distinct classes.
    Small,
    /// `W`/`B`/`E` — only blank vs non-blank matters.
    Big,
}

/// Character class for boundary detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    /// Letters, digits, underscore (and in `Big` scope, everything
    /// non-blank).
    Word,
    /// Non-blank, non-word characters. Never produced in `Big` scope.
    Punctuation,
    /// Space or tab.
    Blank,
    /// `\n` or `\r`.
    Newline,
}

impl WordScope {
    fn classify(self, ch: char) -> CharClass {
        if ch == '\n' || ch == '\r' {
            CharClass::Newline
        } else if ch.is_whitespace() {
            CharClass::Blank
        } else if matches!(self, Self::Big) || ch.is_alphanumeric() || ch == '_' {
            CharClass::Word
        } else {
            CharClass::Punctuation
        }
    }
}

// ---------------------------------------------------------------------------
// Scans
// ---------------------------------------------------------------------------

/// Forward to the start of the next word. Stays put at the end of the
/// buffer.
///
/// 1. Skip the current token (same-class chars).
/// 2. Skip whitespace/newlines, stopping at empty lines.
/// 3. Land on the first char of the next token.
#[must_use]
pub fn next_start(buf: &Buffer, pos: Position, scope: WordScope) -> Position {
    let rope = buf.rope();
    let total = rope.len_chars();

    let Some(start_idx) = buf.pos_to_char_idx(pos) else {
        return pos;
    };
    if total == 0 || start_idx >= total.saturating_sub(1) {
        return pos;
    }

    let mut idx = start_idx;
    let start_class = scope.classify(rope.char(idx));

    // Phase 1: skip the token under the cursor.
    if matches!(start_class, CharClass::Word | CharClass::Punctuation) {
        while idx < total && scope.classify(rope.char(idx)) == start_class {
            idx += 1;
        }
    }

    // Phase 2: skip whitespace/newlines, stopping at empty lines.
    while idx < total {
        let ch = rope.char(idx);
        match scope.classify(ch) {
            CharClass::Word | CharClass::Punctuation => break,
            CharClass::Blank => idx += 1,
            CharClass::Newline => {
                idx += 1;
                // \r\n counts as one newline.
                if ch == '\r' && idx < total && rope.char(idx) == '\n' {
                    idx += 1;
                }
                // Two newlines in a row means an empty line — a word.
                if idx < total && matches!(scope.classify(rope.char(idx)), CharClass::Newline) {
                    break;
                }
            }
        }
    }

    if idx >= total {
        return pos;
    }

    buf.char_idx_to_pos(idx).unwrap_or(pos)
}

/// Backward to the start of the previous word. Stays put at the start of
/// the buffer.
///
/// 1. Step back one char.
/// 2. Skip whitespace/newlines backward, stopping at empty lines.
/// 3. Continue backward through the word to its start.
#[must_use]
pub fn prev_start(buf: &Buffer, pos: Position, scope: WordScope) -> Position {
    let rope = buf.rope();
    let total = rope.len_chars();

    let Some(start_idx) = buf.pos_to_char_idx(pos) else {
        return pos;
    };
    if start_idx == 0 || total == 0 {
        return pos;
    }

    let mut idx = start_idx - 1;

    // Phase 1: skip whitespace/newlines backward, stopping at empty lines.
    loop {
        match scope.classify(rope.char(idx)) {
            CharClass::Word | CharClass::Punctuation => break,
            CharClass::Newline => {
                let line = rope.char_to_line(idx);
                if buf.line_content_len(line) == Some(0) {
                    // Empty line is a word — stop at its start.
                    return buf.char_idx_to_pos(rope.line_to_char(line)).unwrap_or(pos);
                }
                if idx == 0 {
                    return Position::ZERO;
                }
                idx -= 1;
            }
            CharClass::Blank => {
                if idx == 0 {
                    return Position::ZERO;
                }
                idx -= 1;
            }
        }
    }

    // Phase 2: walk back to the start of this token.
    let word_class = scope.classify(rope.char(idx));
    while idx > 0 && scope.classify(rope.char(idx - 1)) == word_class {
        idx -= 1;
    }

    buf.char_idx_to_pos(idx).unwrap_or(pos)
}

/// Forward to the end of the current or next word. Stays put at the end of
/// the buffer.
///
/// 1. Advance one char (off the current word-end).
/// 2. Skip whitespace/newlines — empty lines are not a stop for `e`.
/// 3. Advance to the last char of the word.
#[must_use]
pub fn next_end(buf: &Buffer, pos: Position, scope: WordScope) -> Position {
    let rope = buf.rope();
    let total = rope.len_chars();

    let Some(start_idx) = buf.pos_to_char_idx(pos) else {
        return pos;
    };
    let last = total.saturating_sub(1);
    if total == 0 || start_idx >= last {
        return pos;
    }

    let mut idx = start_idx + 1;

    // Phase 1: skip everything that isn't a token char.
    while idx < total {
        let class = scope.classify(rope.char(idx));
        if matches!(class, CharClass::Word | CharClass::Punctuation) {
            break;
        }
        idx += 1;
    }

    if idx >= total {
        return pos;
    }

    // Phase 2: advance to the last char of the token.
    let word_class = scope.classify(rope.char(idx));
    while idx < last && scope.classify(rope.char(idx + 1)) == word_class {
        idx += 1;
    }

    buf.char_idx_to_pos(idx).unwrap_or(pos)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
