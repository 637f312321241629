//! Text objects — structural selection targets.
//!
//! Text objects pick regions by structure rather than cursor motion.
//! Combined with operators they form the composable grammar:
//!
//! ```text
//! operator + text-object = action
//! d        + iw          = delete inner word
//! c        + i"          = change inside quotes
//! y        + a(          = yank around parentheses
//! ```
//!
//! [`resolve`] is the single entry point: it takes a [`TextObjectKind`] and
//! an [`Extent`] (inner vs around) and returns the object's span, or `None`
//! when no enclosing object exists.
//!
//! # Supported objects
//!
//! | Inner    | Around   | Kind                                 |
//! |----------|----------|--------------------------------------|
//! | `iw`     | `aw`     | word (letters, digits, `_`)          |
//! | `iW`     | `aW`     | WORD (non-blank characters)          |
//! | `ip`     | `ap`     | paragraph (line-wise)                |
//! | `i"` `i'` `` i` `` | `a"` `a'` `` a` `` | quoted string on the line |
//! | `i(` `i[` `i{` `i<` | `a(` `a[` `a{` `a<` | bracketed block, nesting-aware |

use ropey::Rope;

use crate::buffer::Buffer;
use crate::position::{Position, Range, Shape};
use crate::word::WordScope;

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// Inner (`i`) selects the content; around (`a`) includes the delimiters —
/// or for words, the neighboring whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extent {
    Inner,
    Around,
}

/// What structure the object selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextObjectKind {
    /// `w` / `W` — the word under the cursor.
    Word(WordScope),
    /// `p` — the paragraph around the cursor (line-wise).
    Paragraph,
    /// `"` / `'` / `` ` `` — a quoted span on the current line.
    Quote(char),
    /// `(` `[` `{` `<` — a delimited block, nesting-aware, multi-line.
    Bracket(char, char),
}

impl TextObjectKind {
    /// Map the key typed after `i`/`a` to an object kind. Both halves of a
    /// bracket pair (and Vim's `b`/`B` aliases) name the same object.
    #[must_use]
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            'w' => Some(Self::Word(WordScope::Small)),
            'W' => Some(Self::Word(WordScope::Big)),
            'p' => Some(Self::Paragraph),
            '"' | '\'' | '`' => Some(Self::Quote(ch)),
            '(' | ')' | 'b' => Some(Self::Bracket('(', ')')),
            '[' | ']' => Some(Self::Bracket('[', ']')),
            '{' | '}' | 'B' => Some(Self::Bracket('{', '}')),
            '<' | '>' => Some(Self::Bracket('<', '>')),
            _ => None,
        }
    }
}

/// A resolved text object: the range plus how it should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectSpan {
    pub range: Range,
    pub shape: Shape,
}

/// Resolve a text object at `pos`. Returns `None` when the object cannot
/// be found (no enclosing quotes/brackets, position out of bounds).
#[must_use]
pub fn resolve(
    buf: &Buffer,
    pos: Position,
    kind: TextObjectKind,
    extent: Extent,
) -> Option<ObjectSpan> {
    match kind {
        TextObjectKind::Word(scope) => {
            let range = match extent {
                Extent::Inner => inner_word(buf, pos, scope)?,
                Extent::Around => around_word(buf, pos, scope)?,
            };
            Some(ObjectSpan { range, shape: Shape::Char })
        }
        TextObjectKind::Paragraph => {
            let range = paragraph(buf, pos, extent);
            Some(ObjectSpan { range, shape: Shape::Line })
        }
        TextObjectKind::Quote(quote) => {
            let (open_col, close_col) = find_quote_pair(buf, pos, quote)?;
            let range = match extent {
                Extent::Inner => {
                    let start = Position::new(pos.line, open_col + 1);
                    let end = Position::new(pos.line, close_col);
                    if start > end { Range::caret(start) } else { Range::new(start, end) }
                }
                Extent::Around => Range::new(
                    Position::new(pos.line, open_col),
                    Position::new(pos.line, close_col + 1),
                ),
            };
            Some(ObjectSpan { range, shape: Shape::Char })
        }
        TextObjectKind::Bracket(open, close) => {
            let (open_idx, close_idx) = find_bracket_pair(buf, pos, open, close)?;
            let range = match extent {
                Extent::Inner => {
                    let start = open_idx + 1;
                    if start >= close_idx {
                        Range::caret(idx_to_pos(buf, start))
                    } else {
                        Range::new(idx_to_pos(buf, start), idx_to_pos(buf, close_idx))
                    }
                }
                Extent::Around => {
                    Range::new(idx_to_pos(buf, open_idx), idx_to_pos(buf, close_idx + 1))
                }
            };
            Some(ObjectSpan { range, shape: Shape::Char })
        }
    }
}

// ---------------------------------------------------------------------------
// Word objects
// ---------------------------------------------------------------------------

/// Character class local to object scanning — whitespace and newlines get
/// distinct treatment from token runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Run {
    Token,
    Blank,
    Newline,
}

fn run_of(scope: WordScope, ch: char) -> (Run, bool) {
    // The bool distinguishes word runs from punctuation runs in Small
    // scope, so adjacent runs of different classes don't merge.
    if ch == '\n' || ch == '\r' {
        (Run::Newline, false)
    } else if ch.is_whitespace() {
        (Run::Blank, false)
    } else if matches!(scope, WordScope::Big) || ch.is_alphanumeric() || ch == '_' {
        (Run::Token, true)
    } else {
        (Run::Token, false)
    }
}

/// `iw` — the run of same-class chars around the cursor. On whitespace,
/// selects the whitespace run (stopping at newlines). On a newline,
/// selects just the line ending.
fn inner_word(buf: &Buffer, pos: Position, scope: WordScope) -> Option<Range> {
    let rope = buf.rope();
    let total = rope.len_chars();
    let idx = buf.pos_to_char_idx(pos)?;
    if total == 0 || idx >= total {
        return None;
    }

    let ch = rope.char(idx);
    let class = run_of(scope, ch);

    let (start, end) = match class.0 {
        Run::Token | Run::Blank => {
            let mut s = idx;
            while s > 0 && run_of(scope, rope.char(s - 1)) == class {
                s -= 1;
            }
            let mut e = idx + 1;
            while e < total && run_of(scope, rope.char(e)) == class {
                e += 1;
            }
            (s, e)
        }
        Run::Newline => {
            let mut e = idx + 1;
            if ch == '\r' && e < total && rope.char(e) == '\n' {
                e += 1;
            }
            (idx, e)
        }
    };

    Some(Range::new(idx_to_pos(buf, start), idx_to_pos(buf, end)))
}

/// `aw` — the inner word plus neighboring whitespace: trailing if present,
/// otherwise leading. On whitespace, the whitespace plus the following
/// word.
fn around_word(buf: &Buffer, pos: Position, scope: WordScope) -> Option<Range> {
    let rope = buf.rope();
    let total = rope.len_chars();
    let inner = inner_word(buf, pos, scope)?;

    let start_idx = buf.pos_to_char_idx(inner.start)?;
    let end_idx = buf.pos_to_char_idx(inner.end).unwrap_or(total);

    let idx = buf.pos_to_char_idx(pos)?;
    let is_blank = |i: usize| run_of(scope, rope.char(i)).0 == Run::Blank;

    match run_of(scope, rope.char(idx)).0 {
        Run::Token => {
            // Trailing whitespace first.
            let mut new_end = end_idx;
            while new_end < total && is_blank(new_end) {
                new_end += 1;
            }
            if new_end > end_idx {
                return Some(Range::new(inner.start, idx_to_pos(buf, new_end)));
            }

            // No trailing — take leading whitespace.
            let mut new_start = start_idx;
            while new_start > 0 && is_blank(new_start - 1) {
                new_start -= 1;
            }
            if new_start < start_idx {
                return Some(Range::new(idx_to_pos(buf, new_start), inner.end));
            }

            Some(inner)
        }
        Run::Blank => {
            // On whitespace: include the following token run.
            let mut new_end = end_idx;
            if new_end < total {
                let next = run_of(scope, rope.char(new_end));
                if next.0 == Run::Token {
                    while new_end < total && run_of(scope, rope.char(new_end)) == next {
                        new_end += 1;
                    }
                }
            }
            Some(Range::new(inner.start, idx_to_pos(buf, new_end)))
        }
        Run::Newline => Some(inner),
    }
}

// ---------------------------------------------------------------------------
// Paragraph objects
// ---------------------------------------------------------------------------

/// `ip`/`ap` — the block of lines around the cursor, line-wise.
///
/// A paragraph is a maximal run of non-blank lines (or, with the cursor on
/// a blank line, the run of blank lines). `ap` extends the block with the
/// trailing blank lines, or the leading ones when there are no trailing.
fn paragraph(buf: &Buffer, pos: Position, extent: Extent) -> Range {
    let blank = |line: usize| buf.line_content_len(line).unwrap_or(0) == 0;
    let on_blank = blank(pos.line);
    let last = buf.last_line();

    let mut first_line = pos.line;
    while first_line > 0 && blank(first_line - 1) == on_blank {
        first_line -= 1;
    }
    let mut last_line = pos.line;
    while last_line < last && blank(last_line + 1) == on_blank {
        last_line += 1;
    }

    if extent == Extent::Around {
        // Trailing blanks first; leading if the block runs to the end.
        let mut extended = false;
        while last_line < last && blank(last_line + 1) != on_blank {
            last_line += 1;
            extended = true;
        }
        if !extended {
            while first_line > 0 && blank(first_line - 1) != on_blank {
                first_line -= 1;
            }
        }
    }

    buf.line_range(first_line, last_line)
}

// ---------------------------------------------------------------------------
// Quote pairing
// ---------------------------------------------------------------------------

/// Find the quote pair on the cursor's line that contains (or follows) the
/// cursor.
///
/// Quotes pair left-to-right: the 1st and 2nd form a pair, the 3rd and 4th
/// the next. A cursor inside a pair selects it; a cursor before or between
/// pairs selects the next pair forward.
fn find_quote_pair(buf: &Buffer, pos: Position, quote: char) -> Option<(usize, usize)> {
    let line = buf.line(pos.line)?;

    let mut quotes = Vec::new();
    for (i, ch) in line.chars().enumerate() {
        if ch == '\n' || ch == '\r' {
            break;
        }
        if ch == quote {
            quotes.push(i);
        }
    }
    if quotes.len() < 2 {
        return None;
    }

    let col = pos.col;
    for pair in quotes.chunks(2) {
        if let [open, close] = *pair {
            if col >= open && col <= close {
                return Some((open, close));
            }
        }
    }
    // Outside all pairs — next pair forward.
    for pair in quotes.chunks(2) {
        if let [open, close] = *pair {
            if open > col {
                return Some((open, close));
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Bracket matching
// ---------------------------------------------------------------------------

/// Find the matching bracket pair containing the cursor. Nesting-aware and
/// multi-line. Returns char indices `(open_idx, close_idx)`.
fn find_bracket_pair(
    buf: &Buffer,
    pos: Position,
    open: char,
    close: char,
) -> Option<(usize, usize)> {
    let rope = buf.rope();
    let total = rope.len_chars();
    let cursor_idx = buf.pos_to_char_idx(pos)?;
    if total == 0 || cursor_idx >= total {
        return None;
    }

    let cursor_char = rope.char(cursor_idx);

    // On the open bracket: scan forward for its close.
    if cursor_char == open {
        let close_idx = find_closing(rope, cursor_idx, total, open, close)?;
        return Some((cursor_idx, close_idx));
    }
    // On the close bracket: scan backward for its open.
    if cursor_char == close {
        let open_idx = find_opening(rope, cursor_idx, open, close)?;
        return Some((open_idx, cursor_idx));
    }

    // Between brackets: find the enclosing open, then its close.
    let open_idx = find_opening(rope, cursor_idx, open, close)?;
    let close_idx = find_closing(rope, open_idx, total, open, close)?;
    (cursor_idx > open_idx && cursor_idx < close_idx).then_some((open_idx, close_idx))
}

/// Backward scan for an unmatched opening bracket. Each close increases
/// depth, each open decreases it; depth 0 at an open is the match.
fn find_opening(rope: &Rope, start: usize, open: char, close: char) -> Option<usize> {
    let mut depth: usize = 0;
    let mut i = start;
    loop {
        if i == 0 {
            return (rope.char(0) == open && depth == 0).then_some(0);
        }
        i -= 1;
        let ch = rope.char(i);
        if ch == close {
            depth += 1;
        } else if ch == open {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
        }
    }
}

/// Forward scan for the matching closing bracket.
fn find_closing(rope: &Rope, start: usize, total: usize, open: char, close: char) -> Option<usize> {
    let mut depth: usize = 0;
    for i in (start + 1)..total {
        let ch = rope.char(i);
        if ch == open {
            depth += 1;
        } else if ch == close {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
        }
    }
    None
}

/// Char index → position, mapping `idx >= len_chars()` to the slot past
/// the final character — needed for half-open range endpoints.
fn idx_to_pos(buf: &Buffer, idx: usize) -> Position {
    if idx >= buf.len_chars() {
        buf.end_position()
    } else {
        buf.char_idx_to_pos(idx).unwrap_or(Position::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
