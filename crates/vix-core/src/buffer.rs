//! Text buffer — the document the engine edits.
//!
//! A `Buffer` wraps a [`ropey::Rope`] with coordinate conversion between
//! `Position` (line, col) and rope char indices, plus the transactional
//! edit primitives everything else is built on.
//!
//! # Design
//!
//! - **ropey** gives O(log n) insert/delete anywhere, cheap line indexing,
//!   and solid Unicode handling; the buffer is a typed facade over it.
//! - **Every mutation returns its inverse.** `insert` hands back the
//!   `Edit` that deletes what was inserted, `delete` the `Edit` that
//!   re-inserts what was removed. The undo history is assembled from these
//!   return values — the buffer itself keeps no history.
//! - **Validation before mutation.** A mutating call either fails with
//!   [`EditError::OutOfBounds`] having touched nothing, or fully applies.
//!   There is no partial state to roll back.
//! - **No file I/O.** Content enters through [`Buffer::from_text`] and
//!   leaves through [`Buffer::contents`]; persistence belongs to the host.

use std::fmt;

use ropey::{Rope, RopeSlice};
use thiserror::Error;

use crate::edit::{Edit, end_of_text};
use crate::position::{Position, Range};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A mutation addressed a position outside the buffer.
///
/// Internal to the engine: the dispatch layer clamps every resolved
/// position before issuing edits, so this surfaces only on misuse of the
/// buffer API itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("position {0} is outside the buffer")]
    OutOfBounds(Position),
}

/// Result alias for buffer mutations.
pub type EditResult<T> = Result<T, EditError>;

// ---------------------------------------------------------------------------
// Line endings
// ---------------------------------------------------------------------------

/// Line terminator style, detected from the loaded text.
///
/// The engine inserts this terminator when opening new lines so edits stay
/// consistent with the document's existing style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineEnding {
    /// `\n`
    Lf,
    /// `\r\n`
    CrLf,
}

impl LineEnding {
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }

    /// Detect the style from the first line break in `text`. Defaults to
    /// `Lf` when the text has no line breaks.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(i) if i > 0 && text.as_bytes()[i - 1] == b'\r' => Self::CrLf,
            _ => Self::Lf,
        }
    }
}

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

/// A rope-backed text buffer.
///
/// Invariant: the buffer always has at least one line — an empty buffer is
/// one empty line, and text ending in `\n` has a trailing empty line after
/// it. All columns are char offsets within a line.
pub struct Buffer {
    rope: Rope,
    line_ending: LineEnding,
    modified: bool,
}

impl Buffer {
    // -- Construction -------------------------------------------------------

    /// An empty buffer (a single empty line).
    #[must_use]
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            line_ending: LineEnding::Lf,
            modified: false,
        }
    }

    /// A buffer holding `text`, with the line-ending style detected.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            line_ending: LineEnding::detect(text),
            rope: Rope::from_str(text),
            modified: false,
        }
    }

    // -- Reads --------------------------------------------------------------

    /// The underlying rope, for read-only traversal.
    #[inline]
    #[must_use]
    pub const fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Total line count. Never 0.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Index of the last line.
    #[inline]
    #[must_use]
    pub fn last_line(&self) -> usize {
        self.rope.len_lines() - 1
    }

    /// Total chars in the buffer.
    #[inline]
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// True when the buffer holds no text at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// A line including its terminator, or `None` past the end.
    #[inline]
    #[must_use]
    pub fn line(&self, line: usize) -> Option<RopeSlice<'_>> {
        (line < self.rope.len_lines()).then(|| self.rope.line(line))
    }

    /// Chars in a line **excluding** the terminator — the editable content
    /// length, which bounds normal-mode cursor columns.
    #[must_use]
    pub fn line_content_len(&self, line: usize) -> Option<usize> {
        self.line(line).map(|l| {
            let total = l.len_chars();
            match total {
                0 => 0,
                _ if l.char(total - 1) == '\n' => {
                    if total >= 2 && l.char(total - 2) == '\r' { total - 2 } else { total - 1 }
                }
                _ => total,
            }
        })
    }

    /// A line's content as a `String`, terminator stripped. Allocates.
    #[must_use]
    pub fn line_text(&self, line: usize) -> Option<String> {
        let len = self.line_content_len(line)?;
        let slice = self.rope.line(line);
        Some(slice.slice(..len).to_string())
    }

    /// The character at `pos`, or `None` out of bounds / past line end.
    #[must_use]
    pub fn char_at(&self, pos: Position) -> Option<char> {
        let idx = self.pos_to_char_idx(pos)?;
        (idx < self.rope.len_chars()).then(|| self.rope.char(idx))
    }

    /// The text covered by `range`, or `None` if an endpoint is invalid.
    #[must_use]
    pub fn slice(&self, range: Range) -> Option<RopeSlice<'_>> {
        let start = self.pos_to_char_idx(range.start)?;
        let end = self.pos_to_char_idx(range.end)?;
        Some(self.rope.slice(start..end))
    }

    /// The whole buffer as a `String`. Allocates.
    #[must_use]
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    /// The detected line-terminator style.
    #[inline]
    #[must_use]
    pub const fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// True once any mutation has been applied since load.
    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    /// Reset the modified flag (the host confirmed a successful save).
    #[inline]
    pub const fn mark_saved(&mut self) {
        self.modified = false;
    }

    // -- Coordinate conversion ----------------------------------------------

    /// `Position` → absolute rope char index. `col == line length` (the
    /// exclusive endpoint slot) is valid; anything further is `None`.
    #[must_use]
    pub fn pos_to_char_idx(&self, pos: Position) -> Option<usize> {
        if pos.line >= self.rope.len_lines() {
            return None;
        }
        let line_start = self.rope.line_to_char(pos.line);
        let line_len = self.rope.line(pos.line).len_chars();
        (pos.col <= line_len).then_some(line_start + pos.col)
    }

    /// Absolute rope char index → `Position`. `len_chars()` itself maps to
    /// the position past the last character.
    #[must_use]
    pub fn char_idx_to_pos(&self, char_idx: usize) -> Option<Position> {
        if char_idx > self.rope.len_chars() {
            return None;
        }
        let line = self.rope.char_to_line(char_idx);
        Some(Position::new(line, char_idx - self.rope.line_to_char(line)))
    }

    /// The position just past the final character of the buffer.
    #[must_use]
    pub fn end_position(&self) -> Position {
        self.char_idx_to_pos(self.rope.len_chars())
            .unwrap_or(Position::ZERO)
    }

    /// Clamp `pos` to the nearest valid position.
    ///
    /// `past_end` selects the column limit: `true` allows the caret slot
    /// after the last character (insert-adjacent contexts), `false` keeps
    /// the cursor on a character (normal mode).
    #[must_use]
    pub fn clamp(&self, pos: Position, past_end: bool) -> Position {
        if self.is_empty() {
            return Position::ZERO;
        }
        let line = pos.line.min(self.last_line());
        let content = self.line_content_len(line).unwrap_or(0);
        let max_col = if past_end { content } else { content.saturating_sub(1) };
        Position::new(line, pos.col.min(max_col))
    }

    /// The half-open range covering whole lines `first..=last`, terminators
    /// included. When `last` is the final line (no terminator after it),
    /// the range ends at the end of the buffer.
    #[must_use]
    pub fn line_range(&self, first: usize, last: usize) -> Range {
        let first = first.min(self.last_line());
        let last = last.min(self.last_line()).max(first);
        let start = Position::new(first, 0);
        let end = if last + 1 < self.line_count() {
            Position::new(last + 1, 0)
        } else {
            self.end_position()
        };
        Range::new(start, end)
    }

    // -- Mutations ----------------------------------------------------------

    /// Insert `text` at `pos`. Returns the inverse edit (deleting what was
    /// inserted).
    ///
    /// # Errors
    ///
    /// `OutOfBounds` when `pos` is not a valid position; the buffer is
    /// untouched in that case.
    pub fn insert(&mut self, pos: Position, text: &str) -> EditResult<Edit> {
        let idx = self.pos_to_char_idx(pos).ok_or(EditError::OutOfBounds(pos))?;
        self.rope.insert(idx, text);
        self.modified = true;
        Ok(Edit::Delete { pos, text: text.to_string() })
    }

    /// Delete the text in `range`. Returns the inverse edit (re-inserting
    /// the removed text). An empty range deletes nothing and returns an
    /// empty insert.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` when either endpoint is invalid; nothing is removed.
    pub fn delete(&mut self, range: Range) -> EditResult<Edit> {
        let start = self
            .pos_to_char_idx(range.start)
            .ok_or(EditError::OutOfBounds(range.start))?;
        let end = self
            .pos_to_char_idx(range.end)
            .ok_or(EditError::OutOfBounds(range.end))?;
        let text = self.rope.slice(start..end).to_string();
        if !text.is_empty() {
            self.rope.remove(start..end);
            self.modified = true;
        }
        Ok(Edit::Insert { pos: range.start, text })
    }

    /// Replace `range` with `text` — a delete followed by an insert, both
    /// validated up front. Returns the two inverse edits in forward
    /// application order (undo applies them in reverse).
    ///
    /// # Errors
    ///
    /// `OutOfBounds` when either endpoint is invalid; nothing changes.
    pub fn replace(&mut self, range: Range, text: &str) -> EditResult<[Edit; 2]> {
        // Validate both endpoints before the first mutation.
        self.pos_to_char_idx(range.start)
            .ok_or(EditError::OutOfBounds(range.start))?;
        self.pos_to_char_idx(range.end)
            .ok_or(EditError::OutOfBounds(range.end))?;
        let undo_delete = self.delete(range)?;
        let undo_insert = self.insert(range.start, text)?;
        Ok([undo_delete, undo_insert])
    }

    /// Apply a primitive edit and return its inverse. This is the path
    /// undo/redo takes: stored edits replay through here.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` when the edit no longer fits the buffer.
    pub fn apply(&mut self, edit: &Edit) -> EditResult<Edit> {
        match edit {
            Edit::Insert { pos, text } => self.insert(*pos, text),
            Edit::Delete { pos, text } => {
                let end = end_of_text(*pos, text);
                self.delete(Range::new(*pos, end))
            }
        }
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("lines", &self.line_count())
            .field("chars", &self.len_chars())
            .field("modified", &self.modified)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    // -- Construction & invariants ------------------------------------------

    #[test]
    fn empty_buffer_has_one_line() {
        let buf = Buffer::new();
        assert_eq!(buf.line_count(), 1);
        assert!(buf.is_empty());
        assert_eq!(buf.line_content_len(0), Some(0));
    }

    #[test]
    fn trailing_newline_yields_trailing_empty_line() {
        let buf = Buffer::from_text("abc\n");
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.line_content_len(1), Some(0));
    }

    #[test]
    fn detects_crlf() {
        assert_eq!(LineEnding::detect("a\r\nb"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect("a\nb"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("ab"), LineEnding::Lf);
        assert_eq!(Buffer::from_text("x\r\ny").line_ending(), LineEnding::CrLf);
    }

    // -- Reads --------------------------------------------------------------

    #[test]
    fn line_content_len_strips_terminators() {
        let buf = Buffer::from_text("hello\nworld\r\nlast");
        assert_eq!(buf.line_content_len(0), Some(5));
        assert_eq!(buf.line_content_len(1), Some(5));
        assert_eq!(buf.line_content_len(2), Some(4));
        assert_eq!(buf.line_content_len(9), None);
    }

    #[test]
    fn line_text_strips_terminator() {
        let buf = Buffer::from_text("hello\nworld");
        assert_eq!(buf.line_text(0).as_deref(), Some("hello"));
        assert_eq!(buf.line_text(1).as_deref(), Some("world"));
        assert_eq!(buf.line_text(5), None);
    }

    #[test]
    fn char_at_positions() {
        let buf = Buffer::from_text("café\nx");
        assert_eq!(buf.char_at(p(0, 3)), Some('é'));
        assert_eq!(buf.char_at(p(0, 4)), Some('\n'));
        assert_eq!(buf.char_at(p(1, 0)), Some('x'));
        assert_eq!(buf.char_at(p(1, 1)), None); // past last char
        assert_eq!(buf.char_at(p(2, 0)), None);
    }

    #[test]
    fn slice_multiline() {
        let buf = Buffer::from_text("one\ntwo\nthree");
        let r = Range::new(p(0, 1), p(2, 2));
        assert_eq!(buf.slice(r).unwrap().to_string(), "ne\ntwo\nth");
        assert!(buf.slice(Range::new(p(0, 0), p(9, 0))).is_none());
    }

    // -- Coordinate conversion ----------------------------------------------

    #[test]
    fn pos_char_idx_roundtrip() {
        let buf = Buffer::from_text("ab\ncde\n\nf");
        for pos in [p(0, 0), p(0, 2), p(1, 1), p(2, 0), p(3, 1)] {
            let idx = buf.pos_to_char_idx(pos).unwrap();
            assert_eq!(buf.char_idx_to_pos(idx), Some(pos));
        }
    }

    #[test]
    fn pos_to_char_idx_allows_exclusive_endpoint() {
        let buf = Buffer::from_text("ab");
        assert_eq!(buf.pos_to_char_idx(p(0, 2)), Some(2));
        assert_eq!(buf.pos_to_char_idx(p(0, 3)), None);
    }

    #[test]
    fn end_position_past_last_char() {
        assert_eq!(Buffer::from_text("ab\ncd").end_position(), p(1, 2));
        assert_eq!(Buffer::from_text("ab\n").end_position(), p(1, 0));
        assert_eq!(Buffer::new().end_position(), p(0, 0));
    }

    // -- Clamp --------------------------------------------------------------

    #[test]
    fn clamp_line_and_column() {
        let buf = Buffer::from_text("hello\nhi");
        assert_eq!(buf.clamp(p(0, 3), false), p(0, 3));
        assert_eq!(buf.clamp(p(0, 99), false), p(0, 4));
        assert_eq!(buf.clamp(p(0, 99), true), p(0, 5));
        assert_eq!(buf.clamp(p(99, 99), false), p(1, 1));
    }

    #[test]
    fn clamp_empty_buffer() {
        let buf = Buffer::new();
        assert_eq!(buf.clamp(p(9, 9), false), Position::ZERO);
    }

    // -- line_range ---------------------------------------------------------

    #[test]
    fn line_range_interior_includes_terminator() {
        let buf = Buffer::from_text("aa\nbb\ncc");
        let r = buf.line_range(1, 1);
        assert_eq!(buf.slice(r).unwrap().to_string(), "bb\n");
    }

    #[test]
    fn line_range_last_line_ends_at_buffer_end() {
        let buf = Buffer::from_text("aa\nbb");
        let r = buf.line_range(1, 1);
        assert_eq!(r.end, p(1, 2));
        assert_eq!(buf.slice(r).unwrap().to_string(), "bb");
    }

    #[test]
    fn line_range_spanning_all() {
        let buf = Buffer::from_text("aa\nbb\n");
        let r = buf.line_range(0, 5);
        assert_eq!(buf.slice(r).unwrap().to_string(), "aa\nbb\n");
    }

    // -- Mutations return inverses ------------------------------------------

    #[test]
    fn insert_returns_deleting_inverse() {
        let mut buf = Buffer::from_text("world");
        let inv = buf.insert(p(0, 0), "hello ").unwrap();
        assert_eq!(buf.contents(), "hello world");

        buf.apply(&inv).unwrap();
        assert_eq!(buf.contents(), "world");
    }

    #[test]
    fn delete_returns_inserting_inverse() {
        let mut buf = Buffer::from_text("hello world");
        let inv = buf.delete(Range::new(p(0, 5), p(0, 11))).unwrap();
        assert_eq!(buf.contents(), "hello");
        assert_eq!(inv, Edit::Insert { pos: p(0, 5), text: " world".into() });

        buf.apply(&inv).unwrap();
        assert_eq!(buf.contents(), "hello world");
    }

    #[test]
    fn delete_across_lines_merges() {
        let mut buf = Buffer::from_text("hello\nworld");
        buf.delete(Range::new(p(0, 5), p(1, 0))).unwrap();
        assert_eq!(buf.contents(), "helloworld");
        assert_eq!(buf.line_count(), 1);
    }

    #[test]
    fn delete_linewise_removes_terminator() {
        let mut buf = Buffer::from_text("aa\nbb\ncc");
        let r = buf.line_range(1, 1);
        let inv = buf.delete(r).unwrap();
        assert_eq!(buf.contents(), "aa\ncc");

        buf.apply(&inv).unwrap();
        assert_eq!(buf.contents(), "aa\nbb\ncc");
    }

    #[test]
    fn replace_returns_both_inverses() {
        let mut buf = Buffer::from_text("hello world");
        let [undo_del, undo_ins] = buf
            .replace(Range::new(p(0, 6), p(0, 11)), "earth")
            .unwrap();
        assert_eq!(buf.contents(), "hello earth");

        // Undo in reverse order restores the original.
        buf.apply(&undo_ins).unwrap();
        buf.apply(&undo_del).unwrap();
        assert_eq!(buf.contents(), "hello world");
    }

    #[test]
    fn out_of_bounds_leaves_buffer_untouched() {
        let mut buf = Buffer::from_text("abc");
        assert_eq!(
            buf.insert(p(5, 0), "x"),
            Err(EditError::OutOfBounds(p(5, 0)))
        );
        assert_eq!(
            buf.delete(Range::new(p(0, 0), p(5, 0))),
            Err(EditError::OutOfBounds(p(5, 0)))
        );
        assert!(buf.replace(Range::new(p(4, 0), p(5, 0)), "x").is_err());
        assert_eq!(buf.contents(), "abc");
        assert!(!buf.is_modified());
    }

    #[test]
    fn empty_delete_is_noop() {
        let mut buf = Buffer::from_text("abc");
        let inv = buf.delete(Range::caret(p(0, 1))).unwrap();
        assert_eq!(inv, Edit::Insert { pos: p(0, 1), text: String::new() });
        assert!(!buf.is_modified());
    }

    #[test]
    fn modified_flag_tracks_mutations() {
        let mut buf = Buffer::from_text("abc");
        assert!(!buf.is_modified());
        buf.insert(p(0, 3), "!").unwrap();
        assert!(buf.is_modified());
        buf.mark_saved();
        assert!(!buf.is_modified());
    }

    #[test]
    fn apply_roundtrips_an_edit() {
        let mut buf = Buffer::from_text("ac");
        let edit = Edit::Insert { pos: p(0, 1), text: "b\n".into() };
        let inv = buf.apply(&edit).unwrap();
        assert_eq!(buf.contents(), "ab\nc");
        buf.apply(&inv).unwrap();
        assert_eq!(buf.contents(), "ac");
    }

    #[test]
    fn unicode_positions() {
        let mut buf = Buffer::from_text("你好");
        buf.insert(p(0, 1), "x").unwrap();
        assert_eq!(buf.contents(), "你x好");
        assert_eq!(buf.len_chars(), 3);
    }
}
