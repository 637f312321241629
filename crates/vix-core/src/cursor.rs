//! Cursor — position tracking with sticky column and selection anchor.
//!
//! The `Cursor` is a lightweight value type: a position, a remembered
//! column for vertical movement, and an optional selection anchor. It does
//! not own or reference the buffer; the buffer is passed to movement
//! methods as a parameter.
//!
//! # Column limits
//!
//! Movement methods take a `past_end: bool` parameter instead of a mode
//! enum, keeping the cursor decoupled from the command layer:
//!
//! - `past_end = false` — the cursor sits ON a character (normal mode).
//! - `past_end = true` — the cursor may sit after the last char (insert
//!   mode, exclusive range endpoints).
//!
//! # Sticky column
//!
//! Vertical movement remembers the column the cursor wants to be at. When
//! passing through a short line and reaching a long line again, the cursor
//! snaps back to the remembered column. Horizontal movement resets it.
//! Setting the column to `usize::MAX` (after `$`) pins the cursor to each
//! line's end.
//!
//! # Selection
//!
//! An optional `anchor` marks the other end of a selection. The anchor
//! stays put while the cursor moves; visual mode sets it on entry and
//! clears it on exit.

use crate::buffer::Buffer;
use crate::position::{Position, Range};

/// A cursor in a text buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    /// Current position.
    pos: Position,

    /// Remembered column for vertical movement. `usize::MAX` means
    /// "end of line" and survives moving through lines of any length.
    sticky_col: usize,

    /// Selection anchor — the end that stays put while the cursor moves.
    anchor: Option<Position>,
}

impl Cursor {
    /// A cursor at the origin.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pos: Position::ZERO,
            sticky_col: 0,
            anchor: None,
        }
    }

    /// A cursor at a specific position.
    #[must_use]
    pub const fn at(pos: Position) -> Self {
        Self {
            pos,
            sticky_col: pos.col,
            anchor: None,
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// Current position.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.pos
    }

    /// Current line (0-indexed).
    #[inline]
    #[must_use]
    pub const fn line(&self) -> usize {
        self.pos.line
    }

    /// Current column (0-indexed, char offset).
    #[inline]
    #[must_use]
    pub const fn col(&self) -> usize {
        self.pos.col
    }

    /// The remembered column for vertical movement.
    #[inline]
    #[must_use]
    pub const fn sticky_col(&self) -> usize {
        self.sticky_col
    }

    /// The selection anchor, if a selection is active.
    #[inline]
    #[must_use]
    pub const fn anchor(&self) -> Option<Position> {
        self.anchor
    }

    /// True if a selection is active.
    #[inline]
    #[must_use]
    pub const fn has_selection(&self) -> bool {
        self.anchor.is_some()
    }

    /// The ordered anchor-to-cursor range, or `None` without a selection.
    #[must_use]
    pub fn selection(&self) -> Option<Range> {
        self.anchor.map(|anchor| Range::ordered(anchor, self.pos))
    }

    // -- Selection control --------------------------------------------------

    /// Drop the anchor at the current position.
    pub const fn set_anchor(&mut self) {
        self.anchor = Some(self.pos);
    }

    /// Drop the anchor at a specific position.
    pub const fn set_anchor_at(&mut self, pos: Position) {
        self.anchor = Some(pos);
    }

    /// Clear the selection.
    pub const fn clear_anchor(&mut self) {
        self.anchor = None;
    }

    /// Swap the cursor and the anchor (visual-mode `o`). No-op without a
    /// selection.
    pub const fn swap_anchor(&mut self) {
        if let Some(anchor) = self.anchor {
            self.anchor = Some(self.pos);
            self.pos = anchor;
            self.sticky_col = self.pos.col;
        }
    }

    // -- Direct positioning -------------------------------------------------

    /// Move to an exact position, clamped to buffer bounds. Resets the
    /// sticky column. Does not touch the anchor.
    pub fn set_position(&mut self, pos: Position, buf: &Buffer, past_end: bool) {
        self.pos = buf.clamp(pos, past_end);
        self.sticky_col = self.pos.col;
    }

    /// Move to a position keeping the sticky column intact — for vertical
    /// motions that resolved their own target line.
    pub fn set_line_keeping_col(&mut self, line: usize, buf: &Buffer, past_end: bool) {
        let target = Position::new(line, self.sticky_col);
        self.pos = buf.clamp(target, past_end);
    }

    // -- Horizontal movement ------------------------------------------------

    /// Left by `count` chars, stopping at column 0. Resets sticky column.
    pub fn move_left(&mut self, count: usize, buf: &Buffer, past_end: bool) {
        let max_col = max_col(buf, self.pos.line, past_end);
        let col = self.pos.col.min(max_col);
        self.pos.col = col.saturating_sub(count);
        self.sticky_col = self.pos.col;
    }

    /// Right by `count` chars, stopping at the line's column limit. Resets
    /// sticky column.
    pub fn move_right(&mut self, count: usize, buf: &Buffer, past_end: bool) {
        let max_col = max_col(buf, self.pos.line, past_end);
        self.pos.col = self.pos.col.saturating_add(count).min(max_col);
        self.sticky_col = self.pos.col;
    }

    /// To column 0 (`0`). Resets sticky column.
    pub const fn move_to_line_start(&mut self) {
        self.pos.col = 0;
        self.sticky_col = 0;
    }

    /// To the first non-whitespace char of the line (`^`). Resets sticky
    /// column.
    pub fn move_to_first_non_blank(&mut self, buf: &Buffer, past_end: bool) {
        self.pos.col = first_non_blank(buf, self.pos.line).min(max_col(buf, self.pos.line, past_end));
        self.sticky_col = self.pos.col;
    }

    /// To the line's last char (`$`), or past it when `past_end`. Pins the
    /// sticky column to end-of-line so vertical moves track line ends.
    pub fn move_to_line_end(&mut self, buf: &Buffer, past_end: bool) {
        self.pos.col = max_col(buf, self.pos.line, past_end);
        self.sticky_col = usize::MAX;
    }

    // -- Vertical movement --------------------------------------------------

    /// Up by `count` lines, tracking the sticky column.
    pub fn move_up(&mut self, count: usize, buf: &Buffer, past_end: bool) {
        self.pos.line = self.pos.line.saturating_sub(count);
        self.pos.col = self.sticky_col.min(max_col(buf, self.pos.line, past_end));
    }

    /// Down by `count` lines, clamped to the last line, tracking the
    /// sticky column.
    pub fn move_down(&mut self, count: usize, buf: &Buffer, past_end: bool) {
        self.pos.line = self.pos.line.saturating_add(count).min(buf.last_line());
        self.pos.col = self.sticky_col.min(max_col(buf, self.pos.line, past_end));
    }

    // -- Clamping -----------------------------------------------------------

    /// Pull the cursor (and anchor) back inside the buffer after an edit.
    pub fn clamp(&mut self, buf: &Buffer, past_end: bool) {
        self.pos = buf.clamp(self.pos, past_end);
        if let Some(anchor) = &mut self.anchor {
            *anchor = buf.clamp(*anchor, past_end);
        }
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Maximum valid column for a line: `content_len` when `past_end`, one
/// less otherwise (0 for empty lines).
#[must_use]
pub fn max_col(buf: &Buffer, line: usize, past_end: bool) -> usize {
    let content_len = buf.line_content_len(line).unwrap_or(0);
    if past_end { content_len } else { content_len.saturating_sub(1) }
}

/// Column of the first non-whitespace char on `line`; the content length
/// when the line is all whitespace.
#[must_use]
pub fn first_non_blank(buf: &Buffer, line: usize) -> usize {
    buf.line(line).map_or(0, |l| {
        l.chars()
            .take_while(|ch| ch.is_whitespace() && *ch != '\n' && *ch != '\r')
            .count()
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // Five lines of varying length, one empty, last without newline.
    fn sample_buffer() -> Buffer {
        Buffer::from_text("hello\nworld\nhi\n\ngoodbye")
    }

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    // -- Construction -------------------------------------------------------

    #[test]
    fn new_at_origin() {
        let c = Cursor::new();
        assert_eq!(c.position(), Position::ZERO);
        assert_eq!(c.sticky_col(), 0);
        assert!(!c.has_selection());
    }

    #[test]
    fn at_specific_position() {
        let c = Cursor::at(p(3, 7));
        assert_eq!(c.position(), p(3, 7));
        assert_eq!(c.sticky_col(), 7);
    }

    // -- Selection ----------------------------------------------------------

    #[test]
    fn set_and_clear_anchor() {
        let mut c = Cursor::at(p(1, 3));
        c.set_anchor();
        assert_eq!(c.anchor(), Some(p(1, 3)));
        c.clear_anchor();
        assert!(!c.has_selection());
    }

    #[test]
    fn selection_is_ordered_both_ways() {
        let mut c = Cursor::at(p(2, 5));
        c.set_anchor_at(p(0, 3));
        let sel = c.selection().unwrap();
        assert_eq!((sel.start, sel.end), (p(0, 3), p(2, 5)));

        let mut c = Cursor::at(p(0, 2));
        c.set_anchor_at(p(3, 0));
        let sel = c.selection().unwrap();
        assert_eq!((sel.start, sel.end), (p(0, 2), p(3, 0)));
    }

    #[test]
    fn swap_anchor_exchanges_ends() {
        let mut c = Cursor::at(p(2, 5));
        c.set_anchor_at(p(0, 3));
        c.swap_anchor();
        assert_eq!(c.position(), p(0, 3));
        assert_eq!(c.anchor(), Some(p(2, 5)));
        assert_eq!(c.sticky_col(), 3);
    }

    #[test]
    fn swap_anchor_without_selection_is_noop() {
        let mut c = Cursor::at(p(1, 1));
        c.swap_anchor();
        assert_eq!(c.position(), p(1, 1));
    }

    // -- set_position -------------------------------------------------------

    #[test]
    fn set_position_clamps() {
        let buf = sample_buffer();
        let mut c = Cursor::new();
        c.set_position(p(100, 100), &buf, false);
        assert_eq!(c.position(), p(4, 6)); // "goodbye" last char
    }

    #[test]
    fn set_position_past_end() {
        let buf = sample_buffer();
        let mut c = Cursor::new();
        c.set_position(p(0, 100), &buf, true);
        assert_eq!(c.position(), p(0, 5));
    }

    // -- Horizontal ---------------------------------------------------------

    #[test]
    fn move_left_stops_at_zero() {
        let buf = sample_buffer();
        let mut c = Cursor::at(p(0, 1));
        c.move_left(5, &buf, false);
        assert_eq!(c.col(), 0);
    }

    #[test]
    fn move_right_limits_by_mode() {
        let buf = sample_buffer();
        let mut c = Cursor::new();
        c.move_right(100, &buf, false);
        assert_eq!(c.col(), 4);

        let mut c = Cursor::new();
        c.move_right(100, &buf, true);
        assert_eq!(c.col(), 5);
    }

    #[test]
    fn move_to_first_non_blank_with_indent() {
        let buf = Buffer::from_text("    hello");
        let mut c = Cursor::new();
        c.move_to_first_non_blank(&buf, false);
        assert_eq!(c.col(), 4);
    }

    #[test]
    fn move_to_first_non_blank_all_whitespace() {
        let buf = Buffer::from_text("   \n");
        let mut c = Cursor::new();
        c.move_to_first_non_blank(&buf, false);
        assert_eq!(c.col(), 2); // max normal col on "   "
    }

    #[test]
    fn move_to_line_end_empty_line() {
        let buf = sample_buffer();
        let mut c = Cursor::at(p(3, 0));
        c.move_to_line_end(&buf, false);
        assert_eq!(c.col(), 0);
    }

    // -- Vertical + sticky column -------------------------------------------

    #[test]
    fn sticky_col_through_short_line() {
        let buf = sample_buffer();
        let mut c = Cursor::at(p(0, 4));

        c.move_down(2, &buf, false); // "hi" — snaps to col 1
        assert_eq!(c.position(), p(2, 1));
        assert_eq!(c.sticky_col(), 4);

        c.move_down(2, &buf, false); // "goodbye" — snaps back to 4
        assert_eq!(c.position(), p(4, 4));
    }

    #[test]
    fn sticky_col_pinned_to_line_end() {
        let buf = Buffer::from_text("hello\nhi\ngoodbye");
        let mut c = Cursor::new();

        c.move_to_line_end(&buf, false);
        assert_eq!(c.col(), 4);

        // $ pins to end-of-line through subsequent vertical moves.
        c.move_down(1, &buf, false);
        assert_eq!(c.col(), 1); // end of "hi"
        c.move_down(1, &buf, false);
        assert_eq!(c.col(), 6); // end of "goodbye"
    }

    #[test]
    fn horizontal_movement_resets_sticky() {
        let buf = sample_buffer();
        let mut c = Cursor::at(p(0, 4));
        c.move_left(2, &buf, false);
        assert_eq!(c.sticky_col(), 2);
        c.move_down(1, &buf, false);
        assert_eq!(c.col(), 2);
    }

    #[test]
    fn move_down_stops_at_last_line() {
        let buf = sample_buffer();
        let mut c = Cursor::at(p(3, 0));
        c.move_down(100, &buf, false);
        assert_eq!(c.line(), 4);
    }

    #[test]
    fn move_up_stops_at_first_line() {
        let buf = sample_buffer();
        let mut c = Cursor::at(p(1, 0));
        c.move_up(100, &buf, false);
        assert_eq!(c.line(), 0);
    }

    #[test]
    fn set_line_keeping_col_tracks_sticky() {
        let buf = sample_buffer();
        let mut c = Cursor::at(p(0, 4));
        c.set_line_keeping_col(2, &buf, false);
        assert_eq!(c.position(), p(2, 1)); // "hi" clamps col 4 to 1
        assert_eq!(c.sticky_col(), 4);
    }

    // -- Clamping -----------------------------------------------------------

    #[test]
    fn clamp_after_deletion() {
        let mut buf = Buffer::from_text("hello world");
        let mut c = Cursor::at(p(0, 10));
        buf.delete(Range::new(p(0, 5), p(0, 11))).unwrap();
        c.clamp(&buf, false);
        assert_eq!(c.col(), 4);
    }

    #[test]
    fn clamp_also_clamps_anchor() {
        let mut buf = Buffer::from_text("hello\nworld\nfoo");
        let mut c = Cursor::at(p(2, 2));
        c.set_anchor_at(p(1, 4));
        buf.delete(Range::new(p(0, 5), p(2, 3))).unwrap();
        c.clamp(&buf, false);
        assert_eq!(c.position(), p(0, 2));
        assert_eq!(c.anchor(), Some(p(0, 4)));
    }

    #[test]
    fn clamp_empty_buffer() {
        let buf = Buffer::new();
        let mut c = Cursor::at(p(10, 10));
        c.clamp(&buf, false);
        assert_eq!(c.position(), Position::ZERO);
    }

    // -- Empty buffer behavior ----------------------------------------------

    #[test]
    fn movement_on_empty_buffer() {
        let buf = Buffer::new();
        let mut c = Cursor::new();
        c.move_right(1, &buf, false);
        c.move_down(1, &buf, false);
        c.move_to_line_end(&buf, false);
        assert_eq!(c.position(), Position::ZERO);
    }

    // -- Helpers ------------------------------------------------------------

    #[test]
    fn max_col_by_mode() {
        let buf = sample_buffer();
        assert_eq!(max_col(&buf, 0, false), 4);
        assert_eq!(max_col(&buf, 0, true), 5);
        assert_eq!(max_col(&buf, 3, false), 0);
        assert_eq!(max_col(&buf, 3, true), 0);
    }

    #[test]
    fn first_non_blank_variants() {
        assert_eq!(first_non_blank(&Buffer::from_text("hello"), 0), 0);
        assert_eq!(first_non_blank(&Buffer::from_text("\t\thello"), 0), 2);
        assert_eq!(first_non_blank(&Buffer::from_text("\nhello"), 0), 0);
    }
}
