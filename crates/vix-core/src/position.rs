//! Buffer coordinates — positions, ranges, and range shapes.
//!
//! All coordinates are **0-indexed** and columns count Unicode scalar values
//! (chars), never bytes. This is the indexing `ropey` speaks natively, so
//! conversion to rope indices stays O(log n) and byte offsets never leak
//! into the public API.
//!
//! A position's column may equal the line's content length: that is the
//! caret slot *after* the last character, legal as an exclusive range
//! endpoint and as an insert-mode cursor, but not as a normal-mode cursor.

use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A `(line, col)` pair into a buffer, both 0-indexed.
///
/// Ordered lexicographically — line first, then column — so positions sort
/// in document order.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    /// Line 0, column 0.
    pub const ZERO: Self = Self { line: 0, col: 0 };

    #[inline]
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    /// The same line with a different column.
    #[inline]
    #[must_use]
    pub const fn with_col(self, col: usize) -> Self {
        Self { line: self.line, col }
    }
}

impl Ord for Position {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.line.cmp(&other.line).then(self.col.cmp(&other.col))
    }
}

impl PartialOrd for Position {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.line, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-indexed for humans, matching the editor status-line convention.
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

// ---------------------------------------------------------------------------
// Shape
// ---------------------------------------------------------------------------

/// How a range (and the register content cut from it) is classified.
///
/// The shape decides how operators expand a span and how paste re-inserts
/// it:
///
/// - `Char` — a literal character span; paste inserts inline.
/// - `Line` — whole lines including terminators; paste opens new lines.
/// - `Block` — a rectangle of columns across lines; paste writes one
///   fragment per line at the cursor column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Shape {
    #[default]
    Char,
    Line,
    Block,
}

impl Shape {
    /// True for line-wise spans.
    #[inline]
    #[must_use]
    pub const fn is_line(self) -> bool {
        matches!(self, Self::Line)
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// A normalized half-open span `[start, end)` in a buffer.
///
/// `start <= end` always holds — construct with [`Range::new`] when the
/// order is known, or [`Range::ordered`] for anchor/cursor pairs that may
/// run backwards. An empty range (`start == end`) is a caret.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// A range whose order is already known. Debug-asserts `start <= end`.
    #[inline]
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.line < end.line || (start.line == end.line && start.col <= end.col),
            "Range::new requires start <= end"
        );
        Self { start, end }
    }

    /// Build a range from two arbitrary positions, swapping if needed.
    #[inline]
    #[must_use]
    pub fn ordered(a: Position, b: Position) -> Self {
        if a <= b { Self { start: a, end: b } } else { Self { start: b, end: a } }
    }

    /// A zero-width range (caret) at `pos`.
    #[inline]
    #[must_use]
    pub const fn caret(pos: Position) -> Self {
        Self { start: pos, end: pos }
    }

    /// True when the range spans zero characters.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start.line == self.end.line && self.start.col == self.end.col
    }

    /// True when `pos` falls within `[start, end)`.
    #[inline]
    #[must_use]
    pub fn contains(self, pos: Position) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Number of lines the range touches (an empty range sits on one line).
    #[inline]
    #[must_use]
    pub const fn line_span(self) -> usize {
        self.end.line - self.start.line + 1
    }
}

impl fmt::Debug for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Range({}:{} .. {}:{})",
            self.start.line, self.start.col, self.end.line, self.end.col
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Position -----------------------------------------------------------

    #[test]
    fn position_orders_by_line_then_col() {
        assert!(Position::new(0, 99) < Position::new(1, 0));
        assert!(Position::new(2, 3) < Position::new(2, 4));
        assert_eq!(Position::new(5, 5), Position::new(5, 5));
    }

    #[test]
    fn position_with_col() {
        let p = Position::new(4, 2).with_col(9);
        assert_eq!(p, Position::new(4, 9));
    }

    #[test]
    fn position_default_is_zero() {
        assert_eq!(Position::default(), Position::ZERO);
    }

    #[test]
    fn position_display_is_1_indexed() {
        assert_eq!(format!("{}", Position::new(0, 0)), "1:1");
        assert_eq!(format!("{}", Position::new(9, 14)), "10:15");
    }

    // -- Range --------------------------------------------------------------

    #[test]
    fn ordered_swaps_backward_pair() {
        let r = Range::ordered(Position::new(3, 0), Position::new(1, 7));
        assert_eq!(r.start, Position::new(1, 7));
        assert_eq!(r.end, Position::new(3, 0));
    }

    #[test]
    fn caret_is_empty() {
        let r = Range::caret(Position::new(2, 2));
        assert!(r.is_empty());
        assert!(!r.contains(Position::new(2, 2)));
    }

    #[test]
    fn contains_is_half_open() {
        let r = Range::new(Position::new(1, 2), Position::new(1, 5));
        assert!(r.contains(Position::new(1, 2)));
        assert!(r.contains(Position::new(1, 4)));
        assert!(!r.contains(Position::new(1, 5)));
    }

    #[test]
    fn contains_multiline() {
        let r = Range::new(Position::new(1, 3), Position::new(3, 1));
        assert!(r.contains(Position::new(2, 100)));
        assert!(!r.contains(Position::new(0, 0)));
        assert!(!r.contains(Position::new(3, 1)));
    }

    #[test]
    fn line_span_counts_touched_lines() {
        assert_eq!(Range::caret(Position::ZERO).line_span(), 1);
        let r = Range::new(Position::new(1, 0), Position::new(4, 0));
        assert_eq!(r.line_span(), 4);
    }

    // -- Shape --------------------------------------------------------------

    #[test]
    fn shape_default_is_char() {
        assert_eq!(Shape::default(), Shape::Char);
        assert!(!Shape::Char.is_line());
        assert!(Shape::Line.is_line());
        assert!(!Shape::Block.is_line());
    }
}
