//! Operators — edit actions applied to a shape-tagged span.
//!
//! The dispatch layer resolves a motion, text object, or visual selection
//! into a `(Range, Shape)` span, then hands it to the helpers here. Each
//! helper mutates the buffer through its inverse-returning primitives and
//! records those inverses into the open history transaction; committing
//! the transaction is the caller's job.
//!
//! Block spans are carried as their normalized corner positions; the
//! rectangle is re-derived per line and clamped to each line's content.

use vix_core::buffer::{Buffer, EditResult};
use vix_core::history::History;
use vix_core::position::{Position, Range, Shape};

use crate::options::Options;

/// An edit action of the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Delete,
    Change,
    Yank,
    Indent,
    Dedent,
}

impl Operator {
    /// Map an operator key to its action.
    #[must_use]
    pub const fn from_char(ch: char) -> Option<Self> {
        match ch {
            'd' => Some(Self::Delete),
            'c' => Some(Self::Change),
            'y' => Some(Self::Yank),
            '>' => Some(Self::Indent),
            '<' => Some(Self::Dedent),
            _ => None,
        }
    }

    /// The key that, doubled, targets the current line (`dd`, `yy`, ...).
    #[must_use]
    pub const fn key(self) -> char {
        match self {
            Self::Delete => 'd',
            Self::Change => 'c',
            Self::Yank => 'y',
            Self::Indent => '>',
            Self::Dedent => '<',
        }
    }
}

// ---------------------------------------------------------------------------
// Block rectangles
// ---------------------------------------------------------------------------

/// Per-line char ranges of the rectangle between the two corners of a
/// block span. Columns clamp to each line's content; lines shorter than
/// the left edge contribute an empty range at their end.
#[must_use]
pub fn block_segments(buf: &Buffer, corners: Range) -> Vec<Range> {
    let left = corners.start.col.min(corners.end.col);
    // The cursor column is part of the rectangle.
    let right = corners.start.col.max(corners.end.col) + 1;
    let mut segments = Vec::new();
    for line in corners.start.line..=corners.end.line.min(buf.last_line()) {
        let len = buf.line_content_len(line).unwrap_or(0);
        let from = left.min(len);
        let to = right.min(len);
        segments.push(Range::new(Position::new(line, from), Position::new(line, to)));
    }
    segments
}

// ---------------------------------------------------------------------------
// Yank
// ---------------------------------------------------------------------------

/// The text a span covers, as it lands in a register. Linewise text
/// always carries a trailing terminator, even when the span includes the
/// buffer's final unterminated line.
#[must_use]
pub fn yank_text(buf: &Buffer, range: Range, shape: Shape) -> String {
    match shape {
        Shape::Char | Shape::Line => {
            let mut text = buf
                .slice(range)
                .map(|s| s.to_string())
                .unwrap_or_default();
            if shape.is_line() && !text.is_empty() && !text.ends_with('\n') {
                text.push_str(buf.line_ending().as_str());
            }
            text
        }
        Shape::Block => {
            let parts: Vec<String> = block_segments(buf, range)
                .into_iter()
                .map(|seg| {
                    buf.slice(seg).map(|s| s.to_string()).unwrap_or_default()
                })
                .collect();
            parts.join("\n")
        }
    }
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// Delete a span, recording inverses into the open transaction. Returns
/// the position the cursor lands on (pre-clamp).
///
/// # Errors
///
/// Propagates `OutOfBounds` from the buffer; the caller passes spans it
/// built from valid positions, so this indicates a dispatch bug.
pub fn delete_span(
    buf: &mut Buffer,
    history: &mut History,
    range: Range,
    shape: Shape,
) -> EditResult<Position> {
    match shape {
        Shape::Char | Shape::Line => {
            let inverse = buf.delete(range)?;
            history.record(inverse);
        }
        Shape::Block => {
            // Bottom-up so earlier deletions don't shift later segments.
            for seg in block_segments(buf, range).into_iter().rev() {
                let inverse = buf.delete(seg)?;
                history.record(inverse);
            }
        }
    }
    Ok(range.start)
}

// ---------------------------------------------------------------------------
// Indent / dedent
// ---------------------------------------------------------------------------

/// One level of indentation as text, honoring `expandtab`.
#[must_use]
pub fn indent_unit(opts: &Options) -> String {
    if opts.expand_tab {
        " ".repeat(opts.tab_width)
    } else {
        "\t".to_string()
    }
}

/// Shift the lines covered by `range` one level right (`dedent = false`)
/// or left (`dedent = true`). Empty lines are left alone when indenting.
///
/// # Errors
///
/// Propagates `OutOfBounds` from the buffer.
pub fn shift_lines(
    buf: &mut Buffer,
    history: &mut History,
    range: Range,
    opts: &Options,
    dedent: bool,
) -> EditResult<()> {
    let first = range.start.line;
    let last = range
        .end
        .line
        .min(buf.last_line())
        // A linewise range ends at col 0 of the line after the span.
        .saturating_sub(usize::from(range.end.col == 0 && range.end.line > first))
        .max(first);

    for line in first..=last {
        if dedent {
            let width = leading_indent_chars(buf, line, opts.tab_width);
            if width > 0 {
                let seg = Range::new(Position::new(line, 0), Position::new(line, width));
                let inverse = buf.delete(seg)?;
                history.record(inverse);
            }
        } else if buf.line_content_len(line).unwrap_or(0) > 0 {
            let inverse = buf.insert(Position::new(line, 0), &indent_unit(opts))?;
            history.record(inverse);
        }
    }
    Ok(())
}

/// How many leading chars one dedent level removes: a single tab, or up
/// to `tab_width` spaces.
fn leading_indent_chars(buf: &Buffer, line: usize, tab_width: usize) -> usize {
    let Some(text) = buf.line_text(line) else { return 0 };
    let mut chars = text.chars();
    match chars.next() {
        Some('\t') => 1,
        Some(' ') => {
            1 + chars.take(tab_width.saturating_sub(1)).take_while(|&c| c == ' ').count()
        }
        _ => 0,
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

    #[test]
    fn from_char_roundtrip() {
        for op in [Operator::Delete, Operator::Change, Operator::Yank, Operator::Indent, Operator::Dedent] {
            assert_eq!(Operator::from_char(op.key()), Some(op));
        }
        assert_eq!(Operator::from_char('x'), None);
    }

    // -- yank_text ----------------------------------------------------------

    #[test]
    fn charwise_yank_is_verbatim() {
        let buf = Buffer::from_text("hello world");
        let text = yank_text(&buf, Range::new(p(0, 0), p(0, 5)), Shape::Char);
        assert_eq!(text, "hello");
    }

    #[test]
    fn linewise_yank_appends_missing_terminator() {
        let buf = Buffer::from_text("abc\ndef");
        let text = yank_text(&buf, buf.line_range(0, 1), Shape::Line);
        assert_eq!(text, "abc\ndef\n");
    }

    #[test]
    fn block_yank_joins_segments() {
        let buf = Buffer::from_text("abcd\nefgh\nijkl");
        let corners = Range::new(p(0, 1), p(2, 2));
        assert_eq!(yank_text(&buf, corners, Shape::Block), "bc\nfg\njk");
    }

    #[test]
    fn block_segments_clamp_to_short_lines() {
        let buf = Buffer::from_text("abcdef\nab\nabcdef");
        let segs = block_segments(&buf, Range::new(p(0, 3), p(2, 4)));
        assert_eq!(segs[0], Range::new(p(0, 3), p(0, 5)));
        assert_eq!(segs[1], Range::new(p(1, 2), p(1, 2))); // empty
        assert_eq!(segs[2], Range::new(p(2, 3), p(2, 5)));
    }

    // -- delete_span --------------------------------------------------------

    #[test]
    fn block_delete_removes_rectangle() {
        let mut buf = Buffer::from_text("abcd\nefgh\nijkl");
        let mut h = History::new();
        h.begin(p(0, 1));
        delete_span(&mut buf, &mut h, Range::new(p(0, 1), p(2, 2)), Shape::Block).unwrap();
        h.commit(p(0, 1));
        assert_eq!(buf.contents(), "ad\neh\nil");

        h.undo(&mut buf).unwrap();
        assert_eq!(buf.contents(), "abcd\nefgh\nijkl");
    }

    // -- shift_lines --------------------------------------------------------

    #[test]
    fn indent_inserts_tab_by_default() {
        let mut buf = Buffer::from_text("a\nb");
        let mut h = History::new();
        h.begin(p(0, 0));
        let range = buf.line_range(0, 1);
        shift_lines(&mut buf, &mut h, range, &Options::default(), false).unwrap();
        h.commit(p(0, 0));
        assert_eq!(buf.contents(), "\ta\n\tb");
    }

    #[test]
    fn indent_with_expandtab_uses_spaces_and_skips_empty() {
        let mut buf = Buffer::from_text("a\n\nb");
        let mut h = History::new();
        let opts = Options { expand_tab: true, tab_width: 2, ..Options::default() };
        h.begin(p(0, 0));
        let range = buf.line_range(0, 2);
        shift_lines(&mut buf, &mut h, range, &opts, false).unwrap();
        h.commit(p(0, 0));
        assert_eq!(buf.contents(), "  a\n\n  b");
    }

    #[test]
    fn dedent_removes_tab_or_space_run() {
        let mut buf = Buffer::from_text("\ta\n        b\nc");
        let mut h = History::new();
        let opts = Options { tab_width: 4, ..Options::default() };
        h.begin(p(0, 0));
        let range = buf.line_range(0, 2);
        shift_lines(&mut buf, &mut h, range, &opts, true).unwrap();
        h.commit(p(0, 0));
        assert_eq!(buf.contents(), "a\n    b\nc");
    }
}
