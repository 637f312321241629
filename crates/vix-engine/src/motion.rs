//! Motions — pure value types mapping a start position and a count to a
//! target.
//!
//! A [`Motion`] evaluates against the buffer to a [`Target`]: the landing
//! position for a bare cursor move, plus the shape-tagged range an
//! operator over the same motion would consume. Evaluation never errors;
//! targets clamp at buffer bounds. `None` means the motion found nothing
//! at all (a failed char find) — an operator given such a motion is a
//! no-op.
//!
//! Inclusivity and shape are baked into the returned range here rather
//! than flagged for the caller:
//!
//! | Motion                     | Operator range                     |
//! |----------------------------|------------------------------------|
//! | `h l 0 ^ w b { }` `F` `T`  | charwise exclusive                 |
//! | `e $ f t g$`               | charwise inclusive                 |
//! | `j k gg G {count}G`        | linewise                           |
//!
//! One Vim quirk is preserved: `w` under an operator stops at the end of
//! the line instead of spilling onto the next one, so `dw` on the last
//! word never joins lines.

use vix_core::buffer::Buffer;
use vix_core::position::{Position, Range, Shape};
use vix_core::word::{self, WordScope};

use crate::display;
use crate::options::Options;

// ---------------------------------------------------------------------------
// Char finds
// ---------------------------------------------------------------------------

/// The four single-line char-find motions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Find {
    /// `f` — onto the next occurrence.
    Forward,
    /// `F` — onto the previous occurrence.
    Backward,
    /// `t` — just before the next occurrence.
    TillForward,
    /// `T` — just after the previous occurrence.
    TillBackward,
}

impl Find {
    /// The mirrored find, for `,`.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
            Self::TillForward => Self::TillBackward,
            Self::TillBackward => Self::TillForward,
        }
    }

    /// Map the trigger key to a find kind.
    #[must_use]
    pub const fn from_char(ch: char) -> Option<Self> {
        match ch {
            'f' => Some(Self::Forward),
            'F' => Some(Self::Backward),
            't' => Some(Self::TillForward),
            'T' => Some(Self::TillBackward),
            _ => None,
        }
    }

    const fn is_forward(self) -> bool {
        matches!(self, Self::Forward | Self::TillForward)
    }
}

// ---------------------------------------------------------------------------
// Motion
// ---------------------------------------------------------------------------

/// A motion of the command grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    /// `0`
    LineStart,
    /// `^`
    FirstNonBlank,
    /// `$`
    LineEnd,
    /// `w` / `W`
    WordForward(WordScope),
    /// `b` / `B`
    WordBackward(WordScope),
    /// `e` / `E`
    WordEnd(WordScope),
    /// `}`
    ParagraphForward,
    /// `{`
    ParagraphBackward,
    /// `gg`
    FirstLine,
    /// `G`
    LastLine,
    /// `{count}G` / `{count}gg` — absolute 0-indexed line.
    Line(usize),
    /// `f F t T` with their argument char.
    CharFind(Find, char),
    /// `g$` — end of the screen line under `wrapcolumn`.
    ScreenLineEnd,
}

impl Motion {
    /// Map a single grammar key to a motion. Multi-key motions (`g`
    /// prefixes, char finds awaiting their argument) are assembled by the
    /// dispatch layer, not here.
    #[must_use]
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            'h' => Some(Self::Left),
            'l' => Some(Self::Right),
            'k' => Some(Self::Up),
            'j' => Some(Self::Down),
            '0' => Some(Self::LineStart),
            '^' => Some(Self::FirstNonBlank),
            '$' => Some(Self::LineEnd),
            'w' => Some(Self::WordForward(WordScope::Small)),
            'W' => Some(Self::WordForward(WordScope::Big)),
            'b' => Some(Self::WordBackward(WordScope::Small)),
            'B' => Some(Self::WordBackward(WordScope::Big)),
            'e' => Some(Self::WordEnd(WordScope::Small)),
            'E' => Some(Self::WordEnd(WordScope::Big)),
            '}' => Some(Self::ParagraphForward),
            '{' => Some(Self::ParagraphBackward),
            'G' => Some(Self::LastLine),
            _ => None,
        }
    }

    /// Vertical motions preserve the cursor's sticky column.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(
            self,
            Self::Up | Self::Down | Self::FirstLine | Self::LastLine | Self::Line(_)
        )
    }
}

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

/// The result of evaluating a motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    /// Where a bare motion puts the cursor. May sit one past the last
    /// character; the dispatch layer clamps per mode.
    pub pos: Position,

    /// The span an operator over this motion consumes. Normalized, with
    /// inclusivity already applied; `Line` shape ranges cover whole lines
    /// including terminators.
    pub range: Range,

    /// `Char` or `Line`. Motions never produce blocks; only block-visual
    /// selections do.
    pub shape: Shape,
}

fn content_len(buf: &Buffer, line: usize) -> usize {
    buf.line_content_len(line).unwrap_or(0)
}

/// Charwise-exclusive target between two positions on known lines.
fn charwise(from: Position, to: Position) -> Target {
    Target { pos: to, range: Range::ordered(from, to), shape: Shape::Char }
}

/// Charwise-inclusive target: the range end steps one char past `to`.
fn charwise_inclusive(buf: &Buffer, from: Position, to: Position) -> Target {
    let end = buf
        .pos_to_char_idx(to)
        .and_then(|idx| buf.char_idx_to_pos(idx + 1))
        .unwrap_or(to);
    Target { pos: to, range: Range::ordered(from, end.max(from)), shape: Shape::Char }
}

/// Linewise target covering the lines from `from` to `line`.
fn linewise(buf: &Buffer, from: Position, line: usize, col: usize) -> Target {
    let line = line.min(buf.last_line());
    let range = buf.line_range(from.line.min(line), from.line.max(line));
    Target { pos: Position::new(line, col), range, shape: Shape::Line }
}

/// Evaluate a motion from `from`, repeated `count` times.
///
/// `op_pending` marks evaluation on behalf of an operator, which changes
/// the `w` end-of-line clamp described in the module docs. Returns `None`
/// only when the motion cannot name a target at all.
#[must_use]
pub fn evaluate(
    motion: Motion,
    buf: &Buffer,
    from: Position,
    count: usize,
    opts: &Options,
    op_pending: bool,
) -> Option<Target> {
    let count = count.max(1);
    match motion {
        Motion::Left => {
            let to = from.with_col(from.col.saturating_sub(count));
            Some(charwise(to, from))
        }
        Motion::Right => {
            let limit = content_len(buf, from.line);
            let end_col = from.col.saturating_add(count).min(limit);
            let to = from.with_col(end_col);
            // Bare `l` stays on the last character; the exclusive range
            // still reaches one past it so `dl` takes that character.
            Some(Target {
                pos: from.with_col(end_col.min(limit.saturating_sub(1))),
                range: Range::ordered(from, to),
                shape: Shape::Char,
            })
        }
        Motion::Up => {
            let line = from.line.saturating_sub(count);
            Some(linewise(buf, from, line, from.col))
        }
        Motion::Down => {
            let line = from.line.saturating_add(count);
            Some(linewise(buf, from, line, from.col))
        }
        Motion::LineStart => Some(charwise(from.with_col(0), from)),
        Motion::FirstNonBlank => {
            let col = vix_core::cursor::first_non_blank(buf, from.line);
            let to = from.with_col(col);
            Some(if col < from.col { charwise(to, from) } else { charwise(from, to) })
        }
        Motion::LineEnd => {
            // {count}$ reaches the end of the (count-1)-th line below.
            let line = from.line.saturating_add(count - 1).min(buf.last_line());
            let len = content_len(buf, line);
            let to = Position::new(line, len.saturating_sub(1));
            Some(Target {
                pos: to,
                range: Range::ordered(from, Position::new(line, len)),
                shape: Shape::Char,
            })
        }
        Motion::WordForward(scope) => {
            let mut to = from;
            for _ in 0..count {
                to = word::next_start(buf, to, scope);
            }
            // Under an operator, stop at the end of the starting line
            // rather than consuming its terminator.
            if op_pending && to.line > from.line {
                let clamp = Position::new(from.line, content_len(buf, from.line));
                if clamp > from {
                    to = clamp;
                }
            }
            Some(charwise(from, to))
        }
        Motion::WordBackward(scope) => {
            let mut to = from;
            for _ in 0..count {
                to = word::prev_start(buf, to, scope);
            }
            Some(charwise(to, from))
        }
        Motion::WordEnd(scope) => {
            let mut to = from;
            for _ in 0..count {
                to = word::next_end(buf, to, scope);
            }
            Some(charwise_inclusive(buf, from, to))
        }
        Motion::ParagraphForward => {
            let mut line = from.line;
            for _ in 0..count {
                line = next_paragraph_boundary(buf, line);
            }
            let to = Position::new(line, 0);
            Some(charwise(from, to))
        }
        Motion::ParagraphBackward => {
            let mut line = from.line;
            for _ in 0..count {
                line = prev_paragraph_boundary(buf, line);
            }
            let to = Position::new(line, 0);
            Some(charwise(to, from))
        }
        Motion::FirstLine => {
            let col = vix_core::cursor::first_non_blank(buf, 0);
            Some(linewise(buf, from, 0, col))
        }
        Motion::LastLine => {
            let line = buf.last_line();
            let col = vix_core::cursor::first_non_blank(buf, line);
            Some(linewise(buf, from, line, col))
        }
        Motion::Line(line) => {
            let line = line.min(buf.last_line());
            let col = vix_core::cursor::first_non_blank(buf, line);
            Some(linewise(buf, from, line, col))
        }
        Motion::CharFind(find, ch) => {
            let to = find_on_line(buf, from, find, ch, count)?;
            Some(charwise_inclusive_for_find(buf, from, to, find))
        }
        Motion::ScreenLineEnd => {
            let line_text = buf.line_text(from.line).unwrap_or_default();
            let col = match opts.wrap_at_column {
                Some(wrap) if wrap > 0 => {
                    let at = display::display_col(&line_text, from.col, opts.tab_width);
                    let target = (at / wrap + 1) * wrap - 1;
                    display::col_at_display(&line_text, target, opts.tab_width)
                        .min(content_len(buf, from.line).saturating_sub(1))
                }
                _ => content_len(buf, from.line).saturating_sub(1),
            };
            let to = from.with_col(col);
            Some(charwise_inclusive(buf, from, to))
        }
    }
}

/// `f`/`t` take the found character; `t` already stopped short of it.
fn charwise_inclusive_for_find(buf: &Buffer, from: Position, to: Position, find: Find) -> Target {
    match find {
        Find::Forward | Find::TillForward => charwise_inclusive(buf, from, to),
        Find::Backward | Find::TillBackward => charwise(to, from),
    }
}

// ---------------------------------------------------------------------------
// Char-find scanning
// ---------------------------------------------------------------------------

/// Resolve an `f F t T` target on the cursor's line. The cursor's own
/// column is excluded from the scan; `None` when the line has no
/// `count`-th occurrence in the given direction.
#[must_use]
pub fn find_on_line(
    buf: &Buffer,
    from: Position,
    find: Find,
    ch: char,
    count: usize,
) -> Option<Position> {
    let count = count.max(1);
    let line: Vec<char> = buf.line_text(from.line)?.chars().collect();

    let col = if find.is_forward() {
        let mut hits = 0;
        let mut found = None;
        for (i, &c) in line.iter().enumerate().skip(from.col + 1) {
            if c == ch {
                hits += 1;
                if hits == count {
                    found = Some(i);
                    break;
                }
            }
        }
        let i = found?;
        match find {
            Find::TillForward => i.checked_sub(1)?,
            _ => i,
        }
    } else {
        let mut hits = 0;
        let mut found = None;
        for i in (0..from.col.min(line.len())).rev() {
            if line[i] == ch {
                hits += 1;
                if hits == count {
                    found = Some(i);
                    break;
                }
            }
        }
        let i = found?;
        match find {
            Find::TillBackward => {
                let col = i + 1;
                if col >= from.col { return None; }
                col
            }
            _ => i,
        }
    };
    Some(from.with_col(col))
}

// ---------------------------------------------------------------------------
// Paragraph boundaries
// ---------------------------------------------------------------------------

/// Line of the next paragraph boundary: the first empty line after the
/// current block, or the last line when none follows.
fn next_paragraph_boundary(buf: &Buffer, from: usize) -> usize {
    let last = buf.last_line();
    let mut line = from;
    // Leave a run of empty lines before scanning for the next one.
    while line < last && content_len(buf, line) == 0 {
        line += 1;
    }
    while line < last {
        line += 1;
        if content_len(buf, line) == 0 {
            return line;
        }
    }
    last
}

/// Line of the previous paragraph boundary, mirroring
/// [`next_paragraph_boundary`].
fn prev_paragraph_boundary(buf: &Buffer, from: usize) -> usize {
    let mut line = from;
    while line > 0 && content_len(buf, line) == 0 {
        line -= 1;
    }
    while line > 0 {
        line -= 1;
        if content_len(buf, line) == 0 {
            return line;
        }
    }
    0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
