//! Literal search — `/`, `?`, `n`, `N`.
//!
//! Patterns are literal strings, not regexes. The prompt itself runs
//! through command-line mode; this module only holds the direction type
//! and the wrap-around scan functions the dispatch layer calls.

use vix_core::buffer::Buffer;
use vix_core::position::Position;

/// Search direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchDirection {
    #[default]
    Forward,
    Backward,
}

impl SearchDirection {
    /// The opposite direction, for `N`.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    /// The prompt character (`/` or `?`).
    #[must_use]
    pub const fn prompt(self) -> char {
        match self {
            Self::Forward => '/',
            Self::Backward => '?',
        }
    }
}

/// A match: start position and length in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub start: Position,
    pub len: usize,
}

/// Find the next match at or after `from`, wrapping past the end of the
/// buffer. The character at `from` itself is included; pass `col + 1` to
/// skip the current position.
#[must_use]
pub fn find_forward(buf: &Buffer, pattern: &str, from: Position) -> Option<Match> {
    if pattern.is_empty() || buf.is_empty() {
        return None;
    }
    let pat: Vec<char> = pattern.chars().collect();
    let line_count = buf.line_count();

    for offset in 0..=line_count {
        let line_idx = (from.line + offset) % line_count;
        let start_col = if offset == 0 { from.col } else { 0 };
        let line: Vec<char> = buf.line_text(line_idx)?.chars().collect();
        // On the wrapped-around visit of the starting line, only the part
        // before the cursor remains to be searched; scanning the whole
        // line is harmless and keeps this simple.
        if let Some(col) = scan(&line, &pat, start_col) {
            return Some(Match { start: Position::new(line_idx, col), len: pat.len() });
        }
    }
    None
}

/// Find the nearest match strictly before `from`, wrapping past the start
/// of the buffer.
#[must_use]
pub fn find_backward(buf: &Buffer, pattern: &str, from: Position) -> Option<Match> {
    if pattern.is_empty() || buf.is_empty() {
        return None;
    }
    let pat: Vec<char> = pattern.chars().collect();
    let line_count = buf.line_count();

    for offset in 0..=line_count {
        let line_idx = (from.line + line_count - offset % line_count) % line_count;
        let line: Vec<char> = buf.line_text(line_idx)?.chars().collect();
        let limit = if offset == 0 {
            from.col
        } else {
            line.len() + 1
        };
        if let Some(col) = scan_last_before(&line, &pat, limit) {
            return Some(Match { start: Position::new(line_idx, col), len: pat.len() });
        }
    }
    None
}

/// First occurrence of `pat` in `line` starting at or after `start_col`.
fn scan(line: &[char], pat: &[char], start_col: usize) -> Option<usize> {
    if pat.len() > line.len() {
        return None;
    }
    (start_col..=line.len() - pat.len()).find(|&col| line[col..col + pat.len()] == *pat)
}

/// Last occurrence of `pat` in `line` starting strictly before `limit`.
fn scan_last_before(line: &[char], pat: &[char], limit: usize) -> Option<usize> {
    if pat.len() > line.len() {
        return None;
    }
    (0..=(line.len() - pat.len()).min(limit.saturating_sub(1)))
        .rev()
        .find(|&col| line[col..col + pat.len()] == *pat)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
