//! Display-column arithmetic — tabs and wide characters.
//!
//! Char columns (what `Position.col` counts) and display columns (what a
//! monospace surface shows) diverge on tabs and East Asian wide
//! characters. The screen-line motion `g$` works in display columns, so
//! it needs the conversions here. Tabs advance to the next multiple of
//! `tab_width`; everything else uses its Unicode width (zero-width
//! characters count 0, wide characters 2).

use unicode_width::UnicodeWidthChar;

/// Display width of `ch` when it starts at display column `at`.
#[must_use]
pub fn char_width(ch: char, at: usize, tab_width: usize) -> usize {
    if ch == '\t' {
        tab_width.max(1) - (at % tab_width.max(1))
    } else {
        UnicodeWidthChar::width(ch).unwrap_or(0)
    }
}

/// Display column where the character at char offset `col` starts.
#[must_use]
pub fn display_col(line: &str, col: usize, tab_width: usize) -> usize {
    let mut width = 0;
    for ch in line.chars().take(col) {
        width += char_width(ch, width, tab_width);
    }
    width
}

/// Char offset of the last character starting at or before display column
/// `target`. Returns the line's char count when every character starts
/// before the target.
#[must_use]
pub fn col_at_display(line: &str, target: usize, tab_width: usize) -> usize {
    let mut width = 0;
    for (i, ch) in line.chars().enumerate() {
        let next = width + char_width(ch, width, tab_width);
        if next > target {
            return i;
        }
        width = next;
    }
    line.chars().count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_ascii_is_identity() {
        assert_eq!(display_col("hello", 3, 4), 3);
        assert_eq!(col_at_display("hello", 3, 4), 3);
    }

    #[test]
    fn tab_advances_to_next_stop() {
        // "a\tb": tab at display col 1 fills to col 4.
        assert_eq!(display_col("a\tb", 2, 4), 4);
        assert_eq!(char_width('\t', 0, 4), 4);
        assert_eq!(char_width('\t', 3, 4), 1);
    }

    #[test]
    fn wide_chars_take_two_columns() {
        assert_eq!(display_col("你好x", 2, 4), 4);
        assert_eq!(col_at_display("你好x", 4, 4), 2);
        // Display col 3 lands inside 好, which starts at col 2.
        assert_eq!(col_at_display("你好x", 3, 4), 1);
    }

    #[test]
    fn target_past_line_end_returns_char_count() {
        assert_eq!(col_at_display("ab", 99, 4), 2);
    }
}
