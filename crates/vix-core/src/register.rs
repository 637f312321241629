//! Registers — storage for yanked and deleted text.
//!
//! Registers are the editor's clipboard system. Every yank and delete
//! copies text into a register; paste retrieves it. Each slot remembers the
//! [`Shape`] the text was captured with, because paste behaves differently
//! for each:
//!
//! - **Char-wise**: paste inserts inline at the cursor.
//! - **Line-wise**: paste opens whole lines below or above the cursor line.
//! - **Block-wise**: paste writes one fragment per line at the cursor
//!   column.
//!
//! ## Register names
//!
//! - **Unnamed (`""`)**: the default. Every yank and delete writes here,
//!   even when targeting another register.
//! - **Named (`"a`–`"z`)**: 26 user-selectable slots. Lowercase overwrites;
//!   uppercase (`"A`–`"Z`) appends to the corresponding lowercase slot.
//! - **Numbered (`"0`–`"9`)**: history slots. `"0` holds the most recent
//!   unnamed yank. `"1` holds the most recent line-wise delete, with older
//!   ones shifting down through `"9` and falling off the end.

use crate::position::Shape;

// ---------------------------------------------------------------------------
// Register
// ---------------------------------------------------------------------------

/// A single register slot — text plus the shape it was captured with.
#[derive(Debug, Clone)]
pub struct Register {
    /// The stored text. Empty when nothing has been captured yet.
    content: String,

    /// Capture shape. Defaults to `Char` when empty (paste is a no-op on
    /// empty content, so the value doesn't matter then).
    shape: Shape,
}

impl Register {
    /// Create an empty register.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            content: String::new(),
            shape: Shape::Char,
        }
    }

    /// Store text, replacing any previous content.
    pub fn store(&mut self, text: String, shape: Shape) {
        self.content = text;
        self.shape = shape;
    }

    /// Append text (for uppercase register names).
    ///
    /// If either the existing content or the appended text is line-wise,
    /// the slot becomes line-wise and a newline separator is inserted.
    /// Otherwise the existing shape is kept.
    pub fn append(&mut self, text: &str, shape: Shape) {
        if shape.is_line() || self.shape.is_line() {
            if !self.content.is_empty() && !self.content.ends_with('\n') {
                self.content.push('\n');
            }
            self.content.push_str(text);
            self.shape = Shape::Line;
        } else {
            if self.content.is_empty() {
                self.shape = shape;
            }
            self.content.push_str(text);
        }
    }

    /// The stored text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The shape the text was captured with.
    #[must_use]
    pub const fn shape(&self) -> Shape {
        self.shape
    }

    /// True if the register holds nothing to paste.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl Default for Register {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// RegisterFile
// ---------------------------------------------------------------------------

/// The complete register file: unnamed + named a–z + numbered 0–9.
///
/// Writes go through [`store_yank`](Self::store_yank) and
/// [`store_delete`](Self::store_delete), which implement the routing rules;
/// reads go through [`get`](Self::get) with the same name the user typed.
pub struct RegisterFile {
    /// The unnamed register — receives every yank and delete.
    unnamed: Register,

    /// Named registers a–z. Indexed by `ch as u8 - b'a'`.
    named: [Register; 26],

    /// Numbered registers 0–9. Slot 0 is the yank slot; 1–9 form the
    /// line-wise delete ring.
    numbered: [Register; 10],
}

impl RegisterFile {
    /// Create a register file with every slot empty.
    #[must_use]
    pub fn new() -> Self {
        Self {
            unnamed: Register::new(),
            named: std::array::from_fn(|_| Register::new()),
            numbered: std::array::from_fn(|_| Register::new()),
        }
    }

    /// Record a yank.
    ///
    /// - `name == None` → unnamed and `"0`.
    /// - `name == Some('a'..='z')` → overwrite named, mirror to unnamed.
    /// - `name == Some('A'..='Z')` → append to named, mirror the appended
    ///   result to unnamed.
    /// - `name == Some('0'..='9')` → that numbered slot and unnamed.
    ///
    /// Any other name falls back to unnamed-only.
    pub fn store_yank(&mut self, name: Option<char>, text: String, shape: Shape) {
        match name {
            None => {
                self.numbered[0].store(text.clone(), shape);
                self.unnamed.store(text, shape);
            }
            Some(ch) => self.store_named(ch, text, shape),
        }
    }

    /// Record a delete (or change).
    ///
    /// - `name == None` → unnamed; line-wise deletes additionally shift the
    ///   `"1`–`"9` ring down and land in `"1`.
    /// - Named and numbered targets route exactly as in
    ///   [`store_yank`](Self::store_yank), without touching the ring.
    pub fn store_delete(&mut self, name: Option<char>, text: String, shape: Shape) {
        match name {
            None => {
                if shape.is_line() {
                    self.shift_ring();
                    self.numbered[1].store(text.clone(), shape);
                }
                self.unnamed.store(text, shape);
            }
            Some(ch) => self.store_named(ch, text, shape),
        }
    }

    /// Get the register to read from.
    ///
    /// - `None` → unnamed.
    /// - `Some('a'..='z')` → named slot; uppercase reads the same slot.
    /// - `Some('0'..='9')` → numbered slot.
    ///
    /// Any other name falls back to unnamed.
    #[must_use]
    pub const fn get(&self, name: Option<char>) -> &Register {
        match name {
            Some(ch) if ch.is_ascii_lowercase() => &self.named[(ch as u8 - b'a') as usize],
            Some(ch) if ch.is_ascii_uppercase() => &self.named[(ch as u8 - b'A') as usize],
            Some(ch) if ch.is_ascii_digit() => &self.numbered[(ch as u8 - b'0') as usize],
            _ => &self.unnamed,
        }
    }

    fn store_named(&mut self, ch: char, text: String, shape: Shape) {
        match ch {
            'a'..='z' => {
                let idx = (ch as u8 - b'a') as usize;
                self.named[idx].store(text.clone(), shape);
                self.unnamed.store(text, shape);
            }
            'A'..='Z' => {
                let idx = (ch as u8 - b'A') as usize;
                self.named[idx].append(&text, shape);
                // Unnamed mirrors the full appended content.
                let full = self.named[idx].content().to_string();
                let full_shape = self.named[idx].shape();
                self.unnamed.store(full, full_shape);
            }
            '0'..='9' => {
                let idx = (ch as u8 - b'0') as usize;
                self.numbered[idx].store(text.clone(), shape);
                self.unnamed.store(text, shape);
            }
            _ => self.unnamed.store(text, shape),
        }
    }

    /// Shift the delete ring: `"9` ← `"8` ← ... ← `"2` ← `"1`.
    fn shift_ring(&mut self) {
        for i in (2..=9).rev() {
            self.numbered[i] = self.numbered[i - 1].clone();
        }
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Register slot ------------------------------------------------------

    #[test]
    fn new_register_is_empty_char() {
        let reg = Register::new();
        assert!(reg.is_empty());
        assert_eq!(reg.content(), "");
        assert_eq!(reg.shape(), Shape::Char);
    }

    #[test]
    fn store_replaces_content_and_shape() {
        let mut reg = Register::new();
        reg.store("first".into(), Shape::Char);
        reg.store("second\n".into(), Shape::Line);
        assert_eq!(reg.content(), "second\n");
        assert_eq!(reg.shape(), Shape::Line);
    }

    #[test]
    fn store_block_shape() {
        let mut reg = Register::new();
        reg.store("ab\ncd".into(), Shape::Block);
        assert_eq!(reg.shape(), Shape::Block);
    }

    #[test]
    fn append_char_to_char() {
        let mut reg = Register::new();
        reg.store("foo".into(), Shape::Char);
        reg.append("bar", Shape::Char);
        assert_eq!(reg.content(), "foobar");
        assert_eq!(reg.shape(), Shape::Char);
    }

    #[test]
    fn append_line_upgrades_shape() {
        let mut reg = Register::new();
        reg.store("first".into(), Shape::Char);
        reg.append("second\n", Shape::Line);
        assert_eq!(reg.content(), "first\nsecond\n");
        assert_eq!(reg.shape(), Shape::Line);
    }

    #[test]
    fn append_char_to_line_stays_line() {
        let mut reg = Register::new();
        reg.store("first\n".into(), Shape::Line);
        reg.append("second", Shape::Char);
        assert_eq!(reg.content(), "first\nsecond");
        assert_eq!(reg.shape(), Shape::Line);
    }

    #[test]
    fn append_to_empty_takes_new_shape() {
        let mut reg = Register::new();
        reg.append("ab\ncd", Shape::Block);
        assert_eq!(reg.shape(), Shape::Block);
    }

    // -- Yank routing -------------------------------------------------------

    #[test]
    fn unnamed_yank_fills_register_zero() {
        let mut rf = RegisterFile::new();
        rf.store_yank(None, "hello".into(), Shape::Char);
        assert_eq!(rf.get(None).content(), "hello");
        assert_eq!(rf.get(Some('0')).content(), "hello");
    }

    #[test]
    fn named_yank_writes_named_and_unnamed() {
        let mut rf = RegisterFile::new();
        rf.store_yank(Some('a'), "world\n".into(), Shape::Line);
        assert_eq!(rf.get(Some('a')).content(), "world\n");
        assert_eq!(rf.get(Some('a')).shape(), Shape::Line);
        assert_eq!(rf.get(None).content(), "world\n");
        // Register 0 is reserved for unnamed yanks.
        assert!(rf.get(Some('0')).is_empty());
    }

    #[test]
    fn uppercase_yank_appends() {
        let mut rf = RegisterFile::new();
        rf.store_yank(Some('a'), "hello".into(), Shape::Char);
        rf.store_yank(Some('A'), " world".into(), Shape::Char);
        assert_eq!(rf.get(Some('a')).content(), "hello world");
        // Unnamed mirrors the appended result.
        assert_eq!(rf.get(None).content(), "hello world");
    }

    #[test]
    fn uppercase_append_to_empty() {
        let mut rf = RegisterFile::new();
        rf.store_yank(Some('A'), "first".into(), Shape::Char);
        assert_eq!(rf.get(Some('a')).content(), "first");
    }

    #[test]
    fn uppercase_read_is_lowercase() {
        let mut rf = RegisterFile::new();
        rf.store_yank(Some('z'), "data".into(), Shape::Char);
        assert_eq!(rf.get(Some('Z')).content(), "data");
    }

    #[test]
    fn named_registers_are_isolated() {
        let mut rf = RegisterFile::new();
        rf.store_yank(Some('a'), "alpha".into(), Shape::Char);
        rf.store_yank(Some('b'), "bravo".into(), Shape::Char);
        assert_eq!(rf.get(Some('a')).content(), "alpha");
        assert_eq!(rf.get(Some('b')).content(), "bravo");
        assert_eq!(rf.get(None).content(), "bravo");
    }

    // -- Delete routing -----------------------------------------------------

    #[test]
    fn charwise_delete_goes_to_unnamed_only() {
        let mut rf = RegisterFile::new();
        rf.store_delete(None, "x".into(), Shape::Char);
        assert_eq!(rf.get(None).content(), "x");
        assert!(rf.get(Some('1')).is_empty());
    }

    #[test]
    fn linewise_delete_fills_register_one() {
        let mut rf = RegisterFile::new();
        rf.store_delete(None, "gone\n".into(), Shape::Line);
        assert_eq!(rf.get(None).content(), "gone\n");
        assert_eq!(rf.get(Some('1')).content(), "gone\n");
        assert_eq!(rf.get(Some('1')).shape(), Shape::Line);
    }

    #[test]
    fn delete_ring_shifts_down() {
        let mut rf = RegisterFile::new();
        rf.store_delete(None, "oldest\n".into(), Shape::Line);
        rf.store_delete(None, "middle\n".into(), Shape::Line);
        rf.store_delete(None, "newest\n".into(), Shape::Line);
        assert_eq!(rf.get(Some('1')).content(), "newest\n");
        assert_eq!(rf.get(Some('2')).content(), "middle\n");
        assert_eq!(rf.get(Some('3')).content(), "oldest\n");
    }

    #[test]
    fn delete_ring_drops_off_the_end() {
        let mut rf = RegisterFile::new();
        for i in 0..12 {
            rf.store_delete(None, format!("line {i}\n"), Shape::Line);
        }
        assert_eq!(rf.get(Some('1')).content(), "line 11\n");
        assert_eq!(rf.get(Some('9')).content(), "line 3\n");
    }

    #[test]
    fn delete_does_not_touch_register_zero() {
        let mut rf = RegisterFile::new();
        rf.store_yank(None, "yanked".into(), Shape::Char);
        rf.store_delete(None, "deleted\n".into(), Shape::Line);
        // The yank survives in "0 while unnamed now holds the delete.
        assert_eq!(rf.get(Some('0')).content(), "yanked");
        assert_eq!(rf.get(None).content(), "deleted\n");
    }

    #[test]
    fn named_delete_skips_the_ring() {
        let mut rf = RegisterFile::new();
        rf.store_delete(Some('a'), "kept\n".into(), Shape::Line);
        assert_eq!(rf.get(Some('a')).content(), "kept\n");
        assert_eq!(rf.get(None).content(), "kept\n");
        assert!(rf.get(Some('1')).is_empty());
    }

    // -- Fallbacks ----------------------------------------------------------

    #[test]
    fn unknown_name_falls_back_to_unnamed() {
        let mut rf = RegisterFile::new();
        rf.store_yank(Some('!'), "fallback".into(), Shape::Char);
        assert_eq!(rf.get(None).content(), "fallback");
        assert_eq!(rf.get(Some('!')).content(), "fallback");
    }

    #[test]
    fn explicit_digit_target() {
        let mut rf = RegisterFile::new();
        rf.store_yank(Some('5'), "pinned".into(), Shape::Char);
        assert_eq!(rf.get(Some('5')).content(), "pinned");
        assert_eq!(rf.get(None).content(), "pinned");
    }

    #[test]
    fn all_named_registers_addressable() {
        let mut rf = RegisterFile::new();
        for (i, ch) in ('a'..='z').enumerate() {
            rf.store_yank(Some(ch), format!("reg_{i}"), Shape::Char);
        }
        for (i, ch) in ('a'..='z').enumerate() {
            assert_eq!(rf.get(Some(ch)).content(), format!("reg_{i}"));
        }
    }
}
