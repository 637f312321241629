//! Command-line mode — the `:` prompt and its command parser.
//!
//! The same input line also serves the search prompts (`/` and `?`); the
//! prompt character decides how Enter is interpreted by the dispatch
//! layer. Only `:` input goes through [`parse_command`].
//!
//! # Supported commands
//!
//! | Command       | Action                                   |
//! |---------------|------------------------------------------|
//! | `:w`          | Save through the host                    |
//! | `:w <path>`   | Save-as through the host                 |
//! | `:q`          | Quit (refused while modified)            |
//! | `:q!`         | Force quit                               |
//! | `:wq` / `:x`  | Save and quit                            |
//! | `:e <path>`   | Ask the host to load a file              |
//! | `:set <args>` | Change options ([`crate::options`])      |

use crate::options::{SetDirective, parse_set_arg};

// ---------------------------------------------------------------------------
// CommandLine
// ---------------------------------------------------------------------------

/// The command/search input line: prompt character, text, and cursor.
///
/// The prompt is not stored in `input`; it is part of the rendered frame.
#[derive(Debug, Clone)]
pub struct CommandLine {
    prompt: char,
    input: String,
    cursor: usize,
}

impl CommandLine {
    /// An empty line behind the given prompt (`:`, `/`, or `?`).
    #[must_use]
    pub const fn new(prompt: char) -> Self {
        Self { prompt, input: String::new(), cursor: 0 }
    }

    #[inline]
    #[must_use]
    pub const fn prompt(&self) -> char {
        self.prompt
    }

    #[inline]
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Insert a character at the cursor.
    pub fn insert_char(&mut self, ch: char) {
        let byte_idx = self.char_to_byte(self.cursor);
        self.input.insert(byte_idx, ch);
        self.cursor += 1;
    }

    /// Delete the character before the cursor. Returns `false` at column 0
    /// so the dispatch layer can close the prompt instead.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let byte_idx = self.char_to_byte(self.cursor);
        self.input.remove(byte_idx);
        true
    }

    pub const fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.input.chars().count() {
            self.cursor += 1;
        }
    }

    fn char_to_byte(&self, char_idx: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_idx)
            .map_or(self.input.len(), |(byte_idx, _)| byte_idx)
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A parsed `:` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `:w` — save to the current identifier.
    Write,
    /// `:w <path>` — save to a specific identifier.
    WriteAs(String),
    /// `:q` — quit unless the buffer is modified.
    Quit,
    /// `:q!` — quit, discarding changes.
    ForceQuit,
    /// `:wq` / `:x` — save, then quit.
    WriteQuit,
    /// `:e <path>` — ask the host to load.
    Edit(String),
    /// `:set <args>` — option directives, already parsed.
    Set(Vec<SetDirective>),
    /// Anything else; carries the input for the error message.
    Unknown(String),
}

/// Parse a `:` command line (without the leading `:`).
#[must_use]
pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();
    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (trimmed, ""),
    };

    match (name, rest) {
        ("w" | "write", "") => Command::Write,
        ("w" | "write", path) => Command::WriteAs(path.to_string()),
        ("q" | "quit", "") => Command::Quit,
        ("q!" | "quit!", "") => Command::ForceQuit,
        ("wq" | "x", "") => Command::WriteQuit,
        ("e" | "edit", path) if !path.is_empty() => Command::Edit(path.to_string()),
        ("set" | "se", args) if !args.is_empty() => {
            let mut directives = Vec::new();
            for arg in args.split_whitespace() {
                match parse_set_arg(arg) {
                    Some(d) => directives.push(d),
                    None => return Command::Unknown(trimmed.to_string()),
                }
            }
            Command::Set(directives)
        }
        _ => Command::Unknown(trimmed.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
