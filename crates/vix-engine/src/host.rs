//! The host boundary — rendering, persistence, and diagnostics.
//!
//! The engine is a library; everything visible or durable happens on the
//! other side of the [`Host`] trait. The engine calls `render` after
//! every handled key that moved the cursor or changed state, `persist`
//! for `:w`/`:e` (fire-and-forget; the outcome comes back later through
//! [`crate::engine::Engine::report_status`]), and `bell` when a key
//! sequence could not be parsed.

use vix_core::position::{Position, Range, Shape};

use crate::mode::Mode;

/// A snapshot of everything a surface needs to draw the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The buffer's lines, terminators stripped.
    pub lines: Vec<String>,
    /// Cursor position (char columns).
    pub cursor: Position,
    pub mode: Mode,
    /// The active selection and its shape, in visual mode.
    pub selection: Option<(Range, Shape)>,
    /// The command/search line being typed, prompt included.
    pub command_line: Option<String>,
    /// Transient status message (command results, host reports).
    pub status: Option<String>,
}

/// A persistence request delegated to the host. Paths are opaque
/// identifiers; the engine never touches storage itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistRequest {
    /// `:w` — save the given content. `path` is `None` for "the current
    /// file", whatever the host considers that to be.
    Save { path: Option<String>, content: String },
    /// `:e` — load a file; the host answers with
    /// [`crate::engine::Engine::load`] and a status report.
    Load { path: String },
}

/// Host → engine outcome report for an earlier [`PersistRequest`].
/// Surfaces as a status message only; buffer and history are untouched,
/// except that a successful save clears the modified flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub success: bool,
    pub message: String,
    /// True when this reports the outcome of a save.
    pub saved: bool,
}

/// The surface hosting the engine.
pub trait Host {
    /// Draw the current state. Called after every handled key event.
    fn render(&mut self, frame: &Frame);

    /// Carry out a persistence request. Must not block the engine; the
    /// outcome arrives later as a [`StatusReport`].
    fn persist(&mut self, request: PersistRequest);

    /// An unparseable key sequence was discarded.
    fn bell(&mut self);
}
