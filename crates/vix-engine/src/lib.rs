//! # vix-engine — Modal command engine for vix
//!
//! Turns a stream of key events into buffer edits, cursor movement, and
//! render frames. The heart is [`engine::Engine`]: feed it a
//! [`key::KeyEvent`], it consults the current [`mode::Mode`] and the
//! pending grammar state, mutates the `vix-core` document model, and
//! hands the [`host::Host`] a fresh [`host::Frame`].
//!
//! - **[`key`]** — key events with modifiers and arrival markers
//! - **[`mode`]** — the mode set and what each mode accepts
//! - **[`pending`]** — the `[count]["x][op][count]motion` accumulator
//! - **[`motion`]** — motion evaluation to positions and operator spans
//! - **[`operator`]** — delete/change/yank/indent over a span
//! - **[`search`]** — literal search with wrap-around
//! - **[`command`]** — the `:` command line and its parser
//! - **[`options`]** — `:set`-able behavior knobs
//! - **[`display`]** — char-to-display column mapping (tabs, wide chars)
//! - **[`host`]** — the embedding boundary: render, persist, bell
//! - **[`engine`]** — the façade tying it all together
//!
//! No terminal and no file I/O anywhere in this crate; both belong to
//! the host.

pub mod command;
pub mod display;
pub mod engine;
pub mod host;
pub mod key;
pub mod mode;
pub mod motion;
pub mod operator;
pub mod options;
pub mod pending;
pub mod search;

pub use engine::Engine;
pub use host::{Frame, Host, PersistRequest, StatusReport};
pub use key::{Key, KeyEvent, Modifiers};
pub use mode::{Mode, VisualKind};
pub use options::Options;
