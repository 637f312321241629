//! # vix-core — Document model for vix
//!
//! The fundamental building blocks the command engine operates on:
//!
//! - **[`position`]** — `Position`, `Range`, and `Shape`, 0-indexed
//! - **[`edit`]** — reversible primitive edits
//! - **[`buffer`]** — rope-backed buffer; every mutation returns its inverse
//! - **[`history`]** — transaction-grouped undo/redo
//! - **[`cursor`]** — cursor with sticky column and selection anchor
//! - **[`word`]** — word/WORD boundary scanning
//! - **[`object`]** — text objects (`iw`, `a"`, `i(`, ...)
//! - **[`register`]** — named and numbered registers
//!
//! Everything here is host-agnostic: no terminal, no file I/O, no key
//! handling. The command layer lives in `vix-engine`.

pub mod buffer;
pub mod cursor;
pub mod edit;
pub mod history;
pub mod object;
pub mod position;
pub mod register;
pub mod word;
