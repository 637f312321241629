//! Undo/redo history — transaction-based edit tracking.
//!
//! Buffer mutations return their inverse [`Edit`]s; the history collects
//! those inverses into [`Transaction`]s, the atomic unit of undo/redo:
//!
//! - **Normal mode**: each command (`x`, `dw`, `p`, ...) is one transaction.
//! - **Insert/Replace mode**: everything from entering the mode to Esc.
//!
//! # Usage
//!
//! ```text
//! history.begin(cursor_position);
//! // mutate the buffer, recording each returned inverse:
//! let inverse = buffer.insert(pos, text)?;
//! history.record(inverse);
//! // finalize:
//! history.commit(cursor_position);
//! ```
//!
//! Empty transactions (no edits between begin and commit) are silently
//! discarded — they don't clutter the undo stack.

use crate::buffer::{Buffer, EditResult};
use crate::edit::Edit;
use crate::position::Position;

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A group of edits that undo/redo as one atomic unit.
///
/// Stores the *inverse* of each mutation, in the order the mutations were
/// applied. Undo replays the inverses back-to-front; redo re-inverts them
/// front-to-back. Cursor positions on both sides are kept so undo restores
/// the cursor to where it was before the transaction and redo to where it
/// was after.
#[derive(Debug, Clone)]
struct Transaction {
    undo_edits: Vec<Edit>,
    cursor_before: Position,
    cursor_after: Position,
}

impl Transaction {
    fn undo(&self, buf: &mut Buffer) -> EditResult<()> {
        for edit in self.undo_edits.iter().rev() {
            buf.apply(edit)?;
        }
        Ok(())
    }

    fn redo(&self, buf: &mut Buffer) -> EditResult<()> {
        for edit in &self.undo_edits {
            buf.apply(&edit.invert())?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Undo/redo history for a buffer.
///
/// Maintains two stacks: transactions that can be undone and transactions
/// that can be redone. Committing a new transaction clears the redo stack —
/// history is linear, any new edit after an undo discards the forward
/// branch.
#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<Transaction>,
    redo_stack: Vec<Transaction>,
    pending: Option<Transaction>,
}

impl History {
    /// Create an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            pending: None,
        }
    }

    /// Start a new transaction. `cursor` is the cursor position before any
    /// edits in this transaction.
    ///
    /// If a previous transaction was still pending (begin without commit),
    /// it is auto-committed first.
    pub fn begin(&mut self, cursor: Position) {
        if self.pending.is_some() {
            self.commit(cursor);
        }
        self.pending = Some(Transaction {
            undo_edits: Vec::new(),
            cursor_before: cursor,
            cursor_after: cursor,
        });
    }

    /// True while a transaction is open.
    #[must_use]
    pub const fn in_transaction(&self) -> bool {
        self.pending.is_some()
    }

    /// Record the inverse edit a buffer mutation returned.
    ///
    /// Does nothing if no transaction is pending.
    pub fn record(&mut self, inverse: Edit) {
        if let Some(txn) = &mut self.pending {
            txn.undo_edits.push(inverse);
        }
    }

    /// Finalize the current transaction. `cursor` is the cursor position
    /// after all edits in this transaction.
    ///
    /// Empty transactions (no edits recorded) are silently discarded.
    /// New transactions clear the redo stack.
    pub fn commit(&mut self, cursor: Position) {
        if let Some(mut txn) = self.pending.take() {
            if txn.undo_edits.is_empty() {
                return;
            }
            txn.cursor_after = cursor;
            self.redo_stack.clear();
            self.undo_stack.push(txn);
        }
    }

    /// Drop the pending transaction without replaying anything. The caller
    /// is responsible for having made no buffer changes since `begin` (or
    /// for reverting them itself).
    pub fn abort(&mut self) {
        self.pending = None;
    }

    /// Undo the last transaction. Returns the cursor position to restore,
    /// or `None` if there's nothing to undo.
    ///
    /// # Errors
    ///
    /// Propagates `OutOfBounds` if a stored edit no longer fits the buffer,
    /// which indicates the buffer was mutated outside the history.
    pub fn undo(&mut self, buf: &mut Buffer) -> EditResult<Option<Position>> {
        // Auto-commit any pending transaction so it can be undone.
        if let Some(txn) = self.pending.take() {
            if !txn.undo_edits.is_empty() {
                self.redo_stack.clear();
                self.undo_stack.push(txn);
            }
        }

        let Some(txn) = self.undo_stack.pop() else {
            return Ok(None);
        };
        txn.undo(buf)?;
        let cursor = txn.cursor_before;
        self.redo_stack.push(txn);
        Ok(Some(cursor))
    }

    /// Redo the last undone transaction. Returns the cursor position to
    /// restore, or `None` if there's nothing to redo.
    ///
    /// # Errors
    ///
    /// Propagates `OutOfBounds` on a stored edit that no longer fits.
    pub fn redo(&mut self, buf: &mut Buffer) -> EditResult<Option<Position>> {
        let Some(txn) = self.redo_stack.pop() else {
            return Ok(None);
        };
        txn.redo(buf)?;
        let cursor = txn.cursor_after;
        self.undo_stack.push(txn);
        Ok(Some(cursor))
    }

    /// True if there are transactions that can be undone.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
            || self
                .pending
                .as_ref()
                .is_some_and(|t| !t.undo_edits.is_empty())
    }

    /// True if there are transactions that can be redone.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of transactions on the undo stack.
    #[must_use]
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of transactions on the redo stack.
    #[must_use]
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Range;

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    /// Insert through the buffer and record the inverse in one step.
    fn ins(buf: &mut Buffer, h: &mut History, pos: Position, text: &str) {
        let inverse = buf.insert(pos, text).unwrap();
        h.record(inverse);
    }

    /// Delete through the buffer and record the inverse in one step.
    fn del(buf: &mut Buffer, h: &mut History, range: Range) {
        let inverse = buf.delete(range).unwrap();
        h.record(inverse);
    }

    // -- Basic undo/redo ----------------------------------------------------

    #[test]
    fn undo_single_insert() {
        let mut buf = Buffer::new();
        let mut h = History::new();

        h.begin(Position::ZERO);
        ins(&mut buf, &mut h, Position::ZERO, "hello");
        h.commit(p(0, 5));

        assert_eq!(buf.contents(), "hello");

        let cursor = h.undo(&mut buf).unwrap();
        assert_eq!(buf.contents(), "");
        assert_eq!(cursor, Some(Position::ZERO));
    }

    #[test]
    fn undo_single_delete() {
        let mut buf = Buffer::from_text("hello");
        let mut h = History::new();

        h.begin(p(0, 4));
        del(&mut buf, &mut h, Range::new(p(0, 4), p(0, 5)));
        h.commit(p(0, 3));

        assert_eq!(buf.contents(), "hell");

        let cursor = h.undo(&mut buf).unwrap();
        assert_eq!(buf.contents(), "hello");
        assert_eq!(cursor, Some(p(0, 4)));
    }

    #[test]
    fn redo_after_undo() {
        let mut buf = Buffer::new();
        let mut h = History::new();

        h.begin(Position::ZERO);
        ins(&mut buf, &mut h, Position::ZERO, "hello");
        h.commit(p(0, 5));

        h.undo(&mut buf).unwrap();
        assert_eq!(buf.contents(), "");

        let cursor = h.redo(&mut buf).unwrap();
        assert_eq!(buf.contents(), "hello");
        assert_eq!(cursor, Some(p(0, 5)));
    }

    #[test]
    fn undo_nothing() {
        let mut buf = Buffer::from_text("hello");
        let mut h = History::new();
        assert_eq!(h.undo(&mut buf).unwrap(), None);
        assert_eq!(h.redo(&mut buf).unwrap(), None);
    }

    // -- Transaction grouping -----------------------------------------------

    #[test]
    fn multi_edit_transaction_undoes_atomically() {
        let mut buf = Buffer::new();
        let mut h = History::new();

        // Simulate insert mode: type "hi"
        h.begin(Position::ZERO);
        ins(&mut buf, &mut h, Position::ZERO, "h");
        ins(&mut buf, &mut h, p(0, 1), "i");
        h.commit(p(0, 2));

        assert_eq!(buf.contents(), "hi");

        let cursor = h.undo(&mut buf).unwrap();
        assert_eq!(buf.contents(), "");
        assert_eq!(cursor, Some(Position::ZERO));
    }

    #[test]
    fn mixed_edits_undo_in_reverse_order() {
        let mut buf = Buffer::from_text("helo");
        let mut h = History::new();

        // Insert 'l' at col 3, then backspace it — net no change.
        h.begin(p(0, 3));
        ins(&mut buf, &mut h, p(0, 3), "l");
        del(&mut buf, &mut h, Range::new(p(0, 3), p(0, 4)));
        h.commit(p(0, 3));

        assert_eq!(buf.contents(), "helo");

        let cursor = h.undo(&mut buf).unwrap();
        assert_eq!(buf.contents(), "helo");
        assert_eq!(cursor, Some(p(0, 3)));
    }

    #[test]
    fn empty_transaction_not_pushed() {
        let mut h = History::new();
        h.begin(Position::ZERO);
        h.commit(Position::ZERO);
        assert!(!h.can_undo());
        assert_eq!(h.undo_count(), 0);
    }

    #[test]
    fn abort_drops_pending() {
        let mut h = History::new();
        h.begin(Position::ZERO);
        assert!(h.in_transaction());
        h.abort();
        assert!(!h.in_transaction());
        assert!(!h.can_undo());
    }

    #[test]
    fn begin_auto_commits_pending() {
        let mut buf = Buffer::new();
        let mut h = History::new();

        h.begin(Position::ZERO);
        ins(&mut buf, &mut h, Position::ZERO, "first");
        // No commit — start a new transaction instead.

        h.begin(p(0, 5));
        ins(&mut buf, &mut h, p(0, 5), "second");
        h.commit(p(0, 11));

        assert_eq!(buf.contents(), "firstsecond");
        assert_eq!(h.undo_count(), 2);

        h.undo(&mut buf).unwrap();
        assert_eq!(buf.contents(), "first");

        h.undo(&mut buf).unwrap();
        assert_eq!(buf.contents(), "");
    }

    // -- Redo stack discipline ----------------------------------------------

    #[test]
    fn new_edit_clears_redo() {
        let mut buf = Buffer::new();
        let mut h = History::new();

        h.begin(Position::ZERO);
        ins(&mut buf, &mut h, Position::ZERO, "hello");
        h.commit(p(0, 5));

        h.undo(&mut buf).unwrap();
        assert!(h.can_redo());

        h.begin(Position::ZERO);
        ins(&mut buf, &mut h, Position::ZERO, "world");
        h.commit(p(0, 5));

        assert!(!h.can_redo());
    }

    #[test]
    fn undo_all_then_redo_all() {
        let mut buf = Buffer::new();
        let mut h = History::new();

        for word in ["hello", " ", "world"] {
            let pos = p(0, buf.len_chars());
            h.begin(pos);
            ins(&mut buf, &mut h, pos, word);
            h.commit(p(0, buf.len_chars()));
        }

        assert_eq!(buf.contents(), "hello world");

        h.undo(&mut buf).unwrap();
        h.undo(&mut buf).unwrap();
        h.undo(&mut buf).unwrap();
        assert_eq!(buf.contents(), "");

        h.redo(&mut buf).unwrap();
        h.redo(&mut buf).unwrap();
        h.redo(&mut buf).unwrap();
        assert_eq!(buf.contents(), "hello world");
    }

    #[test]
    fn undo_redo_undo_cycle() {
        let mut buf = Buffer::from_text("hello");
        let mut h = History::new();

        h.begin(p(0, 4));
        del(&mut buf, &mut h, Range::new(p(0, 4), p(0, 5)));
        h.commit(p(0, 3));

        assert_eq!(buf.contents(), "hell");

        h.undo(&mut buf).unwrap();
        assert_eq!(buf.contents(), "hello");

        h.redo(&mut buf).unwrap();
        assert_eq!(buf.contents(), "hell");

        h.undo(&mut buf).unwrap();
        assert_eq!(buf.contents(), "hello");
    }

    // -- Multiline edits ----------------------------------------------------

    #[test]
    fn undo_multiline_delete() {
        let mut buf = Buffer::from_text("hello\nworld\nfoo");
        let mut h = History::new();

        h.begin(p(1, 0));
        del(&mut buf, &mut h, Range::new(p(1, 0), p(2, 0)));
        h.commit(p(1, 0));

        assert_eq!(buf.contents(), "hello\nfoo");

        let cursor = h.undo(&mut buf).unwrap();
        assert_eq!(buf.contents(), "hello\nworld\nfoo");
        assert_eq!(cursor, Some(p(1, 0)));
    }

    #[test]
    fn simulate_o_open_line_and_type() {
        let mut buf = Buffer::from_text("first\nthird");
        let mut h = History::new();

        // 'o' opens a line below line 0, then typing fills it.
        h.begin(p(0, 0));
        ins(&mut buf, &mut h, p(0, 5), "\n");
        ins(&mut buf, &mut h, p(1, 0), "second");
        h.commit(p(1, 6));

        assert_eq!(buf.contents(), "first\nsecond\nthird");

        let cursor = h.undo(&mut buf).unwrap();
        assert_eq!(buf.contents(), "first\nthird");
        assert_eq!(cursor, Some(p(0, 0)));
    }

    // -- Counts -------------------------------------------------------------

    #[test]
    fn counts_track_stacks() {
        let mut buf = Buffer::new();
        let mut h = History::new();

        assert_eq!(h.undo_count(), 0);
        assert_eq!(h.redo_count(), 0);

        for (i, ch) in ["a", "b"].iter().enumerate() {
            h.begin(p(0, i));
            ins(&mut buf, &mut h, p(0, i), ch);
            h.commit(p(0, i + 1));
        }

        assert_eq!(h.undo_count(), 2);
        h.undo(&mut buf).unwrap();
        assert_eq!(h.undo_count(), 1);
        assert_eq!(h.redo_count(), 1);
    }

    // -- Undo interacts with pending ----------------------------------------

    #[test]
    fn undo_auto_commits_pending() {
        let mut buf = Buffer::new();
        let mut h = History::new();

        h.begin(Position::ZERO);
        ins(&mut buf, &mut h, Position::ZERO, "typed");
        // Esc not pressed yet — undo should still take effect.

        let cursor = h.undo(&mut buf).unwrap();
        assert_eq!(buf.contents(), "");
        assert_eq!(cursor, Some(Position::ZERO));
    }
}
