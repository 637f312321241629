//! Pending command state — the partially parsed grammar sequence.
//!
//! Grammar: `[count1] ["register] [operator] [count2] motion|object`.
//! Digits, the register prefix, and the operator accumulate here until a
//! motion (or doubled operator, or text object) completes the command.
//! Multi-key productions park in [`Await`] while the next key is
//! outstanding: `g` prefixes, `i`/`a` objects, `f F t T` and `r`
//! arguments, `"` register names.
//!
//! The state is cleared on dispatch, on Escape, and on any key that
//! cannot extend the sequence.

use vix_core::object::Extent;

use crate::motion::Find;
use crate::operator::Operator;
use crate::options::Options;

/// What the next key will complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Await {
    /// Nothing outstanding.
    #[default]
    None,
    /// After `"` — a register name.
    RegisterName,
    /// After `g` — the second key of a `g` command.
    Gee,
    /// After `f F t T` — the char to find.
    FindChar(Find),
    /// After `r` — the replacement char.
    ReplaceChar,
    /// After `i`/`a` with an operator or in visual mode — the object key.
    ObjectKind(Extent),
}

/// The accumulated parse state.
#[derive(Debug, Clone, Default)]
pub struct Pending {
    count1: Option<usize>,
    count2: Option<usize>,
    register: Option<char>,
    operator: Option<Operator>,
    awaiting: Await,
}

impl Pending {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn operator(&self) -> Option<Operator> {
        self.operator
    }

    #[inline]
    #[must_use]
    pub const fn register(&self) -> Option<char> {
        self.register
    }

    #[inline]
    #[must_use]
    pub const fn awaiting(&self) -> Await {
        self.awaiting
    }

    /// True when nothing has accumulated — a fresh grammar position.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count1.is_none()
            && self.count2.is_none()
            && self.register.is_none()
            && self.operator.is_none()
            && matches!(self.awaiting, Await::None)
    }

    /// True when `0` should be a count digit rather than the line-start
    /// motion: only while a count is already being typed.
    #[must_use]
    pub const fn zero_is_digit(&self) -> bool {
        if self.operator.is_some() {
            self.count2.is_some()
        } else {
            self.count1.is_some()
        }
    }

    // -- Mutation -----------------------------------------------------------

    /// Append a digit to whichever count is active (count2 once an
    /// operator is pending). Saturates instead of overflowing.
    pub fn push_count_digit(&mut self, digit: u32) {
        let slot = if self.operator.is_some() { &mut self.count2 } else { &mut self.count1 };
        let current = slot.unwrap_or(0);
        *slot = Some(
            current
                .saturating_mul(10)
                .saturating_add(digit as usize),
        );
    }

    pub const fn set_register(&mut self, name: char) {
        self.register = Some(name);
    }

    pub const fn set_operator(&mut self, op: Operator) {
        self.operator = Some(op);
    }

    pub const fn set_awaiting(&mut self, awaiting: Await) {
        self.awaiting = awaiting;
    }

    /// The effective repeat count: count1 × count2, defaulting each to 1,
    /// clamped to `maxrepeat`.
    #[must_use]
    pub fn effective_count(&self, opts: &Options) -> usize {
        self.count1
            .unwrap_or(1)
            .saturating_mul(self.count2.unwrap_or(1))
            .min(opts.max_repeat_count)
            .max(1)
    }

    /// The raw typed count, if any digit was typed at all — `{count}G`
    /// needs to distinguish "no count" from "count 1".
    #[must_use]
    pub fn explicit_count(&self) -> Option<usize> {
        match (self.count1, self.count2) {
            (None, None) => None,
            (a, b) => Some(a.unwrap_or(1).saturating_mul(b.unwrap_or(1))),
        }
    }

    /// Discard everything.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
