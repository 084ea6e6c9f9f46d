// Copyright (c) 2025 Redglyph (@gmail.com). All Rights Reserved.

use crate::sem_record::SemanticRecord;
use crate::symbol::SemArg;

/// Snapshot of the semantic-stack indices, carried by the end-of-production
/// marker the parser pushes when it predicts a production. Restoring the
/// snapshot closes that production's frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EopFrame {
    pub current: usize,
    pub left: usize,
    pub right: usize,
    pub top: usize,
}

/// Positional attribute store for the semantic routines.
///
/// The stack is conceptually 1-based: index 0 holds a permanently unused
/// sentinel. Four indices frame the production being recognized:
/// `left` is the slot of the production's left-hand side in the parent frame
/// (`$$`), `[right, top)` is the production's own frame (`$1` at `right`),
/// and `current` walks through the slots as symbols complete.
///
/// Invariant after every parser step:
/// `0 <= left <= right <= current <= top == len()`.
pub struct SemanticStack {
    records: Vec<SemanticRecord>,
    left: usize,
    right: usize,
    current: usize,
    top: usize,
}

impl SemanticStack {
    pub fn new() -> Self {
        let mut stack = SemanticStack { records: Vec::new(), left: 0, right: 0, current: 0, top: 0 };
        stack.initialize();
        stack
    }

    /// Resets to the priming state: the sentinel plus one empty slot standing
    /// for the start symbol.
    pub fn initialize(&mut self) {
        self.records.clear();
        self.records.resize(2, SemanticRecord::default());
        self.left = 0;
        self.right = 0;
        self.current = 1;
        self.top = 2;
    }

    /// Opens a frame of `n` slots for the production being predicted. The
    /// caller must push the [snapshot](SemanticStack::snapshot) first, since
    /// expanding moves all four indices.
    pub fn expand(&mut self, n: u32) {
        let n = n as usize;
        self.records.resize(self.records.len() + n, SemanticRecord::default());
        self.left = self.current;
        self.right = self.top;
        self.current = self.right;
        self.top += n;
    }

    /// The indices as they are now; taken before [expand](SemanticStack::expand).
    pub fn snapshot(&self) -> EopFrame {
        EopFrame { current: self.current, left: self.left, right: self.right, top: self.top }
    }

    /// Closes the frame opened by the matching [expand](SemanticStack::expand):
    /// the indices come back from the snapshot, the frame's slots are
    /// discarded, and `current` moves past the nonterminal just recognized.
    pub fn restore(&mut self, frame: EopFrame) {
        self.current = frame.current;
        self.left = frame.left;
        self.right = frame.right;
        self.top = frame.top;
        self.records.truncate(self.top);
        self.current += 1;
    }

    /// Writes the record of a matched terminal and advances `current`.
    pub fn replace_at_current(&mut self, record: SemanticRecord) {
        self.records[self.current] = record;
        self.current += 1;
    }

    /// Slot index of an action argument: `$$` is `left`, `$k` is `right + k - 1`.
    fn index_of(&self, arg: SemArg) -> usize {
        match arg {
            SemArg::Lhs => self.left,
            SemArg::Rhs(k) => self.right + k as usize - 1,
        }
    }

    pub fn record(&self, arg: SemArg) -> &SemanticRecord {
        &self.records[self.index_of(arg)]
    }

    pub fn set_record(&mut self, arg: SemArg, record: SemanticRecord) {
        let index = self.index_of(arg);
        self.records[index] = record;
    }

    /// The most recently matched terminal's record, consumed by `processid`,
    /// `processliteral` and `processop`.
    pub fn record_before_current(&self) -> &SemanticRecord {
        &self.records[self.current - 1]
    }

    /// All records above the sentinel, for the generation trace.
    pub fn records(&self) -> impl Iterator<Item = &SemanticRecord> {
        self.records.iter().skip(1)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index invariant, checked by the parser tests after every step.
    pub fn indices_consistent(&self) -> bool {
        self.left <= self.right && self.right <= self.current
            && self.current <= self.top && self.top == self.records.len()
    }
}

impl Default for SemanticStack {
    fn default() -> Self {
        SemanticStack::new()
    }
}

// ---------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_primes_the_indices() {
        let stack = SemanticStack::new();
        assert_eq!(stack.snapshot(), EopFrame { current: 1, left: 0, right: 0, top: 2 });
        assert_eq!(stack.len(), 2);
        assert!(stack.indices_consistent());
    }

    #[test]
    fn expand_opens_a_frame() {
        let mut stack = SemanticStack::new();
        stack.expand(3);
        assert_eq!(stack.snapshot(), EopFrame { current: 2, left: 1, right: 2, top: 5 });
        assert_eq!(stack.len(), 5);
        assert!(stack.indices_consistent());
        // $$ is the parent slot, $1 the first slot of the new frame
        assert_eq!(stack.index_of(SemArg::Lhs), 1);
        assert_eq!(stack.index_of(SemArg::Rhs(1)), 2);
        assert_eq!(stack.index_of(SemArg::Rhs(3)), 4);
    }

    #[test]
    fn expand_zero_for_action_only_production() {
        let mut stack = SemanticStack::new();
        let before = stack.len();
        stack.expand(0);
        assert_eq!(stack.len(), before);
        assert!(stack.indices_consistent());
    }

    #[test]
    fn restore_closes_the_frame_and_advances() {
        let mut stack = SemanticStack::new();
        let frame = stack.snapshot();
        stack.expand(2);
        stack.replace_at_current(SemanticRecord::id("X"));
        stack.restore(frame);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.snapshot(), EopFrame { current: 2, left: 0, right: 0, top: 2 });
        assert!(stack.indices_consistent());
    }

    #[test]
    fn argument_addressing_follows_the_frame() {
        let mut stack = SemanticStack::new();
        stack.expand(2);
        stack.set_record(SemArg::Rhs(1), SemanticRecord::literal("1"));
        stack.set_record(SemArg::Rhs(2), SemanticRecord::literal("2"));
        stack.set_record(SemArg::Lhs, SemanticRecord::id("X"));
        assert_eq!(stack.record(SemArg::Rhs(2)).extract(), "2");
        assert_eq!(stack.record(SemArg::Lhs).extract(), "X");
    }

    #[test]
    fn matched_terminal_is_a_placeholder_at_pre_increment_current() {
        let mut stack = SemanticStack::new();
        stack.expand(1);
        stack.replace_at_current(SemanticRecord::Placeholder(crate::token::Token::new("42", 15, 1, 1)));
        assert_eq!(stack.record_before_current().extract(), "42");
        assert!(stack.indices_consistent());
    }
}
