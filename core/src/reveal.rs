//! Pending characters awaiting reveal.

use std::collections::VecDeque;

use crate::graphemes;

/// FIFO of grapheme clusters, consumed one per scheduler tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevealQueue {
    pending: VecDeque<String>,
}

impl RevealQueue {
    /// Append every grapheme of `text` to the tail. Returns how many were added.
    pub fn extend_from_str(&mut self, text: &str) -> usize {
        let before = self.pending.len();
        self.pending.extend(graphemes::split(text));
        self.pending.len() - before
    }

    /// Take the next grapheme to reveal.
    pub fn pop(&mut self) -> Option<String> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop everything still pending.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
