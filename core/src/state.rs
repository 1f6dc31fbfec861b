//! Synchronization state for one text field.
//!
//! Holds the two copies of the text the engine reconciles:
//! - confirmed: what the user committed, independent of the animation
//! - revealed: what is on screen, lagging behind while typing
//!
//! plus the reveal queue and the cursor bookkeeping that goes with it.
//! Mutation is limited to a handful of transitions so the invariants
//! (`revealed` never longer than `confirmed`, equal when idle) are easy to
//! audit.

use crate::graphemes;
use crate::reveal::RevealQueue;

/// Per-field synchronization state.
#[derive(Debug, Clone, Default)]
pub struct SyncState {
    /// Text the engine has accepted as the user's intent
    confirmed: String,

    /// Text currently shown
    revealed: String,

    /// Characters still to be spliced into `revealed`
    queue: RevealQueue,

    /// Whether a reveal is in flight
    typing: bool,

    /// Grapheme index in `revealed` where the next character lands
    insertion_index: Option<usize>,

    /// Where the cursor goes once the queue drains
    target_cursor: usize,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn confirmed(&self) -> &str {
        &self.confirmed
    }

    pub fn revealed(&self) -> &str {
        &self.revealed
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn target_cursor(&self) -> usize {
        self.target_cursor
    }

    pub fn queue(&self) -> &RevealQueue {
        &self.queue
    }

    /// Cursor position while a reveal is in flight: the insertion point,
    /// or the end of the revealed text when none is set.
    pub fn reveal_cursor(&self) -> usize {
        self.insertion_index.unwrap_or_else(|| graphemes::len(&self.revealed))
    }

    /// Set both copies at once, dropping anything pending.
    pub fn collapse_to(&mut self, text: String) {
        self.queue.clear();
        self.typing = false;
        self.insertion_index = None;
        self.target_cursor = graphemes::len(&text);
        self.revealed = text.clone();
        self.confirmed = text;
    }

    /// Stop revealing and make the confirmed copy match what is on screen.
    pub fn abandon_reveal(&mut self) {
        let shown = self.revealed.clone();
        self.collapse_to(shown);
    }

    /// Accept `confirmed` and queue `chars` for reveal at `insertion_index`
    /// (end of revealed text when `None`). Returns the number queued.
    pub fn begin_reveal(
        &mut self,
        confirmed: String,
        chars: &str,
        insertion_index: Option<usize>,
        target_cursor: usize,
    ) -> usize {
        let revealed_len = graphemes::len(&self.revealed);
        self.confirmed = confirmed;
        self.insertion_index = Some(insertion_index.unwrap_or(revealed_len).min(revealed_len));
        self.target_cursor = target_cursor;
        let queued = self.queue.extend_from_str(chars);
        self.typing = !self.queue.is_empty();
        queued
    }

    /// Splice the next queued grapheme into the revealed text.
    ///
    /// Returns `None` when nothing is queued.
    pub fn reveal_next(&mut self) -> Option<String> {
        let next = self.queue.pop()?;
        let revealed_len = graphemes::len(&self.revealed);
        let at = self.insertion_index.unwrap_or(revealed_len).min(revealed_len);
        graphemes::insert(&mut self.revealed, at, &next);
        self.insertion_index = Some(at + 1);
        Some(next)
    }

    /// Finish the reveal. Returns `true` when revealed text had drifted from
    /// confirmed text and had to be snapped back.
    pub fn finish_reveal(&mut self) -> bool {
        self.typing = false;
        self.insertion_index = None;
        self.queue.clear();
        let drifted = self.revealed != self.confirmed;
        if drifted {
            self.revealed = self.confirmed.clone();
        }
        self.target_cursor = self.target_cursor.min(graphemes::len(&self.revealed));
        drifted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_idle() {
        let state = SyncState::new();
        assert!(!state.is_typing());
        assert_eq!(state.confirmed(), "");
        assert_eq!(state.revealed(), "");
        assert_eq!(state.reveal_cursor(), 0);
    }

    #[test]
    fn test_reveal_append() {
        let mut state = SyncState::new();
        state.collapse_to("ab".to_string());

        let queued = state.begin_reveal("abcd".to_string(), "cd", None, 4);
        assert_eq!(queued, 2);
        assert!(state.is_typing());
        assert_eq!(state.reveal_cursor(), 2);
        assert_eq!(state.revealed(), "ab");

        assert_eq!(state.reveal_next().as_deref(), Some("c"));
        assert_eq!(state.revealed(), "abc");
        assert_eq!(state.reveal_cursor(), 3);
        assert_eq!(state.reveal_next().as_deref(), Some("d"));
        assert_eq!(state.reveal_next(), None);

        assert!(!state.finish_reveal());
        assert!(!state.is_typing());
        assert_eq!(state.revealed(), "abcd");
        assert_eq!(state.target_cursor(), 4);
    }

    #[test]
    fn test_reveal_insert_advances_index() {
        let mut state = SyncState::new();
        state.collapse_to("ad".to_string());
        state.begin_reveal("abcd".to_string(), "bc", Some(1), 3);

        state.reveal_next();
        assert_eq!(state.revealed(), "abd");
        assert_eq!(state.reveal_cursor(), 2);
        state.reveal_next();
        assert_eq!(state.revealed(), "abcd");
        assert_eq!(state.reveal_cursor(), 3);
    }

    #[test]
    fn test_insertion_index_clamped() {
        let mut state = SyncState::new();
        state.collapse_to("ab".to_string());
        state.begin_reveal("abc".to_string(), "c", Some(10), 3);
        assert_eq!(state.reveal_cursor(), 2);
    }

    #[test]
    fn test_abandon_reveal_keeps_shown_text() {
        let mut state = SyncState::new();
        state.begin_reveal("hello".to_string(), "hello", None, 5);
        state.reveal_next();
        state.reveal_next();
        state.abandon_reveal();

        assert!(!state.is_typing());
        assert_eq!(state.confirmed(), "he");
        assert_eq!(state.revealed(), "he");
        assert!(state.queue().is_empty());
    }

    #[test]
    fn test_finish_reveal_snaps_drift() {
        let mut state = SyncState::new();
        state.begin_reveal("abc".to_string(), "ab", None, 3);
        while state.reveal_next().is_some() {}
        assert!(state.finish_reveal());
        assert_eq!(state.revealed(), "abc");
    }

    #[test]
    fn test_collapse_resets_everything() {
        let mut state = SyncState::new();
        state.begin_reveal("hello".to_string(), "hello", None, 5);
        state.collapse_to("bye".to_string());
        assert!(!state.is_typing());
        assert!(state.queue().is_empty());
        assert_eq!(state.confirmed(), "bye");
        assert_eq!(state.revealed(), "bye");
        assert_eq!(state.target_cursor(), 3);
    }
}
