//! Composition tracking for multi-keystroke input methods.
//!
//! While an input method has an uncommitted candidate (for example pinyin
//! "nihao" waiting to become "你好"), the host field carries a *marked*
//! range. The engine must not diff such text: the guard routes those edits
//! straight through and only lets the engine look at the edit that follows
//! the commit.

use std::ops::Range;

use crate::graphemes;

/// Where an incoming raw edit should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Normal edit: diff it against confirmed text.
    Process,
    /// Input method is composing; show the raw text untouched.
    PassThrough,
    /// Composition starts on this edit. Any in-flight reveal must be
    /// collapsed before passing through.
    Enter,
}

/// The composing portion of a raw edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    /// Full raw text, marked range included
    pub text: String,
    /// Uncommitted candidate range (grapheme offsets)
    pub marked: Range<usize>,
}

impl Composition {
    /// Create a composition, clamping the marked range to `text`.
    pub fn new(text: String, marked: Range<usize>) -> Self {
        let len = graphemes::len(&text);
        let start = marked.start.min(len);
        let end = marked.end.clamp(start, len);
        Self {
            text,
            marked: start..end,
        }
    }

    /// The raw text with the marked candidate removed.
    pub fn committed(&self) -> String {
        graphemes::remove_range(&self.text, self.marked.start, self.marked.end)
    }
}

/// Composition guard.
///
/// Remembers whether the field is mid-composition so the engine can tell
/// entry, continuation and exit apart.
#[derive(Debug, Clone, Default)]
pub struct CompositionGuard {
    composing: bool,
}

impl CompositionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an input method currently holds uncommitted text.
    pub fn is_composing(&self) -> bool {
        self.composing
    }

    /// Decide how to route an edit given whether it carries marked text.
    ///
    /// An edit without marked text after a composing run is the commit and
    /// is processed normally.
    pub fn route(&mut self, has_marked: bool) -> Route {
        match (self.composing, has_marked) {
            (false, true) => {
                self.composing = true;
                Route::Enter
            }
            (true, true) => Route::PassThrough,
            (true, false) => {
                self.composing = false;
                Route::Process
            }
            (false, false) => Route::Process,
        }
    }
}
