//! Simulated host text field.
//!
//! Turns scripted key actions into the `RawEdit`s a real widget would
//! report, and takes back whatever the engine asks it to display.

use std::ops::Range;

use anyhow::{bail, Result};
use typewriter_core::{graphemes, Display, RawEdit};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostField {
    text: String,
    cursor: usize,
    marked: Option<Range<usize>>,
}

impl HostField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_composing(&self) -> bool {
        self.marked.is_some()
    }

    fn edit(&self) -> RawEdit {
        RawEdit {
            text: self.text.clone(),
            cursor: self.cursor,
            marked: self.marked.clone(),
        }
    }

    /// Insert text at the caret.
    pub fn type_text(&mut self, s: &str) -> Result<RawEdit> {
        if self.is_composing() {
            bail!("cannot type while composing; commit first");
        }
        graphemes::insert(&mut self.text, self.cursor, s);
        self.cursor += graphemes::len(s);
        Ok(self.edit())
    }

    /// Delete up to `count` graphemes before the caret.
    pub fn backspace(&mut self, count: usize) -> Result<RawEdit> {
        if self.is_composing() {
            bail!("cannot delete while composing; commit first");
        }
        let start = self.cursor.saturating_sub(count);
        self.text = graphemes::remove_range(&self.text, start, self.cursor);
        self.cursor = start;
        Ok(self.edit())
    }

    pub fn move_left(&mut self, count: usize) -> RawEdit {
        self.cursor = self.cursor.saturating_sub(count);
        self.edit()
    }

    pub fn move_right(&mut self, count: usize) -> RawEdit {
        self.cursor = self.cursor.saturating_add(count).min(graphemes::len(&self.text));
        self.edit()
    }

    pub fn move_home(&mut self) -> RawEdit {
        self.move_left(usize::MAX)
    }

    pub fn move_end(&mut self) -> RawEdit {
        self.move_right(usize::MAX)
    }

    /// Show `candidate` as marked text, replacing any current candidate.
    pub fn compose(&mut self, candidate: &str) -> RawEdit {
        let range = self.marked.take().unwrap_or(self.cursor..self.cursor);
        self.text = graphemes::remove_range(&self.text, range.start, range.end);
        graphemes::insert(&mut self.text, range.start, candidate);
        let end = range.start + graphemes::len(candidate);
        self.marked = Some(range.start..end);
        self.cursor = end;
        self.edit()
    }

    /// Replace the marked candidate with `committed` and end composition.
    pub fn commit(&mut self, committed: &str) -> RawEdit {
        let range = self.marked.take().unwrap_or(self.cursor..self.cursor);
        self.text = graphemes::remove_range(&self.text, range.start, range.end);
        graphemes::insert(&mut self.text, range.start, committed);
        self.cursor = range.start + graphemes::len(committed);
        self.edit()
    }

    /// Mirror what the engine wants shown.
    pub fn apply(&mut self, display: &Display) {
        self.text = display.text.clone();
        self.cursor = display.cursor.min(graphemes::len(&self.text));
        if let Some(marked) = &self.marked {
            if marked.end > graphemes::len(&self.text) {
                self.marked = None;
            }
        }
    }

    /// Text with the caret drawn as `|` and marked text in brackets.
    pub fn render(text: &str, cursor: usize, marked: Option<&Range<usize>>) -> String {
        let mut out = String::new();
        for (idx, g) in graphemes::split(text).enumerate() {
            if idx == cursor {
                out.push('|');
            }
            if marked.is_some_and(|m| m.start == idx && !m.is_empty()) {
                out.push('[');
            }
            out.push_str(&g);
            if marked.is_some_and(|m| m.end == idx + 1 && !m.is_empty()) {
                out.push(']');
            }
        }
        if cursor >= graphemes::len(text) {
            out.push('|');
        }
        out
    }

    pub fn marked(&self) -> Option<&Range<usize>> {
        self.marked.as_ref()
    }
}
