//! Host-facing output of the engine.
//!
//! `Display` is a plain data container the host mirrors into its text
//! widget. `EngineListener` is the capability set the host injects at
//! construction; the engine holds it by value and calls it synchronously.

use serde::Serialize;

/// What the host field should show right now.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Display {
    /// Visible text
    pub text: String,

    /// Caret position (grapheme offset)
    pub cursor: usize,
}

impl Display {
    pub fn new(text: impl Into<String>, cursor: usize) -> Self {
        Self {
            text: text.into(),
            cursor,
        }
    }
}

/// Callbacks from the engine to its host.
pub trait EngineListener {
    /// The field settled: revealed text equals confirmed text and nothing is
    /// pending. Fires once per completed edit cycle.
    fn on_settled(&mut self, text: &str);

    /// The overflow policy truncated an edit.
    fn on_overflow(&mut self) {}

    /// The visible text or caret changed.
    fn on_display(&mut self, _display: &Display) {}
}

/// Listener that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl EngineListener for NoopListener {
    fn on_settled(&mut self, _text: &str) {}
}

/// One recorded engine callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerEvent {
    Settled(String),
    Overflow,
    Display(Display),
}

/// Listener that records every callback in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    pub events: Vec<ListenerEvent>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texts passed to `on_settled`, in order.
    pub fn settled(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|ev| match ev {
                ListenerEvent::Settled(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn overflow_count(&self) -> usize {
        self.events
            .iter()
            .filter(|ev| matches!(ev, ListenerEvent::Overflow))
            .count()
    }

    /// Every frame pushed to `on_display`, in order.
    pub fn frames(&self) -> Vec<&Display> {
        self.events
            .iter()
            .filter_map(|ev| match ev {
                ListenerEvent::Display(display) => Some(display),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EngineListener for RecordingListener {
    fn on_settled(&mut self, text: &str) {
        self.events.push(ListenerEvent::Settled(text.to_string()));
    }

    fn on_overflow(&mut self) {
        self.events.push(ListenerEvent::Overflow);
    }

    fn on_display(&mut self, display: &Display) {
        self.events.push(ListenerEvent::Display(display.clone()));
    }
}
