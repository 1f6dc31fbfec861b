//! Typewriter engine: one instance per text field.
//!
//! The host reports every user-driven change through `on_raw_edit()` and
//! mirrors `Display` back into its widget whenever `on_display` fires. Time
//! only advances through `poll()` (or `tick_now()`); the `driver` module
//! wraps that in a tokio loop.
//!
//! Lifecycle: `Idle -> Typing -> Idle`, with `Composing` reachable from
//! `Idle` while an input method holds marked text. Composition starting in
//! the middle of a reveal collapses the reveal first.

use std::ops::Range;

use tracing::{debug, trace, warn};

use crate::classifier::{classify, EditKind, Plan};
use crate::clock::{Clock, SystemClock};
use crate::composition::{Composition, CompositionGuard, Route};
use crate::graphemes;
use crate::listener::{Display, EngineListener};
use crate::overflow::OverflowPolicy;
use crate::scheduler::Scheduler;
use crate::state::SyncState;
use crate::{Config, ConfigError};

/// The host field's state immediately after a user edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEdit {
    /// Full text of the field
    pub text: String,

    /// Caret position (grapheme offset)
    pub cursor: usize,

    /// Uncommitted input-method candidate, if any (grapheme range)
    pub marked: Option<Range<usize>>,
}

impl RawEdit {
    pub fn new(text: impl Into<String>, cursor: usize) -> Self {
        Self {
            text: text.into(),
            cursor,
            marked: None,
        }
    }

    /// Edit with the caret at the end of the text.
    pub fn at_end(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = graphemes::len(&text);
        Self::new(text, cursor)
    }

    /// Edit carrying marked (composing) text.
    pub fn composing(text: impl Into<String>, cursor: usize, marked: Range<usize>) -> Self {
        Self {
            text: text.into(),
            cursor,
            marked: Some(marked),
        }
    }

    pub fn is_composing(&self) -> bool {
        self.marked.is_some()
    }
}

/// Engine lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Typing,
    Composing,
}

/// What happened to a raw edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Input method is composing; passed through untouched
    Composing,
    /// A reveal was in flight; the edit was discarded and the field reset
    Dropped,
    /// Text did not change (caret move)
    Unchanged,
    /// Applied without animation; already settled
    Applied(EditKind),
    /// Queued for reveal
    Animating { kind: EditKind, queued: usize },
}

/// Result of `force_set_text()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceSet {
    Applied,
    /// The field is composing; programmatic text is not written over marked text
    Ignored,
}

/// Per-field typewriter engine.
pub struct TypewriterEngine<L: EngineListener, C: Clock = SystemClock> {
    config: Config,
    state: SyncState,
    scheduler: Scheduler,
    guard: CompositionGuard,
    overflow: OverflowPolicy,
    display: Display,
    listener: L,
    clock: C,
}

impl<L: EngineListener> TypewriterEngine<L, SystemClock> {
    /// Create an engine driven by the wall clock.
    pub fn new(config: Config, listener: L) -> Result<Self, ConfigError> {
        Self::with_clock(config, listener, SystemClock)
    }
}

impl<L: EngineListener, C: Clock> TypewriterEngine<L, C> {
    /// Create an engine with an explicit time source.
    pub fn with_clock(config: Config, listener: L, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            scheduler: Scheduler::new(config.character_delay()),
            overflow: OverflowPolicy::new(config.max_length),
            config,
            state: SyncState::new(),
            guard: CompositionGuard::new(),
            display: Display::default(),
            listener,
            clock,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// What the host should currently show.
    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn confirmed_text(&self) -> &str {
        self.state.confirmed()
    }

    pub fn revealed_text(&self) -> &str {
        self.state.revealed()
    }

    pub fn is_typing(&self) -> bool {
        self.state.is_typing()
    }

    pub fn is_composing(&self) -> bool {
        self.guard.is_composing()
    }

    pub fn phase(&self) -> Phase {
        if self.guard.is_composing() {
            Phase::Composing
        } else if self.state.is_typing() {
            Phase::Typing
        } else {
            Phase::Idle
        }
    }

    /// Characters still waiting to be revealed.
    pub fn pending_chars(&self) -> usize {
        self.state.queue().len()
    }

    /// Ticks run over the engine's lifetime.
    pub fn tick_count(&self) -> u64 {
        self.scheduler.ticks()
    }

    /// When the next tick is due, if a reveal is in flight.
    pub fn next_deadline(&self) -> Option<std::time::Instant> {
        self.scheduler.deadline()
    }

    /// Entry point for every user-driven change of the field.
    pub fn on_raw_edit(&mut self, edit: RawEdit) -> EditOutcome {
        match self.guard.route(edit.is_composing()) {
            Route::Enter => {
                if self.state.is_typing() {
                    self.collapse_for_composition(&edit);
                }
                debug!(text = %edit.text, "composition started");
                self.display = Display::new(edit.text, edit.cursor);
                return EditOutcome::Composing;
            }
            Route::PassThrough => {
                self.display = Display::new(edit.text, edit.cursor);
                return EditOutcome::Composing;
            }
            Route::Process => {}
        }

        if self.state.is_typing() {
            debug!(
                pending = self.state.queue().len(),
                "edit dropped while revealing"
            );
            let pinned = Display::new(self.state.revealed(), self.state.reveal_cursor());
            self.show(pinned);
            return EditOutcome::Dropped;
        }

        let accepted = self.overflow.apply(&edit.text);
        if accepted.truncated {
            debug!(max_length = ?self.overflow.max_length(), "edit truncated");
            self.listener.on_overflow();
        }
        let cursor = edit.cursor.min(graphemes::len(&accepted.text));

        match classify(
            self.state.confirmed(),
            self.state.revealed(),
            &accepted.text,
            cursor,
        ) {
            Plan::Unchanged => {
                let display = Display::new(accepted.text, cursor);
                self.show_if_differs(display, &edit);
                EditOutcome::Unchanged
            }
            Plan::Immediate(kind) => {
                debug!(?kind, text = %accepted.text, "edit applied");
                self.state.collapse_to(accepted.text);
                let display = Display::new(self.state.revealed(), cursor);
                self.show_if_differs(display, &edit);
                self.listener.on_settled(self.state.revealed());
                EditOutcome::Applied(kind)
            }
            Plan::Reveal {
                kind,
                chars,
                insertion_index,
                target_cursor,
            } => {
                let queued = self.state.begin_reveal(
                    accepted.text,
                    &chars,
                    Some(insertion_index),
                    target_cursor,
                );
                debug!(?kind, queued, insertion_index, "edit queued for reveal");

                // roll the field back so the full string never flashes
                let rollback = Display::new(self.state.revealed(), self.state.reveal_cursor());
                self.show(rollback);

                if queued == 0 {
                    self.finish_reveal();
                } else {
                    self.scheduler.arm(self.clock.now());
                }
                EditOutcome::Animating { kind, queued }
            }
        }
    }

    /// Programmatic override of the field's text.
    ///
    /// Cancels any reveal without settling it, applies the overflow policy,
    /// and settles on the new text.
    pub fn force_set_text(&mut self, text: impl Into<String>) -> ForceSet {
        let text = text.into();
        if self.guard.is_composing() {
            debug!("force set ignored while composing");
            return ForceSet::Ignored;
        }

        let cancelled = self.scheduler.cancel();
        let accepted = self.overflow.apply(&text);
        if accepted.truncated {
            self.listener.on_overflow();
        }
        debug!(cancelled, text = %accepted.text, "force set");

        self.state.collapse_to(accepted.text);
        let len = graphemes::len(self.state.revealed());
        self.show(Display::new(self.state.revealed(), len));
        self.listener.on_settled(self.state.revealed());
        ForceSet::Applied
    }

    /// Stop an in-flight reveal, keeping what is already shown.
    ///
    /// No settle fires for the cancelled animation. No-op when idle.
    pub fn cancel(&mut self) {
        let had_tick = self.scheduler.cancel();
        if !had_tick && !self.state.is_typing() {
            return;
        }
        debug!(dropped = self.state.queue().len(), "reveal cancelled");
        self.state.abandon_reveal();
        let len = graphemes::len(self.state.revealed());
        self.show(Display::new(self.state.revealed(), len));
    }

    /// Run every tick that is due. Returns how many ran.
    pub fn poll(&mut self) -> usize {
        let now = self.clock.now();
        let mut ran = 0;
        while self.scheduler.take_due(now) {
            self.run_tick();
            ran += 1;
        }
        ran
    }

    /// Run the pending tick right away, ignoring its deadline.
    ///
    /// Returns `false` when nothing is pending.
    pub fn tick_now(&mut self) -> bool {
        let now = self.clock.now();
        if !self.scheduler.take_now(now) {
            return false;
        }
        self.run_tick();
        true
    }

    fn run_tick(&mut self) {
        if let Some(ch) = self.state.reveal_next() {
            trace!(ch = %ch, remaining = self.state.queue().len(), "revealed");
            let frame = Display::new(self.state.revealed(), self.state.reveal_cursor());
            self.show(frame);
        }
        if self.state.queue().is_empty() {
            self.finish_reveal();
        }
    }

    fn finish_reveal(&mut self) {
        self.scheduler.cancel();
        if self.state.finish_reveal() {
            warn!(
                confirmed = %self.state.confirmed(),
                "revealed text drifted from confirmed text; snapped back"
            );
        }
        let done = Display::new(self.state.revealed(), self.state.target_cursor());
        self.show(done);
        self.listener.on_settled(self.state.revealed());
    }

    /// Composition began mid-reveal: treat it as a force-set boundary.
    fn collapse_for_composition(&mut self, edit: &RawEdit) {
        self.scheduler.cancel();
        let marked = edit.marked.clone().unwrap_or(0..0);
        let committed = Composition::new(edit.text.clone(), marked).committed();
        let accepted = self.overflow.apply(&committed);
        if accepted.truncated {
            self.listener.on_overflow();
        }
        debug!(
            dropped = self.state.queue().len(),
            text = %accepted.text,
            "reveal collapsed by composition"
        );
        self.state.collapse_to(accepted.text);
    }

    fn show(&mut self, display: Display) {
        self.listener.on_display(&display);
        self.display = display;
    }

    /// Push `display` to the host only if it differs from what the host
    /// already has after `edit`.
    fn show_if_differs(&mut self, display: Display, edit: &RawEdit) {
        if display.text != edit.text || display.cursor != edit.cursor {
            self.show(display);
        } else {
            self.display = display;
        }
    }
}
