//! Tokio event loop for a single engine.
//!
//! One task, one loop: wait for either the next host event or the engine's
//! next tick deadline, whichever comes first. Every state change happens on
//! this task, so the engine needs no locking. Pair it with `TokioClock` so
//! the deadlines the engine computes line up with tokio's timer (and with
//! `tokio::time::pause()` in tests).

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::engine::{RawEdit, TypewriterEngine};
use crate::listener::EngineListener;

/// Something the host wants the engine to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Edit(RawEdit),
    ForceSet(String),
    Cancel,
}

/// Apply one host event to the engine.
pub fn dispatch<L: EngineListener, C: Clock>(
    engine: &mut TypewriterEngine<L, C>,
    event: HostEvent,
) {
    match event {
        HostEvent::Edit(edit) => {
            engine.on_raw_edit(edit);
        }
        HostEvent::ForceSet(text) => {
            engine.force_set_text(text);
        }
        HostEvent::Cancel => engine.cancel(),
    }
}

/// Let time pass until `until`, running ticks as they fall due.
///
/// For hosts that own their event loop and only need the engine to keep
/// time between their own actions.
pub async fn advance_until<L: EngineListener, C: Clock>(
    engine: &mut TypewriterEngine<L, C>,
    until: Instant,
) {
    while let Some(deadline) = engine.next_deadline().map(Instant::from_std) {
        if deadline > until {
            break;
        }
        sleep_until(deadline).await;
        if !poll_after_deadline(engine) {
            break;
        }
    }
    sleep_until(until).await;
}

/// Run ticks until the engine is idle.
///
/// Returns early if the engine's clock does not follow tokio's timer.
pub async fn settle<L: EngineListener, C: Clock>(engine: &mut TypewriterEngine<L, C>) {
    while let Some(deadline) = engine.next_deadline().map(Instant::from_std) {
        sleep_until(deadline).await;
        if !poll_after_deadline(engine) {
            break;
        }
    }
}

/// Poll once tokio says the deadline has passed. `false` when no tick ran,
/// meaning the engine's clock is behind and waiting again would spin.
fn poll_after_deadline<L: EngineListener, C: Clock>(engine: &mut TypewriterEngine<L, C>) -> bool {
    if engine.poll() > 0 {
        return true;
    }
    warn!(
        pending = engine.pending_chars(),
        "engine clock is behind the timer, not waiting for it"
    );
    false
}

/// Drive `engine` until `events` closes and the last reveal has drained.
pub async fn run<L: EngineListener, C: Clock>(
    engine: &mut TypewriterEngine<L, C>,
    mut events: mpsc::UnboundedReceiver<HostEvent>,
) {
    // set when a passed deadline ran no tick; cleared by the next event
    let mut stalled = false;
    loop {
        let deadline = engine.next_deadline().map(Instant::from_std);
        let timed = deadline.is_some() && !stalled;

        tokio::select! {
            biased;

            event = events.recv() => match event {
                Some(event) => {
                    dispatch(engine, event);
                    stalled = false;
                }
                None => {
                    debug!("host channel closed, draining");
                    break;
                }
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if timed => {
                stalled = !poll_after_deadline(engine);
            }
        }
    }
    settle(engine).await;
}
