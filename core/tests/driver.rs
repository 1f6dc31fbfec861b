//! Integration tests for the tokio driver.
//!
//! Time is paused, so sleeps inside the driver resolve instantly in virtual
//! time and reveal timings can be asserted exactly.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use typewriter_core::driver::{self, HostEvent};
use typewriter_core::{
    Config, ManualClock, RawEdit, RecordingListener, TokioClock, TypewriterEngine,
};

const DELAY: Duration = Duration::from_millis(50);

fn engine() -> TypewriterEngine<RecordingListener, TokioClock> {
    let config = Config {
        character_delay: DELAY.as_secs_f64(),
        max_length: None,
    };
    TypewriterEngine::with_clock(config, RecordingListener::new(), TokioClock).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_drains_after_channel_closes() {
    let mut engine = engine();
    let (tx, rx) = mpsc::unbounded_channel();

    tx.send(HostEvent::Edit(RawEdit::at_end("hello"))).unwrap();
    drop(tx);

    let start = Instant::now();
    driver::run(&mut engine, rx).await;

    assert_eq!(engine.revealed_text(), "hello");
    assert_eq!(engine.listener().settled(), vec!["hello"]);
    assert_eq!(engine.tick_count(), 5);
    // N characters take N delays
    assert!(start.elapsed() >= DELAY * 5);
    assert!(start.elapsed() < DELAY * 6);
}

#[tokio::test(start_paused = true)]
async fn test_force_set_mid_reveal() {
    let mut engine = engine();
    let (tx, rx) = mpsc::unbounded_channel();

    let host = async move {
        tx.send(HostEvent::Edit(RawEdit::at_end("hello"))).unwrap();
        tokio::time::sleep(DELAY * 2 + DELAY / 2).await;
        tx.send(HostEvent::ForceSet("bye".to_string())).unwrap();
    };

    let ((), ()) = tokio::join!(driver::run(&mut engine, rx), host);

    assert_eq!(engine.revealed_text(), "bye");
    assert_eq!(engine.confirmed_text(), "bye");
    assert_eq!(engine.tick_count(), 2);
    assert_eq!(engine.listener().settled(), vec!["bye"]);
}

#[tokio::test(start_paused = true)]
async fn test_edits_while_typing_are_dropped() {
    let mut engine = engine();
    let (tx, rx) = mpsc::unbounded_channel();

    let host = async move {
        tx.send(HostEvent::Edit(RawEdit::at_end("abc"))).unwrap();
        tokio::time::sleep(DELAY + DELAY / 2).await;
        // host thinks it appended to "a" but a reveal is in flight
        tx.send(HostEvent::Edit(RawEdit::at_end("aZ"))).unwrap();
        tokio::time::sleep(DELAY * 4).await;
        // idle again: accepted
        tx.send(HostEvent::Edit(RawEdit::at_end("abcd"))).unwrap();
    };

    let ((), ()) = tokio::join!(driver::run(&mut engine, rx), host);

    assert_eq!(engine.revealed_text(), "abcd");
    assert_eq!(engine.listener().settled(), vec!["abc", "abcd"]);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_reveal() {
    let mut engine = engine();
    let (tx, rx) = mpsc::unbounded_channel();

    let host = async move {
        tx.send(HostEvent::Edit(RawEdit::at_end("typewriter"))).unwrap();
        tokio::time::sleep(DELAY * 3 + DELAY / 2).await;
        tx.send(HostEvent::Cancel).unwrap();
        tx.send(HostEvent::Cancel).unwrap();
    };

    let ((), ()) = tokio::join!(driver::run(&mut engine, rx), host);

    assert_eq!(engine.revealed_text(), "typ");
    assert_eq!(engine.confirmed_text(), "typ");
    assert!(engine.listener().settled().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_advance_until_runs_due_ticks_only() {
    let mut engine = engine();
    driver::dispatch(&mut engine, HostEvent::Edit(RawEdit::at_end("hello")));

    let start = Instant::now();
    driver::advance_until(&mut engine, start + DELAY * 2 + DELAY / 2).await;

    assert_eq!(engine.revealed_text(), "he");
    assert!(engine.is_typing());
    assert!(start.elapsed() >= DELAY * 2 + DELAY / 2);
    assert!(start.elapsed() < DELAY * 3);

    driver::settle(&mut engine).await;
    assert_eq!(engine.revealed_text(), "hello");
    assert_eq!(engine.listener().settled(), vec!["hello"]);
    assert!(engine.next_deadline().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_settle_when_idle_returns_at_once() {
    let mut engine = engine();
    driver::dispatch(&mut engine, HostEvent::ForceSet("done".to_string()));

    let start = Instant::now();
    driver::settle(&mut engine).await;
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(engine.tick_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_frozen_clock_does_not_hang() {
    let config = Config {
        character_delay: DELAY.as_secs_f64(),
        max_length: None,
    };
    let clock = ManualClock::new();
    let mut engine =
        TypewriterEngine::with_clock(config, RecordingListener::new(), clock.clone()).unwrap();
    driver::dispatch(&mut engine, HostEvent::Edit(RawEdit::at_end("abc")));

    driver::settle(&mut engine).await;
    driver::advance_until(&mut engine, Instant::now() + DELAY * 4).await;

    let (tx, rx) = mpsc::unbounded_channel();
    drop(tx);
    driver::run(&mut engine, rx).await;

    // nothing ran: the engine's own clock never moved
    assert!(engine.is_typing());
    assert_eq!(engine.revealed_text(), "");

    clock.advance(DELAY * 3);
    driver::settle(&mut engine).await;
    assert_eq!(engine.revealed_text(), "abc");
    assert_eq!(engine.listener().settled(), vec!["abc"]);
}
