//! Integration tests for the threaded engine runner.

use std::sync::Arc;
use std::thread;
use std::time::Duration;
use synheart_load_engine::{
    EngineConfig, EngineRunner, EngineState, InputEvent, InputFeed, LoadEngine, SystemClock,
};

fn fast_config() -> EngineConfig {
    EngineConfig {
        tick_interval: Duration::from_millis(20),
        prune_interval: Duration::from_millis(200),
        ..EngineConfig::default()
    }
}

fn spawn_fast() -> (InputFeed, synheart_load_engine::RunnerHandle) {
    let mut feed = InputFeed::with_capacity(1024);
    feed.start().unwrap();

    let engine = LoadEngine::new(fast_config(), Arc::new(SystemClock)).unwrap();
    let runner = EngineRunner::spawn(engine, feed.receiver().clone()).unwrap();
    (feed, runner)
}

#[test]
fn test_runner_publishes_snapshots() {
    let (feed, mut runner) = spawn_fast();
    let sender = feed.sender();

    assert!(sender.push(InputEvent::key_down("a")));
    thread::sleep(Duration::from_millis(15));
    assert!(sender.push(InputEvent::key_up("a")));

    let snapshot = runner
        .updates()
        .recv_timeout(Duration::from_secs(2))
        .expect("runner should publish a snapshot");
    assert!(snapshot.load >= 0.0 && snapshot.load <= 100.0);
    assert!(!snapshot.idle);

    thread::sleep(Duration::from_millis(60));
    let published = runner.published();
    assert!(!published.load_history.is_empty());

    let engine = runner.stop().expect("first stop returns the engine");
    assert_eq!(engine.state(), EngineState::Stopped);
    assert_eq!(engine.telemetry().stats(engine.now_ms()).key_downs, 1);
    assert_eq!(engine.telemetry().stats(engine.now_ms()).key_ups, 1);
}

#[test]
fn test_pointer_trail_published_between_ticks() {
    let mut feed = InputFeed::new();
    feed.start().unwrap();

    let config = EngineConfig {
        tick_interval: Duration::from_secs(60),
        ..EngineConfig::default()
    };
    let engine = LoadEngine::new(config, Arc::new(SystemClock)).unwrap();
    let mut runner = EngineRunner::spawn(engine, feed.receiver().clone()).unwrap();

    let sender = feed.sender();
    for i in 0..5 {
        sender.push(InputEvent::pointer_move(i as f64, 0.0));
    }

    let mut trail_len = 0;
    for _ in 0..100 {
        trail_len = runner.published().pointer_trail.len();
        if trail_len == 5 {
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(trail_len, 5);
    assert!(runner.published().load_history.is_empty());

    runner.stop();
}

#[test]
fn test_stop_twice_returns_engine_once() {
    let (_feed, mut runner) = spawn_fast();
    assert!(runner.is_running());

    assert!(runner.stop().is_some());
    assert!(!runner.is_running());
    assert!(runner.stop().is_none());
}

#[test]
fn test_no_publication_after_stop() {
    let (mut feed, mut runner) = spawn_fast();
    let sender = feed.sender();
    sender.push(InputEvent::key_down("a"));

    let engine = runner.stop().unwrap();
    let records = engine.telemetry().len();
    let published = runner.published();

    // Pushes still succeed into the queue, but nothing consumes them.
    sender.push(InputEvent::key_up("a"));
    thread::sleep(Duration::from_millis(60));

    assert_eq!(runner.published(), published);
    assert_eq!(engine.telemetry().len(), records);

    feed.stop();
    assert!(!sender.push(InputEvent::key_down("b")));
}

#[test]
fn test_runner_survives_closed_feed() {
    let feed = InputFeed::new();
    let engine = LoadEngine::new(fast_config(), Arc::new(SystemClock)).unwrap();
    let mut runner = EngineRunner::spawn(engine, feed.receiver().clone()).unwrap();

    // Dropping the feed disconnects the channel; ticks keep coming.
    drop(feed);
    assert!(runner
        .updates()
        .recv_timeout(Duration::from_secs(2))
        .is_ok());

    assert!(runner.stop().is_some());
}

#[test]
fn test_spawn_rejects_started_engine() {
    let feed = InputFeed::new();
    let mut engine = LoadEngine::new(fast_config(), Arc::new(SystemClock)).unwrap();
    engine.start().unwrap();

    assert!(EngineRunner::spawn(engine, feed.receiver().clone()).is_err());
}
