//! Demonstration of the Synheart Load Engine on a synthetic session.
//!
//! This example shows how to:
//! 1. Drive an engine deterministically with a manual clock
//! 2. Feed it a burst of typing, some pointer movement and a pause
//! 3. Read snapshots, the load history and the telemetry summary
//!
//! Run with: cargo run --example synthetic_session

use std::sync::Arc;

use synheart_load_engine::{
    telemetry::iso_timestamp, Clock, InputEvent, LoadEngine, ManualClock, ManualScheduler,
    TimedInput,
};

/// 2024-01-22T10:00:00Z
const SESSION_START: i64 = 1_705_917_600_000;

fn main() {
    println!("Synheart Load Engine - Synthetic Session Demo");
    println!("=============================================");
    println!();

    let clock = ManualClock::new(SESSION_START);
    let mut engine = LoadEngine::with_defaults(Arc::new(clock.clone()));
    if let Err(e) = engine.start() {
        eprintln!("Error starting engine: {e}");
        return;
    }
    let mut scheduler = ManualScheduler::new(&engine, clock.clone());

    println!("Session ID: {}", engine.telemetry().session_id());
    println!();

    let session = build_session();
    println!("Replaying {} synthetic events...", session.len());
    println!();

    for input in &session {
        for tick in scheduler.feed(&mut engine, input) {
            let s = tick.snapshot;
            println!(
                "[{}] load {:5.2} | volatility {:7.2} | samples {:3} | anomalies {}{}",
                iso_timestamp(tick.at_ms),
                s.load,
                s.volatility,
                s.sample_count,
                s.anomaly_count,
                if s.idle { " | idle" } else { "" }
            );
        }
    }

    // Let the session go quiet long enough to register as idle.
    let end = clock.now_ms() + 7000;
    for tick in scheduler.advance_to(&mut engine, end) {
        println!(
            "[{}] load {:5.2} | idle: {}",
            iso_timestamp(tick.at_ms),
            tick.snapshot.load,
            tick.snapshot.idle
        );
    }

    engine.stop();

    println!();
    println!("Load history ({} ticks):", engine.load_history().len());
    let history: Vec<String> = engine
        .load_history()
        .iter()
        .map(|load| format!("{load:.1}"))
        .collect();
    println!("  {}", history.join(" "));
    println!();
    println!("Pointer trail length: {}", engine.pointer_trail().len());
    println!();
    println!("{}", engine.telemetry().summary(clock.now_ms()));

    match engine.export_csv() {
        Ok(csv) => {
            println!();
            println!("First telemetry rows:");
            for line in csv.lines().take(6) {
                println!("  {line}");
            }
        }
        Err(e) => eprintln!("Export failed: {e}"),
    }
}

/// Steady typing, then a slower hesitant stretch, then pointer movement.
fn build_session() -> Vec<TimedInput> {
    let mut inputs = Vec::new();
    let mut t = SESSION_START + 200;

    let mut push = |t: i64, event: InputEvent| {
        inputs.push(TimedInput {
            timestamp_ms: t,
            event,
        })
    };

    for (i, key) in "the quick brown fox".chars().enumerate() {
        let key = key.to_string();
        let hold = 70 + (i as i64 % 3) * 15;
        push(t, InputEvent::key_down(key.as_str()));
        push(t + hold, InputEvent::key_up(key.as_str()));
        t += 140;
    }

    for (i, key) in "jumps".chars().enumerate() {
        let key = key.to_string();
        let hold = 160 + i as i64 * 40;
        push(t, InputEvent::key_down(key.as_str()));
        push(t + hold, InputEvent::key_up(key.as_str()));
        t += 450;
    }

    for i in 0..60 {
        let x = 400.0 + (i as f64 * 0.3).sin() * 120.0;
        let y = 300.0 + i as f64 * 4.0;
        push(t, InputEvent::pointer_move(x, y));
        t += 16 + (i % 5) * 6;
    }

    inputs.sort_by_key(|input| input.timestamp_ms);
    inputs
}
