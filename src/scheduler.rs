//! Tick and prune cadences.
//!
//! Two drivers share the same contract: ticks fire every `tick_interval`,
//! prune passes every `prune_interval`, the two cadences are independent, and
//! everything runs on one thread so event handling never overlaps a tick.
//!
//! - [`EngineRunner`] runs live on a dedicated thread, multiplexing the input
//!   feed and both timers with `crossbeam_channel::select!`.
//! - [`ManualScheduler`] fires due actions against a [`ManualClock`] for
//!   replays and tests.

use crate::clock::{Clock, ManualClock};
use crate::collector::types::InputEvent;
use crate::collector::TimedInput;
use crate::core::{MetricsSnapshot, PublishedState};
use crate::engine::{EngineError, LoadEngine};
use crossbeam_channel::{bounded, never, select, tick, Receiver, Sender};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::JoinHandle;
use std::time::Duration;

/// Queue depth for snapshot notifications. Older ones are dropped when full.
const UPDATE_CAPACITY: usize = 64;

/// Published state shared between the engine thread and readers.
pub type SharedPublishedState = Arc<RwLock<PublishedState>>;

/// A fixed-interval schedule over a manual timeline.
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    interval_ms: i64,
    next_due_ms: i64,
}

impl Cadence {
    /// First firing is one interval after `start_ms`.
    pub fn new(interval: Duration, start_ms: i64) -> Self {
        let interval_ms = (interval.as_millis() as i64).max(1);
        Self {
            interval_ms,
            next_due_ms: start_ms + interval_ms,
        }
    }

    pub fn next_due_ms(&self) -> i64 {
        self.next_due_ms
    }

    fn advance(&mut self) {
        self.next_due_ms += self.interval_ms;
    }
}

/// A snapshot produced by [`ManualScheduler`], with the time it fired at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledTick {
    pub at_ms: i64,
    pub snapshot: MetricsSnapshot,
}

/// Deterministic driver for an engine running on a [`ManualClock`].
pub struct ManualScheduler {
    clock: ManualClock,
    tick: Cadence,
    prune: Cadence,
}

impl ManualScheduler {
    /// Schedule both cadences from the clock's current time.
    pub fn new(engine: &LoadEngine, clock: ManualClock) -> Self {
        let now = clock.now_ms();
        Self {
            tick: Cadence::new(engine.config().tick_interval, now),
            prune: Cadence::new(engine.config().prune_interval, now),
            clock,
        }
    }

    /// Move the clock to `target_ms`, firing every tick and prune that falls
    /// due on the way, in time order. A tick and a prune due at the same
    /// instant run tick first.
    ///
    /// Returns the ticks that fired.
    pub fn advance_to(&mut self, engine: &mut LoadEngine, target_ms: i64) -> Vec<ScheduledTick> {
        let mut ticks = Vec::new();

        loop {
            let next = self.tick.next_due_ms().min(self.prune.next_due_ms());
            if next > target_ms {
                break;
            }

            self.clock.set(next);
            if self.tick.next_due_ms() <= self.prune.next_due_ms() {
                self.tick.advance();
                if let Some(snapshot) = engine.tick() {
                    ticks.push(ScheduledTick {
                        at_ms: next,
                        snapshot,
                    });
                }
            } else {
                self.prune.advance();
                engine.prune();
            }
        }

        if target_ms > self.clock.now_ms() {
            self.clock.set(target_ms);
        }
        ticks
    }

    /// Advance to an input's timestamp, then deliver it.
    pub fn feed(&mut self, engine: &mut LoadEngine, input: &TimedInput) -> Vec<ScheduledTick> {
        let ticks = self.advance_to(engine, input.timestamp_ms);
        engine.handle(input.event.clone());
        ticks
    }

    pub fn next_tick_ms(&self) -> i64 {
        self.tick.next_due_ms()
    }
}

/// Spawns engines onto their own thread.
pub struct EngineRunner;

impl EngineRunner {
    /// Start `engine` and run it on a new thread, fed by `events`.
    pub fn spawn(
        mut engine: LoadEngine,
        events: Receiver<InputEvent>,
    ) -> Result<RunnerHandle, EngineError> {
        engine.start()?;

        let published: SharedPublishedState = Arc::new(RwLock::new(engine.published()));
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let (update_tx, update_rx) = bounded(UPDATE_CAPACITY);

        let shared = Arc::clone(&published);
        let thread = std::thread::Builder::new()
            .name("load-engine".into())
            .spawn(move || run_loop(engine, events, stop_rx, update_tx, shared))
            .map_err(|e| EngineError::SpawnFailed(e.to_string()))?;

        Ok(RunnerHandle {
            stop_tx: Some(stop_tx),
            thread: Some(thread),
            published,
            updates: update_rx,
        })
    }
}

fn run_loop(
    mut engine: LoadEngine,
    events: Receiver<InputEvent>,
    stop: Receiver<()>,
    updates: Sender<MetricsSnapshot>,
    published: SharedPublishedState,
) -> LoadEngine {
    let ticker = tick(engine.config().tick_interval);
    let pruner = tick(engine.config().prune_interval);
    let mut events = events;

    loop {
        let mut feed_closed = false;

        select! {
            recv(events) -> msg => match msg {
                Ok(event) => {
                    let is_pointer = matches!(event, InputEvent::PointerMove { .. });
                    if engine.handle(event) && is_pointer {
                        let trail = engine.pointer_trail();
                        write_published(&published, |state| state.pointer_trail = trail);
                    }
                }
                Err(_) => feed_closed = true,
            },
            recv(ticker) -> _ => {
                if let Some(snapshot) = engine.tick() {
                    let state = engine.published();
                    write_published(&published, |current| *current = state);
                    let _ = updates.try_send(snapshot);
                }
            },
            recv(pruner) -> _ => {
                engine.prune();
            },
            recv(stop) -> _ => break,
        }

        if feed_closed {
            tracing::debug!("input feed disconnected");
            events = never();
        }
    }

    engine.stop();
    engine
}

fn write_published(published: &SharedPublishedState, update: impl FnOnce(&mut PublishedState)) {
    let mut guard = published.write().unwrap_or_else(PoisonError::into_inner);
    update(&mut guard);
}

/// Control handle for a running engine thread.
pub struct RunnerHandle {
    stop_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<LoadEngine>>,
    published: SharedPublishedState,
    updates: Receiver<MetricsSnapshot>,
}

impl RunnerHandle {
    /// Value copy of the latest published state.
    pub fn published(&self) -> PublishedState {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Snapshots as they are produced, one per tick.
    pub fn updates(&self) -> &Receiver<MetricsSnapshot> {
        &self.updates
    }

    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    /// Stop both cadences and stop listening to the feed, then hand the
    /// stopped engine back. Only the first call returns it; later calls are
    /// no-ops returning `None`.
    pub fn stop(&mut self) -> Option<LoadEngine> {
        let stop_tx = self.stop_tx.take()?;
        let _ = stop_tx.send(());
        drop(stop_tx);

        let thread = self.thread.take()?;
        match thread.join() {
            Ok(engine) => Some(engine),
            Err(_) => {
                tracing::error!("load engine thread panicked");
                None
            }
        }
    }
}

impl Drop for RunnerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
