//! Push-style input feed.
//!
//! Platform capture code (or a test, or the CLI's stdin reader) pushes
//! normalized [`InputEvent`]s through a [`FeedSender`]; the engine side drains
//! the receiver. While the feed is stopped, pushes are discarded, which is how
//! "deregistering listeners" looks from the producer's side.

use crate::collector::types::InputEvent;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Default queue depth between producers and the engine.
pub const DEFAULT_FEED_CAPACITY: usize = 10_000;

/// Errors that can occur when controlling the feed.
#[derive(Debug)]
pub enum FeedError {
    AlreadyRunning,
}

impl std::fmt::Display for FeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedError::AlreadyRunning => write!(f, "Input feed is already running"),
        }
    }
}

impl std::error::Error for FeedError {}

#[derive(Debug, Default)]
struct FeedState {
    running: AtomicBool,
    dropped: AtomicU64,
}

/// Producer handle for the feed. Cheap to clone.
#[derive(Debug, Clone)]
pub struct FeedSender {
    sender: Sender<InputEvent>,
    state: Arc<FeedState>,
}

impl FeedSender {
    /// Push an event without blocking.
    ///
    /// Returns `false` if the event was discarded because the feed is stopped,
    /// full, or the engine side has gone away.
    pub fn push(&self, event: InputEvent) -> bool {
        if !self.state.running.load(Ordering::SeqCst) {
            return false;
        }

        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                let dropped = self.state.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                if dropped.is_power_of_two() {
                    tracing::warn!(dropped, "input feed full, dropping events");
                }
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// The engine-facing end of the input feed.
pub struct InputFeed {
    sender: Sender<InputEvent>,
    receiver: Receiver<InputEvent>,
    state: Arc<FeedState>,
}

impl InputFeed {
    /// Create a feed with the default queue depth.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_FEED_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            state: Arc::new(FeedState::default()),
        }
    }

    /// Start accepting events from producers.
    pub fn start(&mut self) -> Result<(), FeedError> {
        if self.state.running.swap(true, Ordering::SeqCst) {
            return Err(FeedError::AlreadyRunning);
        }
        Ok(())
    }

    /// Stop accepting events. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.state.running.store(false, Ordering::SeqCst);
    }

    /// Check if the feed is currently accepting events.
    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::SeqCst)
    }

    /// Get a producer handle.
    pub fn sender(&self) -> FeedSender {
        FeedSender {
            sender: self.sender.clone(),
            state: Arc::clone(&self.state),
        }
    }

    /// Get the receiver for input events.
    pub fn receiver(&self) -> &Receiver<InputEvent> {
        &self.receiver
    }

    /// Try to receive an event without blocking.
    pub fn try_recv(&self) -> Option<InputEvent> {
        self.receiver.try_recv().ok()
    }

    /// Number of events discarded because the queue was full.
    pub fn dropped_count(&self) -> u64 {
        self.state.dropped.load(Ordering::Relaxed)
    }
}

impl Default for InputFeed {
    fn default() -> Self {
        Self::new()
    }
}
