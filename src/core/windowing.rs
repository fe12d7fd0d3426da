//! Window extraction.
//!
//! Each tick looks at a sliding window `[now - window, now]` over the event
//! buffers. Both bounds are inclusive.

use crate::collector::types::{KeyEvent, PointerSample};
use crate::core::buffers::EventBuffers;

/// The events that fall inside one extraction window.
#[derive(Debug, Clone, Default)]
pub struct EventWindow {
    /// Window start in Unix milliseconds
    pub start: i64,
    /// Window end in Unix milliseconds
    pub end: i64,
    /// Key transitions in arrival order
    pub key_events: Vec<KeyEvent>,
    /// Pointer samples in arrival order
    pub pointer_samples: Vec<PointerSample>,
}

impl EventWindow {
    /// Slice the buffers down to the window ending at `now`.
    pub fn extract(buffers: &EventBuffers, now: i64, window_ms: i64) -> Self {
        let start = now - window_ms;
        Self {
            start,
            end: now,
            key_events: buffers
                .keys
                .in_window(start, now)
                .into_iter()
                .cloned()
                .collect(),
            pointer_samples: buffers
                .pointer
                .in_window(start, now)
                .into_iter()
                .copied()
                .collect(),
        }
    }

    /// Total number of events in the window.
    pub fn event_count(&self) -> usize {
        self.key_events.len() + self.pointer_samples.len()
    }
}
