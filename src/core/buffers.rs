//! Age-bounded event buffers.
//!
//! Two retention policies apply independently:
//! - time: [`EventBuffer::prune`] drops everything at or before a cutoff;
//! - capacity: a buffer with a [`CapacityCap`] truncates itself to its low
//!   water mark, keeping the newest entries, as soon as it grows past its
//!   high water mark.

use crate::collector::types::{KeyEvent, PointerSample, Timestamped};
use std::collections::VecDeque;

/// Hard size limit for a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityCap {
    pub high_water: usize,
    pub low_water: usize,
}

/// An append-only sequence of timestamped events, in arrival order.
#[derive(Debug, Clone)]
pub struct EventBuffer<T> {
    events: VecDeque<T>,
    cap: Option<CapacityCap>,
}

impl<T: Timestamped> EventBuffer<T> {
    /// A buffer bounded only by time-based pruning.
    pub fn new() -> Self {
        Self {
            events: VecDeque::new(),
            cap: None,
        }
    }

    /// A buffer that also enforces a capacity cap.
    pub fn with_cap(cap: CapacityCap) -> Self {
        Self {
            events: VecDeque::new(),
            cap: Some(cap),
        }
    }

    /// Append an event. Returns the number of entries evicted by the cap.
    pub fn record(&mut self, event: T) -> usize {
        self.events.push_back(event);

        match self.cap {
            Some(cap) if self.events.len() > cap.high_water => {
                let excess = self.events.len() - cap.low_water;
                self.events.drain(..excess);
                excess
            }
            _ => 0,
        }
    }

    /// Remove all entries with `timestamp <= cutoff`. Returns how many went.
    pub fn prune(&mut self, cutoff: i64) -> usize {
        let before = self.events.len();
        self.events.retain(|e| e.timestamp() > cutoff);
        before - self.events.len()
    }

    /// Entries with `start <= timestamp <= end`, in arrival order.
    pub fn in_window(&self, start: i64, end: i64) -> Vec<&T> {
        self.events
            .iter()
            .filter(|e| {
                let ts = e.timestamp();
                ts >= start && ts <= end
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<T: Timestamped> Default for EventBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The engine's two input buffers.
#[derive(Debug, Clone)]
pub struct EventBuffers {
    pub keys: EventBuffer<KeyEvent>,
    pub pointer: EventBuffer<PointerSample>,
}

impl EventBuffers {
    pub fn new(pointer_cap: CapacityCap) -> Self {
        Self {
            keys: EventBuffer::new(),
            pointer: EventBuffer::with_cap(pointer_cap),
        }
    }

    /// Prune both buffers. Returns `(keys_removed, pointer_removed)`.
    pub fn prune(&mut self, cutoff: i64) -> (usize, usize) {
        (self.keys.prune(cutoff), self.pointer.prune(cutoff))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_removes_at_and_before_cutoff() {
        let mut buffer = EventBuffer::new();
        for ts in [0, 100, 200, 300] {
            buffer.record(PointerSample::new(ts, 0.0, 0.0));
        }

        assert_eq!(buffer.prune(100), 2);
        assert_eq!(buffer.len(), 2);
        let kept: Vec<i64> = buffer
            .in_window(i64::MIN, i64::MAX)
            .iter()
            .map(|e| e.timestamp)
            .collect();
        assert_eq!(kept, vec![200, 300]);
    }

    #[test]
    fn test_capacity_cap_keeps_newest() {
        let mut buffer = EventBuffer::with_cap(CapacityCap {
            high_water: 10,
            low_water: 5,
        });

        for ts in 0..10 {
            assert_eq!(buffer.record(PointerSample::new(ts, 0.0, 0.0)), 0);
        }
        assert_eq!(buffer.len(), 10);

        assert_eq!(buffer.record(PointerSample::new(10, 0.0, 0.0)), 6);
        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.in_window(0, 5).len(), 0);
        assert_eq!(buffer.in_window(6, 10).len(), 5);
    }

    #[test]
    fn test_in_window_is_inclusive() {
        let mut buffer = EventBuffer::new();
        for ts in [0, 500, 1000, 1001] {
            buffer.record(KeyEvent::press(ts, "a"));
        }

        let window: Vec<i64> = buffer
            .in_window(0, 1000)
            .iter()
            .map(|e| e.timestamp)
            .collect();
        assert_eq!(window, vec![0, 500, 1000]);
    }
}
