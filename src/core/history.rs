//! Fixed-length FIFO series for published state (load history, pointer trail).

use serde::Serialize;
use std::collections::VecDeque;

#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct BoundedSeries<T> {
    items: VecDeque<T>,
    #[serde(skip)]
    capacity: usize,
}

impl<T: Clone> BoundedSeries<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append, dropping the oldest entry once the series is full.
    pub fn push(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    /// Value copy, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}
