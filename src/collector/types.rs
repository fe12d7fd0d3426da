//! Input event types consumed by the load engine.
//!
//! Raw capture is done elsewhere; these are the already-normalized events of
//! the push feed, and the timestamped records the engine keeps in its buffers.

use serde::{Deserialize, Serialize};

/// A raw input event as delivered by the feed.
///
/// Events carry no timestamp of their own: the engine stamps them with its
/// clock on arrival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    KeyDown { key: String },
    KeyUp { key: String },
    PointerMove { x: f64, y: f64 },
}

impl InputEvent {
    pub fn key_down(key: impl Into<String>) -> Self {
        InputEvent::KeyDown { key: key.into() }
    }

    pub fn key_up(key: impl Into<String>) -> Self {
        InputEvent::KeyUp { key: key.into() }
    }

    pub fn pointer_move(x: f64, y: f64) -> Self {
        InputEvent::PointerMove { x, y }
    }
}

/// Direction of a key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyTransition {
    Press,
    Release,
}

/// A recorded key transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Arrival time in Unix milliseconds
    pub timestamp: i64,
    pub transition: KeyTransition,
    pub key: String,
}

impl KeyEvent {
    pub fn press(timestamp: i64, key: impl Into<String>) -> Self {
        Self {
            timestamp,
            transition: KeyTransition::Press,
            key: key.into(),
        }
    }

    pub fn release(timestamp: i64, key: impl Into<String>) -> Self {
        Self {
            timestamp,
            transition: KeyTransition::Release,
            key: key.into(),
        }
    }

    pub fn is_press(&self) -> bool {
        self.transition == KeyTransition::Press
    }
}

/// A recorded pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    /// Arrival time in Unix milliseconds
    pub timestamp: i64,
    pub x: f64,
    pub y: f64,
}

impl PointerSample {
    pub fn new(timestamp: i64, x: f64, y: f64) -> Self {
        Self { timestamp, x, y }
    }

    /// Euclidean distance to another sample.
    pub fn distance_to(&self, other: &PointerSample) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Anything stored in an event buffer.
pub trait Timestamped {
    fn timestamp(&self) -> i64;
}

impl Timestamped for KeyEvent {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

impl Timestamped for PointerSample {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}
