//! Input collection for the Synheart Load Engine.
//!
//! Raw OS capture lives outside this crate. This module defines the event
//! types of the push feed, the feed itself, and recorded sessions for replay.

pub mod feed;
pub mod replay;
pub mod types;

// Re-export commonly used types
pub use feed::{FeedError, FeedSender, InputFeed, DEFAULT_FEED_CAPACITY};
pub use replay::{load_recording, parse_recording, ReplayError, TimedInput};
pub use types::{InputEvent, KeyEvent, KeyTransition, PointerSample, Timestamped};
