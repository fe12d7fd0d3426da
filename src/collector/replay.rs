//! Recorded input sessions.
//!
//! A recording is a JSON-lines file where every line is an [`InputEvent`]
//! plus the millisecond timestamp it arrived at:
//!
//! ```text
//! {"timestamp_ms": 0, "type": "key_down", "key": "a"}
//! {"timestamp_ms": 120, "type": "key_up", "key": "a"}
//! {"timestamp_ms": 130, "type": "pointer_move", "x": 10.0, "y": 4.0}
//! ```

use crate::collector::types::InputEvent;
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::path::Path;

/// An input event paired with its arrival time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedInput {
    pub timestamp_ms: i64,
    #[serde(flatten)]
    pub event: InputEvent,
}

/// Errors while reading a recording.
#[derive(Debug)]
pub enum ReplayError {
    IoError(String),
    ParseError { line: usize, message: String },
}

impl std::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplayError::IoError(e) => write!(f, "IO error: {e}"),
            ReplayError::ParseError { line, message } => {
                write!(f, "Parse error on line {line}: {message}")
            }
        }
    }
}

impl std::error::Error for ReplayError {}

/// Parse a recording from any buffered reader.
///
/// Blank lines are skipped. Events are returned sorted by timestamp; the sort
/// is stable so same-millisecond events keep their file order.
pub fn parse_recording<R: BufRead>(reader: R) -> Result<Vec<TimedInput>, ReplayError> {
    let mut events = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| ReplayError::IoError(e.to_string()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let event: TimedInput =
            serde_json::from_str(trimmed).map_err(|e| ReplayError::ParseError {
                line: index + 1,
                message: e.to_string(),
            })?;
        events.push(event);
    }

    events.sort_by_key(|e| e.timestamp_ms);
    Ok(events)
}

/// Read a recording from disk.
pub fn load_recording(path: &Path) -> Result<Vec<TimedInput>, ReplayError> {
    let file = std::fs::File::open(path).map_err(|e| ReplayError::IoError(e.to_string()))?;
    parse_recording(std::io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recording() {
        let input = r#"
{"timestamp_ms": 120, "type": "key_up", "key": "a"}
{"timestamp_ms": 0, "type": "key_down", "key": "a"}

{"timestamp_ms": 130, "type": "pointer_move", "x": 10.0, "y": 4.0}
"#;
        let events = parse_recording(input.as_bytes()).unwrap();

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].timestamp_ms, 0);
        assert_eq!(events[0].event, InputEvent::key_down("a"));
        assert_eq!(events[2].event, InputEvent::pointer_move(10.0, 4.0));
    }

    #[test]
    fn test_parse_error_reports_line() {
        let input = "{\"timestamp_ms\": 0, \"type\": \"key_down\", \"key\": \"a\"}\nnot json\n";
        match parse_recording(input.as_bytes()) {
            Err(ReplayError::ParseError { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
