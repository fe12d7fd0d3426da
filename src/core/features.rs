//! Feature computation from an extraction window.
//!
//! A window yields four raw feature lists: key dwell times, key flight times,
//! pointer inter-sample intervals and pointer acceleration magnitudes. All
//! times are in milliseconds.

use crate::collector::types::{KeyEvent, PointerSample};
use crate::core::stats::{mean, population_variance};
use crate::core::windowing::EventWindow;
use serde::{Deserialize, Serialize};

/// Raw per-window feature lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowFeatures {
    /// Press-to-release durations of matched key presses
    pub dwell_times: Vec<f64>,
    /// Gaps between consecutive key presses
    pub flight_times: Vec<f64>,
    /// Gaps between consecutive pointer samples
    pub pointer_intervals: Vec<f64>,
    /// |d2 - d1| over consecutive pointer displacements
    pub pointer_accelerations: Vec<f64>,
}

/// Scalar summary of a window's features.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSummary {
    pub mean_dwell: f64,
    pub mean_flight: f64,
    pub mean_pointer_interval: f64,
    pub pointer_acceleration_variance: f64,
}

impl WindowFeatures {
    /// Reduce the feature lists to the four aggregates the composite uses.
    pub fn summary(&self) -> FeatureSummary {
        FeatureSummary {
            mean_dwell: mean(&self.dwell_times),
            mean_flight: mean(&self.flight_times),
            mean_pointer_interval: mean(&self.pointer_intervals),
            pointer_acceleration_variance: population_variance(&self.pointer_accelerations),
        }
    }
}

/// Compute all features from an event window.
pub fn compute_features(window: &EventWindow) -> WindowFeatures {
    let presses: Vec<&KeyEvent> = window.key_events.iter().filter(|e| e.is_press()).collect();
    let releases: Vec<&KeyEvent> = window.key_events.iter().filter(|e| !e.is_press()).collect();

    WindowFeatures {
        dwell_times: compute_dwell_times(&presses, &releases),
        flight_times: compute_flight_times(&presses),
        pointer_intervals: compute_pointer_intervals(&window.pointer_samples),
        pointer_accelerations: compute_pointer_accelerations(&window.pointer_samples),
    }
}

/// Pair every press with the first release of the same key that comes after it.
///
/// The match is the first qualifying entry in release order, not necessarily
/// the nearest one, so fast repeats of one key can pair with the same release.
/// Presses without a later release contribute nothing.
fn compute_dwell_times(presses: &[&KeyEvent], releases: &[&KeyEvent]) -> Vec<f64> {
    presses
        .iter()
        .filter_map(|press| {
            releases
                .iter()
                .find(|release| release.key == press.key && release.timestamp > press.timestamp)
                .map(|release| (release.timestamp - press.timestamp) as f64)
        })
        .collect()
}

/// Gaps between consecutive presses, regardless of key.
fn compute_flight_times(presses: &[&KeyEvent]) -> Vec<f64> {
    presses
        .windows(2)
        .map(|pair| (pair[1].timestamp - pair[0].timestamp) as f64)
        .collect()
}

fn compute_pointer_intervals(samples: &[PointerSample]) -> Vec<f64> {
    samples
        .windows(2)
        .map(|pair| (pair[1].timestamp - pair[0].timestamp) as f64)
        .collect()
}

/// Change in displacement magnitude across each run of three samples.
fn compute_pointer_accelerations(samples: &[PointerSample]) -> Vec<f64> {
    samples
        .windows(3)
        .map(|run| {
            let d1 = run[0].distance_to(&run[1]);
            let d2 = run[1].distance_to(&run[2]);
            (d2 - d1).abs()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(keys: Vec<KeyEvent>, pointer: Vec<PointerSample>) -> EventWindow {
        EventWindow {
            start: 0,
            end: 1000,
            key_events: keys,
            pointer_samples: pointer,
        }
    }

    #[test]
    fn test_single_dwell_pair() {
        let w = window(
            vec![KeyEvent::press(0, "a"), KeyEvent::release(120, "a")],
            vec![],
        );
        let features = compute_features(&w);

        assert_eq!(features.dwell_times, vec![120.0]);
        assert!(features.flight_times.is_empty());
        assert_eq!(features.summary().mean_dwell, 120.0);
    }

    #[test]
    fn test_unmatched_press_is_ignored() {
        let w = window(
            vec![
                KeyEvent::press(0, "a"),
                KeyEvent::press(50, "b"),
                KeyEvent::release(90, "b"),
            ],
            vec![],
        );
        let features = compute_features(&w);

        assert_eq!(features.dwell_times, vec![40.0]);
        assert_eq!(features.flight_times, vec![50.0]);
    }

    #[test]
    fn test_dwell_uses_first_later_release() {
        // Double tap of "a": both presses pair with the first release after them.
        let w = window(
            vec![
                KeyEvent::press(0, "a"),
                KeyEvent::press(30, "a"),
                KeyEvent::release(60, "a"),
                KeyEvent::release(200, "a"),
            ],
            vec![],
        );
        let features = compute_features(&w);

        assert_eq!(features.dwell_times, vec![60.0, 30.0]);
    }

    #[test]
    fn test_release_at_same_timestamp_does_not_match() {
        let w = window(
            vec![KeyEvent::release(10, "a"), KeyEvent::press(10, "a")],
            vec![],
        );
        assert!(compute_features(&w).dwell_times.is_empty());
    }

    #[test]
    fn test_two_pointer_samples() {
        let w = window(
            vec![],
            vec![
                PointerSample::new(0, 0.0, 0.0),
                PointerSample::new(50, 10.0, 0.0),
            ],
        );
        let features = compute_features(&w);

        assert_eq!(features.pointer_intervals, vec![50.0]);
        assert!(features.pointer_accelerations.is_empty());
        assert_eq!(features.summary().pointer_acceleration_variance, 0.0);
    }

    #[test]
    fn test_pointer_accelerations() {
        let w = window(
            vec![],
            vec![
                PointerSample::new(0, 0.0, 0.0),
                PointerSample::new(10, 3.0, 4.0),
                PointerSample::new(20, 3.0, 16.0),
                PointerSample::new(30, 3.0, 17.0),
            ],
        );
        let features = compute_features(&w);

        assert_eq!(features.pointer_intervals.len(), 3);
        assert_eq!(features.pointer_accelerations.len(), 2);
        assert!((features.pointer_accelerations[0] - 7.0).abs() < 1e-9);
        assert!((features.pointer_accelerations[1] - 11.0).abs() < 1e-9);
        assert!((features.summary().pointer_acceleration_variance - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_window_summary_is_zero() {
        let summary = compute_features(&EventWindow::default()).summary();
        assert_eq!(summary, FeatureSummary::default());
    }
}
