//! Idle detection based on time since the last raw input.

#[derive(Debug, Clone)]
pub struct IdleDetector {
    threshold_ms: i64,
    last_activity_ms: i64,
}

impl IdleDetector {
    pub fn new(threshold_ms: i64, now_ms: i64) -> Self {
        Self {
            threshold_ms,
            last_activity_ms: now_ms,
        }
    }

    /// Note raw input at `now_ms`. Ticks must not call this.
    pub fn touch(&mut self, now_ms: i64) {
        self.last_activity_ms = now_ms;
    }

    pub fn is_idle(&self, now_ms: i64) -> bool {
        now_ms - self.last_activity_ms > self.threshold_ms
    }
}
