//! Monotonic millisecond timestamps for the recognizer
//!
//! Video-mode recognizers reject a timestamp that does not increase, so two
//! frames landing in the same millisecond still get distinct values.

use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct Timebase {
    origin: Instant,
    last_ms: Option<i64>,
}

impl Timebase {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            last_ms: None,
        }
    }

    /// Milliseconds since creation, bumped past the previous value if needed
    pub fn next_timestamp_ms(&mut self) -> i64 {
        let now = self.origin.elapsed().as_millis() as i64;
        let timestamp = match self.last_ms {
            Some(last) if now <= last => last + 1,
            _ => now,
        };
        self.last_ms = Some(timestamp);
        timestamp
    }
}

impl Default for Timebase {
    fn default() -> Self {
        Self::new()
    }
}
