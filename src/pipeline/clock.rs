//! Frame pacing

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};

/// Wakes the frame loop once per display refresh
#[async_trait]
pub trait FrameClock: Send {
    async fn next_frame(&mut self);
}

/// Fixed-period clock. A slow frame drops the ticks it overran instead of
/// bursting to catch up.
pub struct IntervalClock {
    interval: Interval,
}

impl IntervalClock {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }
}

#[async_trait]
impl FrameClock for IntervalClock {
    async fn next_frame(&mut self) {
        self.interval.tick().await;
    }
}
