//! Gesture Studio - hand gestures in, audio actions out.
//!
//! This is the core library of the gesture performance tool. It turns a live
//! stream of hand-landmark detections into audio actions (drum hits,
//! playback, speed, volume, loop regions) and lets the performer record,
//! label and train a small personal gesture classifier while playing.

pub mod classifier;
pub mod config;
pub mod dispatch;
pub mod features;
pub mod landmarks;
pub mod pipeline;
pub mod recognizer;
pub mod recorder;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "gesture_studio=debug";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_filter`. Calling this again after a
/// subscriber is installed does nothing.
pub fn init_tracing(default_filter: &str) {
    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    match result {
        Ok(()) => tracing::info!("Starting Gesture Studio v{}", env!("CARGO_PKG_VERSION")),
        Err(e) => tracing::debug!("Tracing already initialized: {}", e),
    }
}
