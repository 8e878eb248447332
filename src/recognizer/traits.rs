//! Recognizer trait definitions
//!
//! The vision model is a black box: given a frame and a strictly increasing
//! timestamp it returns zero or more hands.

use crate::config::RecognizerConfig;
use crate::landmarks::DetectionFrame;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One video frame handed to the recognizer
#[derive(Debug, Clone, Default)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    /// RGBA pixel data
    pub data: Vec<u8>,
}

/// Live video input
pub trait VideoSource: Send {
    /// `(0, 0)` until the source has loaded
    fn dimensions(&self) -> (u32, u32);
    fn current_frame(&mut self) -> VideoFrame;
}

/// Options passed to the recognizer on construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizerOptions {
    pub num_hands: u32,
    pub running_mode: String,
    pub model_asset_path: String,
}

impl From<&RecognizerConfig> for RecognizerOptions {
    fn from(config: &RecognizerConfig) -> Self {
        Self {
            num_hands: config.num_hands,
            running_mode: config.running_mode.clone(),
            model_asset_path: config.model_asset_path.clone(),
        }
    }
}

/// A constructed hand landmark recognizer
#[async_trait]
pub trait Recognizer: Send {
    /// Detect hands in `frame`. `timestamp_ms` must increase on every call.
    async fn recognize_for_video(
        &mut self,
        frame: &VideoFrame,
        timestamp_ms: i64,
    ) -> anyhow::Result<DetectionFrame>;
}

/// Resolves model assets and builds a recognizer
#[async_trait]
pub trait RecognizerFactory: Send + Sync {
    async fn create(&self, options: &RecognizerOptions) -> anyhow::Result<Box<dyn Recognizer>>;
}
