//! Configuration schema definitions

use crate::landmarks::{HAND_LANDMARK_COUNT, INDEX_FINGER_TIP};
use crate::utils::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// =============================================================================
// Recognizer
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecognizerConfig {
    /// Initialization attempts before the session is given up on
    pub max_attempts: u32,
    pub num_hands: u32,
    pub model_asset_path: String,
    pub running_mode: String,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            num_hands: 2,
            model_asset_path: "models/gesture_recognizer.task".to_string(),
            running_mode: "VIDEO".to_string(),
        }
    }
}

// =============================================================================
// Frame loop
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameLoopConfig {
    /// Display refresh interval driving the loop
    pub frame_interval_ms: u64,
}

impl Default for FrameLoopConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
        }
    }
}

// =============================================================================
// Recording
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordingConfig {
    /// Hard cap on a recording session
    pub max_duration_ms: u64,
    /// Label used when the user has not typed one
    pub default_label: String,
    /// Landmark used as the per-frame feature
    pub keypoint_index: usize,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            max_duration_ms: 2000,
            default_label: "gestureLabel".to_string(),
            keypoint_index: INDEX_FINGER_TIP,
        }
    }
}

// =============================================================================
// Features
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureConfig {
    pub feats_per_t: usize,
    pub normal_seq_len: usize,
}

impl FeatureConfig {
    /// Length of a windowed feature vector
    pub fn window_len(&self) -> usize {
        self.feats_per_t * self.normal_seq_len
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            feats_per_t: 3,
            normal_seq_len: 10,
        }
    }
}

// =============================================================================
// Training
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub learning_rate: f32,
    /// The one label encoded as class 0; every other label is class 1
    pub sentinel_label: String,
    pub hidden_units: Vec<usize>,
    pub num_classes: usize,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 20,
            learning_rate: 0.05,
            sentinel_label: "gestureLabel".to_string(),
            hidden_units: vec![64, 32],
            num_classes: 4,
            seed: 0x5eed_cafe,
        }
    }
}

// =============================================================================
// UI
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiConfig {
    /// How long the volume readout stays up after the last change
    pub volume_indicator_ms: u64,
    pub idle_status: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            volume_indicator_ms: 3000,
            idle_status: "No hands detected".to_string(),
        }
    }
}

// =============================================================================
// Root
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    pub recognizer: RecognizerConfig,
    pub frame_loop: FrameLoopConfig,
    pub recording: RecordingConfig,
    pub features: FeatureConfig,
    pub training: TrainingConfig,
    pub ui: UiConfig,
}

impl PipelineConfig {
    /// Read a JSON config file and validate it
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;

        tracing::debug!("Loaded pipeline config from {:?}", path);

        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.recognizer.max_attempts == 0 {
            return Err(AppError::Config("recognizer.maxAttempts must be at least 1".into()));
        }
        if self.frame_loop.frame_interval_ms == 0 {
            return Err(AppError::Config("frameLoop.frameIntervalMs must be positive".into()));
        }
        if self.recording.keypoint_index >= HAND_LANDMARK_COUNT {
            return Err(AppError::Config(format!(
                "recording.keypointIndex must be below {}",
                HAND_LANDMARK_COUNT
            )));
        }
        if self.features.feats_per_t == 0 || self.features.normal_seq_len == 0 {
            return Err(AppError::Config("features window must be non-empty".into()));
        }
        if self.features.feats_per_t > 3 {
            return Err(AppError::Config("features.featsPerT is at most 3 (x, y, z)".into()));
        }
        if self.training.epochs == 0 {
            return Err(AppError::Config("training.epochs must be at least 1".into()));
        }
        if self.training.num_classes < 2 {
            return Err(AppError::Config("training.numClasses must be at least 2".into()));
        }
        if !(self.training.learning_rate.is_finite() && self.training.learning_rate > 0.0) {
            return Err(AppError::Config("training.learningRate must be positive".into()));
        }
        Ok(())
    }
}
