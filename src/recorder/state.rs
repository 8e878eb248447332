//! Recording state management
//!
//! Defines the recording state machine, the live session buffer and the
//! labeled examples it produces.

use crate::features::FeatureVector;
use crate::utils::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

/// Current state of the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// No recording in progress
    Idle,
    /// Capturing frames
    Recording,
}

impl Default for RecordingState {
    fn default() -> Self {
        Self::Idle
    }
}

/// The active capture buffer. Exists only while recording.
#[derive(Debug, Clone)]
pub struct RecordingSession {
    /// Correlates auto-stop deadlines with the session that armed them
    pub id: Uuid,
    pub started_at: Instant,
    /// One per-frame feature per captured frame, in arrival order
    pub frames: Vec<FeatureVector>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Instant::now(),
            frames: Vec::new(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}

/// A recorded gesture ready for training
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabeledExample {
    pub id: Uuid,
    pub label: String,
    /// Windowed, flattened feature vector
    pub features: FeatureVector,
    /// Frames captured before windowing
    pub frame_count: usize,
    pub duration_ms: u64,
    pub recorded_at: DateTime<Utc>,
}

/// Result of stopping a recording
#[derive(Debug, Clone)]
pub enum StopOutcome {
    Appended(LabeledExample),
    /// Nothing was captured; the session was discarded
    Empty,
    /// There was no active session (late or duplicate stop)
    NotRecording,
}

/// Insertion-ordered collection of labeled examples
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExampleSet {
    examples: Vec<LabeledExample>,
}

impl ExampleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, example: LabeledExample) {
        self.examples.push(example);
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabeledExample> {
        self.examples.iter()
    }

    /// Feature length shared by every example, taken from the first
    pub fn feature_len(&self) -> Option<usize> {
        self.examples.first().map(|e| e.features.len())
    }

    /// Check that every example has the same feature length
    pub fn validate_uniform(&self) -> AppResult<usize> {
        let expected = self.feature_len().ok_or(AppError::EmptyTrainingSet)?;
        for example in &self.examples {
            if example.features.len() != expected {
                return Err(AppError::FeatureLength {
                    expected,
                    found: example.features.len(),
                });
            }
        }
        Ok(expected)
    }
}

/// Recorder status for UI queries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderSnapshot {
    pub state: RecordingState,
    pub frames: usize,
    pub elapsed_ms: u64,
    pub label: String,
    pub examples: usize,
}
