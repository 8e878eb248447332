//! Pipeline configuration
//!
//! Typed settings for every subsystem, with defaults matching the live
//! performance tool. Loadable from a JSON file where missing fields fall
//! back to defaults.

pub mod schema;

pub use schema::{
    FeatureConfig, FrameLoopConfig, PipelineConfig, RecognizerConfig, RecordingConfig,
    TrainingConfig, UiConfig,
};
