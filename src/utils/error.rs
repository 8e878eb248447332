//! Error types and handling
//!
//! Common error types used across the pipeline. None of these reach UI code
//! as a failure that must be handled: the frame loop logs and absorbs them.

use thiserror::Error;

/// Pipeline-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Recognizer failed to initialize after {attempts} attempts: {message}")]
    Initialization { attempts: u32, message: String },

    #[error("Recognition error: {0}")]
    Recognition(String),

    #[error("No labeled examples to train on")]
    EmptyTrainingSet,

    #[error("Training error: {0}")]
    Training(String),

    #[error("Prediction error: {0}")]
    Prediction(String),

    #[error("Feature length mismatch: expected {expected}, found {found}")]
    FeatureLength { expected: usize, found: usize },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
