//! Custom gesture classifier
//!
//! - Classifier: small dense network over windowed keypoint features
//! - ClassifierTrainer: background training from a snapshot of the example set
//! - ClassifierSlot: the single current model, swapped atomically
//! - Predictor: rolling-window scoring of live frames

pub mod model;
pub mod predictor;
pub mod slot;
pub mod trainer;

pub use model::{Classifier, Prediction};
pub use predictor::Predictor;
pub use slot::ClassifierSlot;
pub use trainer::{encode_label, ClassifierTrainer, TrainingReport};
