//! Live prediction against the current classifier

use super::model::{Classifier, Prediction};
use crate::features::{FeatureExtractor, FeatureVector};
use crate::landmarks::DetectionFrame;
use crate::utils::error::{AppError, AppResult};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Keeps the most recent per-frame features of the primary hand so live
/// frames are scored with the same windowed input the recorder produces.
pub struct Predictor {
    extractor: FeatureExtractor,
    history: VecDeque<FeatureVector>,
}

impl Predictor {
    pub fn new(extractor: FeatureExtractor) -> Self {
        let capacity = extractor.config().normal_seq_len;
        Self {
            extractor,
            history: VecDeque::with_capacity(capacity),
        }
    }

    /// Push the frame's primary-hand feature and return the current window.
    ///
    /// Frames without a usable hand leave the history alone and yield `None`.
    pub fn observe(&mut self, frame: &DetectionFrame) -> Option<FeatureVector> {
        let feature = self.extractor.extract(frame.primary()?)?;

        if self.history.len() == self.extractor.config().normal_seq_len {
            self.history.pop_front();
        }
        self.history.push_back(feature);

        Some(self.extractor.window(self.history.make_contiguous()))
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Score `input` off the frame loop and log the class probabilities
    pub fn spawn_predict(
        classifier: Arc<Classifier>,
        input: FeatureVector,
    ) -> JoinHandle<AppResult<Prediction>> {
        tokio::spawn(async move {
            let task = tokio::task::spawn_blocking(move || classifier.predict(&input));
            let result = match task.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Prediction task panicked: {}", e);
                    return Err(AppError::Prediction(e.to_string()));
                }
            };

            match &result {
                Ok(prediction) => tracing::info!(
                    "Predicted '{}' (class {}) probabilities {:?}",
                    prediction.label,
                    prediction.class_index,
                    prediction.probabilities
                ),
                Err(e) => tracing::warn!("Prediction failed: {}", e),
            }

            result
        })
    }
}
