//! Classifier training
//!
//! Turns an example set into a fitted [`Classifier`]. Training is CPU-bound
//! and runs on the blocking pool so the frame loop keeps ticking; the result
//! is published through a [`ClassifierSlot`] only when the run succeeds.

use super::model::Classifier;
use super::slot::ClassifierSlot;
use crate::config::{FeatureConfig, TrainingConfig};
use crate::recorder::ExampleSet;
use crate::utils::error::{AppError, AppResult};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Name given to the non-sentinel class when several labels collapse into it
const OTHER_CLASS: &str = "other";

/// Summary of one completed training run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingReport {
    /// Examples in the snapshot that was trained on
    pub examples: usize,
    pub epochs: usize,
    /// Loss at the start of each epoch, followed by the final loss
    pub loss_history: Vec<f32>,
}

impl TrainingReport {
    pub fn final_loss(&self) -> Option<f32> {
        self.loss_history.last().copied()
    }
}

/// One-hot target row: the sentinel label is class 0, everything else class 1
pub fn encode_label(label: &str, sentinel: &str, num_classes: usize) -> Vec<f32> {
    let mut row = vec![0.0; num_classes];
    let class = if label == sentinel { 0 } else { 1 };
    if class < num_classes {
        row[class] = 1.0;
    }
    row
}

#[derive(Debug, Clone)]
pub struct ClassifierTrainer {
    config: TrainingConfig,
    features: FeatureConfig,
}

impl ClassifierTrainer {
    pub fn new(config: TrainingConfig, features: FeatureConfig) -> Self {
        Self { config, features }
    }

    /// Fit a fresh classifier on `examples`
    pub fn train(&self, examples: &ExampleSet) -> AppResult<(Classifier, TrainingReport)> {
        let input_len = examples.validate_uniform()?;
        let expected = self.features.window_len();
        if input_len != expected {
            return Err(AppError::FeatureLength {
                expected,
                found: input_len,
            });
        }

        let (inputs, targets) = self.batch(examples, input_len)?;
        let mut classifier = Classifier::new(
            input_len,
            &self.config.hidden_units,
            self.class_labels(examples),
            self.config.seed,
        );

        let mut loss_history = Vec::with_capacity(self.config.epochs + 1);
        for epoch in 0..self.config.epochs {
            let loss = classifier.train_epoch(&inputs, &targets, self.config.learning_rate);
            if !loss.is_finite() {
                return Err(AppError::Training(format!("loss diverged at epoch {}", epoch)));
            }
            tracing::trace!("epoch {} loss {:.4}", epoch, loss);
            loss_history.push(loss);
        }

        let final_loss = classifier.evaluate_loss(&inputs, &targets);
        if !final_loss.is_finite() {
            return Err(AppError::Training("loss diverged after final epoch".to_string()));
        }
        loss_history.push(final_loss);

        Ok((
            classifier,
            TrainingReport {
                examples: examples.len(),
                epochs: self.config.epochs,
                loss_history,
            },
        ))
    }

    /// Train on a snapshot of `examples` in the background.
    ///
    /// Returns `None` when there is nothing to train on. On success the new
    /// classifier replaces the slot's current one; on failure the slot is
    /// left untouched.
    pub fn spawn_training(
        &self,
        examples: &ExampleSet,
        slot: &ClassifierSlot,
    ) -> Option<JoinHandle<AppResult<TrainingReport>>> {
        if examples.is_empty() {
            tracing::info!("No recorded examples; skipping training");
            return None;
        }

        let trainer = self.clone();
        let snapshot = examples.clone();
        let slot = slot.clone();

        tracing::info!("Training classifier on {} example(s)", snapshot.len());

        Some(tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || trainer.train(&snapshot)).await;

            match result {
                Ok(Ok((classifier, report))) => {
                    slot.replace(Arc::new(classifier));
                    tracing::info!(
                        "Classifier trained on {} example(s), final loss {:.4}",
                        report.examples,
                        report.final_loss().unwrap_or(f32::NAN)
                    );
                    Ok(report)
                }
                Ok(Err(e)) => {
                    tracing::error!("Training failed: {}", e);
                    Err(e)
                }
                Err(e) => {
                    tracing::error!("Training task panicked: {}", e);
                    Err(AppError::Training(e.to_string()))
                }
            }
        }))
    }

    fn batch(
        &self,
        examples: &ExampleSet,
        input_len: usize,
    ) -> AppResult<(Array2<f32>, Array2<f32>)> {
        let rows = examples.len();
        let num_classes = self.config.num_classes;

        let mut inputs = Vec::with_capacity(rows * input_len);
        let mut targets = Vec::with_capacity(rows * num_classes);
        for example in examples.iter() {
            inputs.extend_from_slice(&example.features);
            targets.extend(encode_label(&example.label, &self.config.sentinel_label, num_classes));
        }

        let inputs = Array2::from_shape_vec((rows, input_len), inputs)
            .map_err(|e| AppError::Training(e.to_string()))?;
        let targets = Array2::from_shape_vec((rows, num_classes), targets)
            .map_err(|e| AppError::Training(e.to_string()))?;
        Ok((inputs, targets))
    }

    fn class_labels(&self, examples: &ExampleSet) -> Vec<String> {
        let sentinel = &self.config.sentinel_label;
        let others: BTreeSet<&str> = examples
            .iter()
            .map(|e| e.label.as_str())
            .filter(|l| *l != sentinel.as_str())
            .collect();

        let other_name = match others.len() {
            1 => others.iter().next().map(|l| l.to_string()),
            _ => None,
        }
        .unwrap_or_else(|| OTHER_CLASS.to_string());

        (0..self.config.num_classes)
            .map(|i| match i {
                0 => sentinel.clone(),
                1 => other_name.clone(),
                _ => format!("class_{}", i),
            })
            .collect()
    }
}
