//! Feed-forward gesture classifier
//!
//! Dense layers with ReLU hidden activations and a softmax output, trained
//! with full-batch gradient descent on cross-entropy loss.

use crate::utils::error::{AppError, AppResult};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Floor applied to probabilities before taking the log
const PROB_EPSILON: f32 = 1e-7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Relu,
    Softmax,
}

impl Activation {
    fn apply(&self, mut z: Array2<f32>) -> Array2<f32> {
        match self {
            Activation::Relu => {
                z.mapv_inplace(|v| v.max(0.0));
                z
            }
            Activation::Softmax => {
                for mut row in z.rows_mut() {
                    let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
                    row.mapv_inplace(|v| (v - max).exp());
                    let sum = row.sum();
                    row.mapv_inplace(|v| v / sum);
                }
                z
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct DenseLayer {
    /// `inputs x units`
    weights: Array2<f32>,
    bias: Array1<f32>,
    activation: Activation,
}

impl DenseLayer {
    fn new(inputs: usize, units: usize, activation: Activation, rng: &mut SplitMix64) -> Self {
        // Xavier-uniform
        let limit = (6.0 / (inputs + units) as f32).sqrt();
        let weights = Array2::from_shape_fn((inputs, units), |_| rng.uniform(-limit, limit));
        Self {
            weights,
            bias: Array1::zeros(units),
            activation,
        }
    }

    fn forward(&self, input: &Array2<f32>) -> (Array2<f32>, Array2<f32>) {
        let z = input.dot(&self.weights) + &self.bias;
        let out = self.activation.apply(z.clone());
        (z, out)
    }

    pub fn units(&self) -> usize {
        self.bias.len()
    }
}

/// Deterministic generator for weight initialization
#[derive(Debug, Clone)]
struct SplitMix64(u64);

impl SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    fn uniform(&mut self, low: f32, high: f32) -> f32 {
        let unit = (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32;
        low + (high - low) * unit
    }
}

/// Scored output of one prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub class_index: usize,
    pub label: String,
    pub probabilities: Vec<f32>,
}

/// A trained (or freshly initialized) classifier
#[derive(Debug, Clone)]
pub struct Classifier {
    layers: Vec<DenseLayer>,
    input_len: usize,
    /// Display label per output class
    class_labels: Vec<String>,
}

impl Classifier {
    /// Build `input_len -> hidden... -> class_labels.len()` with seeded weights
    pub fn new(
        input_len: usize,
        hidden_units: &[usize],
        class_labels: Vec<String>,
        seed: u64,
    ) -> Self {
        let mut rng = SplitMix64(seed);
        let mut layers = Vec::with_capacity(hidden_units.len() + 1);
        let mut fan_in = input_len;

        for &units in hidden_units {
            layers.push(DenseLayer::new(fan_in, units, Activation::Relu, &mut rng));
            fan_in = units;
        }
        layers.push(DenseLayer::new(
            fan_in,
            class_labels.len(),
            Activation::Softmax,
            &mut rng,
        ));

        Self {
            layers,
            input_len,
            class_labels,
        }
    }

    pub fn input_len(&self) -> usize {
        self.input_len
    }

    pub fn num_classes(&self) -> usize {
        self.class_labels.len()
    }

    pub fn layer_units(&self) -> Vec<usize> {
        self.layers.iter().map(|l| l.units()).collect()
    }

    pub fn class_labels(&self) -> &[String] {
        &self.class_labels
    }

    /// Class probabilities for a batch of inputs (one row each)
    pub fn forward(&self, inputs: &Array2<f32>) -> Array2<f32> {
        self.layers
            .iter()
            .fold(inputs.clone(), |a, layer| layer.forward(&a).1)
    }

    /// Mean cross-entropy of the current weights
    pub fn evaluate_loss(&self, inputs: &Array2<f32>, targets: &Array2<f32>) -> f32 {
        cross_entropy(&self.forward(inputs), targets)
    }

    /// One full-batch gradient step. Returns the loss before the update.
    pub fn train_epoch(
        &mut self,
        inputs: &Array2<f32>,
        targets: &Array2<f32>,
        learning_rate: f32,
    ) -> f32 {
        let n = inputs.nrows().max(1) as f32;

        let mut layer_inputs = Vec::with_capacity(self.layers.len());
        let mut pre_activations = Vec::with_capacity(self.layers.len());
        let mut a = inputs.clone();
        for layer in &self.layers {
            let (z, out) = layer.forward(&a);
            layer_inputs.push(a);
            pre_activations.push(z);
            a = out;
        }

        let loss = cross_entropy(&a, targets);

        // softmax + cross-entropy gradient w.r.t. the output pre-activation
        let mut delta = (&a - targets) / n;

        for i in (0..self.layers.len()).rev() {
            let grad_w = layer_inputs[i].t().dot(&delta);
            let grad_b = delta.sum_axis(Axis(0));

            if i > 0 {
                let mut upstream = delta.dot(&self.layers[i].weights.t());
                if self.layers[i - 1].activation == Activation::Relu {
                    upstream.zip_mut_with(&pre_activations[i - 1], |g, &z| {
                        if z <= 0.0 {
                            *g = 0.0;
                        }
                    });
                }
                delta = upstream;
            }

            let layer = &mut self.layers[i];
            layer.weights.scaled_add(-learning_rate, &grad_w);
            layer.bias.scaled_add(-learning_rate, &grad_b);
        }

        loss
    }

    /// Score a single feature vector
    pub fn predict(&self, input: &[f32]) -> AppResult<Prediction> {
        if input.len() != self.input_len {
            return Err(AppError::FeatureLength {
                expected: self.input_len,
                found: input.len(),
            });
        }

        let batch = Array2::from_shape_vec((1, self.input_len), input.to_vec())
            .map_err(|e| AppError::Prediction(e.to_string()))?;
        let probabilities = self.forward(&batch).row(0).to_vec();

        let class_index = probabilities
            .iter()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |best, (i, &p)| {
                if p > best.1 {
                    (i, p)
                } else {
                    best
                }
            })
            .0;

        let label = self
            .class_labels
            .get(class_index)
            .cloned()
            .ok_or_else(|| AppError::Prediction("classifier has no output classes".to_string()))?;

        Ok(Prediction {
            class_index,
            label,
            probabilities,
        })
    }
}

fn cross_entropy(probabilities: &Array2<f32>, targets: &Array2<f32>) -> f32 {
    let n = probabilities.nrows().max(1) as f32;
    let total: f32 = probabilities
        .iter()
        .zip(targets.iter())
        .map(|(&p, &t)| {
            // f32::max would swallow a NaN from diverged weights
            let p = if p.is_nan() { p } else { p.max(PROB_EPSILON) };
            -t * p.ln()
        })
        .sum();
    total / n
}
