//! Landmark normalization and windowing

use crate::config::FeatureConfig;
use crate::landmarks::{Hand, Landmark, WRIST};

/// Fixed-length numeric encoding of one or more landmark frames
pub type FeatureVector = Vec<f32>;

/// Translate every landmark so the wrist sits at the origin.
///
/// Missing depth counts as zero on both sides, so the output always carries
/// a depth value.
pub fn normalize_to_wrist(landmarks: &[Landmark]) -> Vec<Landmark> {
    let Some(wrist) = landmarks.get(WRIST) else {
        return Vec::new();
    };

    landmarks
        .iter()
        .map(|p| Landmark::new(p.x - wrist.x, p.y - wrist.y, p.depth() - wrist.depth()))
        .collect()
}

/// `[x, y, z]` of one landmark, or `None` when the hand is too short
pub fn keypoint_feature(landmarks: &[Landmark], index: usize) -> Option<FeatureVector> {
    landmarks.get(index).map(|p| vec![p.x, p.y, p.depth()])
}

/// Flatten a variable-length sequence of per-frame features into a
/// `feats_per_t * normal_seq_len` vector.
///
/// Frames past the window are dropped, missing frames stay zero, and only
/// the first `feats_per_t` values of each frame are used.
pub fn window(points: &[FeatureVector], config: FeatureConfig) -> FeatureVector {
    let mut out = vec![0.0; config.window_len()];

    for (t, point) in points.iter().take(config.normal_seq_len).enumerate() {
        for (f, value) in point.iter().take(config.feats_per_t).enumerate() {
            out[config.feats_per_t * t + f] = *value;
        }
    }

    out
}

/// Per-frame feature extraction for the primary hand
#[derive(Debug, Clone, Copy)]
pub struct FeatureExtractor {
    keypoint_index: usize,
    config: FeatureConfig,
}

impl FeatureExtractor {
    pub fn new(keypoint_index: usize, config: FeatureConfig) -> Self {
        Self {
            keypoint_index,
            config,
        }
    }

    pub fn config(&self) -> FeatureConfig {
        self.config
    }

    /// Wrist-normalized keypoint feature of one hand
    pub fn extract(&self, hand: &Hand) -> Option<FeatureVector> {
        let normalized = normalize_to_wrist(&hand.landmarks);
        keypoint_feature(&normalized, self.keypoint_index)
    }

    /// Window a captured sequence into classifier input
    pub fn window(&self, points: &[FeatureVector]) -> FeatureVector {
        window(points, self.config)
    }
}
