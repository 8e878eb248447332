//! Feature extraction
//!
//! Pure functions turning raw hand landmarks into classifier input:
//! wrist-relative normalization, single-keypoint per-frame features, and
//! fixed-length temporal windowing.

pub mod extractor;

pub use extractor::{keypoint_feature, normalize_to_wrist, window, FeatureExtractor, FeatureVector};
