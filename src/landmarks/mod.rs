//! Hand landmark data model
//!
//! Per-frame detections produced by the external recognizer. A frame is
//! consumed within the same loop iteration and then dropped.

pub mod types;

pub use types::{
    DetectionFrame, GestureCategory, Hand, Handedness, Landmark, HAND_LANDMARK_COUNT,
    INDEX_FINGER_TIP, WRIST,
};
