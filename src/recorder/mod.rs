//! Gesture recording
//!
//! This module implements the capture side of the custom-gesture workflow:
//! - RecordingState / RecordingSession for the idle/recording state machine
//! - LabeledExample and ExampleSet, the accumulated training data
//! - GestureRecorder, which buffers features and enforces the auto-stop deadline

pub mod coordinator;
pub mod state;

pub use coordinator::{AutoStop, GestureRecorder, RecorderEvent, ToggleOutcome};
pub use state::{
    ExampleSet, LabeledExample, RecorderSnapshot, RecordingSession, RecordingState, StopOutcome,
};
