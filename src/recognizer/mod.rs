//! Landmark recognizer lifecycle
//!
//! - Traits for the external recognizer, its factory and the video source
//! - RecognizerSession: bounded-retry initialization and readiness gating

pub mod session;
pub mod traits;

pub use session::{RecognizerSession, SessionState};
pub use traits::{Recognizer, RecognizerFactory, RecognizerOptions, VideoFrame, VideoSource};
