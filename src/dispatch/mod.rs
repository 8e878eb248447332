//! Per-frame action dispatch
//!
//! This module maps detected hands to application actions:
//! - Collaborator traits for the gesture FSM, audio engine, regions and UI
//! - ActionDispatcher, the stateless per-hand fan-out
//! - TransitionFsm, the default table-driven gesture interpreter

pub mod dispatcher;
pub mod interpreter;
pub mod traits;

pub use dispatcher::{volume_percent, Action, ActionDispatcher, VolumeIndicator};
pub use interpreter::{GestureState, TransitionFsm};
pub use traits::{AudioEngine, FrameRenderer, GestureInterpreter, Region, Regions, StatusSink};
