//! Real-time pipeline
//!
//! - FrameLoop: the single task that recognizes, records, predicts and dispatches
//! - FrameClock / IntervalClock: display-refresh pacing
//! - Timebase: strictly increasing recognizer timestamps
//! - ControlCommand / PipelineHandle: UI commands into the loop

pub mod clock;
pub mod control;
pub mod frame_loop;
pub mod timebase;

pub use clock::{FrameClock, IntervalClock};
pub use control::{ControlCommand, PipelineHandle};
pub use frame_loop::{Collaborators, FrameLoop, TickOutcome};
pub use timebase::Timebase;
