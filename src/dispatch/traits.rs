//! Collaborator trait definitions
//!
//! The audio engine, UI and gesture FSM live outside the core. These traits
//! are the whole of what the pipeline needs from them.

use crate::landmarks::{DetectionFrame, GestureCategory, Handedness, Landmark};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A marked span of the audio timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub start_sec: f64,
    pub end_sec: f64,
    /// Whether playback loops inside this region
    pub looping: bool,
    pub label: String,
}

/// Region management attached to the audio engine
pub trait Regions: Send + Sync {
    fn add_region(&self, region: Region);
    fn clear_regions(&self);
}

/// Audio/waveform engine
pub trait AudioEngine: Send + Sync {
    fn play_pause(&self);
    fn set_playback_rate(&self, rate: f32);
    /// Volume in 0.0 to 1.0; callers may pass values outside that range
    fn set_volume(&self, volume: f32);
    /// Playhead position in seconds
    fn current_time(&self) -> f64;
    fn play_sample(&self, sound_id: &str);
    fn load_all_samples(&self);
    /// Region manager for this engine
    fn regions(&self) -> Arc<dyn Regions>;
}

/// Single status-text slot plus the volume readout
pub trait StatusSink: Send + Sync {
    fn set_status(&self, text: &str);
    fn set_volume_indicator(&self, visible: bool, percent: u8);
}

/// Draws landmark overlays for a frame
pub trait FrameRenderer: Send {
    fn draw(&mut self, frame: &DetectionFrame);
}

/// Stateful gesture interpretation (cut, loop, speed, playback, volume)
pub trait GestureInterpreter: Send {
    /// Feed one hand into the state machine; returns text to surface, if any
    fn update_state(
        &mut self,
        category: &GestureCategory,
        handedness: Handedness,
        landmarks: &[Landmark],
    ) -> Option<String>;

    /// Hands seen in the current frame, reported before any per-hand call
    fn hands_present(&mut self, present: &[Handedness]);

    /// Drum sample for this landmark configuration, already debounced
    fn drum_sound_for(&mut self, landmarks: &[Landmark]) -> Option<String>;

    /// One-shot: true once per requested play/pause toggle
    fn should_toggle_playback(&mut self) -> bool;

    fn speed_change_text(&mut self, landmarks: &[Landmark], handedness: Handedness)
        -> Option<String>;

    fn current_speed(&self) -> f32;

    fn manage_loop_regions(&mut self, current_time_sec: f64);

    fn is_volume_gesture_active(&self) -> bool;

    fn has_regions_attached(&self) -> bool;

    fn attach_regions(&mut self, regions: Arc<dyn Regions>);
}
