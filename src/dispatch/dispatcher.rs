//! Action dispatcher
//!
//! Fans a detection frame out to the gesture FSM, the audio engine and the
//! status sink. Hands are handled strictly in detection order, so a later
//! hand's status text overwrites an earlier one's within the same frame.

use super::traits::{AudioEngine, GestureInterpreter, StatusSink};
use crate::landmarks::{DetectionFrame, Hand, Handedness, INDEX_FINGER_TIP};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// What a dispatch produced, in the order it happened
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// No hands in the frame
    Idle,
    Status(String),
    DrumHit(String),
    TogglePlayback,
    SetSpeed(f32),
    /// `raw` went to the engine, `percent` to the readout
    Volume { raw: f32, percent: u8 },
}

/// Round a raw volume to the 0-100 readout value
pub fn volume_percent(raw: f32) -> u8 {
    (raw * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Volume readout that hides itself a fixed time after the last update.
///
/// Each update cancels the pending hide and schedules a new one. Hide tasks
/// also carry a generation number so one that already woke up is ignored.
pub struct VolumeIndicator {
    sink: Arc<dyn StatusSink>,
    hide_after: Duration,
    generation: Arc<AtomicU64>,
    hide_task: Option<JoinHandle<()>>,
}

impl VolumeIndicator {
    pub fn new(sink: Arc<dyn StatusSink>, hide_after: Duration) -> Self {
        Self {
            sink,
            hide_after,
            generation: Arc::new(AtomicU64::new(0)),
            hide_task: None,
        }
    }

    /// Show `percent` and restart the hide timer. Must run inside a tokio runtime.
    pub fn show(&mut self, percent: u8) {
        self.sink.set_volume_indicator(true, percent);

        if let Some(task) = self.hide_task.take() {
            task.abort();
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let current = self.generation.clone();
        let sink = self.sink.clone();
        let hide_at = Instant::now() + self.hide_after;

        self.hide_task = Some(tokio::spawn(async move {
            tokio::time::sleep_until(hide_at).await;
            if current.load(Ordering::SeqCst) == generation {
                sink.set_volume_indicator(false, percent);
            }
        }));
    }
}

impl Drop for VolumeIndicator {
    fn drop(&mut self) {
        if let Some(task) = self.hide_task.take() {
            task.abort();
        }
    }
}

/// Maps detected hands to application actions
pub struct ActionDispatcher {
    interpreter: Box<dyn GestureInterpreter>,
    audio: Arc<dyn AudioEngine>,
    sink: Arc<dyn StatusSink>,
    volume: VolumeIndicator,
    idle_status: String,
}

impl ActionDispatcher {
    pub fn new(
        interpreter: Box<dyn GestureInterpreter>,
        audio: Arc<dyn AudioEngine>,
        sink: Arc<dyn StatusSink>,
        volume_hide_after: Duration,
        idle_status: impl Into<String>,
    ) -> Self {
        let volume = VolumeIndicator::new(sink.clone(), volume_hide_after);
        Self {
            interpreter,
            audio,
            sink,
            volume,
            idle_status: idle_status.into(),
        }
    }

    /// Interpreter access for session setup (region attachment)
    pub fn interpreter_mut(&mut self) -> &mut dyn GestureInterpreter {
        self.interpreter.as_mut()
    }

    pub fn audio(&self) -> &Arc<dyn AudioEngine> {
        &self.audio
    }

    /// Dispatch one frame
    pub fn dispatch(&mut self, frame: &DetectionFrame) -> Vec<Action> {
        let present: Vec<Handedness> = frame.hands.iter().map(|h| h.handedness).collect();
        self.interpreter.hands_present(&present);

        if frame.is_empty() {
            self.sink.set_status(&self.idle_status);
            return vec![Action::Idle];
        }

        let mut actions = Vec::new();
        for hand in &frame.hands {
            self.dispatch_hand(hand, &mut actions);
        }
        actions
    }

    fn dispatch_hand(&mut self, hand: &Hand, actions: &mut Vec<Action>) {
        let landmarks = hand.landmarks.as_slice();

        if let Some(text) =
            self.interpreter
                .update_state(&hand.gesture_category, hand.handedness, landmarks)
        {
            self.set_status(text, actions);
        }

        if hand.handedness == Handedness::Left {
            if let Some(sound) = self.interpreter.drum_sound_for(landmarks) {
                tracing::debug!("Drum hit: {}", sound);
                self.audio.play_sample(&sound);
                self.set_status(format!("Drum: {}", sound), actions);
                actions.push(Action::DrumHit(sound));
            }
        }

        if self.interpreter.should_toggle_playback() {
            self.audio.play_pause();
            actions.push(Action::TogglePlayback);
        }

        if let Some(text) = self.interpreter.speed_change_text(landmarks, hand.handedness) {
            let speed = self.interpreter.current_speed();
            self.audio.set_playback_rate(speed);
            self.set_status(text, actions);
            actions.push(Action::SetSpeed(speed));
        }

        self.interpreter.manage_loop_regions(self.audio.current_time());

        if self.interpreter.is_volume_gesture_active() {
            if let Some(tip) = hand.landmark(INDEX_FINGER_TIP) {
                let raw = 1.0 - tip.x;
                let percent = volume_percent(raw);
                self.volume.show(percent);
                self.audio.set_volume(raw);
                actions.push(Action::Volume { raw, percent });
            }
        }
    }

    fn set_status(&self, text: String, actions: &mut Vec<Action>) {
        self.sink.set_status(&text);
        actions.push(Action::Status(text));
    }
}
