//! Recording test doubles for the pipeline's collaborators

use crate::dispatch::{AudioEngine, FrameRenderer, GestureInterpreter, Region, Regions, StatusSink};
use crate::landmarks::{DetectionFrame, GestureCategory, Hand, Handedness, Landmark};
use crate::recognizer::{Recognizer, RecognizerFactory, RecognizerOptions, VideoFrame, VideoSource};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// A hand whose landmarks are all at `(x, y)` except the index fingertip
pub fn hand_with_tip(
    handedness: Handedness,
    category: GestureCategory,
    tip_x: f32,
    tip_y: f32,
) -> Hand {
    let mut landmarks = vec![Landmark::new(0.5, 0.5, 0.0); 21];
    landmarks[8] = Landmark::new(tip_x, tip_y, 0.0);
    Hand::new(landmarks, category, handedness)
}

pub fn frame_of(hands: Vec<Hand>) -> DetectionFrame {
    DetectionFrame::new(hands)
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioCall {
    PlayPause,
    PlaybackRate(f32),
    Volume(f32),
    Sample(String),
    LoadAll,
}

#[derive(Default)]
pub struct RecordingRegions {
    pub regions: Mutex<Vec<Region>>,
    pub clears: Mutex<usize>,
}

impl Regions for RecordingRegions {
    fn add_region(&self, region: Region) {
        self.regions.lock().push(region);
    }

    fn clear_regions(&self) {
        self.regions.lock().clear();
        *self.clears.lock() += 1;
    }
}

#[derive(Default)]
pub struct RecordingAudio {
    pub calls: Mutex<Vec<AudioCall>>,
    pub time: Mutex<f64>,
    pub regions: Arc<RecordingRegions>,
}

impl RecordingAudio {
    pub fn calls(&self) -> Vec<AudioCall> {
        self.calls.lock().clone()
    }
}

impl AudioEngine for RecordingAudio {
    fn play_pause(&self) {
        self.calls.lock().push(AudioCall::PlayPause);
    }

    fn set_playback_rate(&self, rate: f32) {
        self.calls.lock().push(AudioCall::PlaybackRate(rate));
    }

    fn set_volume(&self, volume: f32) {
        self.calls.lock().push(AudioCall::Volume(volume));
    }

    fn current_time(&self) -> f64 {
        *self.time.lock()
    }

    fn play_sample(&self, sound_id: &str) {
        self.calls.lock().push(AudioCall::Sample(sound_id.to_string()));
    }

    fn load_all_samples(&self) {
        self.calls.lock().push(AudioCall::LoadAll);
    }

    fn regions(&self) -> Arc<dyn Regions> {
        self.regions.clone()
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub statuses: Mutex<Vec<String>>,
    pub indicator: Mutex<Vec<(bool, u8)>>,
}

impl RecordingSink {
    pub fn last_status(&self) -> Option<String> {
        self.statuses.lock().last().cloned()
    }

    pub fn indicator(&self) -> Vec<(bool, u8)> {
        self.indicator.lock().clone()
    }
}

impl StatusSink for RecordingSink {
    fn set_status(&self, text: &str) {
        self.statuses.lock().push(text.to_string());
    }

    fn set_volume_indicator(&self, visible: bool, percent: u8) {
        self.indicator.lock().push((visible, percent));
    }
}

#[derive(Default)]
pub struct CountingRenderer {
    pub frames: Arc<Mutex<usize>>,
}

impl FrameRenderer for CountingRenderer {
    fn draw(&mut self, _frame: &DetectionFrame) {
        *self.frames.lock() += 1;
    }
}

/// Observable state shared between a [`ScriptedInterpreter`] and its test
#[derive(Default)]
pub struct Script {
    pub statuses: Mutex<VecDeque<Option<String>>>,
    pub drum: Mutex<Option<String>>,
    pub toggle: Mutex<bool>,
    pub speed_text: Mutex<Option<String>>,
    pub speed: Mutex<f32>,
    pub volume_active: Mutex<bool>,
    pub updates: Mutex<Vec<(GestureCategory, Handedness)>>,
    pub loop_times: Mutex<Vec<f64>>,
    pub attach_count: Mutex<usize>,
    pub presence: Mutex<Vec<Vec<Handedness>>>,
}

/// Interpreter that answers from a [`Script`] and records what it was fed
pub struct ScriptedInterpreter {
    pub script: Arc<Script>,
    attached: bool,
}

impl ScriptedInterpreter {
    pub fn new() -> (Self, Arc<Script>) {
        let script = Arc::new(Script::default());
        *script.speed.lock() = 1.0;
        (
            Self {
                script: script.clone(),
                attached: false,
            },
            script,
        )
    }
}

impl GestureInterpreter for ScriptedInterpreter {
    fn update_state(
        &mut self,
        category: &GestureCategory,
        handedness: Handedness,
        _landmarks: &[Landmark],
    ) -> Option<String> {
        self.script.updates.lock().push((category.clone(), handedness));
        self.script.statuses.lock().pop_front().flatten()
    }

    fn hands_present(&mut self, present: &[Handedness]) {
        self.script.presence.lock().push(present.to_vec());
    }

    fn drum_sound_for(&mut self, _landmarks: &[Landmark]) -> Option<String> {
        self.script.drum.lock().clone()
    }

    fn should_toggle_playback(&mut self) -> bool {
        std::mem::take(&mut *self.script.toggle.lock())
    }

    fn speed_change_text(
        &mut self,
        _landmarks: &[Landmark],
        _handedness: Handedness,
    ) -> Option<String> {
        self.script.speed_text.lock().clone()
    }

    fn current_speed(&self) -> f32 {
        *self.script.speed.lock()
    }

    fn manage_loop_regions(&mut self, current_time_sec: f64) {
        self.script.loop_times.lock().push(current_time_sec);
    }

    fn is_volume_gesture_active(&self) -> bool {
        *self.script.volume_active.lock()
    }

    fn has_regions_attached(&self) -> bool {
        self.attached
    }

    fn attach_regions(&mut self, _regions: Arc<dyn Regions>) {
        self.attached = true;
        *self.script.attach_count.lock() += 1;
    }
}

/// Recognizer that replays scripted results and records timestamps
pub struct ScriptedRecognizer {
    pub results: Arc<Mutex<Vec<anyhow::Result<DetectionFrame>>>>,
    pub timestamps: Arc<Mutex<Vec<i64>>>,
}

#[async_trait]
impl Recognizer for ScriptedRecognizer {
    async fn recognize_for_video(
        &mut self,
        _frame: &VideoFrame,
        timestamp_ms: i64,
    ) -> anyhow::Result<DetectionFrame> {
        self.timestamps.lock().push(timestamp_ms);
        let mut results = self.results.lock();
        if results.is_empty() {
            Ok(DetectionFrame::empty())
        } else {
            results.remove(0)
        }
    }
}

/// Factory that fails a set number of times before succeeding
pub struct FlakyFactory {
    pub failures_left: Mutex<u32>,
    pub calls: Mutex<u32>,
    pub results: Arc<Mutex<Vec<anyhow::Result<DetectionFrame>>>>,
    pub timestamps: Arc<Mutex<Vec<i64>>>,
}

impl FlakyFactory {
    pub fn new(failures: u32) -> Self {
        Self {
            failures_left: Mutex::new(failures),
            calls: Mutex::new(0),
            results: Arc::new(Mutex::new(Vec::new())),
            timestamps: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl RecognizerFactory for FlakyFactory {
    async fn create(&self, options: &RecognizerOptions) -> anyhow::Result<Box<dyn Recognizer>> {
        *self.calls.lock() += 1;
        let mut left = self.failures_left.lock();
        if *left > 0 {
            *left -= 1;
            anyhow::bail!("failed to fetch {}", options.model_asset_path);
        }
        Ok(Box::new(ScriptedRecognizer {
            results: self.results.clone(),
            timestamps: self.timestamps.clone(),
        }))
    }
}

/// Video source whose dimensions a test can change while the loop owns it
pub struct StubVideo {
    pub dimensions: Arc<Mutex<(u32, u32)>>,
}

impl StubVideo {
    pub fn loaded() -> Self {
        Self {
            dimensions: Arc::new(Mutex::new((640, 480))),
        }
    }
}

impl VideoSource for StubVideo {
    fn dimensions(&self) -> (u32, u32) {
        *self.dimensions.lock()
    }

    fn current_frame(&mut self) -> VideoFrame {
        let (width, height) = self.dimensions();
        VideoFrame {
            width,
            height,
            data: Vec::new(),
        }
    }
}
