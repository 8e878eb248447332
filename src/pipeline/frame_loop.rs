//! Frame loop
//!
//! One task owns every piece of mutable pipeline state and drives it from a
//! `select!` over the frame clock, the auto-stop channel and UI commands.
//! A frame's recognition call is only issued after the previous frame has
//! been fully handled.

use super::clock::{FrameClock, IntervalClock};
use super::control::{ControlCommand, PipelineHandle};
use super::timebase::Timebase;
use crate::classifier::{ClassifierSlot, ClassifierTrainer, Predictor, TrainingReport};
use crate::config::PipelineConfig;
use crate::dispatch::{
    Action, ActionDispatcher, AudioEngine, FrameRenderer, GestureInterpreter, StatusSink,
};
use crate::features::FeatureExtractor;
use crate::landmarks::DetectionFrame;
use crate::recognizer::{RecognizerFactory, RecognizerSession, VideoSource};
use crate::recorder::{AutoStop, GestureRecorder, StopOutcome, ToggleOutcome};
use crate::utils::error::AppResult;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// External pieces the loop is wired to
pub struct Collaborators {
    pub factory: Arc<dyn RecognizerFactory>,
    pub interpreter: Box<dyn GestureInterpreter>,
    pub audio: Arc<dyn AudioEngine>,
    pub sink: Arc<dyn StatusSink>,
    pub video: Box<dyn VideoSource>,
    pub renderer: Box<dyn FrameRenderer>,
}

/// What one tick did
#[derive(Debug, Clone)]
pub enum TickOutcome {
    /// Recognizer never became ready
    NotReady,
    /// Video reports zero dimensions
    VideoNotLoaded,
    RecognitionFailed,
    Processed { hands: usize, actions: Vec<Action> },
}

pub struct FrameLoop {
    session: RecognizerSession,
    factory: Arc<dyn RecognizerFactory>,
    dispatcher: ActionDispatcher,
    recorder: GestureRecorder,
    auto_stop_rx: mpsc::UnboundedReceiver<AutoStop>,
    trainer: ClassifierTrainer,
    classifier: ClassifierSlot,
    predictor: Predictor,
    video: Box<dyn VideoSource>,
    renderer: Box<dyn FrameRenderer>,
    clock: Box<dyn FrameClock>,
    timebase: Timebase,
    command_tx: mpsc::UnboundedSender<ControlCommand>,
    command_rx: mpsc::UnboundedReceiver<ControlCommand>,
    /// Most recent training run
    training: Option<JoinHandle<AppResult<TrainingReport>>>,
}

impl FrameLoop {
    /// Wire the loop up. Fails when `config` does not validate.
    pub fn new(config: PipelineConfig, collaborators: Collaborators) -> AppResult<Self> {
        config.validate()?;

        let Collaborators {
            factory,
            interpreter,
            audio,
            sink,
            video,
            renderer,
        } = collaborators;

        let extractor = FeatureExtractor::new(config.recording.keypoint_index, config.features);
        let (recorder, auto_stop_rx) = GestureRecorder::new(config.recording.clone(), extractor);
        let dispatcher = ActionDispatcher::new(
            interpreter,
            audio,
            sink,
            Duration::from_millis(config.ui.volume_indicator_ms),
            config.ui.idle_status.clone(),
        );
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        Ok(Self {
            session: RecognizerSession::new(config.recognizer.clone()),
            factory,
            dispatcher,
            recorder,
            auto_stop_rx,
            trainer: ClassifierTrainer::new(config.training.clone(), config.features),
            classifier: ClassifierSlot::new(),
            predictor: Predictor::new(extractor),
            video,
            renderer,
            clock: Box::new(IntervalClock::new(Duration::from_millis(
                config.frame_loop.frame_interval_ms,
            ))),
            timebase: Timebase::new(),
            command_tx,
            command_rx,
            training: None,
        })
    }

    /// Replace the default interval clock
    pub fn with_clock(mut self, clock: Box<dyn FrameClock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn handle(&self) -> PipelineHandle {
        PipelineHandle::new(self.command_tx.clone())
    }

    pub fn recorder(&self) -> &GestureRecorder {
        &self.recorder
    }

    pub fn classifier(&self) -> &ClassifierSlot {
        &self.classifier
    }

    pub fn is_ready(&self) -> bool {
        self.session.is_ready()
    }

    /// Take the handle of the most recent training run, if any
    pub fn take_training(&mut self) -> Option<JoinHandle<AppResult<TrainingReport>>> {
        self.training.take()
    }

    /// Preload samples and bring up the recognizer
    pub async fn start(&mut self) -> AppResult<()> {
        let audio = self.dispatcher.audio().clone();
        audio.load_all_samples();

        self.session
            .initialize(self.factory.as_ref(), self.dispatcher.interpreter_mut(), audio.as_ref())
            .await
    }

    /// Run until a shutdown command arrives
    pub async fn run(mut self) {
        if let Err(e) = self.start().await {
            tracing::error!("Frame loop running without a recognizer: {}", e);
        }

        loop {
            tokio::select! {
                _ = self.clock.next_frame() => {
                    self.tick().await;
                }
                Some(deadline) = self.auto_stop_rx.recv() => {
                    self.recorder.handle_auto_stop(deadline);
                }
                command = self.command_rx.recv() => {
                    let keep_running = match command {
                        Some(command) => self.apply_command(command),
                        None => false,
                    };
                    if !keep_running {
                        break;
                    }
                }
            }
        }

        tracing::info!("Frame loop stopped");
    }

    /// Handle one display refresh
    pub async fn tick(&mut self) -> TickOutcome {
        if !self.session.is_ready() {
            tracing::trace!("Recognizer not ready; skipping frame");
            return TickOutcome::NotReady;
        }

        let (width, height) = self.video.dimensions();
        if width == 0 || height == 0 {
            tracing::trace!("Video not loaded; skipping frame");
            return TickOutcome::VideoNotLoaded;
        }

        let frame = self.video.current_frame();
        let timestamp_ms = self.timebase.next_timestamp_ms();

        match self.session.recognize(&frame, timestamp_ms).await {
            Ok(detection) => {
                let hands = detection.hands.len();
                let actions = self.process(&detection);
                TickOutcome::Processed { hands, actions }
            }
            Err(e) => {
                tracing::warn!("Recognition failed at {}ms: {}", timestamp_ms, e);
                TickOutcome::RecognitionFailed
            }
        }
    }

    fn process(&mut self, detection: &DetectionFrame) -> Vec<Action> {
        if self.recorder.is_recording() {
            self.recorder.capture(detection);
        }

        if let Some(classifier) = self.classifier.current() {
            if let Some(input) = self.predictor.observe(detection) {
                // result is logged by the task; nothing acts on it yet
                let _ = Predictor::spawn_predict(classifier, input);
            }
        }

        self.renderer.draw(detection);
        self.dispatcher.dispatch(detection)
    }

    /// Apply a UI command. Returns `false` on shutdown.
    pub fn apply_command(&mut self, command: ControlCommand) -> bool {
        match command {
            ControlCommand::ToggleRecording => {
                match self.recorder.toggle() {
                    ToggleOutcome::Started(id) => tracing::debug!("Toggle started session {}", id),
                    ToggleOutcome::Stopped(StopOutcome::Appended(example)) => {
                        tracing::debug!("Toggle stored example {}", example.id)
                    }
                    ToggleOutcome::Stopped(_) => {}
                }
                true
            }
            ControlCommand::SetLabel(label) => {
                self.recorder.set_label(&label);
                true
            }
            ControlCommand::Train => {
                if let Some(handle) = self
                    .trainer
                    .spawn_training(self.recorder.examples(), &self.classifier)
                {
                    self.training = Some(handle);
                }
                true
            }
            ControlCommand::Shutdown => false,
        }
    }
}
