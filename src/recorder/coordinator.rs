//! Gesture recorder
//!
//! Two states, idle and recording, switched by a single toggle command.
//! Starting arms an auto-stop deadline; stopping by hand cancels it. A
//! deadline that fires anyway is matched against the session that armed it,
//! so a stale one does nothing.

use super::state::{
    ExampleSet, LabeledExample, RecorderSnapshot, RecordingSession, RecordingState, StopOutcome,
};
use crate::config::RecordingConfig;
use crate::features::FeatureExtractor;
use crate::landmarks::DetectionFrame;
use chrono::Utc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

/// Events emitted by the recorder
#[derive(Debug, Clone)]
pub enum RecorderEvent {
    Started { session_id: Uuid },
    /// A labeled example was appended
    ExampleAdded { id: Uuid, label: String, frames: usize },
    /// Stopped with nothing captured
    Discarded { session_id: Uuid },
}

/// Auto-stop deadline for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoStop {
    pub session_id: Uuid,
}

/// What a toggle did
#[derive(Debug, Clone)]
pub enum ToggleOutcome {
    Started(Uuid),
    Stopped(StopOutcome),
}

pub struct GestureRecorder {
    config: RecordingConfig,
    extractor: FeatureExtractor,

    /// Active session, `None` when idle
    session: Option<RecordingSession>,

    /// Label applied to the next stored example
    label: String,

    examples: ExampleSet,

    /// Pending auto-stop timer for the active session
    auto_stop: Option<JoinHandle<()>>,
    deadline_tx: mpsc::UnboundedSender<AutoStop>,

    /// Event broadcaster
    event_tx: broadcast::Sender<RecorderEvent>,
}

impl GestureRecorder {
    /// Create a recorder and the receiver its auto-stop deadlines arrive on
    pub fn new(
        config: RecordingConfig,
        extractor: FeatureExtractor,
    ) -> (Self, mpsc::UnboundedReceiver<AutoStop>) {
        let (deadline_tx, deadline_rx) = mpsc::unbounded_channel();
        let (event_tx, _) = broadcast::channel(100);
        let label = config.default_label.clone();

        let recorder = Self {
            config,
            extractor,
            session: None,
            label,
            examples: ExampleSet::new(),
            auto_stop: None,
            deadline_tx,
            event_tx,
        };
        (recorder, deadline_rx)
    }

    pub fn state(&self) -> RecordingState {
        if self.session.is_some() {
            RecordingState::Recording
        } else {
            RecordingState::Idle
        }
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RecorderEvent> {
        self.event_tx.subscribe()
    }

    pub fn examples(&self) -> &ExampleSet {
        &self.examples
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Set the label for subsequent examples; blank restores the default
    pub fn set_label(&mut self, label: &str) {
        let label = label.trim();
        self.label = if label.is_empty() {
            self.config.default_label.clone()
        } else {
            label.to_string()
        };
        tracing::debug!("Recording label set to '{}'", self.label);
    }

    /// Start if idle, stop if recording
    pub fn toggle(&mut self) -> ToggleOutcome {
        if self.is_recording() {
            ToggleOutcome::Stopped(self.stop())
        } else {
            ToggleOutcome::Started(self.start_session())
        }
    }

    /// Start a session. Returns `None` if one is already active.
    pub fn start(&mut self) -> Option<Uuid> {
        if self.is_recording() {
            return None;
        }
        Some(self.start_session())
    }

    fn start_session(&mut self) -> Uuid {
        let session = RecordingSession::new();
        let session_id = session.id;
        self.session = Some(session);

        let limit = Duration::from_millis(self.config.max_duration_ms);
        let deadline = Instant::now() + limit;
        let tx = self.deadline_tx.clone();
        self.auto_stop = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = tx.send(AutoStop { session_id });
        }));

        let _ = self.event_tx.send(RecorderEvent::Started { session_id });
        tracing::info!("Recording started (label '{}', max {:?})", self.label, limit);
        session_id
    }

    /// Stop the active session, appending an example if anything was captured
    pub fn stop(&mut self) -> StopOutcome {
        if let Some(task) = self.auto_stop.take() {
            task.abort();
        }

        let Some(session) = self.session.take() else {
            tracing::debug!("Stop requested while idle");
            return StopOutcome::NotRecording;
        };

        let duration_ms = session.elapsed_ms();

        if session.frames.is_empty() {
            tracing::info!("Recording stopped after {}ms with no frames; discarded", duration_ms);
            let _ = self.event_tx.send(RecorderEvent::Discarded {
                session_id: session.id,
            });
            return StopOutcome::Empty;
        }

        let example = LabeledExample {
            id: Uuid::new_v4(),
            label: self.label.clone(),
            features: self.extractor.window(&session.frames),
            frame_count: session.frames.len(),
            duration_ms,
            recorded_at: Utc::now(),
        };

        tracing::info!(
            "Recording stopped: {} frames in {}ms labeled '{}' ({} examples)",
            example.frame_count,
            duration_ms,
            example.label,
            self.examples.len() + 1
        );

        let _ = self.event_tx.send(RecorderEvent::ExampleAdded {
            id: example.id,
            label: example.label.clone(),
            frames: example.frame_count,
        });
        self.examples.push(example.clone());

        StopOutcome::Appended(example)
    }

    /// Apply a fired deadline. Ignored unless it belongs to the active session.
    pub fn handle_auto_stop(&mut self, deadline: AutoStop) -> StopOutcome {
        let current = self
            .session
            .as_ref()
            .is_some_and(|s| s.id == deadline.session_id);

        if !current {
            tracing::debug!("Ignoring stale auto-stop for session {}", deadline.session_id);
            return StopOutcome::NotRecording;
        }

        tracing::info!("Recording hit {}ms limit", self.config.max_duration_ms);
        self.auto_stop = None;
        self.stop()
    }

    /// Buffer the first hand of `frame`. Returns whether a frame was captured.
    pub fn capture(&mut self, frame: &DetectionFrame) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let Some(hand) = frame.primary() else {
            return false;
        };

        match self.extractor.extract(hand) {
            Some(feature) => {
                session.frames.push(feature);
                true
            }
            None => {
                tracing::debug!("Skipping capture: hand has {} landmarks", hand.landmarks.len());
                false
            }
        }
    }

    pub fn snapshot(&self) -> RecorderSnapshot {
        RecorderSnapshot {
            state: self.state(),
            frames: self.session.as_ref().map(|s| s.frames.len()).unwrap_or(0),
            elapsed_ms: self.session.as_ref().map(|s| s.elapsed_ms()).unwrap_or(0),
            label: self.label.clone(),
            examples: self.examples.len(),
        }
    }
}

impl Drop for GestureRecorder {
    fn drop(&mut self) {
        if let Some(task) = self.auto_stop.take() {
            task.abort();
        }
    }
}
