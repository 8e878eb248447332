//! Recognizer session
//!
//! Owns the recognizer handle. Initialization is attempted a bounded number
//! of times; once exhausted the session stays failed for its lifetime.

use super::traits::{Recognizer, RecognizerFactory, RecognizerOptions, VideoFrame};
use crate::config::RecognizerConfig;
use crate::dispatch::{AudioEngine, GestureInterpreter};
use crate::landmarks::DetectionFrame;
use crate::utils::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Lifecycle of the recognizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Uninitialized,
    Ready,
    /// All attempts failed; no further attempts are made
    Failed,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Uninitialized
    }
}

pub struct RecognizerSession {
    config: RecognizerConfig,
    state: SessionState,
    recognizer: Option<Box<dyn Recognizer>>,
    last_error: Option<String>,
}

impl RecognizerSession {
    pub fn new(config: RecognizerConfig) -> Self {
        Self {
            config,
            state: SessionState::Uninitialized,
            recognizer: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    /// Build the recognizer, retrying up to `max_attempts` times.
    ///
    /// Also attaches the audio engine's region manager to the interpreter,
    /// once, whatever the outcome.
    pub async fn initialize(
        &mut self,
        factory: &dyn RecognizerFactory,
        interpreter: &mut dyn GestureInterpreter,
        audio: &dyn AudioEngine,
    ) -> AppResult<()> {
        if !interpreter.has_regions_attached() {
            tracing::debug!("Attaching region manager to gesture interpreter");
            interpreter.attach_regions(audio.regions());
        }

        match self.state {
            SessionState::Ready => return Ok(()),
            SessionState::Failed => return Err(self.failure()),
            SessionState::Uninitialized => {}
        }

        let options = RecognizerOptions::from(&self.config);
        let max_attempts = self.config.max_attempts;

        for attempt in 1..=max_attempts {
            tracing::info!(
                "Initializing recognizer (attempt {}/{}): {}",
                attempt,
                max_attempts,
                options.model_asset_path
            );

            match factory.create(&options).await {
                Ok(recognizer) => {
                    self.recognizer = Some(recognizer);
                    self.state = SessionState::Ready;
                    self.last_error = None;
                    tracing::info!("Recognizer ready after {} attempt(s)", attempt);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Recognizer init attempt {} failed: {:#}", attempt, e);
                    self.last_error = Some(format!("{:#}", e));
                }
            }
        }

        self.state = SessionState::Failed;
        let error = self.failure();
        tracing::error!("{}", error);
        Err(error)
    }

    /// Run the recognizer on one frame
    pub async fn recognize(
        &mut self,
        frame: &VideoFrame,
        timestamp_ms: i64,
    ) -> AppResult<DetectionFrame> {
        let recognizer = self
            .recognizer
            .as_mut()
            .ok_or_else(|| AppError::Recognition("recognizer not ready".to_string()))?;

        recognizer
            .recognize_for_video(frame, timestamp_ms)
            .await
            .map_err(|e| AppError::Recognition(format!("{:#}", e)))
    }

    fn failure(&self) -> AppError {
        AppError::Initialization {
            attempts: self.config.max_attempts,
            message: self
                .last_error
                .clone()
                .unwrap_or_else(|| "unknown error".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FlakyFactory, RecordingAudio, ScriptedInterpreter};

    #[tokio::test]
    async fn test_ready_after_retries() {
        let factory = FlakyFactory::new(2);
        let (mut interpreter, _script) = ScriptedInterpreter::new();
        let audio = RecordingAudio::default();
        let mut session = RecognizerSession::new(RecognizerConfig::default());

        session.initialize(&factory, &mut interpreter, &audio).await.unwrap();

        assert!(session.is_ready());
        assert_eq!(*factory.calls.lock(), 3);
    }

    #[tokio::test]
    async fn test_fails_after_max_attempts() {
        let factory = FlakyFactory::new(5);
        let (mut interpreter, _script) = ScriptedInterpreter::new();
        let audio = RecordingAudio::default();
        let mut session = RecognizerSession::new(RecognizerConfig::default());

        let result = session.initialize(&factory, &mut interpreter, &audio).await;

        assert!(matches!(result, Err(AppError::Initialization { attempts: 3, .. })));
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(*factory.calls.lock(), 3);

        // permanently degraded: no further attempts
        let again = session.initialize(&factory, &mut interpreter, &audio).await;
        assert!(again.is_err());
        assert_eq!(*factory.calls.lock(), 3);
    }

    #[tokio::test]
    async fn test_regions_attached_once() {
        let factory = FlakyFactory::new(0);
        let (mut interpreter, script) = ScriptedInterpreter::new();
        let audio = RecordingAudio::default();
        let mut session = RecognizerSession::new(RecognizerConfig::default());

        session.initialize(&factory, &mut interpreter, &audio).await.unwrap();
        session.initialize(&factory, &mut interpreter, &audio).await.unwrap();

        assert_eq!(*script.attach_count.lock(), 1);
        assert_eq!(*factory.calls.lock(), 1);
    }

    #[tokio::test]
    async fn test_recognize_before_ready() {
        let mut session = RecognizerSession::new(RecognizerConfig::default());
        let result = session.recognize(&VideoFrame::default(), 1).await;
        assert!(matches!(result, Err(AppError::Recognition(_))));
    }

    #[tokio::test]
    async fn test_recognize_maps_errors() {
        let factory = FlakyFactory::new(0);
        factory.results.lock().push(Err(anyhow::anyhow!("graph error")));
        let (mut interpreter, _script) = ScriptedInterpreter::new();
        let audio = RecordingAudio::default();
        let mut session = RecognizerSession::new(RecognizerConfig::default());
        session.initialize(&factory, &mut interpreter, &audio).await.unwrap();

        match session.recognize(&VideoFrame::default(), 5).await {
            Err(AppError::Recognition(message)) => assert!(message.contains("graph error")),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(session.recognize(&VideoFrame::default(), 6).await.is_ok());
        assert_eq!(*factory.timestamps.lock(), vec![5, 6]);
    }
}
