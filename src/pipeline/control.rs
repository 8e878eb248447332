//! Commands from the UI into the running frame loop

use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    /// The record button: start if idle, stop if recording
    ToggleRecording,
    SetLabel(String),
    Train,
    Shutdown,
}

/// Cloneable sender half handed to the UI
#[derive(Debug, Clone)]
pub struct PipelineHandle {
    tx: mpsc::UnboundedSender<ControlCommand>,
}

impl PipelineHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<ControlCommand>) -> Self {
        Self { tx }
    }

    /// Queue a command. Returns `false` once the loop has exited.
    pub fn send(&self, command: ControlCommand) -> bool {
        match self.tx.send(command) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Frame loop gone; dropped {:?}", e.0);
                false
            }
        }
    }

    pub fn toggle_recording(&self) -> bool {
        self.send(ControlCommand::ToggleRecording)
    }

    pub fn set_label(&self, label: impl Into<String>) -> bool {
        self.send(ControlCommand::SetLabel(label.into()))
    }

    pub fn train(&self) -> bool {
        self.send(ControlCommand::Train)
    }

    pub fn shutdown(&self) -> bool {
        self.send(ControlCommand::Shutdown)
    }
}
