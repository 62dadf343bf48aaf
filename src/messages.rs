use crate::platform::{CameraDevice, CaptureError};
use std::path::PathBuf;
use tokio::sync::oneshot;

pub type SessionId = u64;

/// Commands for the Recorder service
pub enum RecorderCommand {
    Start {
        session: SessionId,
        device: CameraDevice,
        reply: oneshot::Sender<Result<(), CaptureError>>,
    },
    Stop(oneshot::Sender<Result<(), CaptureError>>),
}

/// Completion of a recording, emitted once per started session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    Finished { session: SessionId, path: PathBuf },
    Failed { session: SessionId, error: CaptureError },
}

impl CaptureEvent {
    pub fn session(&self) -> SessionId {
        match self {
            CaptureEvent::Finished { session, .. } | CaptureEvent::Failed { session, .. } => {
                *session
            }
        }
    }
}

/// Recording lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    Idle,
    Recording,
    /// Stop was requested, waiting for the platform to hand back the file
    Finishing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// User-visible message, the terminal counterpart of an alert dialog
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn new(severity: Severity, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            body: body.into(),
        }
    }
}
