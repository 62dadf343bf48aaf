pub mod sim;

use crate::permissions::PermissionState;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::oneshot;

/// Which physical camera is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    Front,
    Back,
}

impl CameraFacing {
    pub fn flipped(self) -> Self {
        match self {
            CameraFacing::Front => CameraFacing::Back,
            CameraFacing::Back => CameraFacing::Front,
        }
    }
}

impl fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraFacing::Front => write!(f, "front"),
            CameraFacing::Back => write!(f, "back"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub id: String,
    pub name: String,
    pub facing: CameraFacing,
}

/// Failures reported by the capture subsystem
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("capture device is already recording")]
    Busy,

    #[error("no recording in progress")]
    NotRecording,

    #[error("recording was interrupted before it finished")]
    Interrupted,

    #[error("recorder service is not running")]
    ServiceUnavailable,

    #[error("{0}")]
    Backend(String),
}

/// Settled result of one recording: the file the platform wrote, or why it didn't
pub type CaptureOutcome = std::result::Result<PathBuf, CaptureError>;

/// Permission prompt for a single capability (camera or microphone)
#[async_trait]
pub trait PermissionSource: Send {
    /// May suspend until the user answers a platform dialog
    async fn request_permission(&mut self) -> PermissionState;
}

/// Camera hardware lookup
pub trait DeviceDirectory: Send {
    fn find_device(&self, facing: CameraFacing) -> Option<CameraDevice>;
}

/// Platform capture subsystem
///
/// `start_recording` hands over a completion sender that the implementation
/// resolves exactly once, after `stop_recording` (or a capture error) has
/// finalized the file. Dropping it unresolved counts as an interruption.
#[async_trait]
pub trait CaptureDevice: Send {
    async fn start_recording(
        &mut self,
        device: &CameraDevice,
        done: oneshot::Sender<CaptureOutcome>,
    ) -> std::result::Result<(), CaptureError>;

    async fn stop_recording(&mut self) -> std::result::Result<(), CaptureError>;
}

/// Durable, user-visible media library
#[async_trait]
pub trait MediaStore: Send {
    async fn request_permission(&mut self) -> PermissionState;

    /// Copy `path` into the library and return where it landed
    async fn persist(&self, path: &Path) -> Result<PathBuf>;
}

/// Collaborators the controller talks to directly
///
/// The capture device is not in here: it belongs to the recorder service.
pub struct Platform {
    pub camera_permission: Box<dyn PermissionSource>,
    pub microphone_permission: Box<dyn PermissionSource>,
    pub media_store: Box<dyn MediaStore>,
    pub devices: Box<dyn DeviceDirectory>,
}
