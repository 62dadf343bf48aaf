use crate::errors::ScreenError;
use crate::gestures::{Control, Gesture};
use crate::messages::{CaptureEvent, Notice, SessionId, SessionStatus, Severity};
use crate::permissions::{self, PermissionState, Permissions};
use crate::platform::{CameraDevice, CameraFacing, CaptureError, Platform};
use crate::services::RecorderHandle;
use crate::view::ScreenView;
use std::path::PathBuf;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSession {
    pub id: SessionId,
    pub status: SessionStatus,
    /// Facing the session was started with, fixed for its whole lifetime
    pub facing: Option<CameraFacing>,
    pub result_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewState {
    pub visible: bool,
    pub source_path: Option<PathBuf>,
}

/// Everything the screen shows, owned by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenState {
    pub permissions: Permissions,
    pub facing: CameraFacing,
    pub device: Option<CameraDevice>,
    /// Whether the opposite facing has hardware behind it
    pub alternate_device: bool,
    pub session: RecordingSession,
    pub preview: PreviewState,
    /// Outcome of the last gesture or capture event; permission notices are not kept here
    pub notices: Vec<Notice>,
}

impl ScreenState {
    fn new(facing: CameraFacing) -> Self {
        Self {
            permissions: Permissions::default(),
            facing,
            device: None,
            alternate_device: false,
            session: RecordingSession::default(),
            preview: PreviewState::default(),
            notices: Vec::new(),
        }
    }
}

/// Capture Session Controller
///
/// Single owner of the screen state. Gestures and capture events are the
/// only inputs; every mutation goes through one of the transitions below.
pub struct CaptureController {
    state: ScreenState,
    platform: Platform,
    recorder: RecorderHandle,
    next_session: SessionId,
}

impl CaptureController {
    pub fn new(platform: Platform, recorder: RecorderHandle, facing: CameraFacing) -> Self {
        Self {
            state: ScreenState::new(facing),
            platform,
            recorder,
            next_session: 1,
        }
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    pub fn view(&self) -> ScreenView {
        ScreenView::render(&self.state)
    }

    /// Negotiate permissions and look up the camera
    ///
    /// Runs the platform prompts only on the first call.
    pub async fn activate(&mut self) -> Permissions {
        if self.state.permissions.is_resolved() {
            return self.state.permissions;
        }

        let Platform {
            camera_permission,
            microphone_permission,
            media_store,
            ..
        } = &mut self.platform;

        let permissions = permissions::negotiate(
            camera_permission.as_mut(),
            microphone_permission.as_mut(),
            media_store.as_mut(),
        )
        .await;
        self.state.permissions = permissions;

        // The matching notices are derived from `permissions` on every render
        if let Some(capability) = permissions.recording_denial() {
            tracing::warn!("Recording unavailable: {} not granted", capability);
        }
        if permissions.storage != PermissionState::Granted {
            tracing::warn!("Media library access not granted, saving is disabled");
        }

        self.lookup_device();
        permissions
    }

    fn lookup_device(&mut self) {
        let facing = self.state.facing;
        self.state.device = self.platform.devices.find_device(facing);
        self.state.alternate_device = self
            .platform
            .devices
            .find_device(facing.flipped())
            .is_some();

        match &self.state.device {
            Some(device) => tracing::info!("Using {} ({})", device.name, device.id),
            None => tracing::warn!("No {} camera detected", facing),
        }
    }

    /// Dispatch a gesture and surface any failure on screen
    pub async fn handle_gesture(&mut self, gesture: Gesture) {
        self.state.notices.clear();

        let result = match gesture {
            Gesture::PressStart(Control::Record) => self.start_recording().await.map(|_| ()),
            Gesture::PressEnd(Control::Record) => self.stop_recording().await,
            Gesture::Tap(Control::Flip) => self.toggle_facing().map(|_| ()),
            Gesture::Tap(Control::ClosePreview) => {
                self.close_preview();
                Ok(())
            }
            Gesture::Tap(Control::SavePreview) => self.save_preview().await.map(|_| ()),
            other => {
                tracing::debug!("Ignoring gesture {:?}", other);
                Ok(())
            }
        };

        if let Err(e) = result {
            self.report(e);
        }
    }

    fn report(&mut self, error: ScreenError) {
        if error.is_user_visible() {
            tracing::warn!("{}", error);
            self.state
                .notices
                .push(Notice::new(Severity::Error, error.title(), error.to_string()));
        } else {
            tracing::debug!("Rejected: {}", error);
        }
    }

    /// Idle → Recording
    pub async fn start_recording(&mut self) -> Result<SessionId, ScreenError> {
        if !self.state.permissions.is_resolved() {
            return Err(ScreenError::PermissionsPending);
        }
        if self.state.session.status != SessionStatus::Idle {
            tracing::warn!("Start ignored: session {} is still active", self.state.session.id);
            return Err(ScreenError::SessionActive);
        }
        if self.state.preview.visible {
            return Err(ScreenError::PreviewOpen);
        }
        if let Some(capability) = self.state.permissions.recording_denial() {
            return Err(ScreenError::PermissionDenied(capability));
        }

        let facing = self.state.facing;
        let device = self
            .state
            .device
            .clone()
            .ok_or(ScreenError::NoDeviceAvailable(facing))?;

        let id = self.next_session;
        self.next_session += 1;

        tracing::info!("Starting recording {} with the {} camera", id, facing);
        self.state.session = RecordingSession {
            id,
            status: SessionStatus::Recording,
            facing: Some(facing),
            result_path: None,
        };
        self.state.preview = PreviewState::default();

        if let Err(e) = self.recorder.start(id, device).await {
            self.state.session.status = SessionStatus::Idle;
            return Err(ScreenError::RecordingFailed(e.to_string()));
        }

        Ok(id)
    }

    /// Recording → Finishing; a no-op in any other state
    pub async fn stop_recording(&mut self) -> Result<(), ScreenError> {
        if self.state.session.status != SessionStatus::Recording {
            tracing::debug!("Stop ignored: no active recording");
            return Ok(());
        }

        tracing::info!("Stopping recording {}", self.state.session.id);
        self.state.session.status = SessionStatus::Finishing;

        match self.recorder.stop().await {
            Ok(()) => Ok(()),
            // The completion raced us and is already queued
            Err(CaptureError::NotRecording) => Ok(()),
            // Nothing owns the hardware any more, so no completion will come
            Err(e @ CaptureError::ServiceUnavailable) => {
                self.state.session.status = SessionStatus::Idle;
                Err(ScreenError::RecordingFailed(e.to_string()))
            }
            // The platform may still be recording; its completion settles the session
            Err(e) => Err(ScreenError::RecordingFailed(e.to_string())),
        }
    }

    /// Finishing → Idle, opening the preview on success
    pub fn on_capture_event(&mut self, event: CaptureEvent) {
        let session = &mut self.state.session;
        if event.session() != session.id || session.status == SessionStatus::Idle {
            tracing::debug!("Ignoring capture event for stale session {}", event.session());
            return;
        }

        session.status = SessionStatus::Idle;

        match event {
            CaptureEvent::Finished { path, .. } if !path.as_os_str().is_empty() => {
                tracing::info!("Recording {} ready for preview: {:?}", session.id, path);
                session.result_path = Some(path.clone());
                self.state.preview = PreviewState {
                    visible: true,
                    source_path: Some(path),
                };
            }
            CaptureEvent::Finished { .. } => {
                self.report(ScreenError::RecordingFailed(
                    "capture finished without a file".to_string(),
                ));
            }
            CaptureEvent::Failed { error, .. } => {
                self.report(ScreenError::RecordingFailed(error.to_string()));
            }
        }
    }

    /// Flip between front and back cameras, only while idle
    pub fn toggle_facing(&mut self) -> Result<CameraFacing, ScreenError> {
        if self.state.session.status != SessionStatus::Idle {
            tracing::warn!("Camera flip ignored while recording");
            return Err(ScreenError::SessionActive);
        }

        self.state.facing = self.state.facing.flipped();
        tracing::info!("Switched to the {} camera", self.state.facing);
        self.lookup_device();

        Ok(self.state.facing)
    }

    /// Hide the preview; the recorded file stays where it is
    pub fn close_preview(&mut self) {
        if self.state.preview.visible {
            tracing::debug!("Closing preview");
        }
        self.state.preview.visible = false;
    }

    /// Persist the previewed recording into the media library
    pub async fn save_preview(&mut self) -> Result<PathBuf, ScreenError> {
        let source = match &self.state.preview {
            PreviewState {
                visible: true,
                source_path: Some(path),
            } => path.clone(),
            _ => return Err(ScreenError::SaveFailed("there is no recording to save".into())),
        };

        if !self.state.permissions.can_save() {
            return Err(ScreenError::SaveFailed(
                "access to the media library was not granted".into(),
            ));
        }

        match self.platform.media_store.persist(&source).await {
            Ok(saved) => {
                tracing::info!("Video saved to {:?}", saved);
                self.state.notices.push(Notice::new(
                    Severity::Info,
                    "Saved",
                    "The video was saved!",
                ));
                Ok(saved)
            }
            Err(e) => Err(ScreenError::SaveFailed(format!("{:#}", e))),
        }
    }

    /// Stop any active recording and wait for it to settle
    ///
    /// Called when the screen goes away so the capture hardware is never
    /// left running.
    pub async fn teardown(&mut self, events: &mut mpsc::Receiver<CaptureEvent>) {
        if self.state.session.status == SessionStatus::Recording {
            tracing::info!("Stopping active recording before shutdown");
            if let Err(e) = self.stop_recording().await {
                tracing::warn!("{}", e);
            }
        }

        while self.state.session.status == SessionStatus::Finishing {
            match events.recv().await {
                Some(event) => self.on_capture_event(event),
                None => {
                    tracing::warn!("Recorder exited before the recording settled");
                    self.state.session.status = SessionStatus::Idle;
                }
            }
        }
    }
}
