use crate::controller::ScreenState;
use crate::messages::{Notice, SessionStatus, Severity};
use crate::permissions::{PermissionState, Permissions};
use crate::platform::CameraFacing;
use std::fmt;
use std::path::PathBuf;

/// Playback modal for a finished recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewModal {
    pub source: PathBuf,
    pub looping: bool,
    pub autoplay: bool,
    pub save_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraScreen {
    pub facing: CameraFacing,
    pub recording_indicator: bool,
    pub record_enabled: bool,
    pub flip_enabled: bool,
    pub preview: Option<PreviewModal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    CheckingPermissions,
    AccessDenied,
    NoCamera { facing: CameraFacing, can_flip: bool },
    Camera(CameraScreen),
}

/// Render directives for the host shell
///
/// Derived from `ScreenState` alone; the shell never reads the state directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenView {
    pub screen: Screen,
    pub notices: Vec<Notice>,
}

impl ScreenView {
    pub fn render(state: &ScreenState) -> Self {
        let idle = state.session.status == SessionStatus::Idle;

        let screen = if !state.permissions.is_resolved() {
            Screen::CheckingPermissions
        } else if state.device.is_none() {
            Screen::NoCamera {
                facing: state.facing,
                can_flip: idle && state.alternate_device,
            }
        } else if !state.permissions.can_record() {
            Screen::AccessDenied
        } else {
            let preview = match (state.preview.visible, &state.preview.source_path) {
                (true, Some(source)) => Some(PreviewModal {
                    source: source.clone(),
                    looping: true,
                    autoplay: true,
                    save_enabled: state.permissions.can_save(),
                }),
                _ => None,
            };

            Screen::Camera(CameraScreen {
                facing: state.facing,
                recording_indicator: state.session.status == SessionStatus::Recording,
                record_enabled: state.session.status != SessionStatus::Finishing
                    && preview.is_none(),
                flip_enabled: idle,
                preview,
            })
        };

        let mut notices = permission_notices(&state.permissions);
        notices.extend(state.notices.iter().cloned());

        Self { screen, notices }
    }

    pub fn preview(&self) -> Option<&PreviewModal> {
        match &self.screen {
            Screen::Camera(camera) => camera.preview.as_ref(),
            _ => None,
        }
    }

    /// Whether the record control is on screen and accepts a press
    pub fn record_reachable(&self) -> bool {
        matches!(&self.screen, Screen::Camera(camera) if camera.record_enabled)
    }
}

/// Standing notices for whatever negotiation refused, shown until the screen goes away
fn permission_notices(permissions: &Permissions) -> Vec<Notice> {
    let mut notices = Vec::new();
    if !permissions.is_resolved() {
        return notices;
    }

    if permissions.recording_denial().is_some() {
        notices.push(Notice::new(
            Severity::Error,
            "Error",
            "Camera or microphone permission not granted.",
        ));
    }
    if permissions.storage != PermissionState::Granted {
        notices.push(Notice::new(
            Severity::Warning,
            "Media library",
            "Access to the media library was not granted. Videos cannot be saved.",
        ));
    }

    notices
}

impl fmt::Display for ScreenView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.screen {
            Screen::CheckingPermissions => writeln!(f, "Checking permissions...")?,
            Screen::AccessDenied => writeln!(f, "Access denied")?,
            Screen::NoCamera { facing, can_flip } => {
                writeln!(f, "No {} camera detected", facing)?;
                if *can_flip {
                    writeln!(f, "  [f] flip camera")?;
                }
            }
            Screen::Camera(camera) => {
                let indicator = if camera.recording_indicator { "  ● REC" } else { "" };
                writeln!(f, "[{} camera]{}", camera.facing, indicator)?;

                match &camera.preview {
                    Some(preview) => {
                        writeln!(f, "  ▶ playing {} (looped)", preview.source.display())?;
                        write!(f, "  [c] close")?;
                        if preview.save_enabled {
                            write!(f, "  [v] save video")?;
                        }
                        writeln!(f)?;
                    }
                    None => {
                        let mut controls = Vec::new();
                        if camera.recording_indicator {
                            controls.push("[s] release to stop");
                        } else if camera.record_enabled {
                            controls.push("[r] hold to record");
                        }
                        if camera.flip_enabled {
                            controls.push("[f] flip camera");
                        }
                        writeln!(f, "  {}", controls.join("  "))?;
                    }
                }
            }
        }

        for notice in &self.notices {
            let marker = match notice.severity {
                Severity::Info => "i",
                Severity::Warning => "!",
                Severity::Error => "x",
            };
            writeln!(f, "({}) {}: {}", marker, notice.title, notice.body)?;
        }

        Ok(())
    }
}
