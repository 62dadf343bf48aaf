use crate::permissions::Capability;
use crate::platform::CameraFacing;
use thiserror::Error;

/// Everything that can go wrong on the capture screen
///
/// The first four variants are shown to the user; the rest are gestures the
/// controller refuses in its current state and are only logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScreenError {
    #[error("{0} permission was not granted")]
    PermissionDenied(Capability),

    #[error("no {0} camera was detected")]
    NoDeviceAvailable(CameraFacing),

    #[error("recording failed: {0}")]
    RecordingFailed(String),

    #[error("an error occurred while saving the video: {0}")]
    SaveFailed(String),

    #[error("permissions are still being requested")]
    PermissionsPending,

    #[error("a recording is already in progress")]
    SessionActive,

    #[error("the preview must be closed before recording again")]
    PreviewOpen,
}

impl ScreenError {
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            ScreenError::PermissionDenied(_)
                | ScreenError::NoDeviceAvailable(_)
                | ScreenError::RecordingFailed(_)
                | ScreenError::SaveFailed(_)
        )
    }

    pub fn title(&self) -> &'static str {
        match self {
            ScreenError::PermissionDenied(_) => "Permission denied",
            ScreenError::NoDeviceAvailable(_) => "No camera",
            ScreenError::RecordingFailed(_) => "Recording failed",
            ScreenError::SaveFailed(_) => "Save failed",
            ScreenError::PermissionsPending
            | ScreenError::SessionActive
            | ScreenError::PreviewOpen => "Busy",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_user_visible_kinds_have_distinct_titles() {
        let errors = [
            ScreenError::PermissionDenied(Capability::Storage),
            ScreenError::NoDeviceAvailable(CameraFacing::Front),
            ScreenError::RecordingFailed("encoder gone".into()),
            ScreenError::SaveFailed("disk full".into()),
        ];
        let titles: HashSet<_> = errors.iter().map(ScreenError::title).collect();
        assert_eq!(titles.len(), errors.len());
        assert!(errors.iter().all(ScreenError::is_user_visible));
    }

    #[test]
    fn test_rejections_stay_out_of_the_ui() {
        assert!(!ScreenError::SessionActive.is_user_visible());
        assert!(!ScreenError::PermissionsPending.is_user_visible());
        assert!(!ScreenError::PreviewOpen.is_user_visible());
    }

    #[test]
    fn test_messages_carry_the_underlying_detail() {
        let err = ScreenError::SaveFailed("No space left on device".into());
        assert!(err.to_string().contains("No space left on device"));
        assert_eq!(
            ScreenError::PermissionDenied(Capability::Microphone).to_string(),
            "microphone permission was not granted"
        );
    }
}
