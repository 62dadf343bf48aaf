use crate::platform::{MediaStore, PermissionSource};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Answer from the host platform for a single capability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    #[default]
    Unknown,
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Camera,
    Microphone,
    Storage,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Camera => write!(f, "camera"),
            Capability::Microphone => write!(f, "microphone"),
            Capability::Storage => write!(f, "storage"),
        }
    }
}

/// Combined grants for the three capabilities the screen needs
///
/// `resolved` only flips once all three requests have come back, so nothing
/// downstream may look at the individual states before that.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Permissions {
    pub camera: PermissionState,
    pub microphone: PermissionState,
    pub storage: PermissionState,
    resolved: bool,
}

impl Permissions {
    pub fn resolved(
        camera: PermissionState,
        microphone: PermissionState,
        storage: PermissionState,
    ) -> Self {
        Self {
            camera,
            microphone,
            storage,
            resolved: true,
        }
    }

    pub fn get(&self, capability: Capability) -> PermissionState {
        match capability {
            Capability::Camera => self.camera,
            Capability::Microphone => self.microphone,
            Capability::Storage => self.storage,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn can_record(&self) -> bool {
        self.resolved
            && self.camera == PermissionState::Granted
            && self.microphone == PermissionState::Granted
    }

    pub fn can_save(&self) -> bool {
        self.resolved && self.storage == PermissionState::Granted
    }

    /// First capability that keeps recording disabled, camera before microphone
    pub fn recording_denial(&self) -> Option<Capability> {
        [Capability::Camera, Capability::Microphone]
            .into_iter()
            .find(|capability| self.get(*capability) != PermissionState::Granted)
    }
}

/// Request camera, microphone and storage access, strictly in that order
///
/// Each request may park on a platform dialog; the next one is only issued
/// after the previous answer arrived.
pub async fn negotiate(
    camera: &mut dyn PermissionSource,
    microphone: &mut dyn PermissionSource,
    storage: &mut dyn MediaStore,
) -> Permissions {
    tracing::debug!("Requesting camera permission");
    let camera = camera.request_permission().await;
    tracing::info!("Camera permission: {:?}", camera);

    tracing::debug!("Requesting microphone permission");
    let microphone = microphone.request_permission().await;
    tracing::info!("Microphone permission: {:?}", microphone);

    tracing::debug!("Requesting media library permission");
    let storage = storage.request_permission().await;
    tracing::info!("Media library permission: {:?}", storage);

    Permissions::resolved(camera, microphone, storage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    struct ScriptedSource {
        name: &'static str,
        answer: PermissionState,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl PermissionSource for ScriptedSource {
        async fn request_permission(&mut self) -> PermissionState {
            tokio::task::yield_now().await;
            self.log.lock().unwrap().push(self.name);
            self.answer
        }
    }

    #[async_trait]
    impl MediaStore for ScriptedSource {
        async fn request_permission(&mut self) -> PermissionState {
            self.log.lock().unwrap().push(self.name);
            self.answer
        }

        async fn persist(&self, path: &Path) -> Result<PathBuf> {
            Ok(path.to_path_buf())
        }
    }

    fn source(
        name: &'static str,
        answer: PermissionState,
        log: &Arc<Mutex<Vec<&'static str>>>,
    ) -> ScriptedSource {
        ScriptedSource {
            name,
            answer,
            log: log.clone(),
        }
    }

    #[tokio::test]
    async fn test_negotiate_asks_in_fixed_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut camera = source("camera", PermissionState::Granted, &log);
        let mut mic = source("microphone", PermissionState::Denied, &log);
        let mut storage = source("storage", PermissionState::Granted, &log);

        let permissions = negotiate(&mut camera, &mut mic, &mut storage).await;

        assert_eq!(*log.lock().unwrap(), vec!["camera", "microphone", "storage"]);
        assert!(permissions.is_resolved());
        assert_eq!(permissions.microphone, PermissionState::Denied);
    }

    #[test]
    fn test_unresolved_permissions_gate_everything() {
        let permissions = Permissions::default();
        assert!(!permissions.is_resolved());
        assert!(!permissions.can_record());
        assert!(!permissions.can_save());
        assert_eq!(permissions.get(Capability::Camera), PermissionState::Unknown);
    }

    #[test]
    fn test_storage_only_gates_save() {
        let permissions = Permissions::resolved(
            PermissionState::Granted,
            PermissionState::Granted,
            PermissionState::Denied,
        );
        assert!(permissions.can_record());
        assert!(!permissions.can_save());
        assert_eq!(permissions.recording_denial(), None);
    }

    #[test]
    fn test_recording_denial_reports_camera_first() {
        let permissions = Permissions::resolved(
            PermissionState::Denied,
            PermissionState::Denied,
            PermissionState::Granted,
        );
        assert_eq!(permissions.recording_denial(), Some(Capability::Camera));

        let permissions = Permissions::resolved(
            PermissionState::Granted,
            PermissionState::Denied,
            PermissionState::Granted,
        );
        assert_eq!(permissions.recording_denial(), Some(Capability::Microphone));
    }
}
