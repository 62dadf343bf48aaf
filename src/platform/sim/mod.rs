//! Stand-in platform for running the capture screen on a desktop terminal

pub mod capture;
pub mod devices;
pub mod library;
pub mod permission;

pub use capture::SimCapture;
pub use devices::ConfiguredDevices;
pub use library::LibraryStore;
pub use permission::PolicyPermission;

use super::Platform;
use crate::config::Config;
use crate::permissions::Capability;
use anyhow::Result;

/// Build the controller-facing collaborators plus the capture device
pub fn build(config: &Config) -> Result<(Platform, SimCapture)> {
    let platform = Platform {
        camera_permission: Box::new(PolicyPermission::new(
            Capability::Camera,
            config.camera_permission,
        )),
        microphone_permission: Box::new(PolicyPermission::new(
            Capability::Microphone,
            config.microphone_permission,
        )),
        media_store: Box::new(LibraryStore::new(
            config.library_dir()?,
            PolicyPermission::new(Capability::Storage, config.storage_permission),
        )),
        devices: Box::new(ConfiguredDevices::new(config.available_cameras.clone())),
    };

    Ok((platform, SimCapture::new(config.recordings_dir())))
}
