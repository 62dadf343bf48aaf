use crate::platform::CameraFacing;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// How the simulated platform answers a permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionPolicy {
    Granted,
    Denied,
    /// Ask on the terminal
    Prompt,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_facing")]
    pub default_facing: CameraFacing,

    #[serde(default = "default_policy")]
    pub camera_permission: PermissionPolicy,

    #[serde(default = "default_policy")]
    pub microphone_permission: PermissionPolicy,

    #[serde(default = "default_policy")]
    pub storage_permission: PermissionPolicy,

    #[serde(default = "default_available_cameras")]
    pub available_cameras: Vec<CameraFacing>,

    #[serde(default)]
    pub recordings_dir: Option<PathBuf>,

    #[serde(default)]
    pub library_dir: Option<PathBuf>,
}

fn default_facing() -> CameraFacing {
    CameraFacing::Back
}

fn default_policy() -> PermissionPolicy {
    PermissionPolicy::Prompt
}

fn default_available_cameras() -> Vec<CameraFacing> {
    vec![CameraFacing::Back, CameraFacing::Front]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_facing: default_facing(),
            camera_permission: default_policy(),
            microphone_permission: default_policy(),
            storage_permission: default_policy(),
            available_cameras: default_available_cameras(),
            recordings_dir: None,
            library_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.config/clipcam/config.json)
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::info!(
                "Config file not found at {:?}, creating default config",
                config_path
            );
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        tracing::info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        tracing::info!("Saved config to {:?}", config_path);
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = if let Ok(dir) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(dir)
        } else {
            home_dir()?.join(".config")
        };

        Ok(config_dir.join("clipcam").join("config.json"))
    }

    /// Where finished recordings are written before the user saves them
    pub fn recordings_dir(&self) -> PathBuf {
        self.recordings_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }

    /// The media library saved videos are copied into
    pub fn library_dir(&self) -> Result<PathBuf> {
        match &self.library_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(home_dir()?.join("Videos").join("clipcam")),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.available_cameras.is_empty() {
            return Err(anyhow::anyhow!(
                "available_cameras must list at least one of: front, back"
            ));
        }

        let unique: HashSet<_> = self.available_cameras.iter().collect();
        if unique.len() != self.available_cameras.len() {
            return Err(anyhow::anyhow!("available_cameras contains duplicates"));
        }

        if self.library_dir.as_ref().is_some_and(|dir| dir.as_os_str().is_empty()) {
            return Err(anyhow::anyhow!("library_dir cannot be empty"));
        }

        Ok(())
    }
}

fn home_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home))
}
