use super::permission::PolicyPermission;
use crate::permissions::PermissionState;
use crate::platform::MediaStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Media library backed by a plain directory
pub struct LibraryStore {
    library_dir: PathBuf,
    permission: PolicyPermission,
}

impl LibraryStore {
    pub fn new(library_dir: PathBuf, permission: PolicyPermission) -> Self {
        Self {
            library_dir,
            permission,
        }
    }
}

#[async_trait]
impl MediaStore for LibraryStore {
    async fn request_permission(&mut self) -> PermissionState {
        self.permission.resolve().await
    }

    async fn persist(&self, path: &Path) -> Result<PathBuf> {
        let file_name = path
            .file_name()
            .with_context(|| format!("Not a file: {:?}", path))?;

        tokio::fs::create_dir_all(&self.library_dir)
            .await
            .with_context(|| format!("Failed to create library directory: {:?}", self.library_dir))?;

        let destination = unique_destination(&self.library_dir, Path::new(file_name)).await;

        tokio::fs::copy(path, &destination)
            .await
            .with_context(|| format!("Failed to copy {:?} to {:?}", path, destination))?;

        tracing::info!("Saved {:?} to library as {:?}", path, destination);
        Ok(destination)
    }
}

/// `name.ext`, or `name-1.ext`, `name-2.ext`, ... when taken
async fn unique_destination(dir: &Path, file_name: &Path) -> PathBuf {
    let candidate = dir.join(file_name);
    if !exists(&candidate).await {
        return candidate;
    }

    let stem = file_name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = file_name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 1u32;
    loop {
        let candidate = dir.join(format!("{}-{}{}", stem, n, extension));
        if !exists(&candidate).await {
            return candidate;
        }
        n += 1;
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
