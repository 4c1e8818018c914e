//! Directory-backed upload store

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::{StorageError, StorageResult, UploadStore};

/// Uploaded files stored flat in one directory
#[derive(Debug, Clone)]
pub struct FsUploadStore {
    root: PathBuf,
}

impl FsUploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_exists(&self) -> StorageResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Resolve a stored file name, refusing anything that is not a bare name
    fn resolve(&self, filename: &str) -> StorageResult<PathBuf> {
        let valid = !filename.is_empty()
            && filename != "."
            && filename != ".."
            && !filename.contains(['/', '\\', '\0']);
        if valid {
            Ok(self.root.join(filename))
        } else {
            Err(StorageError::InvalidName(filename.to_string()))
        }
    }
}

/// Lowercased extension of an uploaded file name, if it looks like one
fn extension(original_name: &str) -> Option<String> {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
}

#[async_trait]
impl UploadStore for FsUploadStore {
    async fn save(&self, original_name: &str, bytes: &[u8]) -> StorageResult<String> {
        let filename = match extension(original_name) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };
        self.ensure_exists().await?;
        tokio::fs::write(self.resolve(&filename)?, bytes).await?;
        tracing::info!(%filename, size = bytes.len(), "upload stored");
        Ok(filename)
    }

    async fn remove(&self, filename: &str) -> StorageResult<bool> {
        match tokio::fs::remove_file(self.resolve(filename)?).await {
            Ok(()) => {
                tracing::info!(%filename, "upload removed");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
