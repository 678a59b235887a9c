//! Filesystem-backed object storage
//!
//! Each bucket is a directory under a root; object paths map to relative file
//! paths inside it.

use crate::adapters::storage::ObjectStore;
use crate::core::reader::ByteStream;
use crate::domain::{Location, Result, TallyError};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// Object store over a local directory tree
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path for a location
    ///
    /// Paths that would escape the bucket directory are rejected.
    pub fn resolve(&self, location: &Location) -> Result<PathBuf> {
        let relative = Path::new(location.path());
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || location.bucket() == ".." || location.bucket() == "." {
            return Err(TallyError::Storage(format!(
                "Object path escapes its bucket: {location}"
            )));
        }
        Ok(self.root.join(location.bucket()).join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    async fn open(&self, location: &Location) -> Result<ByteStream> {
        let path = self.resolve(location)?;
        let file = tokio::fs::File::open(&path).await.map_err(|e| {
            TallyError::Storage(format!("Failed to open {}: {}", path.display(), e))
        })?;

        tracing::debug!(location = %location, path = %path.display(), "Opened local object");
        Ok(Box::new(file.into_std().await))
    }

    async fn write(&self, location: &Location, contents: Vec<u8>) -> Result<()> {
        let path = self.resolve(location)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                TallyError::Storage(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let size = contents.len();
        tokio::fs::write(&path, contents).await.map_err(|e| {
            TallyError::Storage(format!("Failed to write {}: {}", path.display(), e))
        })?;

        tracing::debug!(location = %location, bytes = size, "Wrote local object");
        Ok(())
    }

    async fn exists(&self, location: &Location) -> Result<bool> {
        let path = self.resolve(location)?;
        tokio::fs::try_exists(&path).await.map_err(|e| {
            TallyError::Storage(format!("Failed to stat {}: {}", path.display(), e))
        })
    }
}
