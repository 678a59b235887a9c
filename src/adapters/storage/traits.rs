//! Object storage abstraction
//!
//! This module defines the trait that storage backends implement to serve
//! input extracts and receive reports.

use crate::core::reader::ByteStream;
use crate::domain::{Location, Result, TallyError};
use async_trait::async_trait;
use std::io::Read;

/// Bucket/path addressed object storage
///
/// `open` hands back a synchronous byte stream because the readers run on a
/// blocking thread. Backends must not buffer a whole object in memory to
/// satisfy it.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;

    /// Open an object for sequential reading
    ///
    /// # Errors
    ///
    /// Returns [`TallyError::Storage`] if the object does not exist or cannot
    /// be read.
    async fn open(&self, location: &Location) -> Result<ByteStream>;

    /// Create or replace an object
    ///
    /// # Errors
    ///
    /// Returns [`TallyError::Storage`] if the object cannot be written.
    async fn write(&self, location: &Location, contents: Vec<u8>) -> Result<()>;

    /// Whether an object exists
    async fn exists(&self, location: &Location) -> Result<bool>;

    /// Read a whole object into memory
    ///
    /// Meant for small objects such as reports.
    async fn read_all(&self, location: &Location) -> Result<Vec<u8>> {
        let mut stream = self.open(location).await?;
        tokio::task::spawn_blocking(move || {
            let mut buf = Vec::new();
            stream.read_to_end(&mut buf).map(|_| buf)
        })
        .await
        .map_err(|e| TallyError::Storage(format!("Read task failed: {e}")))?
        .map_err(|e| TallyError::Storage(format!("Failed to read {location}: {e}")))
    }
}
