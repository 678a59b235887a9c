//! Object store factory
//!
//! Builds the configured [`ObjectStore`] backend.

use crate::adapters::storage::{HttpObjectStore, LocalObjectStore, ObjectStore};
use crate::config::{StorageBackend, StorageConfig};
use crate::domain::Result;
use std::sync::Arc;

/// Create an object store based on the `[storage]` section
///
/// # Errors
///
/// Returns an error if the HTTP backend is selected with an unusable base URL.
pub fn create_object_store(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>> {
    match config.backend {
        StorageBackend::Local => {
            tracing::info!(root = %config.root, "Using local object storage");
            Ok(Arc::new(LocalObjectStore::new(&config.root)))
        }
        StorageBackend::Http => {
            let store = HttpObjectStore::from_config(config)?;
            tracing::info!(
                base_url = config.base_url.as_deref().unwrap_or_default(),
                authenticated = config.token.is_some(),
                "Using HTTP object storage"
            );
            Ok(Arc::new(store))
        }
    }
}
