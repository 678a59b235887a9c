//! External system integrations for Tally.
//!
//! - [`storage`] - object storage backends (local directory tree, HTTP)
//! - [`trigger`] - upload notifications grouped into source/target pairs
//!
//! # Design Pattern
//!
//! Adapters isolate external systems behind traits so the engine depends only
//! on a `read(location)` / `write(location)` capability and tests can run
//! against a temporary directory.
//!
//! ```rust,no_run
//! use tally::adapters::storage::create_object_store;
//! use tally::config::StorageConfig;
//!
//! # fn example() -> tally::domain::Result<()> {
//! let store = create_object_store(&StorageConfig::default())?;
//! println!("backend: {}", store.backend_name());
//! # Ok(())
//! # }
//! ```

pub mod storage;
pub mod trigger;
