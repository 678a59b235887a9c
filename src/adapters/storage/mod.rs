//! Object storage backends
//!
//! - [`LocalObjectStore`] - buckets as directories under a root
//! - [`HttpObjectStore`] - buckets below an HTTP base URL
//!
//! Use [`create_object_store`] to build the one selected in configuration.

pub mod factory;
pub mod http;
pub mod local;
pub mod traits;

pub use factory::create_object_store;
pub use http::HttpObjectStore;
pub use local::LocalObjectStore;
pub use traits::ObjectStore;
