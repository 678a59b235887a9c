//! Domain models and types for Tally.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Addressing** ([`Location`]) for inputs and reports
//! - **Batches** ([`Batch`]) produced by the readers and consumed by the comparator
//! - **Mismatch records** ([`MismatchRecord`], [`ErrorKind`])
//! - **Error types** ([`TallyError`]) and the [`Result`] alias
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, TallyError>`]:
//!
//! ```rust
//! use tally::domain::{Location, Result, TallyError};
//! use std::str::FromStr;
//!
//! fn parse(raw: &str) -> Result<Location> {
//!     Location::from_str(raw).map_err(TallyError::Configuration)
//! }
//!
//! assert!(parse("bucket/file.txt").is_ok());
//! assert!(parse("bucket").is_err());
//! ```

pub mod batch;
pub mod errors;
pub mod location;
pub mod mismatch;
pub mod result;

pub use batch::Batch;
pub use errors::TallyError;
pub use location::Location;
pub use mismatch::{ErrorKind, MismatchRecord};
pub use result::Result;
