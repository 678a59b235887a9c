//! Upload-driven triggering
//!
//! [`UploadTracker`] consumes [`NotificationEvent`]s and yields a
//! [`TriggeredPair`] when two files have arrived for the same group.

pub mod event;
pub mod tracker;

pub use event::NotificationEvent;
pub use tracker::{TriggeredPair, UploadTracker};
