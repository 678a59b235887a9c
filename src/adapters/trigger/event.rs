//! Upload notification events
//!
//! Events arrive as JSON objects, one per line. Only `name` is required; a
//! `bucket` field, when present, overrides the configured bucket.

use crate::domain::{Result, TallyError};
use serde::{Deserialize, Serialize};

/// A storage notification for one uploaded object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Object path inside the bucket
    pub name: String,

    /// Bucket holding the object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
}

impl NotificationEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bucket: None,
        }
    }

    /// Parse one feed line; `Ok(None)` for blank lines
    pub fn parse_line(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(line)
            .map(Some)
            .map_err(|e| TallyError::Trigger(format!("Malformed notification: {e}")))
    }
}
