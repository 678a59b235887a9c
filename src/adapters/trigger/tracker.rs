//! Grouping of uploads into source/target pairs
//!
//! Object names look like `<prefix>/<group>/<file>`. The second segment is the
//! grouping key. When a second distinct file arrives for a group, the first
//! becomes the source, the second the target, and the group is cleared.

use crate::adapters::trigger::NotificationEvent;
use crate::domain::{Location, Result, TallyError};
use std::collections::HashMap;

/// Minimum number of path segments in a tracked object name
pub const MIN_SEGMENTS: usize = 3;

/// A completed group ready for reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggeredPair {
    pub group: String,
    pub source: Location,
    pub target: Location,
}

/// Pending uploads per group
#[derive(Debug, Default)]
pub struct UploadTracker {
    default_bucket: String,
    pending: HashMap<String, Location>,
}

impl UploadTracker {
    /// Create a tracker for notifications that name no bucket
    pub fn new(default_bucket: impl Into<String>) -> Self {
        Self {
            default_bucket: default_bucket.into(),
            pending: HashMap::new(),
        }
    }

    /// Grouping key of an object name
    ///
    /// # Errors
    ///
    /// Returns [`TallyError::Trigger`] for names with fewer than three segments.
    pub fn group_key(name: &str) -> Result<&str> {
        let parts: Vec<&str> = name.split('/').collect();
        if parts.len() < MIN_SEGMENTS || parts[1].is_empty() {
            return Err(TallyError::Trigger(format!(
                "Object name '{name}' has no grouping segment"
            )));
        }
        Ok(parts[1])
    }

    /// Record one upload
    ///
    /// Returns the pair once a group has two distinct files. A repeated
    /// notification for the file already pending is ignored.
    pub fn record(&mut self, event: &NotificationEvent) -> Result<Option<TriggeredPair>> {
        let group = Self::group_key(&event.name)?.to_string();
        let bucket = event.bucket.as_deref().unwrap_or(&self.default_bucket);
        let location = Location::new(bucket, event.name.as_str()).map_err(TallyError::Trigger)?;

        match self.pending.remove(&group) {
            None => {
                tracing::info!(group = %group, file = %location, "Waiting for second file");
                self.pending.insert(group, location);
                Ok(None)
            }
            Some(first) if first == location => {
                tracing::debug!(group = %group, file = %location, "Duplicate notification ignored");
                self.pending.insert(group, first);
                Ok(None)
            }
            Some(first) => {
                tracing::info!(
                    group = %group,
                    source = %first,
                    target = %location,
                    "Group complete"
                );
                Ok(Some(TriggeredPair {
                    group,
                    source: first,
                    target: location,
                }))
            }
        }
    }

    /// Groups still waiting for a second file
    pub fn pending_groups(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("validation/org1/source.txt", Some("org1"))]
    #[test_case("a/b/c/d.json", Some("b") ; "deeper paths")]
    #[test_case("validation/source.txt", None ; "two segments")]
    #[test_case("source.txt", None ; "one segment")]
    #[test_case("validation//source.txt", None ; "empty group")]
    fn test_group_key(name: &str, expected: Option<&str>) {
        assert_eq!(UploadTracker::group_key(name).ok(), expected);
    }

    #[test]
    fn test_second_file_completes_group() {
        let mut tracker = UploadTracker::new("uploads");

        let first = tracker
            .record(&NotificationEvent::new("validation/org1/source.txt"))
            .unwrap();
        assert!(first.is_none());
        assert_eq!(tracker.pending_groups(), 1);

        let pair = tracker
            .record(&NotificationEvent::new("validation/org1/target.json"))
            .unwrap()
            .unwrap();
        assert_eq!(pair.group, "org1");
        assert_eq!(pair.source.to_string(), "uploads/validation/org1/source.txt");
        assert_eq!(pair.target.to_string(), "uploads/validation/org1/target.json");
        assert_eq!(tracker.pending_groups(), 0);
    }

    #[test]
    fn test_groups_are_independent() {
        let mut tracker = UploadTracker::new("uploads");
        tracker.record(&NotificationEvent::new("v/org1/a.txt")).unwrap();
        tracker.record(&NotificationEvent::new("v/org2/a.txt")).unwrap();
        assert_eq!(tracker.pending_groups(), 2);

        let pair = tracker
            .record(&NotificationEvent::new("v/org2/b.json"))
            .unwrap()
            .unwrap();
        assert_eq!(pair.group, "org2");
        assert_eq!(tracker.pending_groups(), 1);
    }

    #[test]
    fn test_duplicate_notification_is_ignored() {
        let mut tracker = UploadTracker::new("uploads");
        let event = NotificationEvent::new("v/org1/a.txt");
        assert!(tracker.record(&event).unwrap().is_none());
        assert!(tracker.record(&event).unwrap().is_none());
        assert_eq!(tracker.pending_groups(), 1);
    }

    #[test]
    fn test_event_bucket_overrides_default() {
        let mut tracker = UploadTracker::new("uploads");
        let event = NotificationEvent {
            name: "v/org1/a.txt".to_string(),
            bucket: Some("landing".to_string()),
        };
        tracker.record(&event).unwrap();
        let pair = tracker
            .record(&NotificationEvent::new("v/org1/b.json"))
            .unwrap()
            .unwrap();
        assert_eq!(pair.source.bucket(), "landing");
        assert_eq!(pair.target.bucket(), "uploads");
    }

    #[test]
    fn test_short_names_are_rejected() {
        let mut tracker = UploadTracker::new("uploads");
        let result = tracker.record(&NotificationEvent::new("source.txt"));
        assert!(matches!(result, Err(TallyError::Trigger(_))));
        assert_eq!(tracker.pending_groups(), 0);
    }
}
