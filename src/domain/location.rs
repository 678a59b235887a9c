//! Object location newtype
//!
//! Inputs and reports are addressed by an opaque `{bucket, path}` pair. The
//! engine never interprets it; storage backends decide what it maps to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Location of an object in storage
///
/// # Examples
///
/// ```
/// use tally::domain::Location;
/// use std::str::FromStr;
///
/// let location = Location::from_str("samples/validation/org1/source.txt").unwrap();
/// assert_eq!(location.bucket(), "samples");
/// assert_eq!(location.path(), "validation/org1/source.txt");
/// assert_eq!(location.to_string(), "samples/validation/org1/source.txt");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    bucket: String,
    path: String,
}

impl Location {
    /// Creates a new location from a bucket and an object path
    ///
    /// Leading slashes on the path are dropped.
    pub fn new(bucket: impl Into<String>, path: impl Into<String>) -> Result<Self, String> {
        let bucket = bucket.into();
        let path = path.into();
        let path = path.trim_start_matches('/').to_string();

        if bucket.trim().is_empty() {
            return Err("Location bucket cannot be empty".to_string());
        }
        if bucket.contains('/') {
            return Err(format!("Location bucket cannot contain '/': {bucket}"));
        }
        if path.trim().is_empty() {
            return Err("Location path cannot be empty".to_string());
        }

        Ok(Self { bucket, path })
    }

    /// Returns the bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Returns the object path inside the bucket
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the final path segment
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.path)
    }
}

impl FromStr for Location {
    type Err = String;

    /// Parses `bucket/path/to/object`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((bucket, path)) => Self::new(bucket, path),
            None => Err(format!(
                "Location must have the form 'bucket/path', got '{s}'"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_new() {
        let location = Location::new("bucket", "dir/file.json").unwrap();
        assert_eq!(location.bucket(), "bucket");
        assert_eq!(location.path(), "dir/file.json");
        assert_eq!(location.file_name(), "file.json");
    }

    #[test]
    fn test_location_strips_leading_slash() {
        let location = Location::new("bucket", "/dir/file.json").unwrap();
        assert_eq!(location.path(), "dir/file.json");
    }

    #[test]
    fn test_location_rejects_empty_parts() {
        assert!(Location::new("", "file").is_err());
        assert!(Location::new("bucket", "").is_err());
        assert!(Location::new("bucket", "/").is_err());
        assert!(Location::new("a/b", "file").is_err());
    }

    #[test]
    fn test_location_from_str() {
        let location = Location::from_str("bucket/a/b.txt").unwrap();
        assert_eq!(location.bucket(), "bucket");
        assert_eq!(location.path(), "a/b.txt");

        assert!(Location::from_str("no-path").is_err());
    }
}
