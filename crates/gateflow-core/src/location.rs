//! Storage location value type
//!
//! Schema documents are addressed by `s3://bucket/key` URIs. Parsing is
//! strict: anything without the scheme, a bucket and a key is rejected
//! synchronously, before any resource is created.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const SCHEME: &str = "s3://";

/// A parsed `s3://bucket/key` location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageLocation {
    pub bucket: String,
    pub key: String,
}

impl StorageLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// The full URI form
    pub fn uri(&self) -> String {
        format!("{SCHEME}{}/{}", self.bucket, self.key)
    }

    /// ARN of the bucket holding this object
    pub fn bucket_arn(&self) -> String {
        format!("arn:aws:s3:::{}", self.bucket)
    }
}

impl FromStr for StorageLocation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let rest = s
            .strip_prefix(SCHEME)
            .ok_or_else(|| CoreError::MalformedLocation(s.to_string()))?;

        let (bucket, key) = rest
            .split_once('/')
            .ok_or_else(|| CoreError::MalformedLocation(s.to_string()))?;

        if bucket.is_empty() || key.is_empty() {
            return Err(CoreError::MalformedLocation(s.to_string()));
        }

        Ok(Self::new(bucket, key))
    }
}

impl std::fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let loc: StorageLocation = "s3://bucket-name/key/path.json".parse().unwrap();
        assert_eq!(loc.bucket, "bucket-name");
        assert_eq!(loc.key, "key/path.json");
        assert_eq!(loc.uri(), "s3://bucket-name/key/path.json");
        assert_eq!(loc.bucket_arn(), "arn:aws:s3:::bucket-name");
    }

    #[test]
    fn test_missing_scheme() {
        let err = "bucket-name/key.json".parse::<StorageLocation>().unwrap_err();
        assert!(matches!(err, CoreError::MalformedLocation(_)));
    }

    #[test]
    fn test_missing_key() {
        assert!("s3://bucket-name".parse::<StorageLocation>().is_err());
        assert!("s3://bucket-name/".parse::<StorageLocation>().is_err());
        assert!("s3:///key.json".parse::<StorageLocation>().is_err());
    }

    #[test]
    fn test_roundtrip_display() {
        let loc = StorageLocation::new("b", "k.json");
        let parsed: StorageLocation = loc.to_string().parse().unwrap();
        assert_eq!(parsed, loc);
    }
}
