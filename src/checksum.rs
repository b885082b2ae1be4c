//! Checksum utilities for schema integrity verification

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA256 checksum of an entity schema document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Compute checksum from a string
    pub fn of_str(content: &str) -> Self {
        Self::from_bytes(content.as_bytes())
    }

    /// Compute checksum from a JSON value (compact serialization)
    pub fn from_json(value: &serde_json::Value) -> Self {
        // Value's Display is infallible compact JSON
        Self::of_str(&value.to_string())
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Verify that JSON value matches this checksum
    pub fn verify_json(&self, value: &serde_json::Value) -> bool {
        *self == Self::from_json(value)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A checksum read back from a listing, not computed
impl From<String> for Checksum {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_checksum_consistency() {
        let schema = json!({"title": "User", "type": "object"});
        assert_eq!(Checksum::from_json(&schema), Checksum::from_json(&schema));
    }

    #[test]
    fn test_checksum_different_content() {
        let a = Checksum::from_json(&json!({"minimum": 0}));
        let b = Checksum::from_json(&json!({"minimum": 1}));
        assert_ne!(a, b);
    }

    #[test]
    fn test_checksum_is_sha256_hex() {
        let checksum = Checksum::of_str("");
        assert_eq!(
            checksum.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_verify_json() {
        let schema = json!({"enum": ["post", "course"]});
        let checksum = Checksum::from_json(&schema);
        assert!(checksum.verify_json(&schema));
        assert!(!checksum.verify_json(&json!({"enum": ["post"]})));
    }
}
