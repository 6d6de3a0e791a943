//! Content hashing for deterministic compilation checks.
//!
//! Produces a SHA-256 hash of a value's canonical JSON serialization, so two
//! compilations of the same document can be compared byte for byte.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::TesseraResult;

/// A content hash digest (SHA-256, 32 bytes).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash {
    bytes: [u8; 32],
}

impl ContentHash {
    /// Create from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Get the hash as a hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Hash raw bytes.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
    let result = Sha256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&result);
    ContentHash::from_bytes(bytes)
}

/// Hash the compact JSON serialization of a value.
pub fn hash_json<T: Serialize>(value: &T) -> TesseraResult<ContentHash> {
    let encoded = serde_json::to_vec(value)?;
    Ok(hash_bytes(&encoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hash_deterministic() {
        let a = json!({ "b": 1, "a": [1, 2, 3] });
        let b = json!({ "a": [1, 2, 3], "b": 1 });
        assert_eq!(hash_json(&a).unwrap(), hash_json(&b).unwrap());
    }

    #[test]
    fn test_hash_different_content() {
        let a = json!({ "x": 1 });
        let b = json!({ "x": 2 });
        assert_ne!(hash_json(&a).unwrap(), hash_json(&b).unwrap());
    }

    #[test]
    fn test_hash_hex_format() {
        let hash = hash_bytes(b"tessera");
        let hex = hash.to_hex();
        assert_eq!(hex.len(), 64); // SHA-256 = 64 hex chars
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(format!("{}", hash), hex);
    }
}
