//! Content digests
//!
//! Every state comparison in the watcher goes through [`content_hash`]:
//! the latest-hash record, snapshot identity and the oversize state-key
//! fallback all use the same SHA256 hex encoding.

use sha2::{Digest, Sha256};

/// SHA256 of raw bytes, hex-encoded (64 lower-case characters)
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        assert_eq!(
            content_hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_empty_content_has_digest() {
        assert_eq!(content_hash(b"").len(), 64);
    }
}
