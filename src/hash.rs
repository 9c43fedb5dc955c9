//! Content hashing for change detection.
//!
//! Every synced document carries a SHA-256 digest over the exact byte
//! sequence used for comparison. The hash is the single source of truth
//! for "did anything change" — file mtimes are deliberately ignored
//! because they do not survive checkouts and clones.

use sha2::{Digest, Sha256};

/// Separator joining a prompt's config text and rendered body before
/// hashing, so an edit to either file invalidates the stored digest.
const PROMPT_HASH_SEPARATOR: &str = "\n---\n";

/// SHA-256 over raw bytes, returned as lowercase hex.
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Digest for a prompt: config text and rendered markdown body joined
/// by a fixed separator.
pub fn prompt_hash(config_text: &str, body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(config_text.as_bytes());
    hasher.update(PROMPT_HASH_SEPARATOR.as_bytes());
    hasher.update(body.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        assert_eq!(content_hash(b"hello"), content_hash(b"hello"));
    }

    #[test]
    fn test_single_byte_change_changes_digest() {
        assert_ne!(content_hash(b"hello"), content_hash(b"hellp"));
    }

    #[test]
    fn test_hex_encoding_shape() {
        let digest = content_hash(b"");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_prompt_hash_sensitive_to_both_inputs() {
        let base = prompt_hash("config", "body");
        assert_ne!(base, prompt_hash("config!", "body"));
        assert_ne!(base, prompt_hash("config", "body!"));
    }

    #[test]
    fn test_prompt_hash_separator_prevents_boundary_shift() {
        // Moving bytes across the config/body boundary must not collide.
        assert_ne!(prompt_hash("ab", "c"), prompt_hash("a", "bc"));
    }
}
