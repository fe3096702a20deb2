//! Stable identifiers for nodes with no natural source identifier.

use sha2::{Digest, Sha256};

/// 20 hex characters derived from the SHA-256 of `content`.
///
/// The first character is forced to `b` so the identifier never starts with
/// a digit.
pub fn digest_id(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let hex = format!("{:x}", hasher.finalize());
    format!("b{}", &hex[1..20])
}
