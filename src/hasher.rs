/// Content digests identifying the document snapshot a rewrite was computed from.
use sha2::{Digest as _, Sha256};

/// SHA-256 of a document's text, 64 lowercase hex chars.
/// Newtype prevents mixing with arbitrary strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotId(
    /// The hex-encoded SHA-256 digest string.
    String,
);

impl SnapshotId {
    /// Digest `text`.
    pub fn of(text: &str) -> Self {
        let hash = Sha256::digest(text.as_bytes());
        return Self(format!("{hash:x}"));
    }
}
