/// Crate-level error types for wikipath diagnostics.
use std::path::PathBuf;

/// All errors in wikipath carry enough context to produce a useful diagnostic
/// without a debugger. Each variant names the file, offset, or reason for failure.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A markdown file could not be read or written.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// A markdown file exceeds the size limit for in-memory rewriting.
    #[error("file too large ({size_bytes} bytes, max {max_bytes}): {}", file.display())]
    FileTooLarge {
        /// File that exceeded the size limit.
        file: PathBuf,
        /// Maximum allowed file size in bytes.
        max_bytes: u64,
        /// Actual file size in bytes.
        size_bytes: u64,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization of command output failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// A computed offset does not land inside the text it indexes.
    #[error("offset {offset} out of bounds for text of length {len}")]
    OffsetOutOfBounds {
        /// Length of the indexed text in bytes.
        len: usize,
        /// The offending byte offset.
        offset: usize,
    },

    /// Two replacements claim overlapping spans of the original text.
    #[error("overlapping replacements at {start}..{end}")]
    OverlappingReplacements {
        /// Exclusive end of the later replacement.
        end: usize,
        /// Start of the later replacement.
        start: usize,
    },

    /// A config file could not be parsed for editing.
    #[error("parse failed: {}: {reason}", file.display())]
    ParseFailed {
        /// File that failed to parse.
        file: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// The on-disk document changed between reading and writing.
    #[error("document changed during rewrite: {}", path.display())]
    StaleSnapshot {
        /// File whose contents moved on.
        path: PathBuf,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// No document in the vault matches a short name.
    #[error("unresolved link: `{name}`")]
    Unresolved {
        /// Candidate paths when the name was ambiguous.
        candidates: Vec<String>,
        /// The short name that failed to resolve.
        name: String,
    },

    /// The filesystem watcher could not be created or attached.
    #[error("watch: {0}")]
    Watch(
        /// The wrapped notify error.
        #[from]
        notify::Error,
    ),
}
