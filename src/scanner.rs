use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::Error;
use crate::types::Occurrence;

/// Maximum markdown file size read into memory (16 MiB).
pub const MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// `[[` followed by anything but `]`, then `]]`. Non-greedy by construction:
/// a match can never span a closing bracket, so adjacent links stay separate.
#[allow(clippy::expect_used, reason = "hardcoded pattern is a compile-time invariant")]
static REFERENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"\[\[([^\]]+)\]\]").expect("valid regex"));

/// Find every `[[...]]` occurrence in `text`, left to right.
/// Unterminated `[[` never matches.
pub fn find_occurrences(text: &str) -> Vec<Occurrence> {
    return REFERENCE_PATTERN
        .captures_iter(text)
        .filter_map(|cap| return parse_wikilink_capture(&cap))
        .collect();
}

/// Check whether a file is a markdown document by extension.
fn is_markdown(path: &Path) -> bool {
    return path.extension().is_some_and(|ext| return ext == "md");
}

/// Turn a regex capture into an occurrence with absolute offsets.
fn parse_wikilink_capture(cap: &Captures<'_>) -> Option<Occurrence> {
    let whole = cap.get(0)?;
    let inner = cap.get(1)?;
    return Some(Occurrence {
        end: whole.end(),
        inner: inner.as_str().to_string(),
        start: whole.start(),
    });
}

/// Read a markdown document, refusing files over [`MAX_FILE_SIZE`].
///
/// # Errors
///
/// Returns `Error::FileNotFound` if the file is missing,
/// `Error::FileTooLarge` if it exceeds the limit, or `Error::Io` on read failure.
pub fn read_document(path: &Path) -> Result<String, Error> {
    let metadata = match std::fs::metadata(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::FileNotFound { path: path.to_path_buf() });
        },
        Err(e) => return Err(Error::Io(e)),
        Ok(m) => m,
    };
    if metadata.len() > MAX_FILE_SIZE {
        return Err(Error::FileTooLarge {
            file: path.to_path_buf(),
            max_bytes: MAX_FILE_SIZE,
            size_bytes: metadata.len(),
        });
    }
    return Ok(std::fs::read_to_string(path)?);
}

/// Vault-relative path of `path` with `/` separators, as used for link context.
pub fn relative_vault_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let joined = relative
        .components()
        .filter_map(|c| {
            return match c {
                std::path::Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            };
        })
        .collect::<Vec<_>>()
        .join("/");
    return joined;
}

/// Walk the vault under `root` and list markdown files accepted by the config's
/// include/exclude filters. Paths are returned relative to `root`, sorted.
pub fn scan_vault(root: &Path, config: &Config) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| return !is_hidden(e.path(), root))
        .filter_map(Result::ok)
        .filter(|e| return e.file_type().is_file() && is_markdown(e.path()))
        .filter_map(|e| {
            let relative = e.path().strip_prefix(root).ok()?.to_path_buf();
            let accepted = config.should_scan(&relative_vault_path(Path::new(""), &relative));
            return accepted.then_some(relative);
        })
        .collect();
    files.sort();
    return files;
}

/// Dot-directories (`.git`, `.obsidian`, `.trash`) are never part of the vault.
fn is_hidden(path: &Path, root: &Path) -> bool {
    if path == root {
        return false;
    }
    return path
        .file_name()
        .is_some_and(|name| return name.to_string_lossy().starts_with('.'));
}
