/// Core domain types for wikilink occurrences, rewrites, and concealment.
use std::fmt;

use serde::Serialize;

/// Opening delimiter of a wikilink.
pub const OPEN: &str = "[[";

/// Closing delimiter of a wikilink.
pub const CLOSE: &str = "]]";

/// Path separator inside a full-path wikilink.
pub const SEPARATOR: char = '/';

/// Canonical full path of a vault document, produced only by a link index.
/// No leading or trailing separator, markdown extension stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CanonicalPath(
    /// The `/`-separated path without extension.
    String,
);

impl CanonicalPath {
    /// Borrow the path as a string slice.
    pub fn as_str(&self) -> &str {
        return &self.0;
    }

    /// Normalize a vault-relative file path into a canonical path.
    /// Backslashes become separators, surrounding separators and the `.md` suffix are dropped.
    pub fn from_vault_path(raw: &str) -> Self {
        let unified = raw.replace('\\', "/");
        let trimmed = unified.trim_matches(SEPARATOR);
        let stem = trimmed.strip_suffix(".md").unwrap_or(trimmed);
        return Self(stem.to_string());
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(&self.0);
    }
}

/// A half-open `[start, end)` range of text hidden from display.
/// Starts just after `[[` and ends one past the last separator of the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConcealRange {
    /// Exclusive end offset.
    pub end: usize,
    /// Inclusive start offset.
    pub start: usize,
}

/// A located `[[...]]` span. Offsets are byte offsets into the scanned text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    /// Offset one past the closing `]]`.
    pub end: usize,
    /// Text between the delimiters.
    pub inner: String,
    /// Offset of the opening `[[`.
    pub start: usize,
}

impl Occurrence {
    /// True when the link carries an alias (`|`) or an anchor (`#`).
    pub fn has_suffix(&self) -> bool {
        return self.inner.contains(['|', '#']);
    }

    /// Offset of the first byte after the opening delimiter.
    pub fn inner_start(&self) -> usize {
        return self.start.saturating_add(OPEN.len());
    }

    /// True when the link already spells out a path.
    pub fn is_full_path(&self) -> bool {
        return self.inner.contains(SEPARATOR);
    }

    /// The link target, without any alias or anchor suffix.
    pub fn path_part(&self) -> &str {
        return match self.inner.find(['|', '#']) {
            None => &self.inner,
            Some(cut) => self.inner.get(..cut).unwrap_or(&self.inner),
        };
    }
}

/// A splice over the original text, replacing `[start, end)` with `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replacement {
    /// Exclusive end offset in the original text.
    pub end: usize,
    /// Inclusive start offset in the original text.
    pub start: usize,
    /// Replacement literal, delimiters included.
    pub text: String,
}

/// Result of one rewrite pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteOutcome {
    /// True when at least one replacement was applied.
    pub changed: bool,
    /// Cursor offset remapped into `text`.
    pub cursor: usize,
    /// The rewritten document text.
    pub text: String,
}

impl RewriteOutcome {
    /// An outcome that leaves the document exactly as it was.
    pub fn unchanged(text: &str, cursor: usize) -> Self {
        return Self {
            changed: false,
            cursor,
            text: text.to_string(),
        };
    }
}

/// A rendered slice of the current document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleWindow<'a> {
    /// Absolute offset of the first byte of `text`.
    pub from: usize,
    /// The rendered text.
    pub text: &'a str,
    /// Absolute offset one past the last byte of `text`.
    pub to: usize,
}

impl<'a> VisibleWindow<'a> {
    /// Slice `[from, to)` out of `document`, clamped to its length and to character boundaries.
    pub fn slice(document: &'a str, from: usize, to: usize) -> Self {
        let to = floor_char_boundary(document, to.min(document.len()));
        let from = floor_char_boundary(document, from.min(to));
        let text = document.get(from..to).unwrap_or("");
        return Self { from, text, to };
    }

    /// A window covering the whole document.
    pub fn whole(document: &'a str) -> Self {
        return Self {
            from: 0,
            text: document,
            to: document.len(),
        };
    }
}

/// Largest character boundary in `text` that is not greater than `offset`.
pub fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut at = offset.min(text.len());
    while at > 0 && !text.is_char_boundary(at) {
        at = at.saturating_sub(1);
    }
    return at;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_path_strips_extension_and_separators() {
        let path = CanonicalPath::from_vault_path("/areas/work/Project.md");
        assert_eq!(path.as_str(), "areas/work/Project");
    }

    #[test]
    fn path_part_stops_at_alias_or_anchor() {
        let occurrence = Occurrence {
            end: 20,
            inner: "a/b#Heading".to_string(),
            start: 0,
        };
        assert_eq!(occurrence.path_part(), "a/b");
        assert!(occurrence.has_suffix());
    }

    #[test]
    fn slice_clamps_inside_multibyte_character() {
        let doc = "a\u{e9}b";
        let window = VisibleWindow::slice(doc, 0, 2);
        assert_eq!(window.text, "a");
        assert_eq!(window.to, 1);
    }
}
