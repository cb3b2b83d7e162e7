use std::fmt::Write as _;

use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened, why, and how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::FileTooLarge { file, size_bytes, max_bytes } => {
            render_file_too_large(file, *size_bytes, *max_bytes)
        },
        Error::StaleSnapshot { path } => render_stale_snapshot(path),
        Error::Unresolved { name, candidates } => render_unresolved(name, candidates),
        _ => render_generic(e),
    };
}

fn render_file_too_large(file: &std::path::Path, size_bytes: u64, max_bytes: u64) -> String {
    return format!("\
# Error: File Too Large

`{}` is {size_bytes} bytes (max {max_bytes}).

## Fix

Exclude it in `.wikipath.toml`:

    exclude = [\"{}\"]
", file.display(), file.display());
}

fn render_generic(e: &Error) -> String {
    return match e {
        Error::FileNotFound { path } => format!("\
# Error: File Not Found

`{}` does not exist.
", path.display()),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),

        Error::OffsetOutOfBounds { len, offset } => format!("\
# Error: Offset Out Of Bounds

Offset {offset} does not fit a text of {len} bytes. The document was left unchanged.
"),

        Error::ParseFailed { file, reason } => format!("\
# Error: Parse Failed

Could not parse `{}`: {reason}
", file.display()),

        Error::TomlDe(e) => format!("\
# Error: Invalid Config

{e}

## Fix

Check `.wikipath.toml`. Recognised keys: `conceal`, `debounce_ms`, `include`, `exclude`.
"),

        Error::Watch(e) => format!("\
# Error: Watch Failed

{e}
"),
        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    };
}

fn render_stale_snapshot(path: &std::path::Path) -> String {
    return format!("\
# Error: Document Changed

`{}` changed while it was being rewritten. Nothing was written.

## Fix

Run the rewrite again:

    wikipath rewrite {}
", path.display(), path.display());
}

fn render_unresolved(name: &str, candidates: &[String]) -> String {
    if candidates.is_empty() {
        return format!("\
# Error: Unresolved Link

No document in the vault is named `{name}`.
");
    }

    let mut out = format!("\
# Error: Ambiguous Link

`{name}` matches several documents and none sits next to the referring note.

## Candidates

");
    for c in candidates {
        let _ = writeln!(out, "- `[[{c}]]`");
    }
    out.push_str("\
\n## Fix

Write the full path of the intended document.
");
    return out;
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "test assertions")]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_link_lists_candidates() {
        let e = Error::Unresolved {
            candidates: vec!["archive/Meeting".to_string(), "inbox/Meeting".to_string()],
            name: "Meeting".to_string(),
        };
        let md = render_error(&e);
        assert!(md.starts_with("# Error: Ambiguous Link"));
        assert!(md.contains("- `[[inbox/Meeting]]`"));
    }

    #[test]
    fn missing_link_has_no_candidate_section() {
        let e = Error::Unresolved { candidates: Vec::new(), name: "Nowhere".to_string() };
        let md = render_error(&e);
        assert!(md.contains("`Nowhere`"));
        assert!(!md.contains("## Candidates"));
    }
}
