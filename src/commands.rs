//! Core CLI commands for wikipath: rewrite, conceal, render, links, resolve, conceal-mode.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;

use crate::concealer;
use crate::config::{self, Config};
use crate::error;
use crate::hasher::SnapshotId;
use crate::index::{LinkResolver as _, VaultIndex};
use crate::rewriter;
use crate::scanner;
use crate::types::{Occurrence, RewriteOutcome, VisibleWindow};

/// One wikilink as reported by `links`.
#[derive(Serialize)]
struct LinkReport {
    /// Label a reader sees.
    displayed: String,
    /// Offset one past `]]`.
    end: usize,
    /// Offset of `[[`.
    start: usize,
    /// How the rewriter treats this link.
    status: LinkStatus,
    /// Link literal as stored.
    stored: String,
    /// Full path the link resolves to, when it is short and resolvable.
    target: Option<String>,
}

/// Classification of a link by the rewriter's rules.
#[derive(Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
enum LinkStatus {
    /// Short and already canonical (a document at the vault root).
    Canonical,
    /// Already a full path.
    FullPath,
    /// Short and resolvable; a rewrite would change it.
    Pending,
    /// Alias or anchor syntax, never rewritten.
    Skipped,
    /// Short and unresolvable: missing or ambiguous.
    Unresolved,
}

impl LinkStatus {
    /// Fixed-width label for plain output.
    const fn label(self) -> &'static str {
        return match self {
            Self::Canonical => "CANONICAL ",
            Self::FullPath => "FULL      ",
            Self::Pending => "PENDING   ",
            Self::Skipped => "SKIPPED   ",
            Self::Unresolved => "UNRESOLVED",
        };
    }
}

/// Build a link report for one occurrence.
fn classify_occurrence(occurrence: &Occurrence, context: &str, index: &VaultIndex) -> LinkReport {
    let (status, target) = if occurrence.has_suffix() {
        (LinkStatus::Skipped, None)
    } else if occurrence.is_full_path() {
        (LinkStatus::FullPath, None)
    } else {
        match index.resolve(&occurrence.inner, context) {
            None => (LinkStatus::Unresolved, None),
            Some(path) if path.as_str() == occurrence.inner => (LinkStatus::Canonical, None),
            Some(path) => (LinkStatus::Pending, Some(path.to_string())),
        }
    };
    return LinkReport {
        displayed: concealer::terminal_name(occurrence.path_part()).to_string(),
        end: occurrence.end,
        start: occurrence.start,
        status,
        stored: format!("[[{}]]", occurrence.inner),
        target,
    };
}

/// Print concealment ranges for `[from, to)` of a file, honouring the configured flag.
///
/// # Errors
///
/// Returns errors from config loading, file reading, or JSON output.
pub fn conceal(file: &str, from: Option<usize>, to: Option<usize>, json: bool) -> Result<(), error::Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;
    let content = scanner::read_document(Path::new(file))?;

    let window = VisibleWindow::slice(
        &content,
        from.unwrap_or(0),
        to.unwrap_or(content.len()),
    );
    let ranges = concealer::build_concealment(&[window], config.conceal)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ranges)?);
        return Ok(());
    }

    if !config.conceal {
        eprintln!("Concealment is off (run `wikipath conceal-mode on`).");
    }
    for range in &ranges {
        let hidden = content.get(range.start..range.end).unwrap_or("");
        println!("{}..{}  {hidden}", range.start, range.end);
    }
    return Ok(());
}

/// Persist the concealment flag.
///
/// # Errors
///
/// Returns errors from config editing.
pub fn conceal_mode(enabled: bool) -> Result<(), error::Error> {
    let root = PathBuf::from(".");
    config::write_conceal(&root, enabled)?;
    let state = if enabled { "on" } else { "off" };
    eprintln!("Concealment {state}");
    return Ok(());
}

/// Output a comprehensive reference document for wikipath.
pub fn info(json: bool) {
    return crate::info::run(json);
}

/// List every wikilink in a file with its stored form, label, and rewrite status.
///
/// # Errors
///
/// Returns errors from config loading, file reading, or JSON output.
pub fn links(file: &str, json: bool) -> Result<(), error::Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;
    let index = VaultIndex::build(&root, &config);
    let path = Path::new(file);
    let content = scanner::read_document(path)?;
    let context = scanner::relative_vault_path(&root, path);

    let reports: Vec<LinkReport> = scanner::find_occurrences(&content)
        .iter()
        .map(|o| return classify_occurrence(o, &context, &index))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for report in &reports {
        match &report.target {
            None => println!("{}  {}  ({})", report.status.label(), report.stored, report.displayed),
            Some(target) => println!("{}  {} -> [[{target}]]", report.status.label(), report.stored),
        }
    }
    return Ok(());
}

/// Print each pending replacement of a dry run.
fn print_pending(file: &Path, content: &str, context: &str, index: &VaultIndex) -> usize {
    let planned = rewriter::plan_replacements(content, context, index);
    for op in &planned {
        let before = content.get(op.start..op.end).unwrap_or("");
        println!("{}:{}  {before} -> {}", file.display(), op.start, op.text);
    }
    return planned.len();
}

/// Print the displayed form of a file: concealed prefixes removed when enabled.
///
/// # Errors
///
/// Returns errors from config loading or file reading.
pub fn render(file: &str) -> Result<(), error::Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;
    let content = scanner::read_document(Path::new(file))?;
    let ranges = concealer::build_concealment(&[VisibleWindow::whole(&content)], config.conceal)?;
    print!("{}", concealer::display_text(&content, &ranges));
    return Ok(());
}

/// Resolve one short name, as written in `from`, against the vault.
///
/// # Errors
///
/// Returns `Error::Unresolved` when the name is missing or ambiguous,
/// or errors from config loading.
pub fn resolve(name: &str, from: Option<&str>) -> Result<(), error::Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;
    let index = VaultIndex::build(&root, &config);
    let context = from.map(|f| return scanner::relative_vault_path(&root, Path::new(f))).unwrap_or_default();
    let path = index.lookup(name, &context)?;
    println!("[[{path}]]");
    return Ok(());
}

/// Rewrite short links to full paths in the given files, or in every scanned
/// file when none are given. With `dry_run`, only report what would change.
///
/// Exits 1 on a dry run that found pending rewrites, 0 otherwise. Files that
/// cannot be read (too large, not UTF-8, unreadable) are reported and skipped.
///
/// # Errors
///
/// Returns errors from config loading, or `Error::FileNotFound` for a missing
/// file argument.
pub fn rewrite(files: &[String], cursor: Option<usize>, dry_run: bool) -> Result<ExitCode, error::Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;
    let index = VaultIndex::build(&root, &config);

    let targets: Vec<PathBuf> = if files.is_empty() {
        scanner::scan_vault(&root, &config)
    } else {
        files.iter().map(PathBuf::from).collect()
    };

    let mut pending = 0_usize;
    let mut rewritten = 0_usize;
    let mut skipped = 0_usize;
    for file in &targets {
        let path = root.join(file);
        if dry_run {
            let content = match scanner::read_document(&path) {
                Err(e @ (error::Error::FileTooLarge { .. } | error::Error::Io(_))) => {
                    eprintln!("skipped: {}: {e}", file.display());
                    skipped = skipped.saturating_add(1);
                    continue;
                },
                Err(e) => return Err(e),
                Ok(content) => content,
            };
            let context = scanner::relative_vault_path(&root, &path);
            pending = pending.saturating_add(print_pending(file, &content, &context, &index));
            continue;
        }

        match rewrite_file(&root, &path, cursor.unwrap_or(0), &index) {
            Err(error::Error::StaleSnapshot { path }) => {
                eprintln!("skipped: {} changed during rewrite", path.display());
                skipped = skipped.saturating_add(1);
            },
            Err(e @ (error::Error::FileTooLarge { .. } | error::Error::Io(_))) => {
                eprintln!("skipped: {}: {e}", file.display());
                skipped = skipped.saturating_add(1);
            },
            Err(e) => return Err(e),
            Ok(outcome) => {
                if outcome.changed {
                    rewritten = rewritten.saturating_add(1);
                    println!("rewrote {}", file.display());
                }
                if cursor.is_some() {
                    println!("cursor: {}", outcome.cursor);
                }
            },
        }
    }

    if dry_run {
        eprintln!("{pending} links would be rewritten");
        if pending > 0 {
            return Ok(ExitCode::from(1));
        }
        return Ok(ExitCode::SUCCESS);
    }

    eprintln!("Rewrote {rewritten} of {} files, skipped {skipped}", targets.len());
    return Ok(ExitCode::SUCCESS);
}

/// Rewrite one file on disk. The file is written only if its contents still
/// match the snapshot the rewrite was computed from.
///
/// # Errors
///
/// Returns `Error::StaleSnapshot` if the file changed in the meantime,
/// or errors from reading and writing the file.
pub fn rewrite_file(
    root: &Path,
    path: &Path,
    cursor: usize,
    index: &VaultIndex,
) -> Result<RewriteOutcome, error::Error> {
    let content = scanner::read_document(path)?;
    let snapshot = SnapshotId::of(&content);
    let context = scanner::relative_vault_path(root, path);

    let outcome = rewriter::rewrite(&content, cursor, &context, index);
    if !outcome.changed {
        return Ok(outcome);
    }

    let current = scanner::read_document(path)?;
    if SnapshotId::of(&current) != snapshot {
        return Err(error::Error::StaleSnapshot { path: path.to_path_buf() });
    }
    std::fs::write(path, &outcome.text)?;
    return Ok(outcome);
}
