use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Error;

/// Name of the per-vault config file.
pub const CONFIG_FILE: &str = ".wikipath.toml";

/// Quiet interval before a debounced rewrite fires, when not configured.
const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Vault configuration loaded from `.wikipath.toml`.
/// Include/exclude patterns are path prefixes applied to markdown files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Hide the path prefix of full-path links in displayed text.
    pub conceal: bool,
    /// Quiet interval in milliseconds before a debounced rewrite fires.
    pub debounce_ms: u64,
    /// Path prefixes never scanned or rewritten.
    exclude: Vec<String>,
    /// Path prefixes to scan; empty means everything.
    include: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        return Self::scan_everything_by_default();
    }
}

/// Raw TOML structure for `.wikipath.toml`.
#[derive(serde::Deserialize)]
struct WikipathTomlConfig {
    /// Concealment flag; absent means enabled.
    #[serde(default = "conceal_by_default")]
    conceal: bool,
    /// Debounce interval in milliseconds.
    #[serde(default = "debounce_ms_by_default")]
    debounce_ms: u64,
    /// Excluded path prefixes.
    #[serde(default)]
    exclude: Vec<String>,
    /// Included path prefixes.
    #[serde(default)]
    include: Vec<String>,
}

impl Config {
    /// The debounce interval as a duration.
    pub const fn debounce(&self) -> Duration {
        return Duration::from_millis(self.debounce_ms);
    }

    /// Load config from `.wikipath.toml` in the given vault root.
    /// Returns defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed, never silently
    /// falling back to defaults when the user wrote a config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::scan_everything_by_default());
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };

        let raw: WikipathTomlConfig = toml::from_str(&content)?;
        return Ok(Self {
            conceal: raw.conceal,
            debounce_ms: raw.debounce_ms,
            exclude: raw.exclude,
            include: raw.include,
        });
    }

    /// Default config: conceal on, scan everything, exclude nothing.
    fn scan_everything_by_default() -> Self {
        return Self {
            conceal: conceal_by_default(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            exclude: Vec::new(),
            include: Vec::new(),
        };
    }

    /// Check whether a markdown file path should be scanned.
    ///
    /// A path is included if no include patterns are set (scan everything),
    /// or if the path starts with at least one include pattern.
    /// An included path is then excluded if it starts with any exclude pattern.
    pub fn should_scan(&self, relative_path: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|p| return relative_path.starts_with(p.as_str()));

        if !included {
            return false;
        }

        return !self.exclude.iter().any(|p| return relative_path.starts_with(p.as_str()));
    }
}

/// Serde default for `conceal`.
const fn conceal_by_default() -> bool {
    return true;
}

/// Serde default for `debounce_ms`.
const fn debounce_ms_by_default() -> u64 {
    return DEFAULT_DEBOUNCE_MS;
}

/// Parse `.wikipath.toml` into a format-preserving document.
/// Returns an empty document if the file doesn't exist.
///
/// # Errors
///
/// Returns `Error::Io` on read failure or `Error::ParseFailed` on parse failure.
fn read_config_doc(root: &Path) -> Result<(PathBuf, toml_edit::DocumentMut), Error> {
    let config_path = root.join(CONFIG_FILE);
    let content = match std::fs::read_to_string(&config_path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(Error::Io(e)),
        Ok(c) => c,
    };

    let doc: toml_edit::DocumentMut = content.parse().map_err(|e: toml_edit::TomlError| {
        return Error::ParseFailed {
            file: config_path.clone(),
            reason: e.to_string(),
        };
    })?;

    return Ok((config_path, doc));
}

/// Persist the concealment flag, keeping the rest of the file intact.
///
/// # Errors
///
/// Returns `Error::ParseFailed` if the config can't be parsed,
/// or `Error::Io` if writing fails.
pub fn write_conceal(root: &Path, enabled: bool) -> Result<(), Error> {
    let (config_path, mut doc) = read_config_doc(root)?;
    doc["conceal"] = toml_edit::value(enabled);
    std::fs::write(&config_path, doc.to_string())?;
    return Ok(());
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "test assertions")]
mod tests {
    use super::*;

    #[test]
    fn missing_file_defaults_to_conceal_on() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(config.conceal);
        assert_eq!(config.debounce_ms, 500);
        assert!(config.should_scan("anything.md"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "conceal = [").unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::TomlDe(_))));
    }

    #[test]
    fn include_and_exclude_prefixes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "include = [\"notes/\"]\nexclude = [\"notes/archive/\"]\n",
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(config.should_scan("notes/today.md"));
        assert!(!config.should_scan("notes/archive/old.md"));
        assert!(!config.should_scan("journal/today.md"));
    }

    #[test]
    fn write_conceal_preserves_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "# my vault\ndebounce_ms = 250\n").unwrap();

        write_conceal(dir.path(), false).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("# my vault"));
        let config = Config::load(dir.path()).unwrap();
        assert!(!config.conceal);
        assert_eq!(config.debounce_ms, 250);
    }
}
