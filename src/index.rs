//! Link index: maps short wikilink names to canonical vault paths.

use std::collections::HashMap;
use std::path::Path;

use crate::config::Config;
use crate::error::Error;
use crate::scanner;
use crate::types::{CanonicalPath, SEPARATOR};

/// Resolves a short link name, seen from a referring document, to a canonical path.
/// Implementations must be pure lookups.
pub trait LinkResolver {
    /// Resolve `short_name` as written inside `context_path`.
    /// Returns `None` for missing or ambiguous targets.
    fn resolve(&self, short_name: &str, context_path: &str) -> Option<CanonicalPath>;
}

impl<F> LinkResolver for F
where
    F: Fn(&str, &str) -> Option<CanonicalPath>,
{
    fn resolve(&self, short_name: &str, context_path: &str) -> Option<CanonicalPath> {
        return self(short_name, context_path);
    }
}

/// Every markdown document in a vault, keyed by lowercase file stem.
#[derive(Debug, Default)]
pub struct VaultIndex {
    /// Lowercased stem to every canonical path carrying it.
    by_stem: HashMap<String, Vec<CanonicalPath>>,
}

impl VaultIndex {
    /// Walk `root` and index every markdown file the config accepts.
    pub fn build(root: &Path, config: &Config) -> Self {
        let files = scanner::scan_vault(root, config);
        return Self::from_paths(files.iter().map(|p| return scanner::relative_vault_path(Path::new(""), p)));
    }

    /// Index an explicit list of vault-relative file paths.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut by_stem: HashMap<String, Vec<CanonicalPath>> = HashMap::new();
        for raw in paths {
            let path = CanonicalPath::from_vault_path(raw.as_ref());
            let stem = terminal_segment(path.as_str()).to_lowercase();
            if stem.is_empty() {
                continue;
            }
            let bucket = by_stem.entry(stem).or_default();
            if !bucket.contains(&path) {
                bucket.push(path);
            }
        }
        for bucket in by_stem.values_mut() {
            bucket.sort_by(|a, b| return a.as_str().cmp(b.as_str()));
        }
        return Self { by_stem };
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        return self.by_stem.values().map(Vec::len).sum();
    }

    /// True when the vault has no markdown documents.
    pub fn is_empty(&self) -> bool {
        return self.by_stem.is_empty();
    }

    /// Resolve like [`LinkResolver::resolve`], but explain failures.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unresolved` with no candidates for a missing target,
    /// or with every candidate when the name is ambiguous.
    pub fn lookup(&self, short_name: &str, context_path: &str) -> Result<CanonicalPath, Error> {
        let name = short_name.trim();
        let name = name.strip_suffix(".md").unwrap_or(name);
        let Some(candidates) = self.by_stem.get(&name.to_lowercase()) else {
            return Err(Error::Unresolved {
                candidates: Vec::new(),
                name: short_name.to_string(),
            });
        };

        if let [only] = candidates.as_slice() {
            return Ok(only.clone());
        }

        let context_dir = parent_dir(&CanonicalPath::from_vault_path(context_path)).to_lowercase();
        let sibling = candidates
            .iter()
            .find(|c| return parent_dir(c).to_lowercase() == context_dir);
        if let Some(found) = sibling {
            log::debug!("resolved `{short_name}` to sibling {found} of {context_path}");
            return Ok(found.clone());
        }

        return Err(Error::Unresolved {
            candidates: candidates.iter().map(ToString::to_string).collect(),
            name: short_name.to_string(),
        });
    }
}

impl LinkResolver for VaultIndex {
    fn resolve(&self, short_name: &str, context_path: &str) -> Option<CanonicalPath> {
        return match self.lookup(short_name, context_path) {
            Err(e) => {
                log::debug!("{e}");
                None
            },
            Ok(path) => Some(path),
        };
    }
}

/// Directory part of a canonical path, empty at the vault root.
fn parent_dir(path: &CanonicalPath) -> &str {
    let raw = path.as_str();
    return match raw.rfind(SEPARATOR) {
        None => "",
        Some(cut) => raw.get(..cut).unwrap_or(""),
    };
}

/// Last `/`-separated segment of a path.
pub fn terminal_segment(path: &str) -> &str {
    return path.rsplit(SEPARATOR).next().unwrap_or(path);
}
