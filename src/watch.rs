//! File watcher: rewrites short links in markdown files as they are saved.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crossbeam_channel::RecvTimeoutError;
use notify::{RecursiveMode, Watcher as _};

use crate::commands;
use crate::config::Config;
use crate::error;
use crate::index::VaultIndex;
use crate::scanner;
use crate::session::Debouncer;

/// Check whether a changed path is a vault markdown file the config accepts.
fn accepts(root: &Path, config: &Config, path: &Path) -> bool {
    if path.extension().is_none_or(|ext| return ext != "md") {
        return false;
    }
    let relative = scanner::relative_vault_path(root, path);
    let hidden = relative.split('/').any(|part| return part.starts_with('.'));
    return !hidden && config.should_scan(&relative);
}

/// Create a filesystem watcher that sends changed paths on the given channel.
///
/// # Errors
///
/// Returns `Error::Watch` if the watcher cannot be created.
fn create_watcher(
    tx: crossbeam_channel::Sender<PathBuf>,
) -> Result<notify::RecommendedWatcher, error::Error> {
    let watcher = notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_) | notify::EventKind::Modify(_)
            )
        {
            for path in event.paths {
                let _ = tx.send(path);
            }
        }
    })?;
    return Ok(watcher);
}

/// Rewrite every file collected since the last quiet interval.
/// The index is rebuilt first so newly created notes resolve.
fn rewrite_changed(root: &Path, config: &Config, changed: &mut HashSet<PathBuf>) {
    let index = VaultIndex::build(root, config);
    let mut paths: Vec<PathBuf> = changed.drain().collect();
    paths.sort();

    for path in &paths {
        let relative = scanner::relative_vault_path(root, path);
        match commands::rewrite_file(root, path, 0, &index) {
            Err(error::Error::StaleSnapshot { .. }) => {
                eprintln!("watch: {relative} changed during rewrite, retrying on next save");
            },
            Err(e) => eprintln!("watch: {relative}: {e}"),
            Ok(outcome) if outcome.changed => eprintln!("watch: rewrote {relative}"),
            Ok(_) => {},
        }
    }
}

/// Entry point for the watch command.
///
/// Rewrites the whole vault once, then watches it and rewrites files changed
/// since the last quiet interval of `debounce_ms`.
///
/// # Errors
///
/// Returns errors from config loading or watcher setup.
pub fn run() -> Result<(), error::Error> {
    let root = std::fs::canonicalize(".")?;
    let config = Config::load(&root)?;

    eprintln!("watch: initial rewrite");
    let mut changed: HashSet<PathBuf> = scanner::scan_vault(&root, &config)
        .into_iter()
        .map(|p| return root.join(p))
        .collect();
    rewrite_changed(&root, &config, &mut changed);

    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(tx)?;
    watcher.watch(&root, RecursiveMode::Recursive)?;
    eprintln!(
        "watch: monitoring {}, debounce {} ms, press Ctrl+C to stop",
        root.display(),
        config.debounce_ms
    );

    let mut debouncer = Debouncer::new(config.debounce());
    loop {
        let received = match debouncer.remaining(Instant::now()) {
            None => rx.recv().map_err(|_err| return RecvTimeoutError::Disconnected),
            Some(wait) => rx.recv_timeout(wait),
        };
        match received {
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {},
            Ok(path) => {
                if accepts(&root, &config, &path) {
                    changed.insert(path);
                    debouncer.trigger(Instant::now());
                }
            },
        }
        if debouncer.poll(Instant::now()) {
            rewrite_changed(&root, &config, &mut changed);
        }
    }

    return Ok(());
}
