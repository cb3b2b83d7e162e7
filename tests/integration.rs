use std::path::Path;
use std::process::Command;

use wikipath::concealer::build_concealment;
use wikipath::rewriter::rewrite;
use wikipath::types::{CanonicalPath, ConcealRange, VisibleWindow};

fn wikipath_cmd(vault: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_wikipath"));
    cmd.current_dir(vault);
    cmd
}

fn vault() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("areas/work")).unwrap();
    std::fs::create_dir_all(root.join("inbox")).unwrap();
    std::fs::write(root.join("areas/work/Project.md"), "# Project\n").unwrap();
    std::fs::write(root.join("inbox/today.md"), "See [[Project]] for details.\n").unwrap();
    dir
}

fn project(name: &str, _context: &str) -> Option<CanonicalPath> {
    (name == "Project").then(|| CanonicalPath::from_vault_path("areas/work/Project"))
}

#[test]
fn example_short_link_rewrite_moves_cursor() {
    let outcome = rewrite("See [[Project]] for details.", 20, "", &project);
    assert_eq!(outcome.text, "See [[areas/work/Project]] for details.");
    assert_eq!(outcome.cursor, 20 + ("[[areas/work/Project]]".len() - "[[Project]]".len()));
    assert!(!rewrite(&outcome.text, outcome.cursor, "", &project).changed);
}

#[test]
fn example_full_path_is_unchanged() {
    let anything = |_: &str, _: &str| Some(CanonicalPath::from_vault_path("x/y"));
    let outcome = rewrite("[[areas/work/Project]]", 0, "", &anything);
    assert!(!outcome.changed);
    assert_eq!(outcome.text, "[[areas/work/Project]]");
}

#[test]
fn example_concealment_on_and_off() {
    let text = "Link: [[areas/work/Project]]";
    let windows = [VisibleWindow::whole(text)];
    let on = build_concealment(&windows, true).unwrap();
    assert_eq!(on, vec![ConcealRange { end: 19, start: 8 }]);
    assert_eq!(&text[8..19], "areas/work/");
    assert!(build_concealment(&windows, false).unwrap().is_empty());
}

#[test]
fn rewrite_command_updates_vault_and_is_idempotent() {
    let dir = vault();

    let first = wikipath_cmd(dir.path()).arg("rewrite").output().unwrap();
    assert!(
        first.status.success(),
        "rewrite failed: {}",
        String::from_utf8_lossy(&first.stderr)
    );
    let written = std::fs::read_to_string(dir.path().join("inbox/today.md")).unwrap();
    assert_eq!(written, "See [[areas/work/Project]] for details.\n");

    let dry = wikipath_cmd(dir.path()).args(["rewrite", "--dry-run"]).output().unwrap();
    assert_eq!(dry.status.code(), Some(0));
}

#[test]
fn dry_run_reports_pending_without_writing() {
    let dir = vault();

    let dry = wikipath_cmd(dir.path()).args(["rewrite", "--dry-run"]).output().unwrap();

    assert_eq!(dry.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&dry.stdout);
    assert!(stdout.contains("[[Project]] -> [[areas/work/Project]]"), "{stdout}");
    let untouched = std::fs::read_to_string(dir.path().join("inbox/today.md")).unwrap();
    assert_eq!(untouched, "See [[Project]] for details.\n");
}

#[test]
fn rewrite_command_prints_remapped_cursor() {
    let dir = vault();

    let out = wikipath_cmd(dir.path())
        .args(["rewrite", "inbox/today.md", "--cursor", "20"])
        .output()
        .unwrap();

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("cursor: 31"), "{stdout}");
}

#[test]
fn render_follows_conceal_mode() {
    let dir = vault();
    std::fs::write(dir.path().join("inbox/done.md"), "Link: [[areas/work/Project]]\n").unwrap();

    let shown = wikipath_cmd(dir.path()).args(["render", "inbox/done.md"]).output().unwrap();
    assert_eq!(String::from_utf8_lossy(&shown.stdout), "Link: [[Project]]\n");

    let off = wikipath_cmd(dir.path()).args(["conceal-mode", "off"]).output().unwrap();
    assert!(off.status.success());

    let raw = wikipath_cmd(dir.path()).args(["render", "inbox/done.md"]).output().unwrap();
    assert_eq!(String::from_utf8_lossy(&raw.stdout), "Link: [[areas/work/Project]]\n");
    let stored = std::fs::read_to_string(dir.path().join("inbox/done.md")).unwrap();
    assert_eq!(stored, "Link: [[areas/work/Project]]\n");
}

#[test]
fn conceal_command_emits_json_ranges() {
    let dir = vault();
    std::fs::write(dir.path().join("inbox/done.md"), "Link: [[areas/work/Project]]").unwrap();

    let out = wikipath_cmd(dir.path())
        .args(["conceal", "inbox/done.md", "--json"])
        .output()
        .unwrap();

    let ranges: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(ranges, serde_json::json!([{ "end": 19, "start": 8 }]));
}

#[test]
fn resolve_command_reports_missing_names() {
    let dir = vault();

    let found = wikipath_cmd(dir.path()).args(["resolve", "project"]).output().unwrap();
    assert_eq!(String::from_utf8_lossy(&found.stdout).trim(), "[[areas/work/Project]]");

    let missing = wikipath_cmd(dir.path()).args(["resolve", "Nowhere"]).output().unwrap();
    assert_eq!(missing.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&missing.stderr).contains("Unresolved Link"));
}

#[test]
fn rewrite_command_skips_unreadable_notes_and_continues() {
    let dir = vault();
    let root = dir.path();
    std::fs::write(root.join("a.md"), [0xff_u8, 0xfe, 0x00]).unwrap();
    std::fs::write(root.join("b.md"), "[[Project]]").unwrap();

    let out = wikipath_cmd(root).arg("rewrite").output().unwrap();
    assert_eq!(out.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("skipped: a.md"));
    assert!(stderr.contains("skipped 1"));

    let b = std::fs::read_to_string(root.join("b.md")).unwrap();
    assert_eq!(b, "[[areas/work/Project]]");

    let dry = wikipath_cmd(root).args(["rewrite", "--dry-run"]).output().unwrap();
    assert_eq!(dry.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&dry.stderr).contains("skipped: a.md"));
}
