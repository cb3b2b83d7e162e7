use std::path::PathBuf;

use serde::Serialize;

use crate::config::{self, Config};
use crate::index::VaultIndex;

/// Output the comprehensive wikipath reference document.
pub fn run(json: bool) {
    let root = PathBuf::from(".");
    let state = gather_state(&root);

    if json {
        print_json(&state);
    } else {
        print_markdown(&state);
    }
}

// ── State gathering ───────────────────────────────────────────────────

struct CurrentState {
    conceal: Option<bool>,
    config_found: bool,
    debounce_ms: Option<u64>,
    documents: usize,
}

fn gather_state(root: &std::path::Path) -> CurrentState {
    let config_found = root.join(config::CONFIG_FILE).exists();
    let loaded = Config::load(root).ok();
    let documents = loaded
        .as_ref()
        .map(|c| return VaultIndex::build(root, c).len())
        .unwrap_or_default();

    return CurrentState {
        conceal: loaded.as_ref().map(|c| return c.conceal),
        config_found,
        debounce_ms: loaded.as_ref().map(|c| return c.debounce_ms),
        documents,
    };
}

// ── Markdown output ───────────────────────────────────────────────────

fn print_markdown(state: &CurrentState) {
    let version = env!("CARGO_PKG_VERSION");
    print_markdown_header(version);
    print_markdown_state(state);
    println!();
    print_markdown_exit_codes();
}

fn print_markdown_header(version: &str) {
    print!(
        "\
# wikipath {version}

Full-path wikilinks for markdown vaults. Short links are stored as full paths;
the path prefix is hidden when displayed.

## Link Syntax

    [[Project]]                   short form, rewritten to a full path
    [[areas/work/Project]]        full-path form, displayed as [[Project]]
    [[Project|alias]]             alias form, left alone
    [[Project#Heading]]           anchor form, left alone

## Workflow

    wikipath rewrite [FILES...]       Rewrite short links to full paths
    wikipath rewrite --dry-run        List pending rewrites (exit 1 if any)
    wikipath watch                    Rewrite changed files as they are saved
    wikipath links <file>             List links with their status
    wikipath conceal <file>           Show concealed ranges
    wikipath render <file>            Print the displayed form
    wikipath resolve <name>           Resolve one short name
    wikipath conceal-mode on|off      Toggle concealment

## Configuration (.wikipath.toml)

    conceal = true                    # hide path prefixes when displayed
    debounce_ms = 500                 # quiet interval before watch rewrites
    include = [\"notes/\"]              # only scan these paths
    exclude = [\"notes/archive/\"]      # skip these paths

## Current State

"
    );
}

fn print_markdown_state(state: &CurrentState) {
    if state.config_found {
        println!("Config:     {} (found)", config::CONFIG_FILE);
    } else {
        println!("Config:     {} (not found, defaults apply)", config::CONFIG_FILE);
    }

    match state.conceal {
        Some(true) => println!("Conceal:    on"),
        Some(false) => println!("Conceal:    off"),
        None => println!("Conceal:    (config unreadable)"),
    }

    if let Some(ms) = state.debounce_ms {
        println!("Debounce:   {ms} ms");
    }
    println!("Documents:  {}", state.documents);
}

fn print_markdown_exit_codes() {
    print!(
        "\
## Exit Codes

| Code | Meaning |
|------|---------|
| 0    | Success |
| 1    | Dry run found pending rewrites |
| 2    | Runtime error |
"
    );
}

// ── JSON output ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct InfoJson {
    current_state: StateJson,
    exit_codes: Vec<ExitCodeInfo>,
    version: String,
}

#[derive(Serialize)]
struct ExitCodeInfo {
    code: u8,
    meaning: String,
}

#[derive(Serialize)]
struct StateJson {
    conceal: Option<bool>,
    config_found: bool,
    debounce_ms: Option<u64>,
    documents: usize,
}

fn print_json(state: &CurrentState) {
    let info = InfoJson {
        current_state: StateJson {
            conceal: state.conceal,
            config_found: state.config_found,
            debounce_ms: state.debounce_ms,
            documents: state.documents,
        },
        exit_codes: vec![
            ExitCodeInfo { code: 0, meaning: "Success".to_string() },
            ExitCodeInfo { code: 1, meaning: "Dry run found pending rewrites".to_string() },
            ExitCodeInfo { code: 2, meaning: "Runtime error".to_string() },
        ],
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    // serde_json::to_string_pretty won't fail on this structure.
    let json = serde_json::to_string_pretty(&info).unwrap_or_default();
    println!("{json}");
}
