use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use wikipath::{commands, diagnostics, error, watch};

#[derive(Parser)]
#[command(name = "wikipath", about = "Full-path wikilinks for markdown vaults")]
struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print concealed ranges of a file
    Conceal {
        /// Markdown file to inspect.
        file: String,
        /// Start of the visible window (byte offset).
        #[arg(long)]
        from: Option<usize>,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// End of the visible window (byte offset).
        #[arg(long)]
        to: Option<usize>,
    },
    /// Turn concealment of path prefixes on or off
    ConcealMode {
        /// New state.
        state: Toggle,
    },
    /// Output a comprehensive reference document
    Info {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List wikilinks in a file with their status
    Links {
        /// Markdown file to inspect.
        file: String,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the displayed form of a file
    Render {
        /// Markdown file to render.
        file: String,
    },
    /// Resolve a short name to its full path
    Resolve {
        /// Referring markdown file, for disambiguation.
        #[arg(long)]
        from: Option<String>,
        /// Short link name.
        name: String,
    },
    /// Rewrite short links to full paths
    Rewrite {
        /// Cursor offset to remap (printed after the rewrite).
        #[arg(long)]
        cursor: Option<usize>,
        /// Report pending rewrites without writing.
        #[arg(long)]
        dry_run: bool,
        /// Files to rewrite; the whole vault when empty.
        files: Vec<String>,
    },
    /// Watch the vault and rewrite files as they change
    Watch,
}

/// On/off switch for `conceal-mode`.
#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    /// Disable concealment.
    Off,
    /// Enable concealment.
    On,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let result: Result<ExitCode, error::Error> = match cli.command {
        Commands::Conceal { file, from, json, to } => {
            commands::conceal(&file, from, to, json).map(|()| return ExitCode::SUCCESS)
        },
        Commands::ConcealMode { state } => {
            commands::conceal_mode(matches!(state, Toggle::On)).map(|()| return ExitCode::SUCCESS)
        },
        Commands::Info { json } => {
            commands::info(json);
            Ok(ExitCode::SUCCESS)
        },
        Commands::Links { file, json } => commands::links(&file, json).map(|()| return ExitCode::SUCCESS),
        Commands::Render { file } => commands::render(&file).map(|()| return ExitCode::SUCCESS),
        Commands::Resolve { from, name } => {
            commands::resolve(&name, from.as_deref()).map(|()| return ExitCode::SUCCESS)
        },
        Commands::Rewrite { cursor, dry_run, files } => commands::rewrite(&files, cursor, dry_run),
        Commands::Watch => watch::run().map(|()| return ExitCode::SUCCESS),
    };

    return match result {
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(2)
        },
        Ok(code) => code,
    };
}
