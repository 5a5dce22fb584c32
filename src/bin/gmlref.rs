//! gmlref CLI binary entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gmlref::cli::{
    run_apply, run_cascade, run_classify_safety, run_generate_patches, run_hot_reload_updates,
    run_impact, run_plan_batch_rename, run_plan_rename,
};
use gmlref_core::batch::RenamePair;
use gmlref_core::reload::HotReloadUpdate;
use gmlref_core::workspace_edit::WorkspaceEdit;

/// Semantic-safe symbol rename and hot-reload coordination engine for GML projects.
#[derive(Parser)]
#[command(name = "gmlref")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Workspace root directory (default: current directory)
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Path to a JSON facts fixture standing in for the semantic analyzer
    #[arg(long, global = true, default_value = "facts.json")]
    facts: PathBuf,

    /// Increase log verbosity (-v for debug, -vv for trace). Overridden by
    /// RUST_LOG when set.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Install the global tracing subscriber. `RUST_LOG` takes priority; absent
/// that, `-v` bumps the default level above `info`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a single symbol rename without applying it.
    #[command(name = "plan-rename")]
    PlanRename {
        /// Symbol id in `gml/{kind}/{name}` form.
        #[arg(long)]
        symbol: String,
        /// New bare name.
        #[arg(long)]
        to: String,
    },

    /// Plan a batch of renames from a JSON file of `{symbolId, newName}` pairs.
    #[command(name = "plan-batch-rename")]
    PlanBatchRename {
        /// Path to a JSON array of rename pairs.
        #[arg(long)]
        renames: PathBuf,
    },

    /// Apply a previously planned Workspace Edit from a JSON file.
    Apply {
        /// Path to a JSON-encoded WorkspaceEdit.
        #[arg(long)]
        edit: PathBuf,
        /// Write changes to disk (default: dry-run, no writes).
        #[arg(long)]
        apply: bool,
    },

    /// Analyze the impact of renaming a symbol, without planning edits.
    Impact {
        /// Symbol id in `gml/{kind}/{name}` form.
        #[arg(long)]
        symbol: String,
    },

    /// Compute the hot-reload cascade reachable from a set of changed symbols.
    Cascade {
        /// Changed symbol ids.
        #[arg(long, num_args = 1..)]
        changed: Vec<String>,
    },

    /// Plan file-level hot-reload updates for a Workspace Edit.
    #[command(name = "hot-reload-updates")]
    HotReloadUpdates {
        /// Path to a JSON-encoded WorkspaceEdit.
        #[arg(long)]
        edit: PathBuf,
    },

    /// Classify whether a rename is safe to hot-reload without restarting.
    #[command(name = "classify-safety")]
    ClassifySafety {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        to: String,
    },

    /// Generate transpiler patches for a list of hot-reload updates.
    #[command(name = "generate-patches")]
    GeneratePatches {
        /// Path to a JSON array of hot-reload updates.
        #[arg(long)]
        updates: PathBuf,
    },
}

fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let workspace = cli
        .workspace
        .unwrap_or_else(|| std::env::current_dir().expect("failed to get current directory"));

    let result = run(&workspace, &cli.facts, cli.command);

    match result {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!(
                "{{\"status\":\"error\",\"error\":{{\"code\":\"InvalidArgument\",\"message\":\"{}\"}}}}",
                e.to_string().replace('"', "\\\"")
            );
            ExitCode::from(1)
        }
    }
}

fn run(workspace: &PathBuf, facts: &PathBuf, command: Commands) -> anyhow::Result<String> {
    match command {
        Commands::PlanRename { symbol, to } => run_plan_rename(workspace, facts, &symbol, &to),
        Commands::PlanBatchRename { renames } => {
            let pairs: Vec<RenamePair> = read_json(&renames)?;
            run_plan_batch_rename(workspace, facts, pairs)
        }
        Commands::Apply { edit, apply } => {
            let edit: WorkspaceEdit = read_json(&edit)?;
            run_apply(workspace, facts, edit, !apply)
        }
        Commands::Impact { symbol } => run_impact(workspace, facts, &symbol),
        Commands::Cascade { changed } => run_cascade(workspace, facts, changed),
        Commands::HotReloadUpdates { edit } => {
            let edit: WorkspaceEdit = read_json(&edit)?;
            run_hot_reload_updates(workspace, facts, edit)
        }
        Commands::ClassifySafety { symbol, to } => {
            run_classify_safety(workspace, facts, &symbol, &to)
        }
        Commands::GeneratePatches { updates } => {
            let updates: Vec<HotReloadUpdate> = read_json(&updates)?;
            run_generate_patches(workspace, facts, updates)
        }
    }
}
