//! Stagehand - safe staging and replay of Composer-managed codebases.
//!
//! Mirrors the live codebase into an isolated staging copy, runs Composer
//! against the copy, and replays the result back, with every operation
//! gated on its precondition tree.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stagehand::commands::{
    self, cmd_begin, cmd_clean, cmd_commit, cmd_preflight, cmd_show, cmd_stage,
};
use stagehand::config::Config;

#[derive(Parser)]
#[command(name = "stagehand")]
#[command(about = "Safe staging and replay of Composer-managed codebases")]
#[command(
    after_help = "QUICK START:\n  stagehand preflight   Check the host and codebase are ready\n  stagehand begin       Mirror the codebase into a staging copy\n  stagehand stage -- require acme/widget\n  stagehand commit      Make the staged changes live\n  stagehand clean       Remove the staging copy"
)]
struct Cli {
    /// Base directory (default: current directory)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mirror the active directory into a new staging copy
    Begin,

    /// Run a Composer command against the staging copy
    Stage {
        /// Arguments passed to composer (e.g. `require acme/widget:^2`)
        #[arg(trailing_var_arg = true, required = true)]
        composer_args: Vec<String>,
    },

    /// Replay the staged copy onto the active directory
    Commit,

    /// Remove the staging directory
    Clean,

    /// Evaluate an operation's preconditions and print a report
    Preflight {
        /// Which operation to check
        #[arg(long, value_enum, default_value = "commit")]
        op: commands::Operation,

        /// Fail if any checks fail (exit code 1)
        #[arg(long)]
        strict: bool,
    },

    /// Show current configuration
    Show,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let base_dir = match cli.dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    // Load .env if present; real environment variables win.
    dotenvy::from_path(base_dir.join(".env")).ok();
    let config = Config::load(&base_dir);

    match cli.command {
        Commands::Begin => cmd_begin(&config),
        Commands::Stage { composer_args } => cmd_stage(&config, &composer_args),
        Commands::Commit => cmd_commit(&config),
        Commands::Clean => cmd_clean(&config),
        Commands::Preflight { op, strict } => cmd_preflight(&config, op, strict),
        Commands::Show => cmd_show(&config),
    }
}
