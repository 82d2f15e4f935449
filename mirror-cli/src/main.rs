//! Mirror: one-way periodic directory mirroring.
//!
//! # Usage
//!
//! ```text
//! mirror init   [--source-folder DIR] [--replica-folder DIR] [--interval SECS] [--log-folder DIR]
//! mirror sync   [flags] [--dry-run]
//! mirror run    [flags] [--json-logs]
//! mirror status [flags] [--json]
//! ```
//!
//! Every command reads `~/.mirror/config.yaml` (or `--config <file>`) and lets
//! the flags above override individual settings.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{init::InitArgs, run::RunArgs, status::StatusArgs, sync::SyncArgs};

#[derive(Parser, Debug)]
#[command(
    name = "mirror",
    version,
    about = "Keep a replica directory an exact copy of a source directory",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate settings and save them to the config file.
    Init(InitArgs),

    /// Run a single synchronization pass.
    Sync(SyncArgs),

    /// Synchronize periodically until interrupted with Ctrl-C.
    Run(RunArgs),

    /// Show whether the replica is current and what a pass would change.
    Status(StatusArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::Run(args) => args.run(),
        Commands::Status(args) => args.run(),
    }
}
