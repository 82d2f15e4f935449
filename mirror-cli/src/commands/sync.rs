//! `mirror sync`: run exactly one pass, or preview it with `--dry-run`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;

use mirror_daemon::LogFormat;
use mirror_sync::{MemoryLogger, PassReport, SyncPlan, Synchronizer, TracingLogger};

/// Arguments for `mirror sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub config: super::ConfigArgs,

    /// Show what a pass would change without touching the replica.
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let config = self.config.resolve()?;

        if self.dry_run {
            let synchronizer = Synchronizer::new(
                &config.source_folder,
                &config.replica_folder,
                Arc::new(MemoryLogger::new()),
            )
            .context("cannot start synchronization")?;
            let plan = synchronizer.plan().context("failed to plan the pass")?;
            print_plan(&plan);
            return Ok(());
        }

        mirror_daemon::init_logging(&config.log_folder, LogFormat::Text)
            .context("failed to set up logging")?;
        let synchronizer = Synchronizer::new(
            &config.source_folder,
            &config.replica_folder,
            Arc::new(TracingLogger),
        )
        .context("cannot start synchronization")?;

        let pass = synchronizer.synchronize();
        print_pass(&pass);
        if !pass.errors.is_empty() {
            bail!("pass finished with {} error(s)", pass.errors.len());
        }
        Ok(())
    }
}

fn print_pass(pass: &PassReport) {
    if !pass.changed() {
        println!("✓ replica is up to date, nothing to do");
    } else {
        println!(
            "✓ synced ({} changes in {} ms)",
            pass.mutation_count(),
            pass.duration_ms
        );
    }
    print_entries("+", "/", &pass.directories_created);
    print_entries("-", "/", &pass.directories_removed);
    print_entries("✎", "", &pass.files_updated);
    print_entries("+", "", &pass.files_copied);
    print_entries("-", "", &pass.files_removed);
    for error in &pass.errors {
        println!("  !  {error}");
    }
}

fn print_plan(plan: &SyncPlan) {
    if plan.is_current() {
        println!("[dry-run] ✓ replica is up to date, nothing to do");
        return;
    }
    println!("[dry-run] {} actions pending", plan.action_count());
    print_entries("+", "/", &plan.create_directories);
    print_entries("-", "/", &plan.remove_directories);
    print_entries("~", "", &plan.update_files);
    print_entries("+", "", &plan.copy_files);
    print_entries("-", "", &plan.remove_files);
    for failure in &plan.compare_failures {
        println!("  ?  {failure}");
    }
}

fn print_entries(marker: &str, suffix: &str, paths: &[PathBuf]) {
    for path in paths {
        println!("  {marker}  {}{suffix}", path.display());
    }
}
