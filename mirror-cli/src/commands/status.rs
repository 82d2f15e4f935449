//! `mirror status`: compare the trees and report pending work.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use mirror_core::MirrorConfig;
use mirror_daemon::paths::log_file_path;
use mirror_sync::{MemoryLogger, SyncPlan, Synchronizer};

/// Arguments for `mirror status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub config: super::ConfigArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let config = self.config.resolve()?;
        let synchronizer = Synchronizer::new(
            &config.source_folder,
            &config.replica_folder,
            Arc::new(MemoryLogger::new()),
        )
        .context("cannot inspect trees")?;
        let plan = synchronizer
            .plan()
            .context("failed to compare source and replica")?;
        let log_file = log_file_path(&config.log_folder, chrono::Local::now().date_naive());

        if self.json {
            print_json(&config, &plan, log_file)?;
            return Ok(());
        }
        print_table(&config, &plan, &log_file);
        Ok(())
    }
}

#[derive(Serialize)]
struct StatusJson<'a> {
    source_folder: &'a PathBuf,
    replica_folder: &'a PathBuf,
    interval_seconds: u64,
    log_file: PathBuf,
    current: bool,
    pending_actions: usize,
    plan: &'a SyncPlan,
}

#[derive(Tabled)]
struct PendingRow {
    #[tabled(rename = "action")]
    action: &'static str,
    #[tabled(rename = "count")]
    count: usize,
    #[tabled(rename = "examples")]
    examples: String,
}

fn print_json(config: &MirrorConfig, plan: &SyncPlan, log_file: PathBuf) -> Result<()> {
    let payload = StatusJson {
        source_folder: &config.source_folder,
        replica_folder: &config.replica_folder,
        interval_seconds: config.interval_seconds,
        log_file,
        current: plan.is_current(),
        pending_actions: plan.action_count(),
        plan,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_table(config: &MirrorConfig, plan: &SyncPlan, log_file: &std::path::Path) {
    println!(
        "Mirror v{} | {} → {} | every {}s",
        env!("CARGO_PKG_VERSION"),
        config.source_folder.display(),
        config.replica_folder.display(),
        config.interval_seconds,
    );
    let state = if plan.is_current() {
        "■ CURRENT".green().bold()
    } else {
        "■ OUT OF DATE".yellow().bold()
    };
    println!("{state}");
    let log_state = if log_file.exists() { "" } else { " (not written yet)" };
    println!("Log file: {}{log_state}", log_file.display());

    if plan.is_current() {
        return;
    }

    let rows = vec![
        row("create directory", &plan.create_directories),
        row("remove directory", &plan.remove_directories),
        row("update file", &plan.update_files),
        row("copy file", &plan.copy_files),
        row("remove file", &plan.remove_files),
    ];
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    for failure in &plan.compare_failures {
        println!("{} {failure}", "could not compare:".red());
    }
    println!("Run 'mirror sync' to bring the replica up to date.");
}

fn row(action: &'static str, paths: &[PathBuf]) -> PendingRow {
    PendingRow {
        action,
        count: paths.len(),
        examples: summarize_paths(paths),
    }
}

fn summarize_paths(paths: &[PathBuf]) -> String {
    let mut names: Vec<String> = paths
        .iter()
        .take(2)
        .map(|path| path.display().to_string())
        .collect();
    if paths.len() > names.len() {
        names.push(format!("+{} more", paths.len() - names.len()));
    }
    names.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarize_paths_truncates_after_two() {
        let paths: Vec<PathBuf> = ["a", "b", "c", "d"].iter().map(PathBuf::from).collect();
        assert_eq!(summarize_paths(&paths), "a, b, +2 more");
        assert_eq!(summarize_paths(&paths[..1]), "a");
        assert_eq!(summarize_paths(&[]), "");
    }
}
