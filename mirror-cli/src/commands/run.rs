//! `mirror run [flags] [--json-logs]`

use anyhow::{Context, Result};
use clap::Args;

use mirror_daemon::LogFormat;

/// Synchronize periodically until Ctrl-C.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: super::ConfigArgs,

    /// Emit log records as JSON lines instead of text.
    #[arg(long)]
    pub json_logs: bool,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let config = self.config.resolve()?;
        let format = if self.json_logs {
            LogFormat::Json
        } else {
            LogFormat::Text
        };

        let summary =
            mirror_daemon::start_blocking(&config, format).context("mirror stopped with an error")?;
        println!(
            "✓ Stopped after {} passes ({} with changes, {} errors)",
            summary.passes, summary.changed_passes, summary.errors
        );
        Ok(())
    }
}
