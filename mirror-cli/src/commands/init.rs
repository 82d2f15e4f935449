//! `mirror init [flags]`

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use mirror_core::ConfigFile;

/// Validate settings and save them to the config file.
#[derive(Args, Debug)]
pub struct InitArgs {
    #[command(flatten)]
    pub config: super::ConfigArgs,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let path = self.config.config_path()?;
        let config = self.config.resolve()?;

        if !config.source_folder.is_dir() {
            println!(
                "{} source folder '{}' does not exist yet; `mirror run` will refuse to start until it does",
                "warning:".yellow().bold(),
                config.source_folder.display()
            );
        }

        ConfigFile::from(config.clone())
            .save(&path)
            .with_context(|| format!("failed to save config to '{}'", path.display()))?;

        println!("✓ Saved configuration to {}", path.display());
        println!("  source:   {}", config.source_folder.display());
        println!("  replica:  {}", config.replica_folder.display());
        println!("  interval: {}s", config.interval_seconds);
        println!("  logs:     {}", config.log_folder.display());
        Ok(())
    }
}
