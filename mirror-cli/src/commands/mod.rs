//! Subcommands and the configuration flags they share.

pub mod init;
pub mod run;
pub mod status;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use mirror_core::{config::default_config_path_at, ConfigError, ConfigFile, MirrorConfig};

/// Settings accepted by every subcommand. Each one overrides the config file.
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Config file to read. Defaults to ~/.mirror/config.yaml when it exists.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory to mirror from. Never modified.
    #[arg(long, value_name = "DIR")]
    pub source_folder: Option<PathBuf>,

    /// Directory kept identical to the source.
    #[arg(long, value_name = "DIR")]
    pub replica_folder: Option<PathBuf>,

    /// Seconds between the end of one pass and the start of the next.
    #[arg(long, value_name = "SECONDS")]
    pub interval: Option<u64>,

    /// Directory for the dated log files.
    #[arg(long, value_name = "DIR")]
    pub log_folder: Option<PathBuf>,
}

impl ConfigArgs {
    /// `--config` if given, else the default location under the home directory.
    pub fn config_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.config {
            return Ok(path.clone());
        }
        let home = dirs::home_dir().context("could not determine home directory")?;
        Ok(default_config_path_at(&home))
    }

    /// Config file contents (if any) with the flags layered on top.
    pub fn merged(&self) -> Result<ConfigFile> {
        let path = self.config_path()?;
        let base = match ConfigFile::load(&path) {
            Ok(file) => file,
            Err(ConfigError::NotFound { .. }) if self.config.is_none() => ConfigFile::default(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read config '{}'", path.display()))
            }
        };
        Ok(base.overlay(self.flags()))
    }

    /// Fully resolved settings; names the first missing or invalid one.
    pub fn resolve(&self) -> Result<MirrorConfig> {
        self.merged()?
            .resolve()
            .context("incomplete configuration; pass the flag or run `mirror init`")
    }

    fn flags(&self) -> ConfigFile {
        ConfigFile {
            source_folder: self.source_folder.clone(),
            replica_folder: self.replica_folder.clone(),
            interval_seconds: self.interval,
            log_folder: self.log_folder.clone(),
        }
    }
}
