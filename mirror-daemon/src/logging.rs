//! Process logging: console plus an appending `<log_folder>/DD-MM-YYYY.log`.
//!
//! Installs a `tracing` subscriber with an `EnvFilter` (default `info`,
//! overridable through `RUST_LOG`). Records emitted through the `log` facade
//! by `mirror-sync` are bridged into the same subscriber.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{Local, NaiveDate};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{io_err, DaemonError};
use crate::paths::log_file_path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Create `log_folder` if needed and open the log file for `date` in append mode.
pub fn open_log_file(log_folder: &Path, date: NaiveDate) -> Result<(PathBuf, File), DaemonError> {
    std::fs::create_dir_all(log_folder).map_err(|e| io_err(log_folder, e))?;
    let path = log_file_path(log_folder, date);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| io_err(&path, e))?;
    Ok((path, file))
}

/// Install the global subscriber. Returns the log file path.
///
/// If a subscriber is already installed (tests, repeated calls) the existing
/// one is kept and only the log file is created.
pub fn init_logging(log_folder: &Path, format: LogFormat) -> Result<PathBuf, DaemonError> {
    let (path, file) = open_log_file(log_folder, Local::now().date_naive())?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // The layers are built per arm because each arm stacks them onto a
    // different subscriber type.
    let installed = match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).json())
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .json(),
            )
            .try_init(),
    };
    if let Err(err) = installed {
        tracing::debug!(error = %err, "global subscriber already installed");
    }

    Ok(path)
}
