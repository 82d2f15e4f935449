use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the scheduler and logging setup.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("initialization failed: {0}")]
    Init(#[from] mirror_sync::InitializationError),

    #[error("configuration error: {0}")]
    Config(#[from] mirror_core::ConfigError),

    #[error("{task} task join failure: {message}")]
    Join { task: &'static str, message: String },

    #[error("ctrl-c handler failed: {0}")]
    Signal(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
