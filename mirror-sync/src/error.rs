//! Error types for mirror-sync.
//!
//! [`InitializationError`] is fatal and stops a process before its first
//! pass. [`SyncError`] is raised inside a pass; the engine catches it at the
//! phase or item boundary, logs it, and carries on.

use std::path::PathBuf;

use thiserror::Error;

/// Construction-time failure of a [`crate::Synchronizer`].
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("source folder does not exist: {path}")]
    SourceMissing { path: PathBuf },

    #[error("source folder is not a directory: {path}")]
    SourceNotDirectory { path: PathBuf },

    /// Source and replica are the same tree, or one is nested in the other.
    #[error("replica folder {replica} overlaps source folder {source_root}")]
    Overlapping {
        source_root: PathBuf,
        replica: PathBuf,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Recoverable errors raised during a synchronization pass.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Walking a tree failed (permission denied or another OS-level error).
    #[error("failed to scan {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content comparison failed: a path is missing, is a directory, or is unreadable.
    #[error("failed to compare {source_path} with {replica_path}: {source}")]
    Compare {
        source_path: PathBuf,
        replica_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Copying a file into the replica failed.
    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory creation/removal or file deletion failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
