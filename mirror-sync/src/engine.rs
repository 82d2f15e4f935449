//! Reconciliation engine.
//!
//! A pass runs four phases in a fixed order:
//!
//! 1. [`Phase::Directories`]: create source-only directories, remove
//!    replica-only ones (recursively).
//! 2. [`Phase::CommonFiles`]: overwrite shared files whose content differs.
//! 3. [`Phase::MissingFiles`]: copy source-only files.
//! 4. [`Phase::ExtraFiles`]: delete replica-only files.
//!
//! Every phase rescans both trees. A phase that cannot scan is logged and the
//! next phase still runs; a single failing item is logged and the rest of the
//! batch still runs. [`Synchronizer::synchronize`] therefore never fails.

use std::fmt;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::digest::{ContentComparator, DigestComparator};
use crate::error::{io_err, InitializationError, SyncError};
use crate::logger::SyncLogger;
use crate::plan::{self, SyncPlan};
use crate::{scanner, transfer};

/// The phases of a pass, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Directories,
    CommonFiles,
    MissingFiles,
    ExtraFiles,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Directories,
        Phase::CommonFiles,
        Phase::MissingFiles,
        Phase::ExtraFiles,
    ];
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Directories => "directory reconciliation",
            Phase::CommonFiles => "common file update",
            Phase::MissingFiles => "missing file copy",
            Phase::ExtraFiles => "extra file removal",
        };
        f.write_str(label)
    }
}

/// What a single pass did. Paths are relative to the roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub directories_created: Vec<PathBuf>,
    pub directories_removed: Vec<PathBuf>,
    pub files_updated: Vec<PathBuf>,
    pub files_copied: Vec<PathBuf>,
    pub files_removed: Vec<PathBuf>,
    /// Messages of every error caught during the pass.
    pub errors: Vec<String>,
}

impl PassReport {
    fn begin() -> Self {
        Self {
            started_at: Utc::now(),
            duration_ms: 0,
            directories_created: Vec::new(),
            directories_removed: Vec::new(),
            files_updated: Vec::new(),
            files_copied: Vec::new(),
            files_removed: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// `true` iff at least one replica mutation succeeded.
    pub fn changed(&self) -> bool {
        self.mutation_count() > 0
    }

    pub fn mutation_count(&self) -> usize {
        self.directories_created.len()
            + self.directories_removed.len()
            + self.files_updated.len()
            + self.files_copied.len()
            + self.files_removed.len()
    }
}

/// Mirrors one source tree into one replica tree.
pub struct Synchronizer {
    source_root: PathBuf,
    replica_root: PathBuf,
    logger: Arc<dyn SyncLogger>,
    comparator: Arc<dyn ContentComparator>,
}

impl fmt::Debug for Synchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synchronizer")
            .field("source_root", &self.source_root)
            .field("replica_root", &self.replica_root)
            .finish_non_exhaustive()
    }
}

impl Synchronizer {
    /// Validate the roots and build an engine.
    ///
    /// The source must be an existing directory. The replica may be absent;
    /// it is created on the first pass. The two trees must not overlap.
    pub fn new(
        source_root: impl Into<PathBuf>,
        replica_root: impl Into<PathBuf>,
        logger: Arc<dyn SyncLogger>,
    ) -> Result<Self, InitializationError> {
        let source_root = source_root.into();
        let replica_root = replica_root.into();

        match std::fs::metadata(&source_root) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(InitializationError::SourceNotDirectory { path: source_root });
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(InitializationError::SourceMissing { path: source_root });
            }
            Err(source) => {
                return Err(InitializationError::Io {
                    path: source_root,
                    source,
                });
            }
        }

        let resolved_source = resolve(&source_root).map_err(|source| InitializationError::Io {
            path: source_root.clone(),
            source,
        })?;
        let resolved_replica = resolve(&replica_root).map_err(|source| InitializationError::Io {
            path: replica_root.clone(),
            source,
        })?;
        if resolved_replica.starts_with(&resolved_source)
            || resolved_source.starts_with(&resolved_replica)
        {
            return Err(InitializationError::Overlapping {
                source_root,
                replica: replica_root,
            });
        }

        Ok(Self {
            source_root,
            replica_root,
            logger,
            comparator: Arc::new(DigestComparator),
        })
    }

    /// Replace the content comparison strategy.
    pub fn with_comparator(mut self, comparator: Arc<dyn ContentComparator>) -> Self {
        self.comparator = comparator;
        self
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn replica_root(&self) -> &Path {
        &self.replica_root
    }

    /// Run one full pass. Errors are logged and collected, never returned.
    pub fn synchronize(&self) -> PassReport {
        let started = Instant::now();
        let mut pass = PassReport::begin();

        for phase in Phase::ALL {
            let result = match phase {
                Phase::Directories => self.reconcile_directories(&mut pass),
                Phase::CommonFiles => self.update_common_files(&mut pass),
                Phase::MissingFiles => self.copy_missing_files(&mut pass),
                Phase::ExtraFiles => self.remove_extra_files(&mut pass),
            };
            if let Err(err) = result {
                self.record_error(&mut pass, format!("{phase} aborted: {err}"));
            }
        }

        pass.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        if pass.changed() {
            self.logger.info("Synchronization complete");
        } else {
            self.logger.info("No changes detected");
        }
        pass
    }

    /// Preview the actions a pass would take without touching either tree.
    pub fn plan(&self) -> Result<SyncPlan, SyncError> {
        plan::plan(&self.source_root, &self.replica_root, self.comparator.as_ref())
    }

    // -----------------------------------------------------------------------
    // Phases
    // -----------------------------------------------------------------------

    fn reconcile_directories(&self, pass: &mut PassReport) -> Result<(), SyncError> {
        let source_dirs = scanner::scan_directories(&self.source_root)?;
        let replica_dirs = scanner::scan_directories(&self.replica_root)?;

        // Sorted order puts every parent before its children.
        for relative in source_dirs.difference(&replica_dirs) {
            let target = self.replica_root.join(relative);
            match self.clear_non_directory(&target) {
                Ok(true) => {
                    self.logger.info(&format!(
                        "File: {} deleted from replica to make way for a directory.",
                        relative.display()
                    ));
                    pass.files_removed.push(relative.clone());
                }
                Ok(false) => {}
                Err(err) => {
                    self.record_error(pass, err.to_string());
                    continue;
                }
            }
            match std::fs::create_dir_all(&target) {
                Ok(()) => {
                    self.logger.info(&format!(
                        "Directory: {} created in replica.",
                        relative.display()
                    ));
                    pass.directories_created.push(relative.clone());
                }
                Err(err) => self.record_error(pass, io_err(&target, err).to_string()),
            }
        }

        let extra = plan::top_level(replica_dirs.difference(&source_dirs));
        for relative in extra {
            let target = self.replica_root.join(&relative);
            match std::fs::remove_dir_all(&target) {
                Ok(()) => {
                    self.logger.info(&format!(
                        "Directory: {} deleted from replica.",
                        relative.display()
                    ));
                    pass.directories_removed.push(relative);
                }
                Err(err) => self.record_error(pass, io_err(&target, err).to_string()),
            }
        }

        Ok(())
    }

    fn update_common_files(&self, pass: &mut PassReport) -> Result<(), SyncError> {
        let source_files = scanner::scan_files(&self.source_root)?;
        let replica_files = scanner::scan_files(&self.replica_root)?;

        for relative in source_files.intersection(&replica_files) {
            let (source, replica) = self.paths(relative);
            let outcome = self
                .comparator
                .files_equal(&source, &replica)
                .and_then(|equal| {
                    if equal {
                        Ok(false)
                    } else {
                        transfer::copy_file(&source, &replica).map(|_| true)
                    }
                });
            match outcome {
                Ok(true) => {
                    self.logger
                        .info(&format!("File: {} updated in replica.", relative.display()));
                    pass.files_updated.push(relative.clone());
                }
                Ok(false) => {}
                Err(err) => self.record_error(pass, err.to_string()),
            }
        }

        Ok(())
    }

    fn copy_missing_files(&self, pass: &mut PassReport) -> Result<(), SyncError> {
        let source_files = scanner::scan_files(&self.source_root)?;
        let replica_files = scanner::scan_files(&self.replica_root)?;

        for relative in source_files.difference(&replica_files) {
            let (source, replica) = self.paths(relative);
            match transfer::copy_file(&source, &replica) {
                Ok(_) => {
                    self.logger
                        .info(&format!("File: {} copied to replica.", relative.display()));
                    pass.files_copied.push(relative.clone());
                }
                Err(err) => self.record_error(pass, err.to_string()),
            }
        }

        Ok(())
    }

    fn remove_extra_files(&self, pass: &mut PassReport) -> Result<(), SyncError> {
        let source_files = scanner::scan_files(&self.source_root)?;
        let replica_files = scanner::scan_files(&self.replica_root)?;

        for relative in replica_files.difference(&source_files) {
            let target = self.replica_root.join(relative);
            match std::fs::remove_file(&target) {
                Ok(()) => {
                    self.logger.info(&format!(
                        "File: {} deleted from replica.",
                        relative.display()
                    ));
                    pass.files_removed.push(relative.clone());
                }
                Err(err) => self.record_error(pass, io_err(&target, err).to_string()),
            }
        }

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn paths(&self, relative: &Path) -> (PathBuf, PathBuf) {
        (
            self.source_root.join(relative),
            self.replica_root.join(relative),
        )
    }

    /// Remove a file or symlink sitting where a directory must go.
    /// Returns `true` if something was removed.
    fn clear_non_directory(&self, target: &Path) -> Result<bool, SyncError> {
        match std::fs::symlink_metadata(target) {
            Ok(meta) if meta.is_dir() => Ok(false),
            Ok(_) => std::fs::remove_file(target)
                .map(|()| true)
                .map_err(|e| io_err(target, e)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(io_err(target, err)),
        }
    }

    fn record_error(&self, pass: &mut PassReport, message: String) {
        self.logger.error(&message);
        pass.errors.push(message);
    }
}

/// Absolute, symlink-free form of `path`, even when its tail does not exist yet.
fn resolve(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        match existing.canonicalize() {
            Ok(mut resolved) => {
                for part in missing.iter().rev() {
                    resolved.push(part);
                }
                return Ok(resolved);
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                let (Some(parent), Some(name)) = (existing.parent(), existing.file_name()) else {
                    return Ok(absolute);
                };
                missing.push(name.to_os_string());
                existing = parent;
            }
            Err(err) => return Err(err),
        }
    }
}
