//! Dry-run planning: what a pass would do, computed without writing anything.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::digest::ContentComparator;
use crate::error::SyncError;
use crate::scanner;

/// Pending actions, relative to the roots, in the order a pass applies them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncPlan {
    pub create_directories: Vec<PathBuf>,
    pub remove_directories: Vec<PathBuf>,
    pub update_files: Vec<PathBuf>,
    pub copy_files: Vec<PathBuf>,
    /// Replica-only files outside any directory scheduled for removal.
    pub remove_files: Vec<PathBuf>,
    /// Shared files whose comparison failed; their state is unknown.
    pub compare_failures: Vec<String>,
}

impl SyncPlan {
    pub fn action_count(&self) -> usize {
        self.create_directories.len()
            + self.remove_directories.len()
            + self.update_files.len()
            + self.copy_files.len()
            + self.remove_files.len()
    }

    /// No pending actions and nothing left unverified.
    pub fn is_current(&self) -> bool {
        self.action_count() == 0 && self.compare_failures.is_empty()
    }
}

/// Scan both trees once and work out the actions of the next pass.
///
/// Fails only if a tree cannot be scanned; individual comparison failures are
/// collected in [`SyncPlan::compare_failures`].
pub fn plan(
    source_root: &Path,
    replica_root: &Path,
    comparator: &dyn ContentComparator,
) -> Result<SyncPlan, SyncError> {
    let source = scanner::scan(source_root)?;
    let replica = scanner::scan(replica_root)?;

    let mut plan = SyncPlan {
        create_directories: source
            .directories
            .difference(&replica.directories)
            .cloned()
            .collect(),
        remove_directories: top_level(replica.directories.difference(&source.directories)),
        copy_files: source.files.difference(&replica.files).cloned().collect(),
        ..SyncPlan::default()
    };

    for relative in source.files.intersection(&replica.files) {
        match comparator.files_equal(&source_root.join(relative), &replica_root.join(relative)) {
            Ok(true) => {}
            Ok(false) => plan.update_files.push(relative.clone()),
            Err(err) => plan.compare_failures.push(err.to_string()),
        }
    }

    let removed_dirs = plan.remove_directories.clone();
    plan.remove_files = replica
        .files
        .difference(&source.files)
        .filter(|file| !removed_dirs.iter().any(|dir| file.starts_with(dir)))
        .cloned()
        .collect();

    Ok(plan)
}

/// Keep only directories that are not inside another listed directory.
/// Input must be sorted, as a `BTreeSet` iteration is.
pub(crate) fn top_level<'a>(dirs: impl IntoIterator<Item = &'a PathBuf>) -> Vec<PathBuf> {
    let mut kept: Vec<PathBuf> = Vec::new();
    for dir in dirs {
        if kept.iter().any(|parent| dir.starts_with(parent)) {
            continue;
        }
        kept.push(dir.clone());
    }
    kept
}
