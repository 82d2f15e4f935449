//! File transfer into the replica.
//!
//! ## `copy_file` protocol
//!
//! 1. Create missing parent directories of the destination.
//! 2. Create a uniquely named `.mirror*.tmp` file next to the destination and
//!    copy content and permissions into it.
//! 3. Stamp the temporary with the source's access/modify times.
//! 4. Rename over the destination (atomic on POSIX).
//!
//! A failure at any step removes the temporary and leaves an existing
//! destination untouched. The temporary is created exclusively, so it never
//! reuses or clobbers another entry of the replica.

use std::io;
use std::path::Path;

use filetime::FileTime;
use tempfile::{Builder, NamedTempFile};

use crate::error::SyncError;

const TMP_PREFIX: &str = ".mirror";
const TMP_SUFFIX: &str = ".tmp";

/// Copy `source` to `dest`, overwriting it. Returns the number of bytes copied.
pub fn copy_file(source: &Path, dest: &Path) -> Result<u64, SyncError> {
    let copy_err = |err: io::Error| SyncError::Copy {
        from: source.to_path_buf(),
        to: dest.to_path_buf(),
        source: err,
    };

    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(copy_err)?;

    let tmp = Builder::new()
        .prefix(TMP_PREFIX)
        .suffix(TMP_SUFFIX)
        .tempfile_in(parent)
        .map_err(copy_err)?;

    let bytes = match fill(source, &tmp) {
        Ok(bytes) => bytes,
        Err(err) => {
            discard(tmp);
            return Err(copy_err(err));
        }
    };

    if let Err(err) = tmp.persist(dest) {
        discard(err.file);
        return Err(copy_err(err.error));
    }
    Ok(bytes)
}

fn fill(source: &Path, tmp: &NamedTempFile) -> io::Result<u64> {
    let bytes = std::fs::copy(source, tmp.path())?;

    let meta = std::fs::metadata(source)?;
    filetime::set_file_times(
        tmp.path(),
        FileTime::from_last_access_time(&meta),
        FileTime::from_last_modification_time(&meta),
    )?;
    Ok(bytes)
}

fn discard(tmp: NamedTempFile) {
    let path = tmp.path().to_path_buf();
    if let Err(err) = tmp.close() {
        tracing::debug!("could not remove temporary {}: {err}", path.display());
    }
}
