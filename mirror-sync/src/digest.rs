//! Content comparison by streamed SHA-256 digest.

use std::fmt;
use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::SyncError;

/// Bytes read per chunk while hashing; bounds memory, not semantics.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// SHA-256 fingerprint of a file's full content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Stream `path` through SHA-256 in [`CHUNK_SIZE`] reads.
pub fn digest_file(path: &Path) -> io::Result<ContentDigest> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        hasher.update(&buf[..n]);
    }
    Ok(ContentDigest(hasher.finalize().into()))
}

/// Decides whether a replica file still matches its source.
pub trait ContentComparator: Send + Sync {
    fn files_equal(&self, source: &Path, replica: &Path) -> Result<bool, SyncError>;
}

/// Default comparator: length check, then whole-file digests.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestComparator;

impl ContentComparator for DigestComparator {
    fn files_equal(&self, source: &Path, replica: &Path) -> Result<bool, SyncError> {
        files_equal(source, replica)
    }
}

/// `true` iff both files have bit-equal digests. Two empty files are equal.
///
/// Fails with [`SyncError::Compare`] when either path is missing, is a
/// directory, or cannot be read.
pub fn files_equal(source: &Path, replica: &Path) -> Result<bool, SyncError> {
    let compare_err = |err: io::Error| SyncError::Compare {
        source_path: source.to_path_buf(),
        replica_path: replica.to_path_buf(),
        source: err,
    };

    let source_len = file_len(source).map_err(compare_err)?;
    let replica_len = file_len(replica).map_err(compare_err)?;
    if source_len != replica_len {
        return Ok(false);
    }

    let source_digest = digest_file(source).map_err(compare_err)?;
    let replica_digest = digest_file(replica).map_err(compare_err)?;
    Ok(source_digest == replica_digest)
}

fn file_len(path: &Path) -> io::Result<u64> {
    let meta = std::fs::metadata(path)?;
    if meta.is_dir() {
        return Err(io::Error::other(format!(
            "{} is a directory",
            path.display()
        )));
    }
    Ok(meta.len())
}
