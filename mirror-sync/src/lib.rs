//! # mirror-sync
//!
//! One-way directory mirroring.
//!
//! Build a [`Synchronizer`] for a source and a replica root, then call
//! [`Synchronizer::synchronize`] once per pass, or [`Synchronizer::plan`] to
//! preview a pass without writing anything.

pub mod digest;
pub mod engine;
pub mod error;
pub mod logger;
pub mod plan;
pub mod scanner;
pub mod transfer;

pub use digest::{files_equal, ContentComparator, ContentDigest, DigestComparator};
pub use engine::{PassReport, Phase, Synchronizer};
pub use error::{InitializationError, SyncError};
pub use logger::{LogLevel, MemoryLogger, SyncLogger, TracingLogger};
pub use plan::SyncPlan;
pub use scanner::{scan, DirectorySet, FileSet, TreeSnapshot};
pub use transfer::copy_file;
