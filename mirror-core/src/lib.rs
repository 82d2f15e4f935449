//! Mirror core library: configuration types and their persistence.
//!
//! - [`config`]: [`MirrorConfig`] and the partially-specified [`ConfigFile`]
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;

pub use config::{ConfigFile, MirrorConfig};
pub use error::ConfigError;
