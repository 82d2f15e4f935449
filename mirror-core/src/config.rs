//! Mirror configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.mirror/
//!   config.yaml   (mode 0600, written by `mirror init`)
//! ```
//!
//! A [`ConfigFile`] is the partially-specified form: every field optional, so
//! that a file and command-line flags can each supply part of it. It becomes a
//! [`MirrorConfig`] through [`ConfigFile::resolve`], which checks that every
//! setting is present and acceptable.
//!
//! As with the rest of the workspace, path helpers come in two forms:
//! `fn_at(home, …)` for an explicit home and `fn(…)` deriving it from
//! `dirs::home_dir()`. Tests only call the `_at` forms.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};

/// Fully resolved configuration for a mirror process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Authoritative tree; never written.
    pub source_folder: PathBuf,
    /// Mirror tree; created lazily.
    pub replica_folder: PathBuf,
    /// Seconds to wait between the end of one pass and the start of the next.
    pub interval_seconds: u64,
    /// Directory receiving the dated log files.
    pub log_folder: PathBuf,
}

impl MirrorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

/// Partially-specified configuration as read from YAML or assembled from flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_folder: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replica_folder: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_folder: Option<PathBuf>,
}

impl From<MirrorConfig> for ConfigFile {
    fn from(config: MirrorConfig) -> Self {
        Self {
            source_folder: Some(config.source_folder),
            replica_folder: Some(config.replica_folder),
            interval_seconds: Some(config.interval_seconds),
            log_folder: Some(config.log_folder),
        }
    }
}

impl ConfigFile {
    /// Load a config file.
    ///
    /// Returns [`ConfigError::NotFound`] if absent and [`ConfigError::Parse`]
    /// (with path + line context) if the YAML is malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save atomically.
    ///
    /// Write flow: serialize → `<name>.tmp` sibling → `chmod 0600` → `rename`.
    /// Missing parent directories are created.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }

        let yaml = serde_yaml::to_string(self)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "config.yaml".to_string());
        let tmp = path.with_file_name(format!("{file_name}.tmp"));
        std::fs::write(&tmp, yaml).map_err(|e| io_err(&tmp, e))?;
        set_file_permissions(&tmp)?;
        if let Err(e) = std::fs::rename(&tmp, path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(path, e));
        }
        Ok(())
    }

    /// Layer `other` on top of `self`: every field set in `other` wins.
    pub fn overlay(self, other: ConfigFile) -> ConfigFile {
        ConfigFile {
            source_folder: other.source_folder.or(self.source_folder),
            replica_folder: other.replica_folder.or(self.replica_folder),
            interval_seconds: other.interval_seconds.or(self.interval_seconds),
            log_folder: other.log_folder.or(self.log_folder),
        }
    }

    /// Check that every setting is present and valid.
    pub fn resolve(self) -> Result<MirrorConfig, ConfigError> {
        let source_folder = require_path(self.source_folder, "source_folder")?;
        let replica_folder = require_path(self.replica_folder, "replica_folder")?;
        let log_folder = require_path(self.log_folder, "log_folder")?;
        let interval_seconds = self
            .interval_seconds
            .ok_or(ConfigError::Missing("interval_seconds"))?;
        if interval_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "interval_seconds",
                reason: "must be a positive number of seconds".to_string(),
            });
        }

        Ok(MirrorConfig {
            source_folder,
            replica_folder,
            interval_seconds,
            log_folder,
        })
    }
}

fn require_path(value: Option<PathBuf>, field: &'static str) -> Result<PathBuf, ConfigError> {
    let path = value.ok_or(ConfigError::Missing(field))?;
    if path.as_os_str().is_empty() {
        return Err(ConfigError::Invalid {
            field,
            reason: "path is empty".to_string(),
        });
    }
    Ok(path)
}

/// `<home>/.mirror/config.yaml`. Pure, no I/O.
pub fn default_config_path_at(home: &Path) -> PathBuf {
    home.join(".mirror").join("config.yaml")
}

/// `default_config_path_at` convenience wrapper.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
    Ok(default_config_path_at(&home))
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}
