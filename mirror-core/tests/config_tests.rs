//! Config file error-message, partial-file, and validation tests.

use std::fs;
use std::path::PathBuf;

use assert_fs::prelude::*;
use mirror_core::{ConfigError, ConfigFile};
use predicates::prelude::*;
use rstest::rstest;

fn full() -> ConfigFile {
    ConfigFile {
        source_folder: Some(PathBuf::from("src-tree")),
        replica_folder: Some(PathBuf::from("replica-tree")),
        interval_seconds: Some(10),
        log_folder: Some(PathBuf::from("logs")),
    }
}

// ---------------------------------------------------------------------------
// 1. Load
// ---------------------------------------------------------------------------

#[test]
fn load_missing_file_returns_not_found() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let path = dir.path().join("absent.yaml");
    let err = ConfigFile::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("absent.yaml"));
}

#[test]
fn load_corrupt_yaml_returns_parse_error_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("config.yaml");
    file.write_str(": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = ConfigFile::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("config.yaml"));
}

#[test]
fn load_rejects_unknown_keys() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("config.yaml");
    file.write_str("source_folder: a\nreplica_path: b\n").expect("write");

    let err = ConfigFile::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

#[test]
fn load_partial_file_leaves_other_fields_unset() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("config.yaml");
    file.write_str("source_folder: /srv/data\ninterval_seconds: 60\n")
        .expect("write");

    let loaded = ConfigFile::load(file.path()).expect("load");
    assert_eq!(loaded.source_folder, Some(PathBuf::from("/srv/data")));
    assert_eq!(loaded.interval_seconds, Some(60));
    assert_eq!(loaded.replica_folder, None);
    assert_eq!(loaded.log_folder, None);
}

// ---------------------------------------------------------------------------
// 2. Save
// ---------------------------------------------------------------------------

#[test]
fn save_creates_parent_directories_and_readable_yaml() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let path = dir.path().join(".mirror").join("config.yaml");
    full().save(&path).expect("save");

    dir.child(".mirror/config.yaml")
        .assert(predicate::str::contains("replica_folder: replica-tree"));
    dir.child(".mirror/config.yaml")
        .assert(predicate::str::contains("interval_seconds: 10"));
    dir.child(".mirror/config.yaml.tmp")
        .assert(predicate::path::missing());
}

#[test]
fn save_omits_unset_fields() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let path = dir.path().join("config.yaml");
    let partial = ConfigFile {
        log_folder: Some(PathBuf::from("logs")),
        ..ConfigFile::default()
    };
    partial.save(&path).expect("save");

    let yaml = fs::read_to_string(&path).expect("read");
    assert!(!yaml.contains("source_folder"), "unset field serialized: {yaml}");
}

// ---------------------------------------------------------------------------
// 3. Resolve
// ---------------------------------------------------------------------------

#[rstest]
#[case::source(ConfigFile { source_folder: None, ..full() }, "source_folder")]
#[case::replica(ConfigFile { replica_folder: None, ..full() }, "replica_folder")]
#[case::interval(ConfigFile { interval_seconds: None, ..full() }, "interval_seconds")]
#[case::log(ConfigFile { log_folder: None, ..full() }, "log_folder")]
fn resolve_reports_the_missing_field(#[case] file: ConfigFile, #[case] field: &str) {
    let err = file.resolve().unwrap_err();
    assert!(matches!(err, ConfigError::Missing(name) if name == field), "got: {err}");
    assert!(err.to_string().contains(field));
}

#[rstest]
#[case::zero_interval(ConfigFile { interval_seconds: Some(0), ..full() }, "interval_seconds")]
#[case::empty_source(ConfigFile { source_folder: Some(PathBuf::new()), ..full() }, "source_folder")]
#[case::empty_log(ConfigFile { log_folder: Some(PathBuf::new()), ..full() }, "log_folder")]
fn resolve_rejects_invalid_values(#[case] file: ConfigFile, #[case] field: &str) {
    let err = file.resolve().unwrap_err();
    assert!(
        matches!(err, ConfigError::Invalid { field: name, .. } if name == field),
        "got: {err}"
    );
}

#[test]
fn flags_complete_a_partial_file() {
    let from_file = ConfigFile {
        source_folder: Some(PathBuf::from("a")),
        replica_folder: Some(PathBuf::from("b")),
        ..ConfigFile::default()
    };
    let from_flags = ConfigFile {
        interval_seconds: Some(3),
        log_folder: Some(PathBuf::from("logs")),
        replica_folder: Some(PathBuf::from("override")),
        ..ConfigFile::default()
    };

    let config = from_file.overlay(from_flags).resolve().expect("resolve");
    assert_eq!(config.replica_folder, PathBuf::from("override"));
    assert_eq!(config.interval_seconds, 3);
}
