use life_launch::{EntryMode, LaunchConfig};
use std::{io::Write, path::PathBuf};

#[test]
fn load_reads_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "search_paths": ["lib/arm64"], "entry_mode": "dedicated_thread" }}"#
    )
    .unwrap();

    let config = LaunchConfig::load(file.path()).unwrap();
    assert_eq!(config.library, "LifeEngine");
    assert_eq!(config.search_paths, vec![PathBuf::from("lib/arm64")]);
    assert_eq!(config.entry_mode, EntryMode::DedicatedThread);
}

#[test]
fn missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = LaunchConfig::load_or_default(dir.path().join("Launch.json")).unwrap();
    assert_eq!(config, LaunchConfig::default());
}

#[test]
fn malformed_file_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();

    let error = LaunchConfig::load_or_default(file.path()).unwrap_err();
    assert!(format!("{error:#}").contains("Failed to parse launch config"));
}

#[cfg(unix)]
#[test]
fn unreadable_path_is_an_error() {
    // A regular file used as a directory fails with something other than NotFound.
    let file = tempfile::NamedTempFile::new().unwrap();
    let error = LaunchConfig::load_or_default(file.path().join("Launch.json")).unwrap_err();
    assert!(format!("{error:#}").contains("Failed to read launch config"));
}
