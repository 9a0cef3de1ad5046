//! Tests for layered configuration loading

use crabshot::config::CrabShotConfig;
use crabshot::types::{AspectRatio, Facing};
use std::fs;

#[test]
fn test_partial_file_overlays_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crabshot.toml");
    fs::write(
        &path,
        r#"
[camera]
default_facing = "front"
default_aspect_ratio = "16:9"

[recording]
fps = 24
"#,
    )
    .unwrap();

    let config = CrabShotConfig::load_layered(&path).unwrap();
    assert_eq!(config.camera.default_facing, Facing::Front);
    assert_eq!(config.camera.default_aspect_ratio, AspectRatio::of(16, 9));
    assert_eq!(config.recording.fps, 24);
    // untouched keys keep their defaults
    assert_eq!(config.recording.bitrate, 10_000_000);
    assert_eq!(config.advanced.open_timeout_ms, 2500);
}

#[test]
fn test_environment_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crabshot.toml");
    fs::write(&path, "[advanced]\nopen_timeout_ms = 1000\n").unwrap();

    std::env::set_var("CRABSHOT__ADVANCED__OPEN_TIMEOUT_MS", "750");
    let config = CrabShotConfig::load_layered(&path);
    std::env::remove_var("CRABSHOT__ADVANCED__OPEN_TIMEOUT_MS");

    assert_eq!(config.unwrap().advanced.open_timeout_ms, 750);
}

#[test]
fn test_invalid_values_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crabshot.toml");
    fs::write(&path, "[recording]\nfps = 0\n").unwrap();
    assert!(CrabShotConfig::load_layered(&path).is_err());

    fs::write(&path, "[camera]\ndefault_aspect_ratio = \"wide\"\n").unwrap();
    assert!(CrabShotConfig::load_layered(&path).is_err());
}

#[test]
fn test_malformed_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[camera\nnot toml").unwrap();
    assert!(CrabShotConfig::load_from_file(&path).is_err());
    assert!(CrabShotConfig::load_layered(&path).is_err());
}

#[test]
fn test_saved_config_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("crabshot.toml");
    let mut config = CrabShotConfig::default();
    config.storage.file_prefix = "SHOT".to_string();
    config.save_to_file(&path).unwrap();

    assert_eq!(CrabShotConfig::load_from_file(&path).unwrap(), config);
}
