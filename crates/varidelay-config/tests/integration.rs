//! Integration tests for varidelay-config.
//!
//! Settings files on disk driving a real session.

use std::path::Path;

use tempfile::TempDir;
use varidelay_config::{ConfigError, Settings};
use varidelay_core::Session;

#[test]
fn save_and_load_through_nested_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("config.toml");

    let mut settings = Settings::default();
    settings.audio.sample_rate = 48000.0;
    settings.audio.block_size = 128;
    settings.midi.input_port = Some("Launch Control".into());
    settings.delay.initial_feedback = 0.3;
    settings.save(&path).expect("save should create parent directories");

    assert!(path.exists());
    let loaded = Settings::load(&path).unwrap();
    assert_eq!(loaded, settings);
}

#[test]
fn loaded_file_builds_a_session() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[audio]
sample_rate = 48000.0
block_size = 128

[delay]
max_delay_seconds = 1.0
filter_stages = 2
initial_delay = 0.5
initial_filter = 1.0
"#,
    )
    .unwrap();

    let settings = Settings::load_or_default(Some(&path)).unwrap();
    let session =
        Session::with_params(settings.to_descriptor().unwrap(), settings.initial_params()).unwrap();

    assert_eq!(session.descriptor().capacity(), 48000);
    assert_eq!(session.processor().cascade().stage_count(), 2);
    let snapshot = session.params().snapshot();
    assert_eq!(snapshot.delay, 0.5);
    assert_eq!(snapshot.coefficient, 1.0);
    assert_eq!(snapshot.feedback, 0.0);
}

#[test]
fn missing_explicit_file_is_read_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    let err = Settings::load_or_default(Some(&path)).unwrap_err();
    match err {
        ConfigError::ReadFile { path: p, .. } => assert_eq!(p, path),
        other => panic!("expected ReadFile, got {other:?}"),
    }
}

#[test]
fn malformed_file_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[audio\nsample_rate = ").unwrap();
    assert!(matches!(Settings::load(&path), Err(ConfigError::TomlParse(_))));
}

#[test]
fn oversized_block_rejected_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[audio]\nsample_rate = 1000.0\nblock_size = 256\n\n[delay]\nmax_delay_seconds = 0.25\n",
    )
    .unwrap();
    let err = Settings::load(&path).unwrap_err();
    assert!(
        err.to_string().contains("block size 256 does not fit"),
        "got: {err}"
    );
}

#[test]
fn save_overwrites_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "stale").unwrap();
    Settings::default().save(&path).unwrap();
    assert_eq!(Settings::load(Path::new(&path)).unwrap(), Settings::default());
}
