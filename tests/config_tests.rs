// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use pocket_camera::config::VideoSinkStrategy;
use pocket_camera::{Config, Lens};
use std::path::PathBuf;

#[test]
fn test_config_default() {
    // Test that default config can be created
    let config = Config::default();

    // Check sensible defaults
    assert_eq!(config.default_lens, Lens::Back, "Back lens should be the default");
    assert_eq!(config.video_sink, VideoSinkStrategy::DirectFile);
    assert_eq!(config.video_relative_path, "Movies/PocketCamera");
    assert_eq!(config.video_extension, "mjpeg");
}

#[test]
fn test_missing_config_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let config = Config {
        media_dir: Some(PathBuf::from("/data/captures")),
        default_lens: Lens::Front,
        video_sink: VideoSinkStrategy::StoreRecord,
        ..Config::default()
    };
    config.save_to(&path).unwrap();

    assert_eq!(Config::load_from(&path).unwrap(), config);
}

#[test]
fn test_partial_config_fills_defaults() {
    // Fields missing from older files take their default values
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "default_lens": "front" }"#).unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.default_lens, Lens::Front);
    assert_eq!(config.video_extension, "mjpeg");
}

#[test]
fn test_malformed_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(Config::load_from(&path).is_err());
}

#[test]
fn test_media_dir_override() {
    let config = Config {
        media_dir: Some(PathBuf::from("/tmp/shots")),
        ..Config::default()
    };
    assert_eq!(config.media_dir(), PathBuf::from("/tmp/shots"));
    assert!(Config::default().media_dir().ends_with("PocketCamera"));
}
