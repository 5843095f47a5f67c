// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use photobooth::Config;
use photobooth::backends::camera::{CameraSource, SessionPreset};
use std::time::Duration;

fn temp_config_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir()
        .join(format!("photobooth-config-{}", uuid::Uuid::new_v4()))
        .join(name)
}

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.device, None);
    assert_eq!(config.source, CameraSource::V4l2);
    assert_eq!(config.preset, SessionPreset::Photo);
    assert_eq!(config.settle_delay(), Duration::from_millis(500));
    assert_eq!(config.capture_timeout(), Some(Duration::from_secs(10)));
    assert_eq!(config.jpeg_quality(), 90);
    assert_eq!(config.default_filter, "none");
}

#[test]
fn test_missing_file_gives_defaults() {
    let path = temp_config_path("config.json");
    let config = Config::load(&path).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_save_then_load() {
    let path = temp_config_path("config.json");
    let config = Config {
        device: Some("/dev/video2".to_string()),
        source: CameraSource::PipeWire,
        preset: SessionPreset::Hd,
        settle_delay_ms: 250,
        capture_timeout_ms: None,
        jpeg_quality: 75,
        default_filter: "vintage".to_string(),
    };

    config.save(&path).unwrap();
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("\"pipewire\""), "sources are lowercase: {}", contents);
    assert_eq!(Config::load(&path).unwrap(), config);

    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}

#[test]
fn test_malformed_file_is_an_error() {
    let path = temp_config_path("config.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{ not json").unwrap();

    assert!(Config::load(&path).is_err());

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn test_default_path_is_under_photobooth_dir() {
    // Only meaningful where a config dir exists
    if let Ok(path) = Config::default_path() {
        assert!(path.ends_with("photobooth/config.json"));
    }
}
