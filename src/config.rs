// SPDX-License-Identifier: GPL-3.0-only

use crate::backends::camera::{CameraSource, SessionPreset};
use crate::constants::{encoding, timing};
use crate::errors::ConfigError;
use crate::filters::FilterType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Directory name under the user config dir
const CONFIG_DIR_NAME: &str = "photobooth";

/// Config file name
const CONFIG_FILE_NAME: &str = "config.json";

/// User configuration for the camera bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Explicit capture device (e.g. `/dev/video2`). First capture node when unset.
    pub device: Option<String>,
    /// GStreamer source used to open the device
    pub source: CameraSource,
    /// Session resolution preset
    pub preset: SessionPreset,
    /// Settling delay between session start and photo request, in milliseconds
    pub settle_delay_ms: u64,
    /// Watchdog for the photo request, in milliseconds. `None` waits forever.
    pub capture_timeout_ms: Option<u64>,
    /// JPEG quality (0-100)
    pub jpeg_quality: u8,
    /// Filter selected when the bridge starts
    pub default_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: None,
            source: CameraSource::default(),
            preset: SessionPreset::default(),
            settle_delay_ms: timing::SETTLE_DELAY.as_millis() as u64,
            capture_timeout_ms: Some(timing::CAPTURE_TIMEOUT.as_millis() as u64),
            jpeg_quality: encoding::JPEG_QUALITY,
            default_filter: FilterType::None.name().to_string(),
        }
    }
}

impl Config {
    /// Default location: `$XDG_CONFIG_HOME/photobooth/config.json`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load configuration from `path`, falling back to defaults when the file is absent
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let config: Config = serde_json::from_str(&contents)?;
                info!(path = %path.display(), "Loaded configuration");
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No configuration file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write the configuration as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn capture_timeout(&self) -> Option<Duration> {
        self.capture_timeout_ms.map(Duration::from_millis)
    }

    /// JPEG quality clamped to the encoder's accepted range
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality.clamp(1, 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{"settle_delay_ms": 250}"#).unwrap();
        assert_eq!(config.settle_delay(), Duration::from_millis(250));
        assert_eq!(config.jpeg_quality, 90);
        assert_eq!(config.default_filter, "none");
    }

    #[test]
    fn test_jpeg_quality_is_clamped() {
        let config = Config {
            jpeg_quality: 0,
            ..Config::default()
        };
        assert_eq!(config.jpeg_quality(), 1);
    }
}
