// SPDX-License-Identifier: GPL-3.0-only

use crate::backends::camera::Lens;
use crate::constants::{DEFAULT_SAVE_FOLDER, DEFAULT_VIDEO_EXTENSION, DEFAULT_VIDEO_RELATIVE_PATH};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Application directory name under the user's config directory
const CONFIG_DIR_NAME: &str = "pocket-camera";

const CONFIG_FILE_NAME: &str = "config.json";

/// Where a recording's bytes go while the device writes them
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum VideoSinkStrategy {
    /// Write a plain file into the capture directory, then copy it into the store
    #[default]
    DirectFile,
    /// Write straight into a record allocated by the store
    StoreRecord,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Capture directory; `None` uses the pictures directory
    pub media_dir: Option<PathBuf>,
    /// Lens a screen binds first
    pub default_lens: Lens,
    /// How recordings reach the media store
    pub video_sink: VideoSinkStrategy,
    /// Store location recordings are registered under
    pub video_relative_path: String,
    /// Container extension for new recordings
    pub video_extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media_dir: None,
            default_lens: Lens::Back,
            video_sink: VideoSinkStrategy::default(),
            video_relative_path: DEFAULT_VIDEO_RELATIVE_PATH.to_string(),
            video_extension: DEFAULT_VIDEO_EXTENSION.to_string(),
        }
    }
}

impl Config {
    /// `<config dir>/pocket-camera/config.json`
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load the user configuration, falling back to defaults
    pub fn load() -> Self {
        let loaded = Self::config_path().and_then(|path| Self::load_from(&path));
        match loaded {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "Using default configuration");
                Self::default()
            }
        }
    }

    /// Load from a specific file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No configuration file");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e.to_string())),
        };
        serde_json::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        let json =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| ConfigError::Io(e.to_string()))?;
        debug!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Capture directory in effect
    pub fn media_dir(&self) -> PathBuf {
        self.media_dir.clone().unwrap_or_else(default_media_dir)
    }
}

/// Pictures directory (or home) joined with the app folder
pub fn default_media_dir() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(DEFAULT_SAVE_FOLDER)
}
