use crate::defaults;
use crate::error::{Result, TextsiftError};
use crate::frames::FrameFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub tracker: TrackerSection,
    pub rank: RankSection,
    pub sink: SinkSection,
    pub input: InputSection,
}

/// Stability tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackerSection {
    pub window_size: usize,
    pub min_sightings: usize,
}

/// Ranking and flush cadence configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RankSection {
    pub marker: String,
    pub flush_interval_secs: u64,
}

/// Notification sink configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SinkSection {
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

/// Frame input configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputSection {
    pub format: FrameFormat,
}

impl Default for TrackerSection {
    fn default() -> Self {
        Self {
            window_size: defaults::WINDOW_SIZE,
            min_sightings: defaults::MIN_SIGHTINGS,
        }
    }
}

impl Default for RankSection {
    fn default() -> Self {
        Self {
            marker: defaults::INTERESTING_MARKER.to_string(),
            flush_interval_secs: defaults::FLUSH_INTERVAL_SECS,
        }
    }
}

impl Default for SinkSection {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: defaults::SINK_TIMEOUT_SECS,
        }
    }
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            format: FrameFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file is missing or contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TextsiftError::ConfigFileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                TextsiftError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only a missing file falls back to defaults. Invalid TOML is a hard
    /// error: silently ignoring a typo'd config is worse than failing.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(TextsiftError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - TEXTSIFT_ENDPOINT → sink.endpoint
    /// - TEXTSIFT_MARKER → rank.marker
    /// - TEXTSIFT_FLUSH_INTERVAL → rank.flush_interval_secs
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(endpoint) = std::env::var("TEXTSIFT_ENDPOINT")
            && !endpoint.is_empty()
        {
            self.sink.endpoint = Some(endpoint);
        }

        if let Ok(marker) = std::env::var("TEXTSIFT_MARKER")
            && !marker.is_empty()
        {
            self.rank.marker = marker;
        }

        if let Ok(interval) = std::env::var("TEXTSIFT_FLUSH_INTERVAL")
            && let Ok(secs) = interval.parse::<u64>()
        {
            self.rank.flush_interval_secs = secs;
        }

        self
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.tracker.window_size == 0 {
            return Err(TextsiftError::ConfigInvalidValue {
                key: "tracker.window_size".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.tracker.min_sightings == 0 {
            return Err(TextsiftError::ConfigInvalidValue {
                key: "tracker.min_sightings".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.tracker.min_sightings > self.tracker.window_size {
            return Err(TextsiftError::ConfigInvalidValue {
                key: "tracker.min_sightings".to_string(),
                message: format!(
                    "must not exceed tracker.window_size ({})",
                    self.tracker.window_size
                ),
            });
        }
        if self.rank.flush_interval_secs == 0 {
            return Err(TextsiftError::ConfigInvalidValue {
                key: "rank.flush_interval_secs".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.rank.marker.is_empty() {
            return Err(TextsiftError::ConfigInvalidValue {
                key: "rank.marker".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/textsift/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("textsift")
            .join("config.toml")
    }
}
