//! Configuration for recording, compression and playback.
//!
//! Stored as TOML at `<config dir>/acast/config.toml`. Every field has a
//! default, so a partial (or missing) file is valid.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub recording: RecordingConfig,
    pub compression: CompressionConfig,
    pub playback: PlaybackConfig,
}

/// Capture and durability settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Longest idle gap kept between two frames (seconds)
    pub max_wait: f64,
    /// Minimum wall-clock time between storage syncs (milliseconds)
    pub sync_interval_ms: u64,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            max_wait: 1.0,
            sync_interval_ms: 500,
        }
    }
}

/// Batching and compression settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Coalesce and compress similar frames
    pub enabled: bool,
    /// Target group size; clamped into `[min_group_size, max_batch_size]`
    pub ratio: usize,
    /// Groups smaller than this are always written uncompressed
    pub min_group_size: usize,
    /// Pending frames that force a flush
    pub max_batch_size: usize,
    /// Pending payload bytes that allow an early flush
    pub data_threshold: usize,
    /// Recording time a batch may span before it is flushed (seconds)
    pub batch_window: f64,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ratio: 8,
            min_group_size: 4,
            max_batch_size: 64,
            data_threshold: 4096,
            batch_window: 1.5,
        }
    }
}

/// Replay settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Speed multiplier (2.0 = twice as fast)
    pub speed: f64,
    /// Longest pause between two frames during replay (seconds)
    pub max_wait: Option<f64>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            max_wait: Some(3.0),
        }
    }
}

impl Config {
    /// Path of the configuration file.
    pub fn config_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(dir.join("acast").join("config.toml"))
    }

    /// Load configuration from the default location, falling back to defaults.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Write configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }
}
