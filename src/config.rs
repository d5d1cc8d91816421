// src/config.rs

//! Defines the configuration structures for a tile matrix.
//!
//! Every section deserializes with defaults for missing fields, so a config
//! file only needs to mention what it changes. The library never reads
//! configuration on its own: `TileManagerBuilder::config` takes a `Config`
//! value, and only the demo binary goes through the process-wide [`CONFIG`].

use crate::color::PixelLayout;
use crate::geometry::Size;
use anyhow::{Context, Result};
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming a JSON config file.
pub const CONFIG_PATH_ENV: &str = "TILE_MATRIX_CONFIG";

/// Process-wide configuration, loaded on first use.
pub static CONFIG: Lazy<Config> = Lazy::new(Config::load_or_default);

// --- Top-Level Configuration Structure ---

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Matrix geometry, frame rate and brightness.
    pub matrix: MatrixConfig,
    /// Animation loop tuning.
    pub scheduler: SchedulerConfig,
    /// Which display driver to use and how it encodes pixels.
    pub output: OutputConfig,
}

impl Config {
    /// Reads a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!("Config: loaded {}", path.display());
        Ok(config)
    }

    /// Loads the file named by `TILE_MATRIX_CONFIG`, falling back to
    /// defaults when it is unset or unreadable.
    pub fn load_or_default() -> Self {
        let Some(path) = std::env::var_os(CONFIG_PATH_ENV) else {
            info!("Config: {} not set, using defaults", CONFIG_PATH_ENV);
            return Config::default();
        };
        Config::load(Path::new(&path)).unwrap_or_else(|e| {
            warn!("Config: {:#}. Using defaults.", e);
            Config::default()
        })
    }
}

// --- Matrix Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct MatrixConfig {
    /// Matrix columns. When either dimension is missing the driver's
    /// declared size is used.
    pub cols: Option<usize>,
    pub rows: Option<usize>,
    /// Frames per second for automatic redraws. `None` means the
    /// application triggers every redraw itself.
    pub target_fps: Option<f64>,
    /// Brightness applied when the manager is built. `None` keeps the
    /// driver's own setting.
    pub brightness: Option<u32>,
}

impl MatrixConfig {
    pub fn size(&self) -> Option<Size> {
        Some(Size::new(self.cols?, self.rows?))
    }
}

// --- Scheduler Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Sleep between checks for the next due frame. Shorter is more
    /// punctual, longer burns less CPU.
    pub poll_interval_ms: u64,
}

impl SchedulerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            poll_interval_ms: 5,
        }
    }
}

// --- Output Configuration ---

/// Display drivers the demo binary knows how to build.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// ANSI colors on stdout.
    #[default]
    Console,
    /// Packed pixels written to `device`.
    Strip,
    /// In-memory only.
    Headless,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub driver: DriverKind,
    /// Channel order for packed-integer drivers.
    pub layout: PixelLayout,
    /// Device node or file the strip driver writes to.
    pub device: Option<PathBuf>,
}
