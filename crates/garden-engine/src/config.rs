//! Runner configuration.
//!
//! Provides run length, reporting and definition settings plus the full
//! garden configuration. Configuration can be loaded from and saved to a
//! TOML file.

use garden_sim::GardenConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "garden.toml";

/// Runner configuration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ticks to simulate (0 = run until interrupted)
    pub ticks: u64,
    /// Ticks between summary log lines
    pub report_interval: u64,
    /// Directory of `*.json` plant definitions
    pub definitions_dir: PathBuf,
    /// Register the built-in species when no definition loads
    pub builtin_fallback: bool,
    /// Garden settings
    pub garden: GardenConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ticks: 12_000,
            report_interval: 600,
            definitions_dir: PathBuf::from("definitions"),
            builtin_fallback: true,
            garden: GardenConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read config file: {e}");
                return Self::default();
            },
        };

        match toml::from_str(&contents) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to parse config file: {e}");
                Self::default()
            },
        }
    }

    /// Load configuration, writing a default file first if none exists.
    ///
    /// A failed write is logged and the defaults are still returned.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if path.exists() {
            return Self::load_from(path);
        }

        let config = Self::default();
        if let Err(e) = config.save_to(path) {
            warn!("Failed to write default config to {}: {e}", path.display());
        }
        config
    }

    /// Write this configuration as TOML, creating parent directories.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)?;

        info!("Wrote config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.report_interval = self.report_interval.max(1);
        self.garden.validate();
    }
}
