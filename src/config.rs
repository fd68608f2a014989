//! Configuration management for papermap.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)
//!
//! The figure itself (panels, palettes, decorations) is described by a
//! separate job file consumed by [`crate::compose`]; this module covers
//! the ambient settings that apply to every run.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{PapermapError, Result};
use crate::projection::AlbersParams;

/// Command-line arguments for papermap
#[derive(Parser, Debug)]
#[command(name = "papermap")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the JSON job file describing the figure
    pub job_file: PathBuf,

    /// Output path (extension selects the format: png, jpg, svg)
    #[arg(short, long, env = "PAPERMAP_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Raster resolution in dots per inch
    #[arg(short, long, env = "PAPERMAP_DPI")]
    pub dpi: Option<u32>,

    /// Path to a TrueType font for labels and titles
    #[arg(short, long, env = "PAPERMAP_FONT")]
    pub font: Option<PathBuf>,

    /// Path to the persisted decoration offsets file
    #[arg(long, env = "PAPERMAP_OFFSETS")]
    pub offsets: Option<PathBuf>,

    /// Path to JSON configuration file
    #[arg(short, long, env = "PAPERMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "PAPERMAP_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Raster resolution in dots per inch
    #[serde(default = "default_dpi")]
    pub dpi: u32,

    /// Path to a TrueType font; text is skipped when absent
    #[serde(default)]
    pub font_path: Option<PathBuf>,

    /// JPEG quality used when exporting .jpg output
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Rendering configuration
    #[serde(default)]
    pub render: RenderConfig,

    /// Target projection parameters (Albers equal-area conic)
    #[serde(default)]
    pub projection: AlbersParams,

    /// Decoration offsets file (absent = all offsets zero)
    #[serde(default)]
    pub offsets_path: Option<PathBuf>,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<(Self, PathBuf, Option<PathBuf>)> {
        let args = Args::parse();

        // Start with defaults
        let mut config = Config::default();

        // Load from JSON file if provided
        if let Some(config_path) = &args.config {
            let json_config = Self::load_from_file(config_path)?;
            config.merge(json_config);
        }

        // Override with command-line arguments
        if let Some(dpi) = args.dpi {
            config.render.dpi = dpi;
        }
        if args.font.is_some() {
            config.render.font_path = args.font;
        }
        if args.offsets.is_some() {
            config.offsets_path = args.offsets;
        }
        config.log_level = args.log_level;

        Ok((config, args.job_file, args.output))
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        self.render.dpi = other.render.dpi;
        if other.render.font_path.is_some() {
            self.render.font_path = other.render.font_path;
        }
        self.render.jpeg_quality = other.render.jpeg_quality;
        self.projection = other.projection;
        if other.offsets_path.is_some() {
            self.offsets_path = other.offsets_path;
        }
        self.log_level = other.log_level;
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(30..=1200).contains(&self.render.dpi) {
            return Err(PapermapError::Config {
                message: format!(
                    "Invalid dpi: {}. Must be between 30 and 1200",
                    self.render.dpi
                ),
            });
        }

        if !(1..=100).contains(&self.render.jpeg_quality) {
            return Err(PapermapError::Config {
                message: format!(
                    "Invalid jpeg_quality: {}. Must be between 1 and 100",
                    self.render.jpeg_quality
                ),
            });
        }

        // Validate log level
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(PapermapError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        // A degenerate cone constant breaks the projection
        if (self.projection.lat_1 + self.projection.lat_2).abs() < 1e-9 {
            return Err(PapermapError::Config {
                message: format!(
                    "Invalid standard parallels: {} and {} cancel out",
                    self.projection.lat_1, self.projection.lat_2
                ),
            });
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            projection: AlbersParams::default(),
            offsets_path: None,
            log_level: default_log_level(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dpi: default_dpi(),
            font_path: None,
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

// Default value functions for serde
fn default_dpi() -> u32 {
    300
}

fn default_jpeg_quality() -> u8 {
    92
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.render.dpi, 300);
        assert_eq!(config.render.jpeg_quality, 92);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.projection.lon_0, 105.0);
    }

    #[test]
    fn test_config_merge() {
        let mut config1 = Config::default();
        let mut config2 = Config::default();

        config2.render.dpi = 150;
        config2.render.font_path = Some(PathBuf::from("/fonts/dejavu.ttf"));

        config1.merge(config2);

        assert_eq!(config1.render.dpi, 150);
        assert_eq!(
            config1.render.font_path,
            Some(PathBuf::from("/fonts/dejavu.ttf"))
        );
    }

    #[test]
    fn test_config_validation() {
        // Valid config should pass
        let config = Config::default();
        assert!(config.validate().is_ok());

        // Test invalid dpi
        let mut config = Config::default();
        config.render.dpi = 10;
        assert!(config.validate().is_err());

        // Test invalid log level
        let mut config = Config::default();
        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());

        // Test degenerate standard parallels
        let mut config = Config::default();
        config.projection.lat_1 = 30.0;
        config.projection.lat_2 = -30.0;
        assert!(config.validate().is_err());
    }
}
