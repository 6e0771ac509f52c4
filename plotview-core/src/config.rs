/// Viewer configuration with TOML support
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewError};

/// Top-level configuration of the view engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Physical display geometry.
    pub display: DisplayConfig,
}

impl ViewerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ViewError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

/// How device pixels relate to physical millimeters and to the world axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Device pixels per millimeter along X and Y. Non-positive values are
    /// treated as 1.
    pub pixels_per_mm: [f64; 2],
    /// Device X grows to the left.
    pub flip_x: bool,
    /// Device Y grows downwards (the usual window convention).
    pub flip_y: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            pixels_per_mm: [1.0, 1.0],
            flip_x: false,
            flip_y: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = ViewerConfig::from_toml_str("[display]\nflip_y = false\n").unwrap();
        assert!(!config.display.flip_y);
        assert_eq!(config.display.pixels_per_mm, [1.0, 1.0]);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = ViewerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = ViewerConfig::default();
        config.display.pixels_per_mm = [3.5, 3.25];
        config.display.flip_x = true;

        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(ViewerConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let err = ViewerConfig::from_toml_str("[display]\npixels_per_mm = \"wide\"\n");
        assert!(matches!(err, Err(ViewError::Config(_))));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = ViewerConfig::load(Path::new("/nonexistent/plotview.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/plotview.toml"));
    }
}
