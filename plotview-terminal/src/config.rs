/// Terminal host configuration: display density, gesture steps and logging
use std::path::{Path, PathBuf};

use plotview_core::{DisplayConfig, Result, ViewError, ViewerConfig};
use serde::{Deserialize, Serialize};

/// Terminal cells per millimeter. Cells are about twice as tall as they
/// are wide, so the vertical density is half the horizontal one.
pub const CELLS_PER_MM: [f64; 2] = [0.5, 0.25];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Keys missing from a `[display]` section take the core defaults (one
    /// cell per millimeter), not [`CELLS_PER_MM`].
    #[serde(default = "cell_display")]
    pub display: DisplayConfig,
    pub controls: ControlsConfig,
    pub log: LogConfig,
}

fn cell_display() -> DisplayConfig {
    DisplayConfig {
        pixels_per_mm: CELLS_PER_MM,
        ..DisplayConfig::default()
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            display: cell_display(),
            controls: ControlsConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl TerminalConfig {
    /// The part of the configuration the view engine consumes.
    pub fn viewer(&self) -> ViewerConfig {
        ViewerConfig {
            display: self.display.clone(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ViewError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

/// Step sizes of keyboard and wheel gestures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Scale applied per wheel notch or `+`/`-` press.
    pub zoom_factor: f64,
    /// Cells panned per arrow key press.
    pub pan_step: i32,
    /// Radians turned per rotate key press.
    pub rotate_step: f64,
    /// Target frame rate.
    pub fps: u32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            zoom_factor: 1.25,
            pan_step: 4,
            rotate_step: 0.1,
            fps: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is not set.
    pub level: String,
    /// Log destination. Without one, logs go to stderr, which the
    /// alternate screen hides while the viewer runs.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_cell_density() {
        let config = TerminalConfig::from_toml_str("").unwrap();
        assert_eq!(config.display.pixels_per_mm, CELLS_PER_MM);
        assert_eq!(config.controls.fps, 30);
        assert_eq!(config.log.file, None);
    }

    #[test]
    fn test_sections_are_independent() {
        let config = TerminalConfig::from_toml_str(
            r#"
            [display]
            pixels_per_mm = [1.0, 0.5]
            flip_y = true

            [controls]
            zoom_factor = 2.0

            [log]
            level = "debug"
            file = "/tmp/plotview.log"
            "#,
        )
        .unwrap();

        assert_eq!(config.display.pixels_per_mm, [1.0, 0.5]);
        assert_eq!(config.controls.zoom_factor, 2.0);
        assert_eq!(config.controls.pan_step, 4);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.file, Some(PathBuf::from("/tmp/plotview.log")));
    }

    #[test]
    fn test_bad_value_is_config_error() {
        let err = TerminalConfig::from_toml_str("[controls]\nfps = \"fast\"\n");
        assert!(matches!(err, Err(ViewError::Config(_))));
    }
}
