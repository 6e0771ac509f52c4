/// Error types for the plotview core library
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by configuration and attribute parsing.
///
/// Geometric operations never fail: degenerate input degrades to a no-op
/// instead of producing one of these.
#[derive(Debug, Error)]
pub enum ViewError {
    /// A color string was not `#rrggbb` or `#rrggbbaa`
    #[error("invalid color '{0}', expected #rrggbb or #rrggbbaa")]
    InvalidColor(String),
    /// The viewer configuration could not be parsed
    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),
    /// A configuration file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ViewError>;
