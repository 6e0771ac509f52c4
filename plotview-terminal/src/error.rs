/// Error types for the terminal host
use std::io;
use std::path::PathBuf;

use plotview_core::ViewError;
use thiserror::Error;

use crate::stl::StlError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Stl(#[from] StlError),

    #[error(transparent)]
    View(#[from] ViewError),

    #[error("cannot open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0}\nusage: plotview-terminal [--config FILE] [MODEL.stl]")]
    Usage(String),
}
