//! Error types for the reporting pipeline.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Invalid report parameter: {0}")]
    InvalidParams(String),

    #[error("Document write failed for {path}: {reason}")]
    DocumentWrite { path: PathBuf, reason: String },
}

impl DeskError {
    /// IO failure while reading `path`
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DeskError::Read {
            path: path.into(),
            source,
        }
    }

    /// IO failure while writing `path`
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DeskError::Write {
            path: path.into(),
            source,
        }
    }

    /// Whether the failure came from configuration rather than data or output
    pub fn is_config(&self) -> bool {
        matches!(self, DeskError::Config(_))
    }

    /// Whether the failure came from writing an output file
    pub fn is_output(&self) -> bool {
        matches!(self, DeskError::Write { .. } | DeskError::DocumentWrite { .. })
    }
}

pub type Result<T> = std::result::Result<T, DeskError>;
