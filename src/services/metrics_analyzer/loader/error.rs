//! Loader error types for TSV exports

use thiserror::Error;

/// Errors that can occur while loading one export file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode file as {encoding}: {reason}")]
    Decode { encoding: &'static str, reason: String },

    #[error("Malformed TSV data: {0}")]
    Table(#[from] csv::Error),

    #[error("Unable to detect file format: {0}")]
    FormatDetection(String),
}

impl LoadError {
    pub fn is_format_detection(&self) -> bool {
        matches!(self, Self::FormatDetection(_))
    }
}

/// Result type alias for loader operations
pub type LoadResult<T> = Result<T, LoadError>;
