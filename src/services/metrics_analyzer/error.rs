//! Pipeline error types

use crate::services::metrics_analyzer::loader::LoadError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a run produced nothing to report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// No rows could be loaded from any input file
    NoData,
    /// Rows were loaded but none survived filtering and aggregation
    NoMatches,
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData => f.write_str("no data loaded from input files"),
            Self::NoMatches => f.write_str("no queries match the filters"),
        }
    }
}

/// Errors raised by the analysis pipeline
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Failed to load {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: LoadError,
    },

    #[error("Invalid regex pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Output path {path} already exists and is not empty (use --overwrite)")]
    OutputConflict { path: PathBuf },

    #[error("Nothing to report: {0}")]
    EmptyResult(EmptyReason),

    #[error("Failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No input files to process")]
    NoInputFiles,
}

impl AnalyzerError {
    pub fn load(path: impl Into<PathBuf>, source: LoadError) -> Self {
        Self::Load { path: path.into(), source }
    }

    pub fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Output { path: path.into(), source }
    }
}

/// Result type alias for analyzer operations
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;
