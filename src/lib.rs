//! YDB Query Metrics Library
//!
//! Core modules of the `ydb-query-metrics` tool: configuration, the metrics
//! analyzer service and small shared utilities.

pub mod config;
pub mod services;
pub mod utils;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use config::Config;
pub use services::metrics_analyzer::{AnalysisRequest, AnalyzerError, RunSummary, run_analysis};
