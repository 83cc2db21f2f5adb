//! YDB Query Metrics Analyzer
//!
//! Aggregates per-query execution statistics from YDB query log exports and
//! renders every distinct query as annotated SQL.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                          run_analysis()                           │
//! │                                                                   │
//! │  patterns ──► input ──► loader ──► filter ──► aggregator          │
//! │               (glob)     │          (AND)       │                 │
//! │                          │                      ▼                 │
//! │            ┌─────────────┴──────┐      AggregationResult          │
//! │            │ encoding           │       (QueryStatistics)         │
//! │            │ table_reader (TSV) │               │                 │
//! │            │ schema             │               ▼                 │
//! │            └────────────────────┘  sorted_by ──► report ──► output │
//! │                                                (renderer)  (sinks)│
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use ydb_query_metrics::services::metrics_analyzer::{AnalysisRequest, run_analysis};
//!
//! let request = AnalysisRequest::new(vec!["exports/*.tsv".to_string()]);
//! let summary = run_analysis(&request)?;
//! println!("{} unique queries", summary.unique_queries);
//! ```

pub mod aggregator;
pub mod error;
pub mod filter;
pub mod input;
pub mod loader;
pub mod models;
pub mod output;
pub mod report;
pub mod statistics;

#[cfg(test)]
mod tests;

pub use aggregator::{AggregationResult, aggregate};
pub use error::{AnalyzerError, AnalyzerResult, EmptyReason};
pub use filter::{FilterPredicate, QueryFilter};
pub use models::*;
pub use output::{OutputMode, OutputOptions};
pub use report::ReportRenderer;
pub use statistics::{MetricAccumulator, QueryStatistics};

use std::path::{Path, PathBuf};

/// Everything one analysis run needs
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    /// File paths or glob patterns
    pub inputs: Vec<String>,
    pub like: Vec<String>,
    pub not_like: Vec<String>,
    pub regex: Vec<String>,
    /// Skip format detection and treat every file as this layout
    pub format_hint: Option<SourceFormat>,
    pub sort_by: SortMetric,
    pub keep_query_format: bool,
    pub output: OutputMode,
    pub output_options: OutputOptions,
}

impl AnalysisRequest {
    pub fn new(inputs: Vec<String>) -> Self {
        Self { inputs, ..Default::default() }
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub files_total: usize,
    pub files_skipped: usize,
    pub rows_loaded: usize,
    pub unique_queries: usize,
    /// Directory or file written, `None` for console output
    pub written_to: Option<PathBuf>,
}

/// Rows loaded from a set of files
#[derive(Debug, Default)]
pub struct LoadedInputs {
    pub rows: Vec<CanonicalRow>,
    pub files_skipped: usize,
}

/// Run the whole pipeline for one request
///
/// The filter is compiled before any file is read, so an invalid regex aborts
/// the run without side effects. Files that fail to load are logged and skipped.
pub fn run_analysis(request: &AnalysisRequest) -> AnalyzerResult<RunSummary> {
    let filter = QueryFilter::from_patterns(&request.like, &request.not_like, &request.regex)?;
    let files = input::expand_input_patterns(&request.inputs)?;

    let loaded = load_inputs(&files, request.format_hint);
    if loaded.rows.is_empty() {
        return Err(AnalyzerError::EmptyResult(EmptyReason::NoData));
    }
    let rows_loaded = loaded.rows.len();

    let result = analyze_rows(loaded.rows, &filter);
    if result.is_empty() {
        return Err(AnalyzerError::EmptyResult(EmptyReason::NoMatches));
    }

    tracing::info!("Processed {} rows from {} files.", rows_loaded, files.len());
    tracing::info!("Found {} unique queries after filtering.", result.len());

    let entries = result.sorted_by(request.sort_by);
    let renderer = ReportRenderer::new(request.sort_by, request.keep_query_format);
    let written_to = request.output.write(&entries, &renderer, &request.output_options)?;

    if let Some(path) = &written_to {
        match request.output {
            OutputMode::MultipleFiles { .. } => {
                tracing::info!("SQL files written to {}/", path.display())
            },
            _ => tracing::info!("SQL written to {}", path.display()),
        }
    }

    Ok(RunSummary {
        files_total: files.len(),
        files_skipped: loaded.files_skipped,
        rows_loaded,
        unique_queries: result.len(),
        written_to,
    })
}

/// Load every file, skipping the ones that fail
pub fn load_inputs(files: &[PathBuf], format_hint: Option<SourceFormat>) -> LoadedInputs {
    let mut loaded = LoadedInputs::default();

    for path in files {
        match load_one(path, format_hint) {
            Ok(rows) => {
                tracing::debug!("Loaded {} rows from {}", rows.len(), path.display());
                loaded.rows.extend(rows);
            },
            Err(e) => {
                tracing::warn!("Error processing file: {}", e);
                loaded.files_skipped += 1;
            },
        }
    }
    loaded
}

fn load_one(path: &Path, format_hint: Option<SourceFormat>) -> AnalyzerResult<Vec<CanonicalRow>> {
    loader::load_file(path, format_hint).map_err(|e| AnalyzerError::load(path, e))
}

/// Filter rows and aggregate the survivors by query text
pub fn analyze_rows(rows: Vec<CanonicalRow>, filter: &QueryFilter) -> AggregationResult {
    let kept = filter.apply(rows);
    tracing::debug!("{} rows left after filtering", kept.len());
    aggregate(&kept)
}
