// Common test utilities and helpers

use crate::services::metrics_analyzer::{
    AnalysisRequest, QUERY_METRICS_COLUMNS, QueryStatistics, ReportRenderer, SortMetric,
};
use std::fs;
use std::path::{Path, PathBuf};

/// One aggregated export row; every column not listed here is written as 0
pub struct MetricsRow {
    pub query: &'static str,
    pub count: u32,
    /// Min, Max, Sum duration in raw export units
    pub duration: (u64, u64, u64),
}

pub const ALPHA: &str = "SELECT * FROM table_alpha WHERE id = 123";
pub const BETA: &str = "SELECT name, value FROM table_beta WHERE status = \"active\"";
pub const GAMMA: &str = "SELECT COUNT(*) FROM table_gamma GROUP BY category";

/// The three reference queries; gamma has the largest MaxDuration
pub fn reference_rows() -> Vec<MetricsRow> {
    vec![
        MetricsRow { query: ALPHA, count: 1, duration: (100_000, 500_000, 1_000_000) },
        MetricsRow { query: BETA, count: 2, duration: (200_000, 600_000, 2_000_000) },
        MetricsRow { query: GAMMA, count: 3, duration: (300_000, 700_000, 3_000_000) },
    ]
}

/// Render rows as a `query_metrics` export with a header line
pub fn query_metrics_tsv(rows: &[MetricsRow]) -> String {
    let mut out = QUERY_METRICS_COLUMNS.join("\t");
    out.push('\n');

    for row in rows {
        let cells: Vec<String> = QUERY_METRICS_COLUMNS
            .iter()
            .map(|column| match *column {
                "Count" => row.count.to_string(),
                "QueryText" => row.query.to_string(),
                "MinDuration" => row.duration.0.to_string(),
                "MaxDuration" => row.duration.1.to_string(),
                "SumDuration" => row.duration.2.to_string(),
                _ => "0".to_string(),
            })
            .collect();
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
    out
}

/// Write `content` to `dir/name`, returning the full path
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Request reading every `.tsv` file in `dir`
pub fn request_for_dir(dir: &Path) -> AnalysisRequest {
    AnalysisRequest {
        keep_query_format: true,
        ..AnalysisRequest::new(vec![format!("{}/*.tsv", dir.display())])
    }
}

/// Sorted file names in a directory
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to read directory")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

pub fn plain_renderer() -> ReportRenderer {
    ReportRenderer::new(SortMetric::MaxDuration, true)
}

/// Statistics fed with a single row of the given max duration
pub fn stats_with_max_duration(max: f64) -> QueryStatistics {
    use crate::services::metrics_analyzer::{CanonicalRow, MetricKind, MetricSample};

    let row = CanonicalRow::new("q").with_sample(MetricKind::Duration, MetricSample::single(max));
    let mut stats = QueryStatistics::new();
    stats.update_from_row(&row);
    stats
}
