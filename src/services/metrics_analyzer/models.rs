//! Query metrics data models
//!
//! Canonical row layout shared by both export schemas, the static metric table,
//! and the small enums used to select input format and sort order.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Source Formats
// ============================================================================

/// Positional column names of the aggregated `query_metrics` export
pub const QUERY_METRICS_COLUMNS: [&str; 28] = [
    "Count",
    "IntervalEnd",
    "MaxCPUTime",
    "MaxDeleteRows",
    "MaxDuration",
    "MaxReadBytes",
    "MaxReadRows",
    "MaxRequestUnits",
    "MaxUpdateBytes",
    "MaxUpdateRows",
    "MinCPUTime",
    "MinDeleteRows",
    "MinDuration",
    "MinReadBytes",
    "MinReadRows",
    "MinRequestUnits",
    "MinUpdateBytes",
    "MinUpdateRows",
    "QueryText",
    "Rank",
    "SumCPUTime",
    "SumDeleteRows",
    "SumDuration",
    "SumReadBytes",
    "SumReadRows",
    "SumRequestUnits",
    "SumUpdateBytes",
    "SumUpdateRows",
];

/// Positional column names of the per-execution `top_queries` export
pub const TOP_QUERIES_COLUMNS: [&str; 29] = [
    "CPUTime",
    "CompileCPUTime",
    "CompileDuration",
    "ComputeNodesCount",
    "DeleteBytes",
    "DeleteRows",
    "Duration",
    "EndTime",
    "FromQueryCache",
    "IntervalEnd",
    "MaxComputeCPUTime",
    "MaxShardCPUTime",
    "MinComputeCPUTime",
    "MinShardCPUTime",
    "ParametersSize",
    "Partitions",
    "ProcessCPUTime",
    "QueryText",
    "Rank",
    "ReadBytes",
    "ReadRows",
    "RequestUnits",
    "ShardCount",
    "SumComputeCPUTime",
    "SumShardCPUTime",
    "Type",
    "UpdateBytes",
    "UpdateRows",
    "UserSID",
];

/// Input export layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum SourceFormat {
    /// Aggregated rows: one row per query per interval with Min/Max/Sum columns
    QueryMetrics,
    /// Per-event rows: one row per query execution
    TopQueries,
}

impl SourceFormat {
    /// Column names assigned to a headerless table of this format
    pub fn positional_columns(self) -> &'static [&'static str] {
        match self {
            Self::QueryMetrics => &QUERY_METRICS_COLUMNS,
            Self::TopQueries => &TOP_QUERIES_COLUMNS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::QueryMetrics => "query_metrics",
            Self::TopQueries => "top_queries",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Metric Table
// ============================================================================

/// Divisor turning the exports' raw time units into seconds
pub const TIME_SCALE: f64 = 1_000_000.0;

/// The six metrics tracked per query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Duration,
    CpuTime,
    ReadRows,
    ReadBytes,
    UpdateRows,
    UpdateBytes,
}

impl MetricKind {
    pub const COUNT: usize = 6;

    /// All metrics in report order
    pub const ALL: [MetricKind; Self::COUNT] = [
        Self::Duration,
        Self::CpuTime,
        Self::ReadRows,
        Self::ReadBytes,
        Self::UpdateRows,
        Self::UpdateBytes,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Column carrying the raw per-event value in the `top_queries` format
    pub fn event_column(self) -> &'static str {
        match self {
            Self::Duration => "Duration",
            Self::CpuTime => "CPUTime",
            Self::ReadRows => "ReadRows",
            Self::ReadBytes => "ReadBytes",
            Self::UpdateRows => "UpdateRows",
            Self::UpdateBytes => "UpdateBytes",
        }
    }

    pub fn min_column(self) -> &'static str {
        match self {
            Self::Duration => "MinDuration",
            Self::CpuTime => "MinCPUTime",
            Self::ReadRows => "MinReadRows",
            Self::ReadBytes => "MinReadBytes",
            Self::UpdateRows => "MinUpdateRows",
            Self::UpdateBytes => "MinUpdateBytes",
        }
    }

    pub fn max_column(self) -> &'static str {
        match self {
            Self::Duration => "MaxDuration",
            Self::CpuTime => "MaxCPUTime",
            Self::ReadRows => "MaxReadRows",
            Self::ReadBytes => "MaxReadBytes",
            Self::UpdateRows => "MaxUpdateRows",
            Self::UpdateBytes => "MaxUpdateBytes",
        }
    }

    pub fn sum_column(self) -> &'static str {
        match self {
            Self::Duration => "SumDuration",
            Self::CpuTime => "SumCPUTime",
            Self::ReadRows => "SumReadRows",
            Self::ReadBytes => "SumReadBytes",
            Self::UpdateRows => "SumUpdateRows",
            Self::UpdateBytes => "SumUpdateBytes",
        }
    }

    /// Divisor applied when reading min/max/avg
    pub fn scale(self) -> f64 {
        match self {
            Self::Duration | Self::CpuTime => TIME_SCALE,
            _ => 1.0,
        }
    }

    /// Label used in the statistics table
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Duration => "Duration (s)",
            Self::CpuTime => "CPUTime (s)",
            Self::ReadRows => "ReadRows",
            Self::ReadBytes => "ReadBytes",
            Self::UpdateRows => "UpdateRows",
            Self::UpdateBytes => "UpdateBytes",
        }
    }

    /// Time metrics are printed with fixed decimals, the rest with unit suffixes
    pub fn is_time(self) -> bool {
        matches!(self, Self::Duration | Self::CpuTime)
    }
}

// ============================================================================
// Canonical Row
// ============================================================================

/// Min/Max/Sum triple for one metric of one row
///
/// `None` means the source table had no such column.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricSample {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub sum: Option<f64>,
}

impl MetricSample {
    /// A single observation: min = max = sum = value
    pub fn single(value: f64) -> Self {
        Self { min: Some(value), max: Some(value), sum: Some(value) }
    }
}

/// One row of the normalized schema
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRow {
    pub query_text: String,
    /// Weight of the row (number of executions it stands for)
    pub count: f64,
    pub interval_end: Option<String>,
    pub rank: i64,
    samples: [MetricSample; MetricKind::COUNT],
}

impl Default for CanonicalRow {
    fn default() -> Self {
        Self {
            query_text: String::new(),
            count: 1.0,
            interval_end: None,
            rank: 0,
            samples: [MetricSample::default(); MetricKind::COUNT],
        }
    }
}

impl CanonicalRow {
    pub fn new(query_text: impl Into<String>) -> Self {
        Self { query_text: query_text.into(), ..Default::default() }
    }

    pub fn sample(&self, kind: MetricKind) -> &MetricSample {
        &self.samples[kind.index()]
    }

    pub fn set_sample(&mut self, kind: MetricKind, sample: MetricSample) {
        self.samples[kind.index()] = sample;
    }

    /// Builder-style variant of [`set_sample`](Self::set_sample)
    pub fn with_sample(mut self, kind: MetricKind, sample: MetricSample) -> Self {
        self.set_sample(kind, sample);
        self
    }

    pub fn with_count(mut self, count: f64) -> Self {
        self.count = count;
        self
    }
}

// ============================================================================
// Sort Metric
// ============================================================================

/// Metric used to order the report (always descending)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum SortMetric {
    #[default]
    #[value(name = "MaxDuration")]
    MaxDuration,
    #[value(name = "AvgDuration")]
    AvgDuration,
    #[serde(rename = "MaxCPUTime")]
    #[value(name = "MaxCPUTime")]
    MaxCpuTime,
    #[serde(rename = "AvgCPUTime")]
    #[value(name = "AvgCPUTime")]
    AvgCpuTime,
}

impl SortMetric {
    pub fn name(self) -> &'static str {
        match self {
            Self::MaxDuration => "MaxDuration",
            Self::AvgDuration => "AvgDuration",
            Self::MaxCpuTime => "MaxCPUTime",
            Self::AvgCpuTime => "AvgCPUTime",
        }
    }

    /// Parse a metric name, falling back to `MaxDuration` for anything unknown
    pub fn parse_lenient(name: &str) -> Self {
        match name.trim() {
            "AvgDuration" => Self::AvgDuration,
            "MaxCPUTime" => Self::MaxCpuTime,
            "AvgCPUTime" => Self::AvgCpuTime,
            _ => Self::MaxDuration,
        }
    }
}

impl fmt::Display for SortMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
