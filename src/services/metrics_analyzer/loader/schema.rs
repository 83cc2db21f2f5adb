//! Schema detection and normalization
//!
//! Maps both export layouts onto [`CanonicalRow`]:
//! - `query_metrics` rows already carry Min/Max/Sum columns and pass through by name.
//! - `top_queries` rows describe a single execution, so each raw value becomes
//!   Min = Max = Sum and the row weight is 1.

use crate::services::metrics_analyzer::loader::error::{LoadError, LoadResult};
use crate::services::metrics_analyzer::loader::table_reader::RawTable;
use crate::services::metrics_analyzer::models::{
    CanonicalRow, MetricKind, MetricSample, QUERY_METRICS_COLUMNS, SourceFormat,
    TOP_QUERIES_COLUMNS,
};
use crate::utils::StringExt;
use std::collections::HashMap;

/// Field names whose presence in the first row marks it as a header row
pub const HEADER_MARKERS: [&str; 4] = ["QueryText", "MaxDuration", "Duration", "IntervalEnd"];

/// Column name -> position lookup for one table
struct ColumnIndex<'a> {
    positions: HashMap<&'a str, usize>,
}

impl<'a> ColumnIndex<'a> {
    fn new<S: AsRef<str>>(names: &'a [S]) -> Self {
        let mut positions = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            // First occurrence wins for duplicated labels
            positions.entry(name.as_ref()).or_insert(i);
        }
        Self { positions }
    }

    /// Cell value; `None` when the column does not exist, `Some("")` when the row is short
    fn cell<'r>(&self, row: &'r [String], name: &str) -> Option<&'r str> {
        self.positions
            .get(name)
            .map(|&i| row.get(i).map(String::as_str).unwrap_or(""))
    }
}

/// Schema normalizer for query metrics exports
pub struct SchemaNormalizer;

impl SchemaNormalizer {
    /// Detect the export format of a table
    ///
    /// Marker fields are looked up in the column labels (when present) and then
    /// in the first row; a headerless table falls back to its column count.
    pub fn detect_format(table: &RawTable) -> LoadResult<SourceFormat> {
        if let Some(headers) = &table.headers {
            let labels: Vec<&str> = headers.iter().map(|h| h.trim()).collect();
            if let Some(format) = Self::format_from_markers(&labels) {
                return Ok(format);
            }
        }

        if let Some(format) = Self::format_from_markers(&table.first_row_values()) {
            return Ok(format);
        }

        match table.column_count() {
            n if n == TOP_QUERIES_COLUMNS.len() => Ok(SourceFormat::TopQueries),
            n if n == QUERY_METRICS_COLUMNS.len() => Ok(SourceFormat::QueryMetrics),
            n => Err(LoadError::FormatDetection(format!(
                "no marker columns found and {} columns match neither layout",
                n
            ))),
        }
    }

    fn format_from_markers(values: &[&str]) -> Option<SourceFormat> {
        let has = |name: &str| values.contains(&name);

        if has("MinDuration") && has("MaxDuration") {
            Some(SourceFormat::QueryMetrics)
        } else if has("CPUTime") && has("Duration") {
            Some(SourceFormat::TopQueries)
        } else {
            None
        }
    }

    /// Whether the table carries a header row
    pub fn has_headers(table: &RawTable) -> bool {
        if let Some(headers) = &table.headers
            && headers.iter().any(|h| HEADER_MARKERS.contains(&h.trim()))
        {
            return true;
        }

        table
            .first_row_values()
            .iter()
            .any(|value| HEADER_MARKERS.contains(value))
    }

    /// Normalize a raw table into canonical rows
    ///
    /// With `format_hint` set, detection is skipped; the table must still have
    /// more than one column.
    pub fn normalize(
        table: RawTable,
        format_hint: Option<SourceFormat>,
    ) -> LoadResult<Vec<CanonicalRow>> {
        let format = match format_hint {
            Some(format) => {
                // Both layouts are tab separated, a single column means a wrong decode
                if !table.rows.is_empty() && table.column_count() < 2 {
                    return Err(LoadError::FormatDetection(format!(
                        "expected a tab-separated {} table, found a single column",
                        format
                    )));
                }
                format
            },
            None => Self::detect_format(&table)?,
        };

        let table = if Self::has_headers(&table) {
            table.promote_header_row()
        } else {
            let names = format.positional_columns().iter().map(|s| s.to_string()).collect();
            RawTable::with_headers(names, table.rows)
        };
        tracing::debug!(
            "Normalizing {} rows as {} ({} columns)",
            table.rows.len(),
            format,
            table.column_count()
        );

        let headers = table.headers.unwrap_or_default();
        let columns = ColumnIndex::new(&headers);

        let rows = match format {
            SourceFormat::QueryMetrics => Self::from_query_metrics(&columns, &table.rows),
            SourceFormat::TopQueries => Self::from_top_queries(&columns, &table.rows),
        };
        Ok(rows)
    }

    /// Aggregated rows: Min/Max/Sum columns are taken by name
    fn from_query_metrics(columns: &ColumnIndex<'_>, rows: &[Vec<String>]) -> Vec<CanonicalRow> {
        rows.iter()
            .map(|row| {
                let mut canonical = Self::common_fields(columns, row);
                canonical.count = columns
                    .cell(row, "Count")
                    .and_then(parse_number)
                    .unwrap_or(1.0);

                for kind in MetricKind::ALL {
                    let sample = MetricSample {
                        min: columns.cell(row, kind.min_column()).map(coerce_number),
                        max: columns.cell(row, kind.max_column()).map(coerce_number),
                        sum: columns.cell(row, kind.sum_column()).map(coerce_number),
                    };
                    canonical.set_sample(kind, sample);
                }
                canonical
            })
            .collect()
    }

    /// Per-execution rows: one raw value per metric, weight 1
    fn from_top_queries(columns: &ColumnIndex<'_>, rows: &[Vec<String>]) -> Vec<CanonicalRow> {
        // A header row repeated inside the data (e.g. concatenated exports)
        let skip = rows
            .first()
            .and_then(|row| columns.cell(row, "CPUTime"))
            .is_some_and(|cell| cell == "CPUTime");

        rows.iter()
            .skip(usize::from(skip))
            .map(|row| {
                let mut canonical = Self::common_fields(columns, row);
                canonical.count = 1.0;

                for kind in MetricKind::ALL {
                    let value = columns.cell(row, kind.event_column()).map(coerce_number);
                    canonical.set_sample(kind, MetricSample::single(value.unwrap_or(0.0)));
                }
                canonical
            })
            .collect()
    }

    fn common_fields(columns: &ColumnIndex<'_>, row: &[String]) -> CanonicalRow {
        let mut canonical = CanonicalRow::new(columns.cell(row, "QueryText").unwrap_or(""));
        canonical.interval_end = columns.cell(row, "IntervalEnd").and_then(|v| v.clean());
        canonical.rank = columns.cell(row, "Rank").map(coerce_number).unwrap_or(0.0) as i64;
        canonical
    }
}

/// Parse a numeric cell; empty, unparseable and NaN cells yield `None`
pub fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Parse a numeric cell, treating anything unparseable as 0
pub fn coerce_number(cell: &str) -> f64 {
    parse_number(cell).unwrap_or(0.0)
}
