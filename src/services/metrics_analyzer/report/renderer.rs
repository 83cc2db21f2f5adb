//! Annotated SQL rendering
//!
//! Each query is rendered as a `/* ... */` statistics table followed by the
//! query text, optionally prefixed with a `-- Query #n` header.

use crate::services::metrics_analyzer::models::SortMetric;
use crate::services::metrics_analyzer::report::number_format::format_number_with_suffix;
use crate::services::metrics_analyzer::report::sql_formatter::{
    PassthroughFormatter, PrettySqlFormatter, SqlFormatter,
};
use crate::services::metrics_analyzer::statistics::QueryStatistics;

const CELL_WIDTH: usize = 15;

/// Renders one query and its statistics
pub struct ReportRenderer {
    sort_metric: SortMetric,
    formatter: Box<dyn SqlFormatter>,
}

impl ReportRenderer {
    /// `keep_query_format` disables SQL pretty-printing
    pub fn new(sort_metric: SortMetric, keep_query_format: bool) -> Self {
        let formatter: Box<dyn SqlFormatter> = if keep_query_format {
            Box::new(PassthroughFormatter)
        } else {
            Box::new(PrettySqlFormatter::new())
        };
        Self { sort_metric, formatter }
    }

    pub fn with_formatter(sort_metric: SortMetric, formatter: Box<dyn SqlFormatter>) -> Self {
        Self { sort_metric, formatter }
    }

    /// Render a block; `position` (1-based) adds the `-- Query #n` header
    pub fn render(&self, query_text: &str, stats: &QueryStatistics, position: Option<usize>) -> String {
        let mut lines: Vec<String> = Vec::with_capacity(20);

        if let Some(n) = position {
            lines.push(format!(
                "-- Query #{} ({}: {:.6} seconds)\n",
                n,
                self.sort_metric.name(),
                stats.sort_value(self.sort_metric)
            ));
        }

        lines.push("/*".to_string());
        lines.push(format!("Row count: {}", stats.row_count));
        lines.push(format!("Total count: {:?}\n", stats.total_count));

        lines.push(table_row("Statistic", "Min", "Avg", "Max"));
        lines.push(rule());

        for acc in stats.metrics() {
            let name = acc.kind.display_name();
            if acc.kind.is_time() {
                lines.push(format!(
                    "{:<w$} {:<w$.6} {:<w$.6} {:<w$.6}",
                    name,
                    acc.min,
                    acc.avg(),
                    acc.max,
                    w = CELL_WIDTH
                ));
            } else {
                lines.push(table_row(
                    name,
                    &format_number_with_suffix(acc.min),
                    &format_number_with_suffix(acc.avg()),
                    &format_number_with_suffix(acc.max),
                ));
            }
        }

        lines.push(rule());
        lines.push(table_row("Rows/second", "", &format_number_with_suffix(stats.rows_per_second()), ""));
        lines.push(table_row("Bytes/row", "", &format_number_with_suffix(stats.bytes_per_row()), ""));
        lines.push("*/\n".to_string());

        let query = self.formatter.format(&unescape_newlines(query_text));
        let needs_newline = !query.ends_with('\n');
        lines.push(query);
        if needs_newline {
            lines.push(String::new());
        }

        lines.join("\n")
    }
}

/// Turn literal `\n` sequences from the export into real line breaks
fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

fn table_row(label: &str, min: &str, avg: &str, max: &str) -> String {
    format!("{:<w$} {:<w$} {:<w$} {:<w$}", label, min, avg, max, w = CELL_WIDTH)
}

fn rule() -> String {
    vec!["-".repeat(CELL_WIDTH); 4].join(" ")
}
