//! Grouping of canonical rows by query text

use crate::services::metrics_analyzer::models::{CanonicalRow, SortMetric};
use crate::services::metrics_analyzer::statistics::QueryStatistics;
use indexmap::IndexMap;
use std::cmp::Ordering;

/// Statistics per distinct query text, in first-seen order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationResult {
    queries: IndexMap<String, QueryStatistics>,
}

impl AggregationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn get(&self, query_text: &str) -> Option<&QueryStatistics> {
        self.queries.get(query_text)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &QueryStatistics)> {
        self.queries.iter()
    }

    /// Feed one row; rows with blank query text are ignored
    pub fn add_row(&mut self, row: &CanonicalRow) {
        if row.query_text.trim().is_empty() {
            return;
        }
        self.queries
            .entry(row.query_text.clone())
            .or_default()
            .update_from_row(row);
    }

    /// Entries ordered by `metric`, largest first; ties keep first-seen order
    pub fn sorted_by(&self, metric: SortMetric) -> Vec<(&str, &QueryStatistics)> {
        let mut entries: Vec<(&str, &QueryStatistics)> =
            self.queries.iter().map(|(text, stats)| (text.as_str(), stats)).collect();

        entries.sort_by(|a, b| descending(a.1.sort_value(metric), b.1.sort_value(metric)));
        entries
    }

    /// Fold another partition's result into this one
    pub fn merge(&mut self, other: AggregationResult) {
        for (text, stats) in other.queries {
            match self.queries.get_mut(&text) {
                Some(existing) => existing.merge(&stats),
                None => {
                    self.queries.insert(text, stats);
                },
            }
        }
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

/// Group rows by exact query text
pub fn aggregate<'a>(rows: impl IntoIterator<Item = &'a CanonicalRow>) -> AggregationResult {
    let mut result = AggregationResult::new();
    for row in rows {
        result.add_row(row);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::metrics_analyzer::models::{MetricKind, MetricSample};

    fn timed(text: &str, max_duration: f64) -> CanonicalRow {
        CanonicalRow::new(text).with_sample(MetricKind::Duration, MetricSample {
            min: Some(max_duration),
            max: Some(max_duration),
            sum: Some(max_duration),
        })
    }

    #[test]
    fn test_groups_by_exact_text() {
        let rows = vec![timed("SELECT 1", 1.0), timed("select 1", 2.0), timed("SELECT 1", 3.0)];
        let result = aggregate(&rows);

        assert_eq!(result.len(), 2);
        assert_eq!(result.get("SELECT 1").map(|s| s.row_count), Some(2));
        assert_eq!(result.get("select 1").map(|s| s.row_count), Some(1));
    }

    #[test]
    fn test_blank_query_text_is_skipped() {
        let rows = vec![timed("", 1.0), timed("   ", 1.0), timed("\t\n", 1.0), timed("SELECT 1", 1.0)];
        let result = aggregate(&rows);

        assert_eq!(result.len(), 1);
        assert!(result.get("").is_none());
    }

    #[test]
    fn test_sorted_descending_and_stable() {
        let rows = vec![
            timed("a", 1_000_000.0),
            timed("b", 3_000_000.0),
            timed("c", 1_000_000.0),
            timed("d", 2_000_000.0),
        ];
        let result = aggregate(&rows);

        let order: Vec<&str> =
            result.sorted_by(SortMetric::MaxDuration).into_iter().map(|(t, _)| t).collect();
        assert_eq!(order, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_merge_partitions() {
        let rows = vec![timed("a", 1.0), timed("b", 2.0), timed("a", 3.0), timed("c", 4.0)];

        let whole = aggregate(&rows);
        let mut left = aggregate(&rows[..2]);
        left.merge(aggregate(&rows[2..]));

        assert_eq!(left, whole);
        let keys: Vec<&String> = left.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_aggregate_weighted_rows() {
        let texts = [
            "SELECT * FROM table_alpha WHERE id = 123",
            "SELECT name, value FROM table_beta WHERE status = \"active\"",
            "SELECT COUNT(*) FROM table_gamma GROUP BY category",
        ];
        let rows: Vec<CanonicalRow> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let n = (i + 1) as f64;
                CanonicalRow::new(*text).with_count(n).with_sample(MetricKind::Duration, MetricSample {
                    min: Some(100_000.0 * n),
                    max: Some(400_000.0 + 100_000.0 * n),
                    sum: Some(1_000_000.0 * n),
                })
            })
            .collect();

        let result = aggregate(&rows);
        assert_eq!(result.len(), 3);

        let first = result.get(texts[0]).unwrap();
        assert!((first.duration().min - 0.1).abs() < 1e-12);
        assert!((first.duration().max - 0.5).abs() < 1e-12);
        assert_eq!(first.total_count, 1.0);

        let third = result.get(texts[2]).unwrap();
        assert_eq!(third.total_count, 3.0);
        // 3e6 / (3 * 1e6)
        assert!((third.duration().avg() - 1.0).abs() < 1e-12);
    }
}
