//! Fixture-driven tests for the metrics analyzer
//!
//! Fixtures live under tests/fixtures/ and mirror real YDB exports: one
//! aggregated `query_metrics` file and one per-execution `top_queries` file.

#[cfg(test)]
mod analyzer_tests {
    use crate::services::metrics_analyzer::loader::{self, RawTable, SchemaNormalizer};
    use crate::services::metrics_analyzer::*;
    use std::fs;
    use std::path::PathBuf;

    const ALPHA: &str = "SELECT * FROM table_alpha WHERE id = 123";
    const BETA: &str = "SELECT name, value FROM table_beta WHERE status = \"active\"";
    const GAMMA: &str = "SELECT COUNT(*) FROM table_gamma GROUP BY category";
    const DELTA: &str = "SELECT * FROM table_delta";
    const EPSILON: &str = "UPDATE table_epsilon SET flag = 1 WHERE id = 7";

    /// Get the path to test fixtures
    fn get_fixture_path(filename: &str) -> PathBuf {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("tests/fixtures");
        path.push(filename);
        path
    }

    fn load_fixture(filename: &str, hint: Option<SourceFormat>) -> Vec<CanonicalRow> {
        let path = get_fixture_path(filename);
        loader::load_file(&path, hint)
            .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", path.display(), e))
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    mod detection_tests {
        use super::*;

        #[test]
        fn test_detect_fixture_formats() {
            for (file, expected) in [
                ("query_metrics_sample.tsv", SourceFormat::QueryMetrics),
                ("top_queries_sample.tsv", SourceFormat::TopQueries),
            ] {
                let text = fs::read_to_string(get_fixture_path(file)).unwrap();
                let table = RawTable::from_tsv(&text).unwrap();
                assert_eq!(SchemaNormalizer::detect_format(&table).unwrap(), expected, "{}", file);
                assert!(SchemaNormalizer::has_headers(&table));
            }
        }

        #[test]
        fn test_headerless_fixture_detected_by_column_count() {
            let text = fs::read_to_string(get_fixture_path("top_queries_sample.tsv")).unwrap();
            let body: String = text.lines().skip(1).map(|l| format!("{}\n", l)).collect();

            let table = RawTable::from_tsv(&body).unwrap();
            assert!(!SchemaNormalizer::has_headers(&table));
            assert_eq!(SchemaNormalizer::detect_format(&table).unwrap(), SourceFormat::TopQueries);

            let rows = SchemaNormalizer::normalize(table, None).unwrap();
            assert_eq!(rows.len(), 3);
            assert_eq!(rows[0].query_text, DELTA);
        }
    }

    mod loading_tests {
        use super::*;

        #[test]
        fn test_load_query_metrics_fixture() {
            let rows = load_fixture("query_metrics_sample.tsv", None);
            assert_eq!(rows.len(), 4);

            let alpha = &rows[0];
            assert_eq!(alpha.query_text, ALPHA);
            assert_eq!(alpha.count, 1.0);
            assert_eq!(alpha.rank, 1);
            assert_eq!(alpha.interval_end.as_deref(), Some("2025-01-01T00:01:00Z"));
            assert_eq!(
                *alpha.sample(MetricKind::Duration),
                MetricSample { min: Some(100000.0), max: Some(500000.0), sum: Some(1000000.0) }
            );

            // Quotes inside an unquoted cell are kept as-is
            assert_eq!(rows[1].query_text, BETA);
            assert_eq!(rows[3].query_text, "");
        }

        #[test]
        fn test_load_top_queries_fixture() {
            let rows = load_fixture("top_queries_sample.tsv", None);
            assert_eq!(rows.len(), 3);

            let first = &rows[0];
            assert_eq!(first.query_text, DELTA);
            assert_eq!(first.count, 1.0);
            assert_eq!(*first.sample(MetricKind::CpuTime), MetricSample::single(10000.0));
            assert_eq!(*first.sample(MetricKind::Duration), MetricSample::single(100000.0));
            assert_eq!(*first.sample(MetricKind::ReadRows), MetricSample::single(10.0));
        }

        #[test]
        fn test_load_utf16_export() {
            let text = fs::read_to_string(get_fixture_path("top_queries_sample.tsv")).unwrap();
            let mut bytes = vec![0xFF, 0xFE];
            bytes.extend(text.encode_utf16().flat_map(u16::to_le_bytes));

            let rows = loader::load_bytes(&bytes, None).unwrap();
            assert_eq!(rows, load_fixture("top_queries_sample.tsv", None));
        }

        #[test]
        fn test_wrong_format_hint_yields_zeros() {
            // Aggregated file read as per-execution rows: event columns are missing
            let rows = load_fixture("query_metrics_sample.tsv", Some(SourceFormat::TopQueries));
            assert_eq!(rows.len(), 4);
            assert_eq!(*rows[0].sample(MetricKind::Duration), MetricSample::single(0.0));
            assert_eq!(rows[0].query_text, ALPHA);
        }
    }

    mod aggregation_tests {
        use super::*;

        #[test]
        fn test_aggregate_query_metrics_fixture() {
            let rows = load_fixture("query_metrics_sample.tsv", None);
            let result = aggregate(&rows);

            // The blank query text row is dropped
            assert_eq!(result.len(), 3);

            let alpha = result.get(ALPHA).unwrap();
            assert!(close(alpha.duration().min, 0.1));
            assert!(close(alpha.duration().max, 0.5));
            assert_eq!(alpha.total_count, 1.0);
            assert_eq!(alpha.row_count, 1);

            let gamma = result.get(GAMMA).unwrap();
            assert_eq!(gamma.total_count, 3.0);
            assert!(close(gamma.duration().avg(), 1.0));
            assert!(close(gamma.cpu_time().avg(), 0.1));
            // 100 rows / 1 s and 10000 bytes / 100 rows
            assert!(close(gamma.rows_per_second(), 100.0));
            assert!(close(gamma.bytes_per_row(), 100.0));
        }

        #[test]
        fn test_aggregate_top_queries_fixture() {
            let rows = load_fixture("top_queries_sample.tsv", None);
            let result = aggregate(&rows);
            assert_eq!(result.len(), 2);

            let delta = result.get(DELTA).unwrap();
            assert_eq!(delta.row_count, 2);
            assert_eq!(delta.total_count, 2.0);
            assert!(close(delta.duration().min, 0.1));
            assert!(close(delta.duration().max, 0.3));
            assert!(close(delta.duration().avg(), 0.2));
            assert!(close(delta.metric(MetricKind::ReadRows).avg(), 20.0));
        }

        #[test]
        fn test_sort_orders() {
            let mut rows = load_fixture("query_metrics_sample.tsv", None);
            rows.extend(load_fixture("top_queries_sample.tsv", None));
            let result = aggregate(&rows);

            let order = |metric: SortMetric| {
                result.sorted_by(metric).into_iter().map(|(text, _)| text).collect::<Vec<_>>()
            };

            assert_eq!(order(SortMetric::MaxDuration), vec![EPSILON, GAMMA, BETA, ALPHA, DELTA]);
            // alpha, beta and gamma all average 1s: ties keep first-seen order
            assert_eq!(order(SortMetric::AvgDuration)[..3], [ALPHA, BETA, GAMMA]);
            assert_eq!(order(SortMetric::MaxCpuTime)[0], GAMMA);
            assert_eq!(order(SortMetric::AvgCpuTime)[0], ALPHA);
            assert_eq!(*order(SortMetric::AvgCpuTime).last().unwrap(), EPSILON);
        }

        #[test]
        fn test_filter_then_aggregate() {
            let rows = load_fixture("query_metrics_sample.tsv", None);
            let filter = QueryFilter::new()
                .with_like(&["select"])
                .with_not_like(&["TABLE_BETA"])
                .with_regex(r"table_(alpha|beta|gamma)")
                .unwrap();

            let result = analyze_rows(rows, &filter);
            let texts: Vec<&String> = result.iter().map(|(text, _)| text).collect();
            assert_eq!(texts, vec![ALPHA, GAMMA]);
        }
    }

    mod report_tests {
        use super::*;

        #[test]
        fn test_render_fixture_query() {
            let rows = load_fixture("query_metrics_sample.tsv", None);
            let result = aggregate(&rows);
            let alpha = result.get(ALPHA).unwrap();

            let renderer = ReportRenderer::new(SortMetric::MaxDuration, true);
            let block = renderer.render(ALPHA, alpha, Some(1));

            assert!(block.starts_with("-- Query #1 (MaxDuration: 0.500000 seconds)\n"));
            assert!(block.contains("Row count: 1\nTotal count: 1.0\n"));
            assert!(block.contains(&format!(
                "{:<15} {:<15} {:<15} {:<15}",
                "ReadBytes", "1.00k", "10.0k", "5.00k"
            )));
            assert!(block.ends_with(&format!("*/\n\n{}\n", ALPHA)));
        }
    }
}
