//! Raw TSV table reading
//!
//! Reads decoded text into untyped rows. Nothing is interpreted here: header
//! detection and column naming happen in the schema normalizer.

use crate::services::metrics_analyzer::loader::error::LoadResult;

/// Untyped tab-separated table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Column labels when the table carries a header row
    pub headers: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Parse tab-separated text without assuming a header row
    pub fn from_tsv(text: &str) -> LoadResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            // Skip blank lines
            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers: None, rows })
    }

    /// Build a table that already has column labels
    pub fn with_headers(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers: Some(headers), rows }
    }

    /// Number of columns: header width if present, else the widest row
    pub fn column_count(&self) -> usize {
        match &self.headers {
            Some(headers) => headers.len(),
            None => self.rows.iter().map(Vec::len).max().unwrap_or(0),
        }
    }

    /// Trimmed, non-empty values of the first row
    pub fn first_row_values(&self) -> Vec<&str> {
        self.rows
            .first()
            .map(|row| row.iter().map(|v| v.trim()).filter(|v| !v.is_empty()).collect())
            .unwrap_or_default()
    }

    /// Promote the first row to column labels
    pub fn promote_header_row(mut self) -> Self {
        if self.headers.is_none() && !self.rows.is_empty() {
            let header = self.rows.remove(0);
            self.headers = Some(header.into_iter().map(|h| h.trim().to_string()).collect());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tsv_ragged_rows() {
        let table = RawTable::from_tsv("a\tb\tc\n1\t2\n\n3\t4\t5\t6\n").unwrap();
        assert!(table.headers.is_none());
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[1], vec!["1", "2"]);
        assert_eq!(table.column_count(), 4);
    }

    #[test]
    fn test_quoted_cells_keep_tabs_and_newlines() {
        let table = RawTable::from_tsv("QueryText\tRank\n\"SELECT 1\nFROM t\"\t1\n").unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][0], "SELECT 1\nFROM t");
    }

    #[test]
    fn test_promote_header_row() {
        let table = RawTable::from_tsv(" QueryText \tRank\nSELECT 1\t1\n").unwrap();
        let table = table.promote_header_row();
        assert_eq!(table.headers.as_deref(), Some(&["QueryText".to_string(), "Rank".to_string()][..]));
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn test_first_row_values_trimmed() {
        let table = RawTable::from_tsv(" CPUTime \t\tDuration\n").unwrap();
        assert_eq!(table.first_row_values(), vec!["CPUTime", "Duration"]);
    }
}
