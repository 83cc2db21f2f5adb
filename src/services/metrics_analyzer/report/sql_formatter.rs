//! SQL text formatting
//!
//! Pretty-printing is purely syntactic: keywords are uppercased and clauses
//! reindented, nothing about the query is validated.

use sqlformat::{FormatOptions, Indent, QueryParams};

/// `format(sql) -> sql` capability used by the report renderer
pub trait SqlFormatter: Send + Sync {
    fn format(&self, sql: &str) -> String;
}

/// Reindents and uppercases keywords
#[derive(Debug, Clone)]
pub struct PrettySqlFormatter {
    indent_width: u8,
    uppercase: bool,
}

impl Default for PrettySqlFormatter {
    fn default() -> Self {
        Self { indent_width: 4, uppercase: true }
    }
}

impl PrettySqlFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    fn options(&self) -> FormatOptions {
        FormatOptions {
            indent: Indent::Spaces(self.indent_width),
            uppercase: self.uppercase,
            ..Default::default()
        }
    }
}

impl SqlFormatter for PrettySqlFormatter {
    fn format(&self, sql: &str) -> String {
        sqlformat::format(sql, &QueryParams::None, self.options())
    }
}

/// Leaves query text untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughFormatter;

impl SqlFormatter for PassthroughFormatter {
    fn format(&self, sql: &str) -> String {
        sql.to_string()
    }
}
