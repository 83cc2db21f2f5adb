//! Query text filtering
//!
//! Predicates are combined with logical AND; an empty filter keeps every row.

use crate::services::metrics_analyzer::error::{AnalyzerError, AnalyzerResult};
use crate::services::metrics_analyzer::models::CanonicalRow;
use regex::{Regex, RegexBuilder};

/// A single predicate over the query text
#[derive(Debug, Clone)]
pub enum FilterPredicate {
    /// Case-insensitive substring must be present (stored lowercased)
    Contains(String),
    /// Case-insensitive substring must be absent (stored lowercased)
    Excludes(String),
    /// Case-insensitive regex must match somewhere in the text
    Matches(Regex),
}

impl FilterPredicate {
    pub fn contains(needle: &str) -> Self {
        Self::Contains(needle.to_lowercase())
    }

    pub fn excludes(needle: &str) -> Self {
        Self::Excludes(needle.to_lowercase())
    }

    /// Compile a case-insensitive regex predicate
    pub fn matches(pattern: &str) -> AnalyzerResult<Self> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(Self::Matches)
            .map_err(|source| AnalyzerError::Pattern { pattern: pattern.to_string(), source })
    }

    /// `lowered` is the lowercased query text, shared across predicates
    fn test(&self, text: &str, lowered: &str) -> bool {
        match self {
            Self::Contains(needle) => lowered.contains(needle.as_str()),
            Self::Excludes(needle) => !lowered.contains(needle.as_str()),
            Self::Matches(regex) => regex.is_match(text),
        }
    }
}

/// Conjunction of query text predicates
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    predicates: Vec<FilterPredicate>,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter from the three CLI pattern lists
    pub fn from_patterns(
        like: &[String],
        not_like: &[String],
        regex: &[String],
    ) -> AnalyzerResult<Self> {
        let mut filter = Self::new().with_like(like).with_not_like(not_like);
        for pattern in regex {
            filter = filter.with_regex(pattern)?;
        }
        Ok(filter)
    }

    pub fn with_like<S: AsRef<str>>(mut self, needles: &[S]) -> Self {
        self.predicates
            .extend(needles.iter().map(|n| FilterPredicate::contains(n.as_ref())));
        self
    }

    pub fn with_not_like<S: AsRef<str>>(mut self, needles: &[S]) -> Self {
        self.predicates
            .extend(needles.iter().map(|n| FilterPredicate::excludes(n.as_ref())));
        self
    }

    pub fn with_regex(mut self, pattern: &str) -> AnalyzerResult<Self> {
        self.predicates.push(FilterPredicate::matches(pattern)?);
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn matches(&self, text: &str) -> bool {
        if self.predicates.is_empty() {
            return true;
        }
        let lowered = text.to_lowercase();
        self.predicates.iter().all(|p| p.test(text, &lowered))
    }

    /// Keep the rows whose query text satisfies every predicate
    pub fn apply(&self, rows: Vec<CanonicalRow>) -> Vec<CanonicalRow> {
        if self.is_empty() {
            return rows;
        }
        rows.into_iter().filter(|row| self.matches(&row.query_text)).collect()
    }
}
