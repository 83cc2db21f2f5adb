//! Export file loading
//!
//! ```text
//! bytes ──► encoding (BOM sniff + fallbacks) ──► RawTable (TSV) ──► SchemaNormalizer ──► Vec<CanonicalRow>
//! ```
//!
//! Decoding, table parsing and normalization run as one unit per encoding
//! attempt, so a wrong guess that decodes but yields garbage still falls
//! through to the next candidate.

pub mod encoding;
pub mod error;
pub mod schema;
pub mod table_reader;

pub use encoding::{TextEncoding, load_with_fallback};
pub use error::{LoadError, LoadResult};
pub use schema::SchemaNormalizer;
pub use table_reader::RawTable;

use crate::services::metrics_analyzer::models::{CanonicalRow, SourceFormat};
use std::path::Path;

/// Load one export file into canonical rows
pub fn load_file(path: &Path, format_hint: Option<SourceFormat>) -> LoadResult<Vec<CanonicalRow>> {
    let bytes = std::fs::read(path)?;
    load_bytes(&bytes, format_hint)
}

/// Load export content already held in memory
pub fn load_bytes(bytes: &[u8], format_hint: Option<SourceFormat>) -> LoadResult<Vec<CanonicalRow>> {
    load_with_fallback(bytes, |text| {
        let table = RawTable::from_tsv(text)?;
        SchemaNormalizer::normalize(table, format_hint)
    })
}
