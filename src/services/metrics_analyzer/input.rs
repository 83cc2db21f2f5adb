//! Input file discovery

use crate::services::metrics_analyzer::error::{AnalyzerError, AnalyzerResult};
use std::path::{Path, PathBuf};

/// Expand glob patterns into file paths, in pattern order
///
/// Patterns matching nothing are warned about and skipped. Fails only when no
/// pattern matched at all.
pub fn expand_input_patterns<S: AsRef<str>>(patterns: &[S]) -> AnalyzerResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        let matched = expand_pattern(pattern);
        if matched.is_empty() {
            tracing::warn!("No files matched pattern '{}'", pattern);
        }
        files.extend(matched);
    }

    if files.is_empty() {
        return Err(AnalyzerError::NoInputFiles);
    }
    Ok(files)
}

fn expand_pattern(pattern: &str) -> Vec<PathBuf> {
    match glob::glob(pattern) {
        Ok(paths) => paths
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!("Skipping unreadable path {}: {}", e.path().display(), e);
                    None
                },
            })
            .collect(),
        Err(e) => {
            // Not a valid glob; still accept it as a literal path
            tracing::debug!("Pattern '{}' is not a valid glob: {}", pattern, e);
            let path = Path::new(pattern);
            if path.exists() { vec![path.to_path_buf()] } else { Vec::new() }
        },
    }
}
