//! Report sinks: console, single file, one file per query
//!
//! Conflicts with existing output are detected before anything is written.

use crate::services::metrics_analyzer::error::{AnalyzerError, AnalyzerResult};
use crate::services::metrics_analyzer::report::ReportRenderer;
use crate::services::metrics_analyzer::statistics::QueryStatistics;
use chrono::NaiveDateTime;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const RULE_WIDTH: usize = 120;

/// Query text and statistics, already in report order
pub type ReportEntry<'a> = (&'a str, &'a QueryStatistics);

/// Where the report goes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Stdout,
    /// All queries in one file, separated by comment rules
    SingleFile(PathBuf),
    /// One `QueryNNN.sql` per query; `None` allocates a timestamped directory
    MultipleFiles { dir: Option<PathBuf> },
}

/// Sink settings shared by every mode
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub overwrite: bool,
    /// Parent of timestamped directories
    pub output_root: PathBuf,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self { overwrite: false, output_root: PathBuf::from("output") }
    }
}

impl OutputMode {
    /// Write all entries; returns the directory or file written, `None` for stdout
    pub fn write(
        &self,
        entries: &[ReportEntry<'_>],
        renderer: &ReportRenderer,
        options: &OutputOptions,
    ) -> AnalyzerResult<Option<PathBuf>> {
        match self {
            Self::Stdout => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                write_console(&mut handle, entries, renderer)
                    .map_err(|e| AnalyzerError::output("<stdout>", e))?;
                Ok(None)
            },
            Self::SingleFile(path) => {
                write_single_file(path, entries, renderer, options.overwrite).map(Some)
            },
            Self::MultipleFiles { dir } => {
                let now = chrono::Local::now().naive_local();
                let target = allocate_output_dir(dir.as_deref(), &options.output_root, now);
                write_multiple_files(&target, entries, renderer, options.overwrite).map(Some)
            },
        }
    }
}

/// Resolve the directory for multi-file output
///
/// An explicit directory is used as is; otherwise `<root>/<YYYYmmdd_HHMMSS>`.
pub fn allocate_output_dir(requested: Option<&Path>, root: &Path, now: NaiveDateTime) -> PathBuf {
    match requested {
        Some(dir) => dir.to_path_buf(),
        None => root.join(now.format("%Y%m%d_%H%M%S").to_string()),
    }
}

/// Print every block with its position header, separated by `=` rules
pub fn write_console<W: Write>(
    writer: &mut W,
    entries: &[ReportEntry<'_>],
    renderer: &ReportRenderer,
) -> std::io::Result<()> {
    for (i, (query, stats)) in entries.iter().enumerate() {
        if i > 0 {
            writeln!(writer, "\n{}\n", "=".repeat(RULE_WIDTH))?;
        }
        writeln!(writer, "{}", renderer.render(query, stats, Some(i + 1)))?;
    }
    writer.flush()
}

/// Write `Query001.sql`, `Query002.sql`, ... into `dir`
pub fn write_multiple_files(
    dir: &Path,
    entries: &[ReportEntry<'_>],
    renderer: &ReportRenderer,
    overwrite: bool,
) -> AnalyzerResult<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| AnalyzerError::output(dir, e))?;
    prepare_directory(dir, overwrite)?;

    for (i, (query, stats)) in entries.iter().enumerate() {
        let path = dir.join(format!("Query{:03}.sql", i + 1));
        fs::write(&path, renderer.render(query, stats, None))
            .map_err(|e| AnalyzerError::output(&path, e))?;
    }

    tracing::debug!("Wrote {} files to {}", entries.len(), dir.display());
    Ok(dir.to_path_buf())
}

/// Write every block, with headers, into one file
pub fn write_single_file(
    path: &Path,
    entries: &[ReportEntry<'_>],
    renderer: &ReportRenderer,
    overwrite: bool,
) -> AnalyzerResult<PathBuf> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| AnalyzerError::output(parent, e))?;
    }

    if path.exists() {
        if !overwrite {
            return Err(AnalyzerError::OutputConflict { path: path.to_path_buf() });
        }
        tracing::info!("Overwriting {}", path.display());
        fs::remove_file(path).map_err(|e| AnalyzerError::output(path, e))?;
    }

    let separator = format!("\n\n-- {}\n\n", "=".repeat(RULE_WIDTH));
    let content = entries
        .iter()
        .enumerate()
        .map(|(i, (query, stats))| renderer.render(query, stats, Some(i + 1)))
        .collect::<Vec<_>>()
        .join(&separator);

    fs::write(path, content).map_err(|e| AnalyzerError::output(path, e))?;
    Ok(path.to_path_buf())
}

/// Fail on a non-empty directory, or clear its regular files when overwriting
fn prepare_directory(dir: &Path, overwrite: bool) -> AnalyzerResult<()> {
    let entries = fs::read_dir(dir)
        .and_then(|rd| rd.collect::<Result<Vec<_>, _>>())
        .map_err(|e| AnalyzerError::output(dir, e))?;

    if entries.is_empty() {
        return Ok(());
    }
    if !overwrite {
        return Err(AnalyzerError::OutputConflict { path: dir.to_path_buf() });
    }

    tracing::info!("Removing existing files in {}", dir.display());
    for entry in entries {
        let path = entry.path();
        if path.is_file() {
            fs::remove_file(&path).map_err(|e| AnalyzerError::output(&path, e))?;
        }
    }
    Ok(())
}
