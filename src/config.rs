use crate::services::metrics_analyzer::{
    AnalysisRequest, OutputMode, OutputOptions, SortMetric, SourceFormat,
};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Daily-rolling log file; console logging only when unset
    pub file: Option<String>,
}

/// Report defaults (loaded from conf/config.toml)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Metric used to order queries (default: MaxDuration)
    pub sort_by: SortMetric,
    /// Keep query text as exported instead of pretty-printing it (default: false)
    pub keep_query_format: bool,
    /// Parent of timestamped output directories (default: output)
    pub output_root: String,
}

/// Command line arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "ydb-query-metrics")]
#[command(
    version,
    about = "Aggregate YDB query statistics from TSV exports and render them as annotated SQL"
)]
pub struct CommandLineArgs {
    /// TSV files to process (glob patterns are supported)
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<String>,

    /// Keep queries containing this substring (case-insensitive, repeatable, AND logic)
    #[arg(short = 'l', long, value_name = "PATTERN")]
    pub like: Vec<String>,

    /// Drop queries containing this substring (case-insensitive, repeatable, AND logic)
    #[arg(short = 'n', long, value_name = "PATTERN")]
    pub not_like: Vec<String>,

    /// Keep queries matching this regular expression (case-insensitive, repeatable, AND logic)
    #[arg(short = 'r', long, value_name = "REGEX")]
    pub regex: Vec<String>,

    /// Write all queries to a single file ("-" for stdout)
    #[arg(short = 'o', long, value_name = "FILE", conflicts_with = "output_dir")]
    pub output: Option<String>,

    /// Write one file per query (`-d=DIR`); without DIR a timestamped directory is created
    #[arg(short = 'd', long, value_name = "DIR", num_args = 0..=1, require_equals = true)]
    pub output_dir: Option<Option<PathBuf>>,

    /// Replace existing output files
    #[arg(short = 'w', long)]
    pub overwrite: bool,

    /// Keep query text as exported (no SQL formatting)
    #[arg(short = 'k', long)]
    pub keep_query_format: bool,

    /// Input file format (detected per file when omitted)
    #[arg(short = 'f', long, value_enum, value_name = "FORMAT")]
    pub format: Option<SourceFormat>,

    /// Sort queries by this metric, descending (overrides config file, default: MaxDuration)
    #[arg(short = 's', long, value_enum, value_name = "METRIC")]
    pub sort_by: Option<SortMetric>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (overrides config file, e.g., "info,ydb_query_metrics=debug")
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl CommandLineArgs {
    /// Output destination selected by `--output` / `--output-dir`
    pub fn output_mode(&self) -> OutputMode {
        match (&self.output, &self.output_dir) {
            (Some(file), _) if file == "-" => OutputMode::Stdout,
            (Some(file), _) => OutputMode::SingleFile(PathBuf::from(file)),
            (None, Some(dir)) => OutputMode::MultipleFiles { dir: dir.clone() },
            (None, None) => OutputMode::Stdout,
        }
    }

    /// Combine arguments with the resolved configuration into one analysis run
    pub fn into_request(self, config: &Config) -> AnalysisRequest {
        let output = self.output_mode();
        AnalysisRequest {
            inputs: self.files,
            like: self.like,
            not_like: self.not_like,
            regex: self.regex,
            format_hint: self.format,
            sort_by: config.report.sort_by,
            keep_query_format: config.report.keep_query_format,
            output,
            output_options: OutputOptions {
                overwrite: self.overwrite,
                output_root: PathBuf::from(&config.report.output_root),
            },
        }
    }
}

impl Config {
    /// Load configuration with command line, environment variable, and file support
    ///
    /// Loading order (priority from highest to lowest):
    /// 1. Command line arguments
    /// 2. Environment variables (prefixed with QUERY_METRICS_)
    /// 3. Configuration file (config.toml)
    /// 4. Default values
    pub fn load(cli_args: &CommandLineArgs) -> Result<Self, anyhow::Error> {
        // 1. Load from config file (use CLI --config if provided, otherwise find default)
        let config_path = cli_args.config.clone().or_else(Self::find_config_file);
        let mut config = if let Some(config_path) = config_path {
            Self::from_toml(&config_path)?
        } else {
            tracing::debug!("Configuration file not found, using defaults");
            Config::default()
        };

        // 2. Override with environment variables
        config.apply_env_overrides();

        // 3. Override with command line arguments (highest priority)
        config.apply_cli_overrides(cli_args);

        // 4. Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - QUERY_METRICS_LOG_LEVEL: Logging level (e.g., "info,ydb_query_metrics=debug")
    /// - QUERY_METRICS_LOG_FILE: Log file path
    /// - QUERY_METRICS_SORT_BY: MaxDuration, AvgDuration, MaxCPUTime or AvgCPUTime
    /// - QUERY_METRICS_KEEP_QUERY_FORMAT: Disable SQL formatting (true/false)
    /// - QUERY_METRICS_OUTPUT_ROOT: Parent of timestamped output directories
    fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("QUERY_METRICS_LOG_LEVEL") {
            self.logging.level = level;
            tracing::info!("Override logging.level from env: {}", self.logging.level);
        }

        if let Ok(file) = std::env::var("QUERY_METRICS_LOG_FILE") {
            tracing::info!("Override logging.file from env: {}", file);
            self.logging.file = Some(file);
        }

        if let Ok(sort_by) = std::env::var("QUERY_METRICS_SORT_BY") {
            match parse_sort_metric(&sort_by) {
                Ok(val) => {
                    self.report.sort_by = val;
                    tracing::info!("Override report.sort_by from env: {}", self.report.sort_by);
                },
                Err(e) => tracing::warn!(
                    "Invalid QUERY_METRICS_SORT_BY '{}': {} (keep {})",
                    sort_by,
                    e,
                    self.report.sort_by
                ),
            }
        }

        if let Ok(keep) = std::env::var("QUERY_METRICS_KEEP_QUERY_FORMAT") {
            match keep.trim().parse() {
                Ok(val) => {
                    self.report.keep_query_format = val;
                    tracing::info!(
                        "Override report.keep_query_format from env: {}",
                        self.report.keep_query_format
                    );
                },
                Err(_) => tracing::warn!(
                    "Invalid QUERY_METRICS_KEEP_QUERY_FORMAT '{}' (keep {})",
                    keep,
                    self.report.keep_query_format
                ),
            }
        }

        if let Ok(root) = std::env::var("QUERY_METRICS_OUTPUT_ROOT") {
            self.report.output_root = root;
            tracing::info!("Override report.output_root from env: {}", self.report.output_root);
        }
    }

    /// Apply command line argument overrides (highest priority)
    fn apply_cli_overrides(&mut self, args: &CommandLineArgs) {
        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
            tracing::info!("Override logging.level from CLI: {}", self.logging.level);
        }

        if let Some(sort_by) = args.sort_by {
            self.report.sort_by = sort_by;
            tracing::info!("Override report.sort_by from CLI: {}", self.report.sort_by);
        }

        if args.keep_query_format {
            self.report.keep_query_format = true;
            tracing::info!("Override report.keep_query_format from CLI: true");
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), anyhow::Error> {
        if self.logging.level.trim().is_empty() {
            anyhow::bail!("logging.level cannot be empty");
        }

        if self.report.output_root.trim().is_empty() {
            anyhow::bail!("report.output_root cannot be empty");
        }

        Ok(())
    }

    fn find_config_file() -> Option<String> {
        let possible_paths = ["conf/config.toml", "config.toml"];

        for path in &possible_paths {
            if Path::new(path).exists() {
                return Some(path.to_string());
            }
        }
        None
    }

    fn from_toml(path: &str) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), file: None }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            sort_by: SortMetric::MaxDuration,
            keep_query_format: false,
            output_root: "output".to_string(),
        }
    }
}

// =========================
// Helpers for parsing values
// =========================

/// Exact metric name, as accepted on the command line
fn parse_sort_metric(input: &str) -> Result<SortMetric, String> {
    SortMetric::from_str(input.trim(), false)
}
