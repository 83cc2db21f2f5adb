use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ydb_query_metrics::config::{CommandLineArgs, Config, LoggingConfig};
use ydb_query_metrics::services::metrics_analyzer::{AnalyzerError, run_analysis};

fn main() -> Result<ExitCode, anyhow::Error> {
    // Pick up QUERY_METRICS_* variables from a local .env file
    dotenvy::dotenv().ok();

    let cli_args = CommandLineArgs::parse();

    // Load configuration first
    let config = Config::load(&cli_args).context("Failed to load configuration")?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _guard = init_logging(&config.logging);
    tracing::debug!("Configuration loaded successfully");

    let request = cli_args.into_request(&config);
    let code = match run_analysis(&request) {
        Ok(summary) => {
            if summary.files_skipped > 0 {
                tracing::warn!(
                    "{} of {} files could not be processed",
                    summary.files_skipped,
                    summary.files_total
                );
            }
            ExitCode::SUCCESS
        },
        Err(AnalyzerError::EmptyResult(reason)) => {
            tracing::warn!("Nothing to report: {}", reason);
            ExitCode::SUCCESS
        },
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        },
    };
    Ok(code)
}

/// Initialize logging: stderr always, plus a daily-rolling file when configured
///
/// Logs never go to stdout, which carries the rendered SQL.
fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let log_filter = tracing_subscriber::EnvFilter::new(&logging.level);

    // Add file logging if configured
    let (file_layer, guard) = match &logging.file {
        Some(log_file) => {
            // Ensure log directory exists
            let log_path = std::path::Path::new(log_file);
            if let Some(parent) = log_path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }

            // Extract directory and filename prefix from config
            let log_dir = log_path
                .parent()
                .and_then(|p| p.to_str())
                .filter(|p| !p.is_empty())
                .unwrap_or(".");
            let file_name = log_path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("ydb-query-metrics.log");
            // Remove .log extension if present (rolling appender adds date suffix)
            let file_prefix = file_name.strip_suffix(".log").unwrap_or(file_name);

            let file_appender = tracing_appender::rolling::daily(log_dir, file_prefix);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false);
            (Some(layer), Some(guard))
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(log_filter)
        .with(file_layer)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    guard
}
