pub mod metrics_analyzer;

pub use metrics_analyzer::{AnalysisRequest, AnalyzerError, AnalyzerResult, RunSummary};
