//! Report rendering: statistics tables, number formatting and SQL formatting

pub mod number_format;
pub mod renderer;
pub mod sql_formatter;

pub use number_format::format_number_with_suffix;
pub use renderer::ReportRenderer;
pub use sql_formatter::{PassthroughFormatter, PrettySqlFormatter, SqlFormatter};
