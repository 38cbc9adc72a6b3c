pub mod commands;
pub mod error;
pub mod output;

pub use commands::{AnalyzeCommand, StatsCommand};
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, format_created_at, format_timestamp, truncate_string};
