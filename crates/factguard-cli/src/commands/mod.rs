pub mod analyze;
pub mod stats;

pub use analyze::AnalyzeCommand;
pub use stats::StatsCommand;
