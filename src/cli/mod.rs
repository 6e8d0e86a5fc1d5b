pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{AnalyzeArgs, BatchesArgs, CliArgs, Commands};
pub use output::{format_batch_plan, format_report};
