//! loglens - LLM-assisted security review of plain-text log files
//!
//! A log file is read line by line, each line is trimmed and length-capped,
//! and the resulting entries are grouped into fixed-size batches. Every batch
//! is sent as one request to a text-completion service acting as a security
//! analyst, with a pause after each request. The answers are collected and
//! written to a timestamped JSON or text file.
//!
//! # Example Usage
//!
//! ```no_run
//! use loglens::{LoglensConfig, LogAnalyzer, Orchestrator};
//! use loglens::pipeline::pacer_for;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = LoglensConfig::default();
//! config.validate()?;
//!
//! let analyzer = LogAnalyzer::new(config.create_client()?, config.analysis_settings());
//! let orchestrator = Orchestrator::new(
//!     config.run_settings()?,
//!     analyzer,
//!     pacer_for(config.request_delay()),
//! );
//!
//! let report = orchestrator.run(Path::new("auth.log")).await?;
//! if let Some(path) = report.output_path {
//!     println!("Results saved to {}", path.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`pipeline`]: loader, normalizer, batcher, analyzer, pacing, sink and orchestrator
//! - [`llm`]: completion client trait, `genai` implementation and mock
//! - [`config`]: environment-backed configuration
//! - [`progress`]: progress events and handlers
//! - [`cli`]: command-line interface

pub mod cli;
pub mod config;
pub mod llm;
pub mod pipeline;
pub mod progress;
pub mod util;

pub use config::{ConfigError, LoglensConfig};
pub use llm::{BackendError, GenAIClient, LLMClient, MockLLMClient, MockResponse};
pub use pipeline::{
    AnalysisResults, BatchOutcome, LogAnalyzer, Orchestrator, OutputFormat, PipelineError,
    ResultMode, RunReport, RunSettings,
};
pub use util::{init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_loglens() {
        assert_eq!(NAME, "loglens");
    }
}
