//! The batch analysis pipeline
//!
//! Loader → Normalizer → Batcher → (LogAnalyzer, paced) → ResultSink, driven
//! by the [`Orchestrator`].

pub mod analysis;
pub mod batcher;
pub mod error;
pub mod loader;
pub mod normalizer;
pub mod orchestrator;
pub mod pacing;
pub mod prompt;
pub mod sink;

pub use analysis::{AnalysisSettings, BatchOutcome, LogAnalyzer};
pub use batcher::{into_batches, Batch};
pub use error::PipelineError;
pub use loader::{load_logs, LogRecord};
pub use normalizer::{normalize, normalize_line, NormalizedRecord};
pub use orchestrator::{Orchestrator, RunReport, RunSettings};
pub use pacing::{pacer_for, FixedDelay, NoDelay, Pacer};
pub use sink::{
    output_file_name, AnalysisResults, BatchResult, OutputFormat, PairedResult, ResultMode,
    ResultSink, EMPTY_ANALYSIS_BLOCK,
};
