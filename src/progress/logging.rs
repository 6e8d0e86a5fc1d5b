//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { path, entries } => {
                info!(path = %path.display(), entries, "Processing {} log entries", entries);
            }
            ProgressEvent::NothingToProcess { path } => {
                info!(path = %path.display(), "No logs to process");
            }
            ProgressEvent::BatchStarted {
                number,
                total,
                size,
            } => {
                info!(
                    batch = number,
                    progress = format!("{}/{}", number, total),
                    size,
                    "Analyzing batch {} with {} logs",
                    number,
                    size
                );
            }
            ProgressEvent::BatchAnalyzed {
                number,
                response_time,
            } => {
                debug!(
                    batch = number,
                    response_time_ms = response_time.as_millis(),
                    "Batch analyzed"
                );
            }
            ProgressEvent::BatchFailed { number, reason } => {
                warn!(batch = number, error = %reason, "Batch skipped");
            }
            ProgressEvent::ResultsSaved { path, results } => {
                info!(path = %path.display(), results, "Results saved to {}", path.display());
            }
            ProgressEvent::Completed {
                batches,
                failed,
                total_time,
            } => {
                info!(
                    batches,
                    failed,
                    total_time_ms = total_time.as_millis(),
                    "Analysis complete"
                );
            }
        }
    }
}
