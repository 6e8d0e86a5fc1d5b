use super::analysis::{BatchOutcome, LogAnalyzer};
use super::batcher::into_batches;
use super::error::PipelineError;
use super::loader::load_logs;
use super::normalizer::normalize;
use super::pacing::Pacer;
use super::sink::{AnalysisResults, OutputFormat, ResultMode, ResultSink};
use crate::progress::{LoggingHandler, ProgressEvent, ProgressHandler};
use chrono::{DateTime, Local};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Per-run parameters of the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub batch_size: NonZeroUsize,
    pub max_entry_chars: usize,
    pub result_mode: ResultMode,
    pub output_format: OutputFormat,
    pub output_dir: PathBuf,
}

/// What a run did
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Local>,
    /// Raw lines read from the input
    pub total_lines: usize,
    /// Entries left after normalization
    pub entries: usize,
    pub batches: usize,
    pub failed_batches: usize,
    pub results: AnalysisResults,
    /// `None` when there was nothing to analyze
    pub output_path: Option<PathBuf>,
}

impl RunReport {
    fn empty(started_at: DateTime<Local>, mode: ResultMode, total_lines: usize) -> Self {
        Self {
            started_at,
            total_lines,
            entries: 0,
            batches: 0,
            failed_batches: 0,
            results: AnalysisResults::empty(mode),
            output_path: None,
        }
    }

    pub fn analyzed_batches(&self) -> usize {
        self.batches - self.failed_batches
    }
}

/// Drives one pass over a log file: load, normalize, batch, analyze, save.
///
/// Batches are sent strictly one after another and the pacer is awaited after
/// every request. A failed batch is logged and left out of the results; it
/// is never retried.
pub struct Orchestrator {
    settings: RunSettings,
    analyzer: LogAnalyzer,
    pacer: Arc<dyn Pacer>,
    progress: Arc<dyn ProgressHandler>,
}

impl Orchestrator {
    pub fn new(settings: RunSettings, analyzer: LogAnalyzer, pacer: Arc<dyn Pacer>) -> Self {
        Self {
            settings,
            analyzer,
            pacer,
            progress: Arc::new(LoggingHandler),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub async fn run(&self, log_path: &Path) -> Result<RunReport, PipelineError> {
        self.run_at(log_path, Local::now()).await
    }

    /// Same as [`Orchestrator::run`] with an explicit start time, which
    /// determines the output file name.
    pub async fn run_at(
        &self,
        log_path: &Path,
        started_at: DateTime<Local>,
    ) -> Result<RunReport, PipelineError> {
        let start = Instant::now();
        let mode = self.settings.result_mode;

        let raw = load_logs(log_path)?;
        if raw.is_empty() {
            self.progress.on_progress(&ProgressEvent::NothingToProcess {
                path: log_path.to_path_buf(),
            });
            return Ok(RunReport::empty(started_at, mode, 0));
        }

        self.progress.on_progress(&ProgressEvent::Started {
            path: log_path.to_path_buf(),
            entries: raw.len(),
        });

        let normalized = normalize(&raw, self.settings.max_entry_chars);
        debug!(
            raw = raw.len(),
            normalized = normalized.len(),
            "Normalized log entries"
        );
        if normalized.is_empty() {
            self.progress.on_progress(&ProgressEvent::NothingToProcess {
                path: log_path.to_path_buf(),
            });
            return Ok(RunReport::empty(started_at, mode, raw.len()));
        }

        let entries = normalized.len();
        let batches = into_batches(normalized, self.settings.batch_size);
        let total = batches.len();
        let mut sink = ResultSink::new(mode, self.settings.output_format);
        let mut failed = 0;

        for batch in &batches {
            self.progress.on_progress(&ProgressEvent::BatchStarted {
                number: batch.number(),
                total,
                size: batch.len(),
            });

            let outcome = self.analyzer.analyze_batch(batch).await;
            self.pacer.pause().await;

            match outcome {
                BatchOutcome::Analyzed {
                    analysis,
                    response_time,
                } => {
                    self.progress.on_progress(&ProgressEvent::BatchAnalyzed {
                        number: batch.number(),
                        response_time,
                    });
                    sink.record(batch, &analysis);
                }
                BatchOutcome::Failed { reason } => {
                    failed += 1;
                    self.progress.on_progress(&ProgressEvent::BatchFailed {
                        number: batch.number(),
                        reason,
                    });
                }
            }
        }

        let output_path = sink.write(&self.settings.output_dir, &started_at)?;
        self.progress.on_progress(&ProgressEvent::ResultsSaved {
            path: output_path.clone(),
            results: sink.len(),
        });
        self.progress.on_progress(&ProgressEvent::Completed {
            batches: total,
            failed,
            total_time: start.elapsed(),
        });

        Ok(RunReport {
            started_at,
            total_lines: raw.len(),
            entries,
            batches: total,
            failed_batches: failed,
            results: sink.into_results(),
            output_path: Some(output_path),
        })
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("settings", &self.settings)
            .field("analyzer", &self.analyzer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{BackendError, MockLLMClient, MockResponse};
    use crate::pipeline::analysis::AnalysisSettings;
    use crate::pipeline::pacing::NoDelay;
    use async_trait::async_trait;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    #[derive(Default)]
    struct CountingPacer {
        pauses: AtomicUsize,
    }

    #[async_trait]
    impl Pacer for CountingPacer {
        async fn pause(&self) {
            self.pauses.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn settings(dir: &Path, batch_size: usize) -> RunSettings {
        RunSettings {
            batch_size: NonZeroUsize::new(batch_size).unwrap(),
            max_entry_chars: 1000,
            result_mode: ResultMode::Paired,
            output_format: OutputFormat::Json,
            output_dir: dir.to_path_buf(),
        }
    }

    #[tokio::test]
    async fn test_missing_input_is_noop() {
        let dir = TempDir::new().unwrap();
        let client = Arc::new(MockLLMClient::new());
        let analyzer = LogAnalyzer::new(client.clone(), AnalysisSettings::default());
        let orchestrator = Orchestrator::new(settings(dir.path(), 10), analyzer, Arc::new(NoDelay));

        let report = orchestrator
            .run(&dir.path().join("missing.log"))
            .await
            .unwrap();

        assert_eq!(client.call_count(), 0);
        assert!(report.output_path.is_none());
        assert!(report.results.is_empty());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_blank_input_is_noop() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("blank.log");
        fs::write(&log, "\n   \n\t\n").unwrap();

        let client = Arc::new(MockLLMClient::new());
        let analyzer = LogAnalyzer::new(client.clone(), AnalysisSettings::default());
        let orchestrator = Orchestrator::new(settings(dir.path(), 10), analyzer, Arc::new(NoDelay));

        let report = orchestrator.run(&log).await.unwrap();

        assert_eq!(report.total_lines, 3);
        assert_eq!(report.entries, 0);
        assert_eq!(client.call_count(), 0);
        assert!(report.output_path.is_none());
    }

    #[tokio::test]
    async fn test_pauses_after_every_request() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("app.log");
        fs::write(&log, "a\nb\nc\nd\ne\n").unwrap();

        let client = Arc::new(MockLLMClient::new());
        client.add_responses(vec![
            MockResponse::text("one"),
            MockResponse::error(BackendError::NetworkError {
                message: "connection reset".to_string(),
            }),
            MockResponse::text("three"),
        ]);
        let pacer = Arc::new(CountingPacer::default());
        let analyzer = LogAnalyzer::new(client.clone(), AnalysisSettings::default());
        let orchestrator = Orchestrator::new(settings(dir.path(), 2), analyzer, pacer.clone());

        let report = orchestrator.run(&log).await.unwrap();

        assert_eq!(client.call_count(), 3);
        assert_eq!(pacer.pauses.load(Ordering::SeqCst), 3);
        assert_eq!(report.batches, 3);
        assert_eq!(report.failed_batches, 1);
        assert_eq!(report.analyzed_batches(), 2);
    }

    #[tokio::test]
    async fn test_requests_follow_batch_order() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("app.log");
        fs::write(&log, "first\nsecond\nthird\n").unwrap();

        let client = Arc::new(MockLLMClient::new());
        client.add_responses(vec![MockResponse::text("x"), MockResponse::text("y")]);
        let analyzer = LogAnalyzer::new(client.clone(), AnalysisSettings::default());
        let orchestrator = Orchestrator::new(settings(dir.path(), 2), analyzer, Arc::new(NoDelay));

        orchestrator.run(&log).await.unwrap();

        let requests = client.requests();
        assert!(requests[0].messages[1].content.ends_with("first\n\nsecond"));
        assert!(requests[1].messages[1].content.ends_with("third"));
    }
}
