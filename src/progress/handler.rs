//! Progress handler trait and events

use std::path::PathBuf;
use std::time::Duration;

/// Events emitted while a run proceeds
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Input loaded and about to be processed
    Started { path: PathBuf, entries: usize },

    /// Input was missing or had nothing worth analyzing
    NothingToProcess { path: PathBuf },

    /// A batch is about to be sent
    BatchStarted {
        number: usize,
        total: usize,
        size: usize,
    },

    /// The service answered for a batch
    BatchAnalyzed {
        number: usize,
        response_time: Duration,
    },

    /// The request for a batch failed and the batch was skipped
    BatchFailed { number: usize, reason: String },

    /// Results were written
    ResultsSaved { path: PathBuf, results: usize },

    /// All batches processed
    Completed {
        batches: usize,
        failed: usize,
        total_time: Duration,
    },
}

/// Trait for handling progress events during a run
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingHandler {
        count: Arc<AtomicUsize>,
    }

    impl ProgressHandler for CountingHandler {
        fn on_progress(&self, _event: &ProgressEvent) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_noop_handler() {
        let handler = NoOpHandler;
        handler.on_progress(&ProgressEvent::NothingToProcess {
            path: PathBuf::from("/var/log/missing.log"),
        });
    }

    #[test]
    fn test_progress_events() {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = CountingHandler {
            count: count.clone(),
        };

        handler.on_progress(&ProgressEvent::Started {
            path: PathBuf::from("app.log"),
            entries: 12,
        });
        handler.on_progress(&ProgressEvent::BatchStarted {
            number: 1,
            total: 2,
            size: 10,
        });
        handler.on_progress(&ProgressEvent::Completed {
            batches: 2,
            failed: 0,
            total_time: Duration::from_secs(5),
        });

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_event_debug() {
        let event = ProgressEvent::BatchStarted {
            number: 1,
            total: 3,
            size: 10,
        };
        let debug_str = format!("{:?}", event);
        assert!(debug_str.contains("BatchStarted"));
        assert!(debug_str.contains("number: 1"));
    }
}
