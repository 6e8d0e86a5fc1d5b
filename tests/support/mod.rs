//! Shared helpers for loglens integration tests

#![allow(dead_code)]

use chrono::{DateTime, Local, TimeZone};
use loglens::pipeline::{NoDelay, OutputFormat, ResultMode, RunSettings};
use loglens::progress::NoOpHandler;
use loglens::{LogAnalyzer, MockLLMClient, Orchestrator};
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 24 Dec 2024, 09:05 local time
pub fn christmas_eve() -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2024, 12, 24, 9, 5, 0)
        .single()
        .expect("unambiguous local time")
}

pub fn write_log(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write log fixture");
    path
}

pub fn run_settings(
    output_dir: &Path,
    batch_size: usize,
    result_mode: ResultMode,
    output_format: OutputFormat,
) -> RunSettings {
    RunSettings {
        batch_size: NonZeroUsize::new(batch_size).expect("batch size must be positive"),
        max_entry_chars: 1000,
        result_mode,
        output_format,
        output_dir: output_dir.to_path_buf(),
    }
}

pub fn orchestrator(settings: RunSettings, client: Arc<MockLLMClient>) -> Orchestrator {
    let analyzer = LogAnalyzer::new(client, Default::default());
    Orchestrator::new(settings, analyzer, Arc::new(NoDelay))
        .with_progress(Arc::new(NoOpHandler))
}

pub fn files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map(|entries| entries.filter_map(|e| e.ok().map(|e| e.path())).collect())
        .unwrap_or_default();
    files.sort();
    files
}
