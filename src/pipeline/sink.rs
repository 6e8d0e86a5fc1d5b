//! Accumulation and persistence of analysis results
//!
//! The sink collects results in one of two shapes:
//!
//! - [`ResultMode::Paired`]: the batch response is split on blank lines and
//!   zipped against the batch entries. The service is not obliged to answer
//!   one fragment per entry, so this pairing is best effort: surplus entries
//!   or fragments are dropped.
//! - [`ResultMode::PerBatch`]: the whole response is kept as one block. In
//!   text output an empty answer is written as [`EMPTY_ANALYSIS_BLOCK`], so
//!   every analyzed batch has exactly one block.
//!
//! At the end of a run the results are written once, to a file named after
//! the run's start time (`analysis_<MM>_<DD>_<YYYY>_<HH>_<MM>.<ext>`).

use super::batcher::Batch;
use super::error::PipelineError;
use super::prompt::ENTRY_DELIMITER;
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const FILE_PREFIX: &str = "analysis_";
const TIMESTAMP_FORMAT: &str = "%m_%d_%Y_%H_%M";

/// Text block written for an analyzed batch whose answer was empty
pub const EMPTY_ANALYSIS_BLOCK: &str = "(no analysis)";

/// How results are shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultMode {
    /// One `{log, analysis}` pair per entry
    #[default]
    Paired,
    /// One analysis block per batch
    PerBatch,
}

impl FromStr for ResultMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "paired" => Ok(ResultMode::Paired),
            "per-batch" | "per_batch" | "batch" => Ok(ResultMode::PerBatch),
            other => Err(format!(
                "unknown result mode '{}' (expected paired or per-batch)",
                other
            )),
        }
    }
}

impl fmt::Display for ResultMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultMode::Paired => write!(f, "paired"),
            ResultMode::PerBatch => write!(f, "per-batch"),
        }
    }
}

/// Serialization of the result file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" | "txt" => Ok(OutputFormat::Text),
            other => Err(format!(
                "unknown output format '{}' (expected json or text)",
                other
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}

/// An entry paired with its (heuristically matched) analysis fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedResult {
    pub log: String,
    pub analysis: String,
}

/// The full response for one batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// 1-based batch number
    pub batch: usize,
    pub logs: Vec<String>,
    pub analysis: String,
}

/// Accumulated results of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisResults {
    Paired(Vec<PairedResult>),
    PerBatch(Vec<BatchResult>),
}

impl AnalysisResults {
    pub fn empty(mode: ResultMode) -> Self {
        match mode {
            ResultMode::Paired => AnalysisResults::Paired(Vec::new()),
            ResultMode::PerBatch => AnalysisResults::PerBatch(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AnalysisResults::Paired(results) => results.len(),
            AnalysisResults::PerBatch(results) => results.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Splits a batch response into per-entry fragments, trimming each.
pub fn split_fragments(analysis: &str) -> Vec<&str> {
    analysis.split(ENTRY_DELIMITER).map(str::trim).collect()
}

/// File name for a run started at `started_at`.
pub fn output_file_name<Tz>(started_at: &DateTime<Tz>, format: OutputFormat) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    format!(
        "{}{}.{}",
        FILE_PREFIX,
        started_at.format(TIMESTAMP_FORMAT),
        format.extension()
    )
}

pub struct ResultSink {
    format: OutputFormat,
    results: AnalysisResults,
}

impl ResultSink {
    pub fn new(mode: ResultMode, format: OutputFormat) -> Self {
        Self {
            format,
            results: AnalysisResults::empty(mode),
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn results(&self) -> &AnalysisResults {
        &self.results
    }

    pub fn into_results(self) -> AnalysisResults {
        self.results
    }

    /// Records the analysis of one successfully analyzed batch.
    pub fn record(&mut self, batch: &Batch, analysis: &str) {
        match &mut self.results {
            AnalysisResults::Paired(results) => {
                let fragments = split_fragments(analysis);
                if fragments.len() != batch.len() {
                    debug!(
                        batch = batch.number(),
                        entries = batch.len(),
                        fragments = fragments.len(),
                        "Response fragments do not match entry count"
                    );
                }
                results.extend(batch.texts().zip(fragments).map(|(log, fragment)| {
                    PairedResult {
                        log: log.to_string(),
                        analysis: fragment.to_string(),
                    }
                }));
            }
            AnalysisResults::PerBatch(results) => results.push(BatchResult {
                batch: batch.number(),
                logs: batch.texts().map(str::to_string).collect(),
                analysis: analysis.to_string(),
            }),
        }
    }

    /// Serializes the accumulated results in the configured format.
    pub fn render(&self) -> Result<String, PipelineError> {
        match self.format {
            OutputFormat::Json => self.render_json(),
            OutputFormat::Text => Ok(self.render_text()),
        }
    }

    fn render_json(&self) -> Result<String, PipelineError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        match &self.results {
            AnalysisResults::Paired(results) => results.serialize(&mut serializer)?,
            AnalysisResults::PerBatch(results) => results.serialize(&mut serializer)?,
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    // Blank lines only ever separate blocks, so they are squeezed out of
    // block bodies.
    fn render_text(&self) -> String {
        let blocks: Vec<String> = match &self.results {
            AnalysisResults::Paired(results) => results
                .iter()
                .map(|r| {
                    collapse_blank_lines(&format!("Log: {}\nAnalysis: {}", r.log, r.analysis))
                })
                .collect(),
            AnalysisResults::PerBatch(results) => results
                .iter()
                .map(|r| match collapse_blank_lines(&r.analysis) {
                    block if block.is_empty() => EMPTY_ANALYSIS_BLOCK.to_string(),
                    block => block,
                })
                .collect(),
        };

        let mut output = blocks.join("\n\n");
        if !output.is_empty() {
            output.push('\n');
        }
        output
    }

    /// Writes the rendered results into `dir` and returns the file path.
    ///
    /// An existing file with the same name is never replaced; a numeric
    /// suffix is appended instead.
    pub fn write<Tz>(
        &self,
        dir: &Path,
        started_at: &DateTime<Tz>,
    ) -> Result<PathBuf, PipelineError>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let content = self.render()?;
        fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))?;

        let stem = format!("{}{}", FILE_PREFIX, started_at.format(TIMESTAMP_FORMAT));
        let extension = self.format.extension();
        let mut attempt = 0usize;

        loop {
            let name = if attempt == 0 {
                format!("{}.{}", stem, extension)
            } else {
                format!("{}_{}.{}", stem, attempt, extension)
            };
            let path = dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(content.as_bytes())
                        .map_err(|e| PipelineError::io(&path, e))?;
                    debug!(path = %path.display(), results = self.len(), "Wrote results");
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    attempt += 1;
                }
                Err(e) => return Err(PipelineError::io(&path, e)),
            }
        }
    }
}

fn collapse_blank_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
