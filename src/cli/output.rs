//! Console rendering of run results and batch plans
//!
//! Result files are written by the pipeline's sink; this module only formats
//! what is echoed to stdout.

use crate::pipeline::{AnalysisResults, Batch, RunReport};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";
const PREVIEW_CHARS: usize = 80;

/// Formats the "Analysis Complete" listing for a finished run
pub fn format_report(report: &RunReport) -> String {
    let mut output = String::new();

    output.push_str("Analysis Complete\n");
    output.push_str(RULE);
    output.push_str("\n\n");

    match &report.results {
        AnalysisResults::Paired(results) => {
            for result in results {
                output.push_str(&format!("Log: {}\n", result.log));
                output.push_str(&format!("Analysis: {}\n\n", result.analysis));
            }
        }
        AnalysisResults::PerBatch(results) => {
            for result in results {
                output.push_str(&format!(
                    "Batch {} ({} logs):\n{}\n\n",
                    result.batch,
                    result.logs.len(),
                    result.analysis
                ));
            }
        }
    }

    output.push_str(&format!(
        "Batches: {} analyzed, {} failed, {} total\n",
        report.analyzed_batches(),
        report.failed_batches,
        report.batches
    ));
    output.push_str(&format!(
        "Entries: {} of {} lines\n",
        report.entries, report.total_lines
    ));

    if let Some(ref path) = report.output_path {
        output.push_str(&format!("\nResults saved to {}\n", path.display()));
    }

    output
}

/// Formats a dry-run listing of batches
pub fn format_batch_plan(batches: &[Batch], total_lines: usize) -> String {
    let entries: usize = batches.iter().map(Batch::len).sum();
    let mut output = String::new();

    output.push_str("Batch Plan\n");
    output.push_str(RULE);
    output.push_str("\n\n");
    output.push_str(&format!(
        "Lines: {}  Entries: {}  Batches: {}\n\n",
        total_lines,
        entries,
        batches.len()
    ));

    for batch in batches {
        output.push_str(&format!("Batch {} ({} logs)\n", batch.number(), batch.len()));
        for (i, record) in batch.records.iter().enumerate() {
            let connector = if i + 1 == batch.len() {
                "\u{2514}\u{2500}"
            } else {
                "\u{251C}\u{2500}"
            };
            output.push_str(&format!(
                "{} {:>5}: {}\n",
                connector,
                record.line,
                preview(&record.text)
            ));
        }
        output.push('\n');
    }

    output
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}\u{2026}", &text[..idx]),
        None => text.to_string(),
    }
}
