//! Trimming and length-capping of raw log lines

use super::loader::LogRecord;
use serde::Serialize;

/// Default cap on a normalized entry, in characters
pub const DEFAULT_MAX_ENTRY_CHARS: usize = 1000;

/// A trimmed, length-capped, non-empty log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedRecord {
    pub line: usize,
    pub text: String,
}

/// Trims `text` and caps it at `max_chars` characters.
///
/// Returns `None` when nothing but whitespace remains.
pub fn normalize_line(text: &str, max_chars: usize) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let capped = match trimmed.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &trimmed[..byte_idx],
        None => trimmed,
    };

    if capped.is_empty() {
        None
    } else {
        Some(capped.to_string())
    }
}

/// Normalizes every record, dropping blank ones and keeping input order.
pub fn normalize(records: &[LogRecord], max_chars: usize) -> Vec<NormalizedRecord> {
    records
        .iter()
        .filter_map(|record| {
            normalize_line(&record.text, max_chars).map(|text| NormalizedRecord {
                line: record.line,
                text,
            })
        })
        .collect()
}
