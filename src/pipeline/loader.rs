//! Log file loading

use super::error::PipelineError;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

/// One raw line of the input, identified by its 1-based line number
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    pub line: usize,
    pub text: String,
}

impl LogRecord {
    pub fn new(line: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
        }
    }
}

/// Reads every line of `path` in order.
///
/// A path that does not exist or is not a regular file yields an empty
/// sequence after a warning. Every other I/O error is fatal.
pub fn load_logs(path: &Path) -> Result<Vec<LogRecord>, PipelineError> {
    match fs::metadata(path) {
        Ok(meta) if !meta.is_file() => {
            warn!(path = %path.display(), "Log path is not a regular file");
            return Ok(Vec::new());
        }
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "Log file not found");
            return Ok(Vec::new());
        }
        Err(e) => return Err(PipelineError::io(path, e)),
    }

    let content = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    let records: Vec<LogRecord> = content
        .lines()
        .enumerate()
        .map(|(i, text)| LogRecord::new(i + 1, text))
        .collect();

    debug!(path = %path.display(), lines = records.len(), "Loaded log file");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_preserves_order_and_line_numbers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "first\nsecond\n\nfourth\n").unwrap();

        let records = load_logs(&path).unwrap();

        assert_eq!(
            records,
            vec![
                LogRecord::new(1, "first"),
                LogRecord::new(2, "second"),
                LogRecord::new(3, ""),
                LogRecord::new(4, "fourth"),
            ]
        );
    }

    #[test]
    fn test_load_handles_crlf() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("win.log");
        fs::write(&path, "a\r\nb\r\n").unwrap();

        let records = load_logs(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "a");
        assert_eq!(records[1].text, "b");
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let records = load_logs(&dir.path().join("missing.log")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let records = load_logs(dir.path()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("binary.log");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let err = load_logs(&path).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn test_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.log");
        fs::write(&path, "").unwrap();

        assert!(load_logs(&path).unwrap().is_empty());
    }
}
