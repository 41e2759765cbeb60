//! Swing data log and its plain-text export.
//!
//! One line per reporting tick:
//!
//! `Timestamp: 2026-10-17T09:30:01.000Z, Max Swing Length: 1.42 meters`
//!
//! Export appends, so repeated exports during a session accumulate in the
//! same file.

use crate::types::{SwingRecord, Timestamp};
use crate::{MetricsError, Result};
use chrono::SecondsFormat;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Default export destination, relative to the working directory.
pub const DEFAULT_SWING_LOG: &str = "SwingData.txt";

/// Append-only record of per-interval maximum swing lengths.
#[derive(Debug, Clone, Default)]
pub struct SwingDataLog {
    records: Vec<SwingRecord>,
}

impl SwingDataLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, timestamp: Timestamp, max_swing_length: f64) {
        self.records.push(SwingRecord {
            timestamp,
            max_swing_length,
        });
    }

    pub fn records(&self) -> &[SwingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append every record to `path`. Returns the number of lines written.
    /// The in-memory log is left untouched.
    pub fn export(&self, path: impl AsRef<Path>) -> Result<usize> {
        export_records(&self.records, path)
    }
}

/// Format one log line (without the trailing newline).
pub fn format_record(record: &SwingRecord) -> String {
    format!(
        "Timestamp: {}, Max Swing Length: {:.2} meters",
        record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        record.max_swing_length
    )
}

/// Append `records` to `path`, creating the file if needed.
pub fn export_records(records: &[SwingRecord], path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let to_export_error = |source: std::io::Error| MetricsError::Export {
        path: path.to_path_buf(),
        source,
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_export_error)?;
    let mut out = BufWriter::new(file);

    for record in records {
        writeln!(out, "{}", format_record(record)).map_err(to_export_error)?;
    }
    out.flush().map_err(to_export_error)?;

    log::info!("Exported {} swing records to {}", records.len(), path.display());
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;

    fn temp_path(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!(
            "motion_metrics_{}_{}_{}.txt",
            tag,
            std::process::id(),
            nanos
        ))
    }

    fn sample_log() -> SwingDataLog {
        let mut log = SwingDataLog::new();
        log.push(Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 1).unwrap(), 1.4167);
        log.push(Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 2).unwrap(), 0.0);
        log
    }

    #[test]
    fn test_format_record() {
        let log = sample_log();
        assert_eq!(
            format_record(&log.records()[0]),
            "Timestamp: 2026-10-17T09:30:01.000Z, Max Swing Length: 1.42 meters"
        );
        assert_eq!(
            format_record(&log.records()[1]),
            "Timestamp: 2026-10-17T09:30:02.000Z, Max Swing Length: 0.00 meters"
        );
    }

    #[test]
    fn test_export_appends_across_calls() {
        let path = temp_path("append");
        let log = sample_log();

        assert_eq!(log.export(&path).unwrap(), 2);
        assert_eq!(log.export(&path).unwrap(), 2);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], lines[2]);
        assert_eq!(lines[1], lines[3]);
        assert!(lines[1].ends_with("Max Swing Length: 0.00 meters"));

        // Export does not drain the log.
        assert_eq!(log.len(), 2);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_export_keeps_existing_content() {
        let path = temp_path("existing");
        std::fs::write(&path, "previous session\n").unwrap();

        sample_log().export(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("previous session\n"));
        assert_eq!(contents.lines().count(), 3);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_export_failure_reports_path() {
        let dir = temp_path("missing_dir");
        let path = dir.join("nested").join("SwingData.txt");
        let log = sample_log();

        match log.export(&path) {
            Err(MetricsError::Export { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected export error, got {:?}", other),
        }
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_empty_log_creates_file() {
        let path = temp_path("empty");
        assert_eq!(SwingDataLog::new().export(&path).unwrap(), 0);
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }
}
