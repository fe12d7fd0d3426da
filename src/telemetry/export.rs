//! CSV export of the telemetry log.
//!
//! Output contract: header `Timestamp,Type,Metric,Value`, one row per record
//! in append order, timestamps as ISO-8601 UTC with millisecond precision.

use crate::telemetry::log::TelemetryRecord;
use chrono::{DateTime, SecondsFormat};
use std::path::{Path, PathBuf};

/// CSV header row.
pub const CSV_HEADER: [&str; 4] = ["Timestamp", "Type", "Metric", "Value"];

/// Export errors.
#[derive(Debug)]
pub enum ExportError {
    IoError(String),
    CsvError(String),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::IoError(e) => write!(f, "IO error: {e}"),
            ExportError::CsvError(e) => write!(f, "CSV error: {e}"),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<csv::Error> for ExportError {
    fn from(e: csv::Error) -> Self {
        ExportError::CsvError(e.to_string())
    }
}

/// File name for an export taken at `export_time_ms`.
pub fn export_filename(export_time_ms: i64) -> String {
    format!("cognitive-load-telemetry-{export_time_ms}.csv")
}

/// Render a Unix millisecond timestamp as ISO-8601, e.g. `2024-01-22T10:00:01.250Z`.
pub fn iso_timestamp(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Write records as CSV into any writer.
pub fn write_records<W: std::io::Write>(
    writer: W,
    records: &[TelemetryRecord],
) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;

    for record in records {
        let value = record.value.map(|v| v.to_string()).unwrap_or_default();
        csv_writer.write_record([
            iso_timestamp(record.timestamp).as_str(),
            record.kind.as_str(),
            record.metric.as_deref().unwrap_or(""),
            value.as_str(),
        ])?;
    }

    csv_writer
        .flush()
        .map_err(|e| ExportError::IoError(e.to_string()))
}

/// Render records as a CSV document.
pub fn to_csv(records: &[TelemetryRecord]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_records(&mut buffer, records)?;
    String::from_utf8(buffer).map_err(|e| ExportError::CsvError(e.to_string()))
}

/// Write an export file into `dir`, creating it if needed.
pub fn write_csv(
    dir: &Path,
    records: &[TelemetryRecord],
    export_time_ms: i64,
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir).map_err(|e| ExportError::IoError(e.to_string()))?;

    let path = dir.join(export_filename(export_time_ms));
    let file = std::fs::File::create(&path).map_err(|e| ExportError::IoError(e.to_string()))?;
    write_records(std::io::BufWriter::new(file), records)?;

    Ok(path)
}
