//! Human-readable history export

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use apiscope_document::HttpMethod;

use crate::error::{StorageError, StorageResult};
use crate::types::HistoryEntry;

/// Export document format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unsupported export format: {other}")),
        }
    }
}

/// Flattened view of a history entry
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    timestamp: String,
    method: HttpMethod,
    url: &'a str,
    path: &'a str,
    summary: Option<&'a str>,
    duration: u64,
    status: Option<u16>,
    error: Option<&'a str>,
    request: Value,
    response: Option<Value>,
}

impl<'a> ExportRow<'a> {
    fn from_entry(entry: &'a HistoryEntry) -> StorageResult<Self> {
        Ok(Self {
            timestamp: entry.timestamp.to_rfc3339(),
            method: entry.method,
            url: &entry.url,
            path: &entry.path,
            summary: entry.summary.as_deref(),
            duration: entry.duration_ms,
            status: entry.outcome.status(),
            error: entry.outcome.error(),
            request: serde_json::to_value(&entry.request)?,
            response: entry
                .outcome
                .response()
                .map(serde_json::to_value)
                .transpose()?,
        })
    }
}

const CSV_HEADER: [&str; 10] = [
    "timestamp",
    "method",
    "url",
    "path",
    "summary",
    "duration",
    "status",
    "error",
    "request",
    "response",
];

/// Render entries as a JSON array or a CSV table.
///
/// In CSV, the request and response columns hold compact JSON.
pub fn export_entries(entries: &[&HistoryEntry], format: ExportFormat) -> StorageResult<String> {
    let rows = entries
        .iter()
        .map(|entry| ExportRow::from_entry(entry))
        .collect::<StorageResult<Vec<_>>>()?;

    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(&rows)?),
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record(CSV_HEADER)?;

            for row in &rows {
                writer.write_record([
                    row.timestamp.clone(),
                    row.method.to_string(),
                    row.url.to_string(),
                    row.path.to_string(),
                    row.summary.unwrap_or_default().to_string(),
                    row.duration.to_string(),
                    row.status.map(|s| s.to_string()).unwrap_or_default(),
                    row.error.unwrap_or_default().to_string(),
                    row.request.to_string(),
                    row.response
                        .as_ref()
                        .map(Value::to_string)
                        .unwrap_or_default(),
                ])?;
            }

            let bytes = writer
                .into_inner()
                .map_err(|e| StorageError::Backend(e.to_string()))?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}
