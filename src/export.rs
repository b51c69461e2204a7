//! Report export to JSON files.
//!
//! A report is wrapped in a [`ReportDocument`] carrying a scan id and a
//! generation timestamp, then written as pretty-printed JSON. Export never
//! runs before the scan that produced the report has finished.

use crate::error::{ExportError, ExportResult};
use crate::report::ScanReport;
use crate::types::ScanId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// An exported scan report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    /// Unique identifier for this scan.
    pub scan_id: ScanId,
    pub generated_at: DateTime<Utc>,
    /// Name and version of the tool that wrote the file.
    pub generator: String,
    #[serde(flatten)]
    pub report: ScanReport,
}

impl ReportDocument {
    pub fn new(report: ScanReport) -> Self {
        Self {
            scan_id: ScanId::new(),
            generated_at: Utc::now(),
            generator: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            report,
        }
    }

    /// Use an id assigned before the scan started.
    pub fn with_scan_id(mut self, scan_id: ScanId) -> Self {
        self.scan_id = scan_id;
        self
    }

    /// Pretty-printed JSON form of the document.
    pub fn to_pretty_string(&self) -> ExportResult<String> {
        serde_json::to_string_pretty(self).map_err(ExportError::Encode)
    }
}

/// Write `document` to `path`, replacing any existing file.
pub fn export_report(document: &ReportDocument, path: &Path) -> ExportResult<()> {
    let mut content = document.to_pretty_string()?;
    content.push('\n');

    fs::write(path, content).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), scan_id = %document.scan_id, "report exported");
    Ok(())
}

/// Read back a document written by [`export_report`].
pub fn load_report(path: &Path) -> ExportResult<ReportDocument> {
    let content = fs::read_to_string(path).map_err(|source| ExportError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(ExportError::Decode)
}
