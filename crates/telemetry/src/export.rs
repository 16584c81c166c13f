//! Telemetry export to JSON files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use linetrace_protocol::TelemetryRecord;

use crate::error::TelemetryError;

/// Result of a completed export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// File name relative to the export directory.
    pub filename: String,
    pub path: PathBuf,
    pub count: usize,
}

/// `telemetry_YYYYmmdd_HHMMSS.json` for the given instant.
pub fn export_filename(at: DateTime<Local>) -> String {
    format!("telemetry_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// Write `records` as a pretty-printed JSON array under `dir`.
///
/// The directory is created if needed. An export taken within the same
/// second as a previous one overwrites it.
pub fn write_export(
    dir: &Path,
    records: &[TelemetryRecord],
    at: DateTime<Local>,
) -> Result<ExportSummary, TelemetryError> {
    std::fs::create_dir_all(dir)?;

    let filename = export_filename(at);
    let path = dir.join(&filename);
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(ExportSummary {
        filename,
        path,
        count: records.len(),
    })
}
