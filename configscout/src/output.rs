//! Output of scan results: display population, JSON report and target list.

use crate::display::RecordDisplay;
use configscout_core::{Result, ScanReport, ScoutError};
use std::io::Write;

/// Replaces the display contents with the report's records, in order.
pub fn show_records(display: &mut dyn RecordDisplay, report: &ScanReport) {
    display.clear_all();
    for record in &report.records {
        display.append_record(record);
    }
}

/// Writes the full report as pretty-printed JSON followed by a newline.
///
/// # Errors
/// Returns error if serialization or the write fails.
pub fn write_json_report<W: Write>(report: &ScanReport, mut out: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, report)
        .map_err(|e| ScoutError::serialization("JSON report", e))?;
    writeln!(out).map_err(|source| ScoutError::Io {
        context: "Failed to write JSON report".to_string(),
        source,
    })
}

/// Writes the configuration options a scan reads, one per line.
///
/// # Errors
/// Returns error if the write fails.
pub fn write_targets<W: Write>(targets: &[String], mut out: W) -> Result<()> {
    for target in targets {
        writeln!(out, "{target}").map_err(|source| ScoutError::Io {
            context: "Failed to write target list".to_string(),
            source,
        })?;
    }
    Ok(())
}
