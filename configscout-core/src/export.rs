//! CSV export of scan records.
//!
//! # Format
//! - UTF-8 with a leading byte-order mark (`EF BB BF`)
//! - Header `ConfigName,Value,DefaultValue,RunningValue,Description`
//! - One `\n`-terminated line per record, fields joined with `,`
//!
//! Fields are written verbatim. Embedded commas and quotes are not quoted or
//! escaped, so a description containing a comma adds columns when re-split.

use crate::error::ExportError;
use crate::models::ConfigRecord;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// UTF-8 byte-order mark written at the start of every export.
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Header fields of the export, in record field order.
pub const CSV_HEADER_FIELDS: [&str; 5] =
    ["ConfigName", "Value", "DefaultValue", "RunningValue", "Description"];

/// Header row of the export.
pub const CSV_HEADER: &str = "ConfigName,Value,DefaultValue,RunningValue,Description";

/// Writes the BOM, header and one line per record to `writer`.
///
/// # Errors
/// Returns any error raised by the CSV writer or by `writer`.
///
/// # Example
/// ```rust
/// use configscout_core::export::write_csv;
/// use configscout_core::ConfigRecord;
///
/// let records = vec![ConfigRecord::authentication_mode("Mixed Mode")];
/// let mut out = Vec::new();
/// write_csv(&records, &mut out)?;
/// let text = String::from_utf8(out[3..].to_vec())?;
/// assert!(text.ends_with("Authentication Mode,Mixed Mode,N/A,Mixed Mode,SQL Server authentication mode\n"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn write_csv<W: Write>(records: &[ConfigRecord], mut writer: W) -> csv::Result<()> {
    writer.write_all(&UTF8_BOM)?;

    let mut csv_writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer.write_record(CSV_HEADER_FIELDS)?;
    for record in records {
        csv_writer.write_record(record.fields())?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Exports `records` to the file at `path`, replacing it if present.
///
/// # Errors
/// Returns [`ExportError::CannotCreateFile`] if the file cannot be opened,
/// in which case nothing is written, and [`ExportError::Write`] if writing
/// fails afterwards.
pub fn export_csv(records: &[ConfigRecord], path: &Path) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|source| ExportError::CannotCreateFile {
        path: path.to_path_buf(),
        source,
    })?;

    write_csv(records, BufWriter::new(file)).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    info!("CSV export written: {}", path.display());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io;

    fn sample_records() -> Vec<ConfigRecord> {
        vec![
            ConfigRecord::authentication_mode("Windows Authentication"),
            ConfigRecord {
                name: "xp_cmdshell".to_string(),
                value: "0".to_string(),
                default_value: "0".to_string(),
                running_value: "0".to_string(),
                description: "Enable or disable command shell".to_string(),
            },
        ]
    }

    #[test]
    fn test_write_csv_layout() {
        let mut out = Vec::new();
        write_csv(&sample_records(), &mut out).unwrap();

        assert_eq!(&out[..3], &UTF8_BOM);
        let text = std::str::from_utf8(&out[3..]).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            "Authentication Mode,Windows Authentication,N/A,Windows Authentication,SQL Server authentication mode"
        );
        assert_eq!(lines[2], "xp_cmdshell,0,0,0,Enable or disable command shell");
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_write_csv_empty_records_has_header_only() {
        let mut out = Vec::new();
        write_csv(&[], &mut out).unwrap();
        assert_eq!(out.len(), 3 + CSV_HEADER.len() + 1);
    }

    #[test]
    fn test_write_csv_does_not_escape_commas() {
        let record = ConfigRecord {
            name: "remote access".to_string(),
            value: "1".to_string(),
            default_value: "0".to_string(),
            running_value: "1".to_string(),
            description: "Allow remote connections, including RPC".to_string(),
        };
        let mut out = Vec::new();
        write_csv(&[record], &mut out).unwrap();
        let text = std::str::from_utf8(&out[3..]).unwrap();
        assert!(text.contains("1,0,1,Allow remote connections, including RPC\n"));
        assert!(!text.contains('"'));
    }

    #[test]
    fn test_header_fields_match_header_line() {
        assert_eq!(CSV_HEADER_FIELDS.join(","), CSV_HEADER);
    }

    #[test]
    fn test_write_csv_leaves_quotes_verbatim() {
        let record = ConfigRecord {
            name: "Ole Automation Procedures".to_string(),
            value: "0".to_string(),
            default_value: "0".to_string(),
            running_value: "0".to_string(),
            description: "Enable or disable \"Ole Automation\" procedures".to_string(),
        };
        let mut out = Vec::new();
        write_csv(&[record], &mut out).unwrap();
        let text = std::str::from_utf8(&out[3..]).unwrap();
        assert!(text.ends_with(
            "Ole Automation Procedures,0,0,0,Enable or disable \"Ole Automation\" procedures\n"
        ));
        assert!(!text.contains("\"\""));
        assert!(!text.contains('\r'));
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_csv_surfaces_writer_failure() {
        let result = write_csv(&sample_records(), FailingWriter);
        assert!(result.unwrap_err().is_io_error());
    }

    #[test]
    fn test_write_csv_keeps_international_text() {
        let record = ConfigRecord::authentication_mode("Mode d'authentification é");
        let mut out = Vec::new();
        write_csv(&[record], &mut out).unwrap();
        let text = std::str::from_utf8(&out[3..]).unwrap();
        assert!(text.contains("Mode d'authentification é"));
    }

    #[test]
    fn test_export_csv_missing_directory_is_cannot_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.csv");
        let err = export_csv(&sample_records(), &path).unwrap_err();
        assert_eq!(err.reason(), "cannot-create-file");
        assert!(!path.exists());
    }
}
