//! CSV export behaviour against the filesystem.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use configscout_core::export::{CSV_HEADER, UTF8_BOM, export_csv};
use configscout_core::{ConfigRecord, ExportError};
use proptest::prelude::*;
use tempfile::TempDir;

fn records() -> Vec<ConfigRecord> {
    vec![
        ConfigRecord::authentication_mode("Mixed Mode"),
        ConfigRecord {
            name: "clr enabled".to_string(),
            value: "0".to_string(),
            default_value: "0".to_string(),
            running_value: "0".to_string(),
            description: "CLR user code execution enabled in the server".to_string(),
        },
    ]
}

#[test]
fn test_export_starts_with_bom_and_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scan.csv");

    export_csv(&records(), &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..3], &UTF8_BOM);
    let text = std::str::from_utf8(&bytes[3..]).unwrap();
    assert_eq!(text.lines().next(), Some(CSV_HEADER));
    assert_eq!(text.lines().count(), 3);
}

#[test]
fn test_export_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");

    export_csv(&records(), &first).unwrap();
    export_csv(&records(), &second).unwrap();

    assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
}

#[test]
fn test_export_overwrites_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scan.csv");
    std::fs::write(&path, "stale contents that are much longer than the header line\n".repeat(20))
        .unwrap();

    export_csv(&[], &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), UTF8_BOM.len() + CSV_HEADER.len() + 1);
}

#[test]
fn test_export_into_missing_directory_fails_without_partial_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("scan.csv");

    let err = export_csv(&records(), &path).unwrap_err();

    assert!(matches!(err, ExportError::CannotCreateFile { .. }));
    assert!(err.to_string().contains("scan.csv"));
    assert!(!path.exists());
}

fn field() -> impl Strategy<Value = String> {
    "[^,\r\n]{0,40}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_comma_free_fields_survive_split(
        rows in prop::collection::vec((field(), field(), field(), field(), field()), 0..8)
    ) {
        let records: Vec<ConfigRecord> = rows
            .into_iter()
            .map(|(name, value, default_value, running_value, description)| ConfigRecord {
                name,
                value,
                default_value,
                running_value,
                description,
            })
            .collect();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scan.csv");
        export_csv(&records, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        prop_assert_eq!(&bytes[..3], &UTF8_BOM[..]);
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let mut lines = text.split('\n');
        prop_assert_eq!(lines.next(), Some(CSV_HEADER));

        for record in &records {
            let line = lines.next().unwrap();
            let fields: Vec<&str> = line.split(',').collect();
            prop_assert_eq!(fields, record.fields().to_vec());
        }
        prop_assert_eq!(lines.next(), Some(""));
        prop_assert_eq!(lines.next(), None);
    }
}
