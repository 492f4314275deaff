//! Configuration lookups against `sys.configurations`.
//!
//! # Field capacity
//! Decoded text is bounded per column: [`VALUE_FIELD_CAPACITY`] characters
//! for name and numeric columns, [`DESCRIPTION_FIELD_CAPACITY`] for the
//! description. Longer values are cut at a character boundary; the lookup
//! does not fail.

use super::MssqlClient;
use super::diagnostic::query_error;
use crate::error::QueryError;
use crate::models::ConfigRecord;
use tiberius::Row;

/// Maximum characters kept for name and value columns.
pub const VALUE_FIELD_CAPACITY: usize = 255;

/// Maximum characters kept for the description column.
pub const DESCRIPTION_FIELD_CAPACITY: usize = 511;

/// Configuration name is always bound as `@P1`.
pub(crate) const CONFIG_QUERY: &str = "SELECT name, \
     CAST(value AS NVARCHAR(100)) AS value, \
     CAST(value_in_use AS NVARCHAR(100)) AS value_in_use, \
     CAST(minimum AS NVARCHAR(100)) AS minimum, \
     description \
     FROM sys.configurations \
     WHERE name = @P1";

/// Text columns of one `sys.configurations` row as returned by the driver.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    /// `name` column
    pub name: Option<String>,
    /// `value` column, cast to text
    pub value: Option<String>,
    /// `value_in_use` column, cast to text
    pub value_in_use: Option<String>,
    /// `minimum` column, cast to text
    pub minimum: Option<String>,
    /// `description` column
    pub description: Option<String>,
}

impl CatalogRow {
    /// Normalizes the row into a record.
    ///
    /// NULL columns become empty strings and every column is bounded to its
    /// field capacity. `minimum` is reported as the default value.
    pub fn into_record(self) -> ConfigRecord {
        ConfigRecord {
            name: bounded(self.name, VALUE_FIELD_CAPACITY),
            value: bounded(self.value, VALUE_FIELD_CAPACITY),
            default_value: bounded(self.minimum, VALUE_FIELD_CAPACITY),
            running_value: bounded(self.value_in_use, VALUE_FIELD_CAPACITY),
            description: bounded(self.description, DESCRIPTION_FIELD_CAPACITY),
        }
    }
}

/// Maps NULL to an empty string and keeps at most `capacity` characters.
pub fn bounded(value: Option<String>, capacity: usize) -> String {
    let mut value = value.unwrap_or_default();
    if let Some((cut, _)) = value.char_indices().nth(capacity) {
        value.truncate(cut);
    }
    value
}

/// Looks up one configuration option.
///
/// All rows are decoded before anything is returned, so a decode failure
/// never yields a partial batch.
pub(crate) async fn query_config(
    client: &mut MssqlClient,
    name: &str,
) -> Result<Vec<ConfigRecord>, QueryError> {
    let stream = client
        .query(CONFIG_QUERY, &[&name])
        .await
        .map_err(|e| query_error(name, &e))?;

    let rows = stream
        .into_first_result()
        .await
        .map_err(|e| query_error(name, &e))?;

    rows.iter()
        .map(|row| decode_row(name, row).map(CatalogRow::into_record))
        .collect()
}

fn decode_row(target: &str, row: &Row) -> Result<CatalogRow, QueryError> {
    Ok(CatalogRow {
        name: text_column(target, row, 0, "name")?,
        value: text_column(target, row, 1, "value")?,
        value_in_use: text_column(target, row, 2, "value_in_use")?,
        minimum: text_column(target, row, 3, "minimum")?,
        description: text_column(target, row, 4, "description")?,
    })
}

pub(crate) fn text_column(
    target: &str,
    row: &Row,
    index: usize,
    column: &'static str,
) -> Result<Option<String>, QueryError> {
    row.try_get::<&str, _>(index)
        .map(|value| value.map(str::to_owned))
        .map_err(|e| QueryError::Decode {
            target: target.to_string(),
            column,
            message: e.to_string(),
        })
}
