//! Authentication mode probe.

use super::MssqlClient;
use super::diagnostic::query_error;
use super::query::{VALUE_FIELD_CAPACITY, bounded, text_column};
use crate::error::QueryError;
use crate::models::{AUTH_MODE_NAME, ConfigRecord};

/// Evaluates to NULL when the property is neither 0 nor 1.
pub(crate) const AUTH_MODE_QUERY: &str = "SELECT CASE SERVERPROPERTY('IsIntegratedSecurityOnly') \
     WHEN 1 THEN 'Windows Authentication' \
     WHEN 0 THEN 'Mixed Mode' \
     END AS AuthMode";

/// Runs the probe and synthesizes the authentication mode record.
///
/// An unexpected server state yields an empty classification, not an error.
pub(crate) async fn probe_auth_mode(client: &mut MssqlClient) -> Result<ConfigRecord, QueryError> {
    let row = client
        .query(AUTH_MODE_QUERY, &[])
        .await
        .map_err(|e| query_error(AUTH_MODE_NAME, &e))?
        .into_row()
        .await
        .map_err(|e| query_error(AUTH_MODE_NAME, &e))?
        .ok_or_else(|| QueryError::NoRow {
            target: AUTH_MODE_NAME.to_string(),
        })?;

    let classification = text_column(AUTH_MODE_NAME, &row, 0, "AuthMode")?;

    Ok(ConfigRecord::authentication_mode(bounded(
        classification,
        VALUE_FIELD_CAPACITY,
    )))
}
