//! Driver seam between the scan orchestrator and a database session.
//!
//! The orchestrator only talks to these traits, so it can be exercised
//! without a live server. [`crate::mssql`] provides the SQL Server
//! implementation.

use crate::error::{ConnectionError, QueryError};
use crate::models::ConfigRecord;
use crate::security::ConnectionParams;
use async_trait::async_trait;

/// An open session able to answer configuration lookups.
///
/// # Security
/// Implementations must only issue read-only statements and must bind the
/// configuration name as a parameter rather than splicing it into SQL.
#[async_trait]
pub trait ConfigSession: Send {
    /// Derives the server authentication mode as a single record.
    ///
    /// # Errors
    /// Returns error if the probe statement fails or yields no row.
    async fn probe_auth_mode(&mut self) -> Result<ConfigRecord, QueryError>;

    /// Looks up one configuration option by name.
    ///
    /// An unknown name yields an empty vector. On error no records are
    /// returned.
    ///
    /// # Errors
    /// Returns error if the lookup cannot be executed or decoded.
    async fn query_config(&mut self, name: &str) -> Result<Vec<ConfigRecord>, QueryError>;

    /// Closes the session, releasing the underlying connection.
    ///
    /// Consumes the session so it can only be released once. Failures are
    /// logged by the implementation.
    async fn close(self);
}

/// Opens sessions against a target server.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Session type produced by this connector
    type Session: ConfigSession + 'static;

    /// Establishes a session.
    ///
    /// Nothing stays allocated when this returns an error.
    ///
    /// # Errors
    /// Returns the first driver diagnostic if the connection cannot be
    /// established.
    async fn open(&self, params: &ConnectionParams) -> Result<Self::Session, ConnectionError>;

    /// Short driver identifier used in logs
    fn driver_name(&self) -> &'static str;
}
