//! SQL Server implementation of the session traits.
//!
//! # Security
//! - Only read-only `SELECT` statements against system catalogs are issued
//! - Configuration names are bound as parameters, never spliced into SQL
//! - Passwords are handed to the driver and never logged

mod connection;
mod diagnostic;
mod probe;
mod query;

pub use query::{CatalogRow, DESCRIPTION_FIELD_CAPACITY, VALUE_FIELD_CAPACITY, bounded};

use crate::error::{ConnectionError, QueryError};
use crate::models::ConfigRecord;
use crate::security::ConnectionParams;
use crate::session::{ConfigSession, Connector};
use async_trait::async_trait;
use tiberius::Client;
use tokio::net::TcpStream;
use tokio_util::compat::Compat;
use tracing::{debug, warn};

pub(crate) type MssqlClient = Client<Compat<TcpStream>>;

/// Opens SQL Server sessions over TDS.
#[derive(Debug, Default, Clone, Copy)]
pub struct MssqlConnector;

impl MssqlConnector {
    /// Creates a new connector
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for MssqlConnector {
    type Session = MssqlSession;

    async fn open(&self, params: &ConnectionParams) -> Result<MssqlSession, ConnectionError> {
        let client = connection::connect(params).await?;
        debug!("SQL Server session established");
        Ok(MssqlSession { client })
    }

    fn driver_name(&self) -> &'static str {
        "sqlserver"
    }
}

/// An authenticated SQL Server session.
pub struct MssqlSession {
    client: MssqlClient,
}

impl std::fmt::Debug for MssqlSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MssqlSession").finish_non_exhaustive()
    }
}

#[async_trait]
impl ConfigSession for MssqlSession {
    async fn probe_auth_mode(&mut self) -> Result<ConfigRecord, QueryError> {
        probe::probe_auth_mode(&mut self.client).await
    }

    async fn query_config(&mut self, name: &str) -> Result<Vec<ConfigRecord>, QueryError> {
        query::query_config(&mut self.client, name).await
    }

    async fn close(self) {
        if let Err(e) = self.client.close().await {
            warn!("SQL Server session did not close cleanly: {}", e);
        }
    }
}
