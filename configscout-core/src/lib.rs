//! Core collection engine for configscout.
//!
//! Connects to a SQL Server instance, reads a closed list of
//! security-relevant server configuration options from
//! `sys.configurations`, derives the authentication mode, and returns the
//! result as a [`ScanReport`] that can be displayed or exported to CSV.
//!
//! # Security Guarantees
//! - All database operations are read-only `SELECT`s against system catalogs
//! - Configuration names are always bound as parameters
//! - Credentials are zeroized on drop and never logged or serialized
//!
//! # Architecture
//! - [`session`]: driver seam (`Connector` / `ConfigSession` traits)
//! - [`mssql`]: SQL Server implementation over TDS
//! - [`scan`]: the orchestrator and per-scan state
//! - [`runner`]: background execution with a status channel, one scan at a time
//! - [`export`]: BOM-prefixed CSV writer

pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod mssql;
pub mod runner;
pub mod scan;
pub mod security;
pub mod session;

// Re-export commonly used types
pub use error::{ConnectStage, ConnectionError, ExportError, QueryError, Result, ScoutError};
pub use export::export_csv;
pub use logging::init_logging;
pub use models::{
    AUTH_MODE_NAME, CRITICAL_CONFIGS, ConfigRecord, NOT_APPLICABLE, ScanPhase, ScanReport,
    ScanStatus, TargetFailure,
};
pub use mssql::{MssqlConnector, MssqlSession};
pub use runner::{ScanHandle, ScanRunner};
pub use scan::{ScanSession, Scanner, StatusSender, StatusUpdate};
pub use security::{ConnectionParams, Credentials};
pub use session::{ConfigSession, Connector};
