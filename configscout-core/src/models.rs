//! Core data models for configuration scan results.
//!
//! These structures are what leaves the collection engine: the display
//! adapter, the JSON report and the CSV exporter all consume them. None of
//! them carries credentials.

use crate::error::{ConnectionError, QueryError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server configuration options inspected by every scan, in report order.
pub const CRITICAL_CONFIGS: [&str; 9] = [
    "xp_cmdshell",
    "clr enabled",
    "remote access",
    "Ole Automation Procedures",
    "Ad Hoc Distributed Queries",
    "Database Mail XPs",
    "SMO and DMO XPs",
    "SQL Mail XPs",
    "Agent XPs",
];

/// Record name synthesized by the authentication mode probe.
pub const AUTH_MODE_NAME: &str = "Authentication Mode";

/// Sentinel used where a field has no meaningful value.
pub const NOT_APPLICABLE: &str = "N/A";

/// One reported configuration item.
///
/// Every field is always populated; absent catalog values are stored as an
/// empty string. `default_value` holds the catalog's `minimum` column, which
/// is not a true default for every option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRecord {
    /// Option name as listed in `sys.configurations`
    pub name: String,
    /// Configured value
    pub value: String,
    /// Catalog `minimum`, shown as the default
    pub default_value: String,
    /// Value currently in effect
    pub running_value: String,
    /// Catalog description
    pub description: String,
}

impl ConfigRecord {
    /// Builds the record produced by the authentication mode probe.
    ///
    /// The configured and running values are the same classification.
    pub fn authentication_mode(classification: impl Into<String>) -> Self {
        let classification = classification.into();
        Self {
            name: AUTH_MODE_NAME.to_string(),
            value: classification.clone(),
            default_value: NOT_APPLICABLE.to_string(),
            running_value: classification,
            description: "SQL Server authentication mode".to_string(),
        }
    }

    /// Fields in display and export column order.
    pub fn fields(&self) -> [&str; 5] {
        [
            &self.name,
            &self.value,
            &self.default_value,
            &self.running_value,
            &self.description,
        ]
    }
}

/// Phases a scan moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ScanPhase {
    /// Not started
    Idle,
    /// Opening the session
    Connecting,
    /// Session open
    Connected,
    /// Reading the authentication mode
    Probing,
    /// Looking up one configuration target
    Querying {
        /// Position of the target in the scan's target list
        index: usize,
    },
    /// Closing the session
    Closing,
    /// Finished
    Done,
    /// Aborted on a connection failure
    Failed,
}

impl std::fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Probing => write!(f, "probing"),
            Self::Querying { index } => write!(f, "querying[{index}]"),
            Self::Closing => write!(f, "closing"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Terminal status of a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanStatus {
    /// The scan ran to completion; individual targets may still have failed
    Completed,
    /// The connection could not be established; no work was performed
    Failed {
        /// Why the connection failed
        error: ConnectionError,
    },
}

/// A target whose lookup failed during an otherwise running scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetFailure {
    /// Configuration name that was skipped
    pub target: String,
    /// Why the lookup failed
    pub error: QueryError,
}

/// Result of one scan invocation.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Unique identifier of this scan
    pub scan_id: Uuid,
    /// Server as given by the operator
    pub server: String,
    /// Database used for the login
    pub database: String,
    /// When the scan started
    pub started_at: DateTime<Utc>,
    /// When the scan finished
    pub finished_at: DateTime<Utc>,
    /// Terminal status
    pub status: ScanStatus,
    /// Collected records, in report order
    pub records: Vec<ConfigRecord>,
    /// Targets skipped because their lookup failed
    pub failures: Vec<TargetFailure>,
}

impl ScanReport {
    /// Number of records collected.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Number of fatal aborts: 1 when the connection failed, 0 otherwise.
    pub const fn fatal_count(&self) -> usize {
        match self.status {
            ScanStatus::Completed => 0,
            ScanStatus::Failed { .. } => 1,
        }
    }

    /// Whether the scan completed (possibly with skipped targets).
    pub const fn is_completed(&self) -> bool {
        matches!(self.status, ScanStatus::Completed)
    }

    /// Operator-facing status line.
    pub fn summary(&self) -> String {
        match &self.status {
            ScanStatus::Failed { error } => format!("Error: {error}"),
            ScanStatus::Completed if self.failures.is_empty() => format!(
                "Scan complete. {} configurations retrieved.",
                self.records.len()
            ),
            ScanStatus::Completed => format!(
                "Scan complete. {} configurations retrieved, {} lookups failed.",
                self.records.len(),
                self.failures.len()
            ),
        }
    }
}
