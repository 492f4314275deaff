//! Scan orchestration.
//!
//! A scan opens one session, probes the authentication mode, looks up every
//! target in order and closes the session:
//!
//! ```text
//! Idle -> Connecting -> Connected -> Probing -> Querying[0..N] -> Closing -> Done
//!            |
//!            +-> Failed (fatal, nothing else runs)
//! ```
//!
//! Only a connection failure is fatal. A failed probe or target lookup is
//! logged, recorded in the report and skipped. The session is closed exactly
//! once on every path that opened it.

use crate::error::QueryError;
use crate::models::{
    AUTH_MODE_NAME, CRITICAL_CONFIGS, ConfigRecord, ScanPhase, ScanReport, ScanStatus,
    TargetFailure,
};
use crate::security::ConnectionParams;
use crate::session::{ConfigSession, Connector};
use chrono::Utc;
use std::fmt;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Operator-facing status message, one per phase transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    /// Connection attempt started
    Connecting {
        /// Server as given by the operator
        server: String,
    },
    /// Session open; configurations are being retrieved
    Connected,
    /// Scan finished
    Completed {
        /// Records collected
        records: usize,
        /// Lookups that failed and were skipped
        failures: usize,
    },
    /// Connection failed; the scan was aborted
    Failed {
        /// Error shown to the operator
        message: String,
    },
}

impl fmt::Display for StatusUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting { server } => write!(f, "Connecting to {server}..."),
            Self::Connected => write!(f, "Connected. Retrieving configurations..."),
            Self::Completed {
                records,
                failures: 0,
            } => write!(f, "Scan complete. {records} configurations retrieved."),
            Self::Completed { records, failures } => write!(
                f,
                "Scan complete. {records} configurations retrieved, {failures} lookups failed."
            ),
            Self::Failed { message } => write!(f, "Error: {message}"),
        }
    }
}

/// Sending half of the status channel.
pub type StatusSender = mpsc::UnboundedSender<StatusUpdate>;

/// Tracing target of status lines. The console layer leaves it to the
/// display; the log file records it.
pub const STATUS_TARGET: &str = "configscout::status";

fn notify(status: &StatusSender, update: StatusUpdate) {
    match &update {
        StatusUpdate::Failed { .. } => error!(target: STATUS_TARGET, "{}", update),
        _ => info!(target: STATUS_TARGET, "{}", update),
    }
    if status.send(update).is_err() {
        debug!("Status receiver dropped; continuing without display updates");
    }
}

fn enter(scan_id: Uuid, phase: ScanPhase) {
    debug!(%scan_id, "Scan phase: {}", phase);
}

/// Per-scan state: the open session and everything collected so far.
///
/// Records are only ever appended. [`ScanSession::finish`] consumes the
/// value and closes the session.
#[derive(Debug)]
pub struct ScanSession<S: ConfigSession> {
    session: S,
    records: Vec<ConfigRecord>,
    failures: Vec<TargetFailure>,
}

impl<S: ConfigSession> ScanSession<S> {
    /// Wraps a freshly opened session.
    pub const fn new(session: S) -> Self {
        Self {
            session,
            records: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Records collected so far, in insertion order.
    pub fn records(&self) -> &[ConfigRecord] {
        &self.records
    }

    /// Lookups that failed so far.
    pub fn failures(&self) -> &[TargetFailure] {
        &self.failures
    }

    /// Runs the authentication mode probe and appends its record.
    pub async fn probe_auth_mode(&mut self) {
        match self.session.probe_auth_mode().await {
            Ok(record) => {
                debug!("Authentication mode: '{}'", record.value);
                self.records.push(record);
            }
            Err(e) => self.skip(AUTH_MODE_NAME, e),
        }
    }

    /// Looks up one target and appends its rows; returns how many were added.
    pub async fn collect(&mut self, target: &str) -> usize {
        match self.session.query_config(target).await {
            Ok(batch) => {
                let count = batch.len();
                if count == 0 {
                    debug!("No catalog row for '{}'", target);
                }
                self.records.extend(batch);
                count
            }
            Err(e) => {
                self.skip(target, e);
                0
            }
        }
    }

    fn skip(&mut self, target: &str, error: QueryError) {
        warn!("Skipping '{}': {}", target, error);
        self.failures.push(TargetFailure {
            target: target.to_string(),
            error,
        });
    }

    /// Closes the session and hands back the collected results.
    pub async fn finish(self) -> (Vec<ConfigRecord>, Vec<TargetFailure>) {
        self.session.close().await;
        (self.records, self.failures)
    }
}

/// Drives scans against a fixed, ordered target list.
#[derive(Debug)]
pub struct Scanner<C: Connector> {
    connector: C,
    targets: Vec<String>,
}

impl<C: Connector> Scanner<C> {
    /// Creates a scanner over [`CRITICAL_CONFIGS`].
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            targets: CRITICAL_CONFIGS.iter().map(ToString::to_string).collect(),
        }
    }

    /// Creates a scanner over an explicit target list, looked up in order.
    pub fn with_targets<I, T>(connector: C, targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            connector,
            targets: targets.into_iter().map(Into::into).collect(),
        }
    }

    /// Targets looked up by every scan.
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Runs one complete scan.
    ///
    /// Never fails: a connection failure is reported through
    /// [`ScanStatus::Failed`] with no records, every other failure is
    /// recorded in [`ScanReport::failures`].
    pub async fn run_scan(&self, params: &ConnectionParams, status: &StatusSender) -> ScanReport {
        let scan_id = Uuid::new_v4();
        let started_at = Utc::now();
        let report = |status: ScanStatus, records, failures| ScanReport {
            scan_id,
            server: params.server.clone(),
            database: params.database.clone(),
            started_at,
            finished_at: Utc::now(),
            status,
            records,
            failures,
        };

        enter(scan_id, ScanPhase::Idle);
        enter(scan_id, ScanPhase::Connecting);
        notify(
            status,
            StatusUpdate::Connecting {
                server: params.server.clone(),
            },
        );
        debug!(
            "Using {} driver with {}",
            self.connector.driver_name(),
            params.redacted_connection_string()
        );

        let session = match self.connector.open(params).await {
            Ok(session) => session,
            Err(e) => {
                enter(scan_id, ScanPhase::Failed);
                notify(
                    status,
                    StatusUpdate::Failed {
                        message: e.to_string(),
                    },
                );
                return report(ScanStatus::Failed { error: e }, Vec::new(), Vec::new());
            }
        };

        enter(scan_id, ScanPhase::Connected);
        notify(status, StatusUpdate::Connected);

        let mut scan = ScanSession::new(session);

        enter(scan_id, ScanPhase::Probing);
        scan.probe_auth_mode().await;

        for (index, target) in self.targets.iter().enumerate() {
            enter(scan_id, ScanPhase::Querying { index });
            scan.collect(target).await;
        }

        enter(scan_id, ScanPhase::Closing);
        let (records, failures) = scan.finish().await;

        enter(scan_id, ScanPhase::Done);
        notify(
            status,
            StatusUpdate::Completed {
                records: records.len(),
                failures: failures.len(),
            },
        );

        report(ScanStatus::Completed, records, failures)
    }
}
