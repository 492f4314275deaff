//! Scan execution boundary.
//!
//! [`ScanRunner`] runs scans as tokio tasks so the caller (a display loop)
//! never blocks, streams [`StatusUpdate`]s over a channel, and admits at most
//! one scan at a time. A second [`ScanRunner::submit`] while a scan is in
//! flight is rejected with [`ScoutError::ScanInProgress`].

use crate::error::{Result, ScoutError};
use crate::models::ScanReport;
use crate::scan::{Scanner, StatusUpdate};
use crate::security::ConnectionParams;
use crate::session::Connector;
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tracing::debug;

/// Runs scans on the tokio runtime, one at a time.
///
/// # Example
/// ```rust,no_run
/// use configscout_core::{ConnectionParams, MssqlConnector, ScanRunner, Scanner};
///
/// # async fn example() -> configscout_core::Result<()> {
/// let runner = ScanRunner::new(Scanner::new(MssqlConnector::new()));
/// let mut handle = runner.submit(ConnectionParams::new("localhost", "master"))?;
/// while let Some(update) = handle.next_update().await {
///     println!("{update}");
/// }
/// let report = handle.wait().await?;
/// println!("{}", report.summary());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ScanRunner<C: Connector + 'static> {
    scanner: Arc<Scanner<C>>,
    slot: Arc<Semaphore>,
}

impl<C: Connector + 'static> ScanRunner<C> {
    /// Creates a runner around `scanner`.
    pub fn new(scanner: Scanner<C>) -> Self {
        Self {
            scanner: Arc::new(scanner),
            slot: Arc::new(Semaphore::new(1)),
        }
    }

    /// Whether a scan is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.slot.available_permits() == 0
    }

    /// Starts a scan in the background.
    ///
    /// The slot is held by the task until the scan finishes, on every exit
    /// path.
    ///
    /// # Errors
    /// Returns [`ScoutError::ScanInProgress`] if another scan is running.
    pub fn submit(&self, params: ConnectionParams) -> Result<ScanHandle> {
        let permit = Arc::clone(&self.slot)
            .try_acquire_owned()
            .map_err(|_| ScoutError::ScanInProgress)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let scanner = Arc::clone(&self.scanner);

        let task = tokio::spawn(async move {
            let report = scanner.run_scan(&params, &tx).await;
            drop(permit);
            debug!("Scan {} released the runner", report.scan_id);
            report
        });

        Ok(ScanHandle { updates: rx, task })
    }
}

/// Handle to an in-flight scan.
#[derive(Debug)]
pub struct ScanHandle {
    updates: mpsc::UnboundedReceiver<StatusUpdate>,
    task: JoinHandle<ScanReport>,
}

impl ScanHandle {
    /// Next status update; `None` once the scan has finished sending.
    pub async fn next_update(&mut self) -> Option<StatusUpdate> {
        self.updates.recv().await
    }

    /// Waits for the scan to finish.
    ///
    /// # Errors
    /// Returns [`ScoutError::ScanTask`] if the task panicked or was aborted.
    pub async fn wait(self) -> Result<ScanReport> {
        self.task.await.map_err(|e| ScoutError::ScanTask {
            context: e.to_string(),
        })
    }
}
