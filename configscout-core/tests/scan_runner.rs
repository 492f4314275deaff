//! Background runner tests: one scan at a time, status streaming, release
//! of the runner slot on every exit path.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use common::{Script, ScriptedConnector, catalog_record, params};
use configscout_core::{
    ConnectStage, ConnectionError, ScanRunner, ScanStatus, Scanner, ScoutError, StatusUpdate,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

fn one_target_script() -> Script {
    Script::default().with_row(catalog_record("clr enabled", "0", "0"))
}

#[tokio::test]
async fn test_second_submit_rejected_while_scan_in_flight() {
    let gate = Arc::new(Semaphore::new(0));
    let (connector, counters) = ScriptedConnector::gated(one_target_script(), Arc::clone(&gate));
    let runner = ScanRunner::new(Scanner::with_targets(connector, ["clr enabled"]));

    let mut first = runner.submit(params()).unwrap();
    assert!(runner.is_busy());

    // The first scan is parked inside `open`.
    assert_eq!(
        first.next_update().await,
        Some(StatusUpdate::Connecting {
            server: "db01".to_string()
        })
    );

    let second = runner.submit(params());
    assert!(matches!(second, Err(ScoutError::ScanInProgress)));

    gate.add_permits(1);
    let report = first.wait().await.unwrap();
    assert!(report.is_completed());
    assert_eq!(report.record_count(), 2);
    assert_eq!(counters.opens(), 1);
    assert!(!runner.is_busy());

    gate.add_permits(1);
    let third = runner.submit(params()).unwrap();
    let report = third.wait().await.unwrap();
    assert!(report.is_completed());
    assert_eq!(counters.opens(), 2);
    assert_eq!(counters.closes(), 2);
}

#[tokio::test]
async fn test_runner_released_after_connection_failure() {
    let script = Script {
        connect: Err(ConnectionError::new(ConnectStage::Timeout, "timed out after 1s")),
        ..one_target_script()
    };
    let (connector, counters) = ScriptedConnector::new(script);
    let runner = ScanRunner::new(Scanner::new(connector));

    let report = runner.submit(params()).unwrap().wait().await.unwrap();
    assert!(matches!(report.status, ScanStatus::Failed { .. }));
    assert!(!runner.is_busy());

    let again = runner.submit(params()).unwrap().wait().await.unwrap();
    assert_eq!(again.fatal_count(), 1);
    assert_eq!(counters.opens(), 2);
    assert_eq!(counters.closes(), 0);
}

#[tokio::test]
async fn test_updates_stream_ends_when_scan_finishes() {
    let (connector, _counters) = ScriptedConnector::new(one_target_script());
    let runner = ScanRunner::new(Scanner::with_targets(connector, ["clr enabled"]));

    let mut handle = runner.submit(params()).unwrap();
    let mut updates = Vec::new();
    while let Some(update) = handle.next_update().await {
        updates.push(update);
    }

    assert_eq!(updates.len(), 3);
    assert_eq!(updates[1], StatusUpdate::Connected);
    assert_eq!(
        updates[2].to_string(),
        "Scan complete. 2 configurations retrieved."
    );

    let report = tokio::time::timeout(Duration::from_secs(5), handle.wait())
        .await
        .expect("scan task should finish")
        .unwrap();
    assert!(report.is_completed());
}

#[tokio::test]
async fn test_concurrent_runners_are_independent() {
    let (first_connector, _) = ScriptedConnector::new(one_target_script());
    let (second_connector, _) = ScriptedConnector::new(one_target_script());
    let first = ScanRunner::new(Scanner::new(first_connector));
    let second = ScanRunner::new(Scanner::new(second_connector));

    let a = first.submit(params()).unwrap();
    let b = second.submit(params()).unwrap();

    let (a, b) = tokio::join!(a.wait(), b.wait());
    assert!(a.unwrap().is_completed());
    assert!(b.unwrap().is_completed());
}
