//! Architectural Contract Test: Failure Propagation
//!
//! This test verifies how failures surface from a reconciliation run.
//!
//! Constraints verified:
//! - Every provider failure ends the run and is tagged with its step
//! - A failure before the branch never reaches create/update
//! - A failing IP source does NOT end the run; its error text becomes
//!   the record content
//!
//! If this test fails, the reconciler either swallows provider errors or
//! changed the documented degraded-discovery behavior.

mod common;

use common::*;
use ddns_core::{Error, Reconciler, Stage};

async fn run(provider: &MockDnsProvider) -> ddns_core::Result<ddns_core::ReconcileOutcome> {
    Reconciler::new(
        Box::new(StaticIpSource::new("203.0.113.5")),
        Box::new(MockDnsProvider::sharing_calls_with(provider)),
        target(),
    )
    .run()
    .await
}

#[tokio::test]
async fn zone_resolution_failure_stops_before_listing() {
    let provider = MockDnsProvider::new(Vec::new()).failing_at(Stage::ZoneResolution);

    let err = run(&provider).await.expect_err("zone failure is fatal");

    assert_eq!(err.stage(), Some(Stage::ZoneResolution));
    assert_eq!(provider.calls().len(), 1, "Only the zone lookup may run");
}

#[tokio::test]
async fn listing_failure_stops_before_mutation() {
    let provider = MockDnsProvider::new(Vec::new()).failing_at(Stage::RecordListing);

    let err = run(&provider).await.expect_err("listing failure is fatal");

    assert_eq!(err.stage(), Some(Stage::RecordListing));
    assert!(provider.create_calls().is_empty());
    assert!(provider.update_calls().is_empty());
}

#[tokio::test]
async fn create_failure_is_reported_as_create_stage() {
    let provider = MockDnsProvider::new(Vec::new()).failing_at(Stage::RecordCreate);

    let err = run(&provider).await.expect_err("create failure is fatal");

    assert_eq!(err.stage(), Some(Stage::RecordCreate));
    assert_eq!(provider.create_calls().len(), 1, "No retry after a failed create");
}

#[tokio::test]
async fn update_failure_is_reported_as_update_stage() {
    let provider = MockDnsProvider::new(vec![existing_record("rec-1", "203.0.113.1")])
        .failing_at(Stage::RecordUpdate);

    let err = run(&provider).await.expect_err("update failure is fatal");

    assert_eq!(err.stage(), Some(Stage::RecordUpdate));
    assert!(matches!(
        err,
        Error::Stage { ref source, .. } if matches!(**source, Error::Provider { .. })
    ));
    assert_eq!(provider.update_calls().len(), 1, "No retry after a failed update");
}

#[tokio::test]
async fn failed_discovery_writes_error_text_as_content() {
    // Regression test for the degraded-discovery path: the run continues and
    // the error description is what gets written.
    let provider = MockDnsProvider::new(Vec::new());
    let expected_content = "error sending request: tcp connect error: Connection refused";

    let outcome = Reconciler::new(
        Box::new(FailingIpSource::new(expected_content)),
        Box::new(MockDnsProvider::sharing_calls_with(&provider)),
        target(),
    )
    .run()
    .await
    .expect("discovery failure is not fatal");

    let creates = provider.create_calls();
    assert_eq!(creates.len(), 1);
    assert_eq!(creates[0].content, expected_content);
    assert_eq!(outcome.record().content, expected_content);
}

#[tokio::test]
async fn failed_discovery_also_flows_into_update() {
    let provider = MockDnsProvider::new(vec![existing_record("rec-1", "203.0.113.1")]);

    Reconciler::new(
        Box::new(FailingIpSource::new("operation timed out")),
        Box::new(MockDnsProvider::sharing_calls_with(&provider)),
        target(),
    )
    .run()
    .await
    .expect("discovery failure is not fatal");

    let updates = provider.update_calls();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].1.content, "operation timed out");
}
