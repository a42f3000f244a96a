//! Creation rejected with 401: dependent steps are skipped.

use std::sync::Arc;

use serde_json::json;

use crate::helpers::stub_api::StubApi;
use crate::helpers::workflow::{labels, run_once};

use onboardcheck_core::outcome::ErrorKind;

#[tokio::test]
async fn test_e2e_create_unauthorized_skips_dependents() {
    // Given: an API that rejects account creation
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(StubApi::healthy().failing(
        "create",
        401,
        json!({"message": "Unauthorized"}),
    ));

    // When: running the full workflow
    let report = run_once(&api, dir.path(), &[]).await;

    // Then: create fails with an auth diagnostic and dependents are skipped
    assert_eq!(
        labels(&report),
        vec!["PASS", "PASS", "PASS", "FAIL", "SKIP", "SKIP", "SKIP", "SKIP"]
    );
    let create = report.outcome_of("create").unwrap().diagnostic().unwrap();
    assert_eq!(create.kind, ErrorKind::Auth);
    assert_eq!(create.status, Some(401));
    assert!(create.hint.is_some());

    for name in ["get", "terms", "activate", "rfi"] {
        let diag = report.outcome_of(name).unwrap().diagnostic().unwrap();
        assert_eq!(diag.kind, ErrorKind::PrerequisiteMissing, "step {name}");
    }

    assert_eq!(report.summary.total, 8);
    assert_eq!(report.summary.passed, 3);
    assert_eq!(report.summary.failed, 5);
    assert_ne!(report.exit_code(), 0);

    // no dependent call reached the API
    assert_eq!(api.ops(), vec!["health", "status", "auth", "create"]);
}

#[tokio::test]
async fn test_e2e_token_issuance_failure_skips_create() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(StubApi::healthy().failing(
        "auth",
        403,
        json!({"error": "client not allowed"}),
    ));

    let report = run_once(&api, dir.path(), &[]).await;

    assert_eq!(labels(&report)[2..], ["FAIL", "SKIP", "SKIP", "SKIP", "SKIP", "SKIP"]);
    assert_eq!(api.count("create"), 0);
    assert_eq!(report.summary.failed, 6);
}

#[tokio::test]
async fn test_e2e_activation_blocked_by_pending_request() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(StubApi::healthy().failing(
        "activate",
        400,
        json!({"message": "Account has an outstanding request for information"}),
    ));

    let report = run_once(&api, dir.path(), &[]).await;

    let diag = report.outcome_of("activate").unwrap().diagnostic().unwrap();
    assert_eq!(diag.kind, ErrorKind::DomainBlocked);
    assert_eq!(diag.hint.as_deref(), Some("blocked by pending request"));
    // the run continues past the blocked step
    assert!(report.outcome_of("rfi").unwrap().is_pass());
    assert_eq!(report.summary.failed, 1);
}

#[tokio::test]
async fn test_e2e_validation_failure_carries_detail() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(StubApi::healthy().failing(
        "create",
        422,
        json!({"message": "invalid document", "errors": {"tax_id": ["is required"]}}),
    ));

    let report = run_once(&api, dir.path(), &[]).await;

    let diag = report.outcome_of("create").unwrap().diagnostic().unwrap();
    assert_eq!(diag.kind, ErrorKind::Validation);
    assert_eq!(diag.detail.as_ref().unwrap()["tax_id"][0], "is required");
}
