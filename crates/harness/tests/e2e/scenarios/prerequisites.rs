//! Missing prerequisites never reach the API.

use std::sync::Arc;

use crate::helpers::stub_api::StubApi;
use crate::helpers::workflow::{labels, run_once};

use onboardcheck_core::outcome::ErrorKind;
use onboardcheck_harness::StepState;

#[tokio::test]
async fn test_e2e_dependent_steps_without_state_are_skipped() {
    // Given: no token, no account id in memory or on disk
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(StubApi::healthy());

    // When: running only the account-dependent steps
    let report = run_once(&api, dir.path(), &["get", "terms", "activate", "rfi"]).await;

    // Then: all are skipped and the stub recorded nothing
    assert_eq!(labels(&report), vec!["SKIP"; 4]);
    assert!(api.invocations().is_empty());
    assert_eq!(report.summary.total, 4);
    assert_eq!(report.summary.failed, 4);
    assert_ne!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_e2e_skipped_steps_report_missing_value() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(StubApi::healthy());
    let mut seq = crate::helpers::workflow::sequencer(&api, &["create", "get"]);
    let mut store = crate::helpers::workflow::store(dir.path(), None);

    let report = seq.run(&mut store).await;

    let create = report.outcome_of("create").unwrap().diagnostic().unwrap();
    assert_eq!(create.kind, ErrorKind::PrerequisiteMissing);
    assert!(create.message.contains("auth token"));
    assert_eq!(seq.step_states(), &[StepState::Skipped, StepState::Skipped]);
    assert!(api.invocations().is_empty());
}

#[tokio::test]
async fn test_e2e_summary_total_matches_selection() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(StubApi::healthy());

    let selections: [&[&str]; 3] = [&["health"], &["health", "status", "auth"], &[]];
    for only in selections {
        let report = run_once(&api, dir.path(), only).await;
        let expected = if only.is_empty() { 8 } else { only.len() };
        assert_eq!(report.summary.total, expected);
        assert_eq!(
            report.summary.total,
            report.summary.passed + report.summary.failed
        );
    }
}
