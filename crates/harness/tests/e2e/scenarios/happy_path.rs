//! Happy path: the full workflow against a healthy stub.

use std::sync::Arc;

use crate::helpers::stub_api::{STUB_ACCOUNT_ID, STUB_TOKEN, StubApi};
use crate::helpers::workflow::{labels, run_once, sequencer, store};

use onboardcheck_harness::{SequencerState, render_summary};

#[tokio::test]
async fn test_e2e_full_workflow_passes_all_steps() {
    // Given: a healthy API and an empty state directory
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(StubApi::healthy());

    // When: running the full workflow
    let report = run_once(&api, dir.path(), &[]).await;

    // Then: every step passed, in declaration order
    assert_eq!(
        api.ops(),
        vec!["health", "status", "auth", "create", "get", "terms", "activate", "rfi"]
    );
    assert_eq!(labels(&report), vec!["PASS"; 8]);
    assert_eq!(
        (report.summary.total, report.summary.passed, report.summary.failed),
        (8, 8, 0)
    );
    assert_eq!(report.exit_code(), 0);
    assert_eq!(
        render_summary(&report.summary),
        "Total: 8  Passed: 8  Failed: 0  (100%)"
    );
}

#[tokio::test]
async fn test_e2e_produced_values_flow_into_later_calls() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(StubApi::healthy());

    run_once(&api, dir.path(), &[]).await;

    let invocations = api.invocations();
    let activate = invocations.iter().find(|i| i.op == "activate").unwrap();
    assert_eq!(activate.token.as_deref(), Some(STUB_TOKEN));
    assert_eq!(activate.account_id.as_deref(), Some(STUB_ACCOUNT_ID));

    // health never carries credentials
    let health = invocations.iter().find(|i| i.op == "health").unwrap();
    assert!(health.token.is_none());
}

#[tokio::test]
async fn test_e2e_full_pass_discards_persisted_state() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(StubApi::healthy());
    let mut seq = sequencer(&api, &[]);
    let mut store = store(dir.path(), None);

    seq.run(&mut store).await;

    assert_eq!(seq.state(), SequencerState::Finished);
    assert!(store.load_persisted().unwrap().is_none());
    assert!(!dir.path().join(onboardcheck_core::session::ACCOUNT_ID_KEY).exists());
}

#[tokio::test]
async fn test_e2e_pre_supplied_token_is_used_before_auth() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(StubApi::healthy());
    let mut seq = sequencer(&api, &[]);
    let mut store = store(dir.path(), Some("preset-token"));

    seq.run(&mut store).await;

    let invocations = api.invocations();
    assert_eq!(invocations[1].op, "status");
    assert_eq!(invocations[1].token.as_deref(), Some("preset-token"));
    // auth replaces the pre-supplied token for later steps
    assert_eq!(invocations[3].token.as_deref(), Some(STUB_TOKEN));
}
