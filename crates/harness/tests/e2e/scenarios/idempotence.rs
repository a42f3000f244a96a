//! Repeated runs where creation reports "already exists".

use std::sync::Arc;

use crate::helpers::stub_api::{CreateBehavior, STUB_ACCOUNT_ID, StubApi};
use crate::helpers::workflow::{labels, run_once};

use onboardcheck_core::outcome::ErrorKind;
use onboardcheck_core::session::{ACCOUNT_ID_KEY, FileSideChannel, SideChannel};

#[tokio::test]
async fn test_e2e_two_runs_with_conflict_both_pass() {
    // Given: an API that reports 409 for every creation after the first
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(StubApi::healthy().with_create(CreateBehavior::ConflictAfterFirst));

    // When: running the full workflow twice
    let first = run_once(&api, dir.path(), &[]).await;
    let second = run_once(&api, dir.path(), &[]).await;

    // Then: both runs pass completely
    assert_eq!(labels(&first), vec!["PASS"; 8]);
    assert_eq!(labels(&second), vec!["PASS"; 8]);
    assert_eq!(second.exit_code(), 0);

    let create = second.outcome_of("create").unwrap().diagnostic().unwrap();
    assert_eq!(create.kind, ErrorKind::ExpectedConflict);
    assert_eq!(create.status, Some(409));

    // the conflict body named the account, so dependents used it
    let last_get = api
        .invocations()
        .into_iter()
        .filter(|i| i.op == "get")
        .last()
        .unwrap();
    assert_eq!(last_get.account_id.as_deref(), Some(STUB_ACCOUNT_ID));
}

#[tokio::test]
async fn test_e2e_anonymous_conflict_falls_back_to_persisted_id() {
    let dir = tempfile::tempdir().unwrap();
    FileSideChannel::new(dir.path())
        .write(ACCOUNT_ID_KEY, "acct-from-earlier-run")
        .unwrap();
    let api = Arc::new(
        StubApi::healthy().with_create(CreateBehavior::AlwaysConflictAnonymous),
    );

    let report = run_once(&api, dir.path(), &[]).await;

    assert!(report.outcome_of("create").unwrap().is_pass());
    let get = api.invocations().into_iter().find(|i| i.op == "get").unwrap();
    assert_eq!(get.account_id.as_deref(), Some("acct-from-earlier-run"));
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_e2e_anonymous_conflict_without_state_skips_dependents() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(
        StubApi::healthy().with_create(CreateBehavior::AlwaysConflictAnonymous),
    );

    let report = run_once(&api, dir.path(), &[]).await;

    assert!(report.outcome_of("create").unwrap().is_pass());
    assert_eq!(labels(&report)[4..], ["SKIP", "SKIP", "SKIP", "SKIP"]);
    assert_eq!(api.count("get"), 0);
}
