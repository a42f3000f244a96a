//! Cross-process resume through the persisted account id.

use std::sync::Arc;

use serde_json::json;

use crate::helpers::stub_api::{STUB_ACCOUNT_ID, StubApi};
use crate::helpers::workflow::{labels, run_once};

use onboardcheck_core::session::{ACCOUNT_ID_KEY, FileSideChannel, SideChannel};

#[tokio::test]
async fn test_e2e_partial_run_persists_created_account_id() {
    // Given: activation fails, so the run does not fully pass
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(StubApi::healthy().failing(
        "activate",
        500,
        json!({"message": "internal error"}),
    ));

    // When
    let report = run_once(&api, dir.path(), &[]).await;

    // Then: the created id survives for a later process
    assert_ne!(report.exit_code(), 0);
    let channel = FileSideChannel::new(dir.path());
    assert_eq!(
        channel.read(ACCOUNT_ID_KEY).unwrap().as_deref(),
        Some(STUB_ACCOUNT_ID)
    );
}

#[tokio::test]
async fn test_e2e_later_run_resumes_with_persisted_id() {
    let dir = tempfile::tempdir().unwrap();

    // First process: everything up to creation
    let first_api = Arc::new(StubApi::healthy());
    let first = run_once(&first_api, dir.path(), &["auth", "create"]).await;
    assert_eq!(labels(&first), vec!["PASS", "PASS"]);
    assert_eq!(first.exit_code(), 0);

    // Second process: a fresh store resolves the id written by the first
    let second_api = Arc::new(StubApi::healthy());
    let second = run_once(&second_api, dir.path(), &["auth", "get"]).await;

    assert_eq!(labels(&second), vec!["PASS", "PASS"]);
    let get = second_api
        .invocations()
        .into_iter()
        .find(|i| i.op == "get")
        .unwrap();
    assert_eq!(get.account_id.as_deref(), Some(STUB_ACCOUNT_ID));
}

#[tokio::test]
async fn test_e2e_stale_file_is_overwritten_by_new_creation() {
    let dir = tempfile::tempdir().unwrap();
    let channel = FileSideChannel::new(dir.path());
    channel.write(ACCOUNT_ID_KEY, "acct-stale").unwrap();

    let api = Arc::new(
        StubApi::healthy().failing("rfi", 502, json!({"message": "bad gateway"})),
    );
    run_once(&api, dir.path(), &[]).await;

    // in-memory id from creation wins over the stale file
    let get = api.invocations().into_iter().find(|i| i.op == "get").unwrap();
    assert_eq!(get.account_id.as_deref(), Some(STUB_ACCOUNT_ID));
    assert_eq!(
        channel.read(ACCOUNT_ID_KEY).unwrap().as_deref(),
        Some(STUB_ACCOUNT_ID)
    );
}
