//! Recording stub implementation of `OnboardingApi`.
//!
//! Every call is recorded (operation, token, account id) before the
//! response is produced. Responses default to the happy path and can be
//! overridden per operation.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::{Value, json};

use onboardcheck_core::api::{ApiResult, Envelope, OnboardingApi};
use onboardcheck_core::error::ApiError;

/// Account id returned by a successful creation.
pub const STUB_ACCOUNT_ID: &str = "acct-stub-001";

/// Token returned by a successful issuance.
pub const STUB_TOKEN: &str = "stub-token";

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub op: &'static str,
    pub token: Option<String>,
    pub account_id: Option<String>,
}

/// Behavior of `create_account` across repeated calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateBehavior {
    /// Always succeeds with [`STUB_ACCOUNT_ID`]
    Created,
    /// First call succeeds; later calls report 409 naming the existing id
    ConflictAfterFirst,
    /// Always 409 without naming the account
    AlwaysConflictAnonymous,
}

/// Recording stub with per-operation failure injection.
pub struct StubApi {
    invocations: Mutex<Vec<Invocation>>,
    failures: HashMap<&'static str, (u16, String)>,
    create: CreateBehavior,
}

impl StubApi {
    /// Happy-path stub.
    pub fn healthy() -> Self {
        Self {
            invocations: Mutex::new(Vec::new()),
            failures: HashMap::new(),
            create: CreateBehavior::Created,
        }
    }

    /// Make `op` fail with `status` and a JSON `body`.
    pub fn failing(mut self, op: &'static str, status: u16, body: Value) -> Self {
        self.failures.insert(op, (status, body.to_string()));
        self
    }

    pub fn with_create(mut self, behavior: CreateBehavior) -> Self {
        self.create = behavior;
        self
    }

    /// All recorded invocations, in call order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    /// Operation names, in call order.
    pub fn ops(&self) -> Vec<&'static str> {
        self.invocations().into_iter().map(|i| i.op).collect()
    }

    /// Number of calls made to `op`.
    pub fn count(&self, op: &str) -> usize {
        self.invocations().iter().filter(|i| i.op == op).count()
    }

    fn record(&self, op: &'static str, token: Option<&str>, account_id: Option<&str>) -> usize {
        let mut invocations = self.invocations.lock().unwrap();
        invocations.push(Invocation {
            op,
            token: token.map(str::to_owned),
            account_id: account_id.map(str::to_owned),
        });
        invocations.iter().filter(|i| i.op == op).count()
    }

    fn respond(&self, op: &'static str, data: Value) -> ApiResult {
        match self.failures.get(op) {
            Some((status, body)) => Err(ApiError::from_response(*status, body)),
            None => Ok(Envelope::success(data)),
        }
    }
}

impl OnboardingApi for StubApi {
    async fn health(&self) -> ApiResult {
        self.record("health", None, None);
        self.respond("health", json!({"status": "ok"}))
    }

    async fn integration_status(&self, token: Option<&str>) -> ApiResult {
        self.record("status", token, None);
        self.respond("status", json!({"integration": "enabled"}))
    }

    async fn issue_token(&self, token: Option<&str>) -> ApiResult {
        self.record("auth", token, None);
        self.respond("auth", json!({"token": STUB_TOKEN, "expires_in": 3600}))
    }

    async fn create_account(&self, token: &str, _document: &Value) -> ApiResult {
        let nth = self.record("create", Some(token), None);
        let conflict = match self.create {
            CreateBehavior::Created => None,
            CreateBehavior::ConflictAfterFirst if nth > 1 => Some(json!({
                "message": "account already exists",
                "data": {"accountId": STUB_ACCOUNT_ID}
            })),
            CreateBehavior::ConflictAfterFirst => None,
            CreateBehavior::AlwaysConflictAnonymous => {
                Some(json!({"message": "account already exists"}))
            }
        };
        if let Some(body) = conflict {
            return Err(ApiError::from_response(409, &body.to_string()));
        }
        self.respond("create", json!({"accountId": STUB_ACCOUNT_ID, "state": "pending"}))
    }

    async fn get_account(&self, token: &str, account_id: &str) -> ApiResult {
        self.record("get", Some(token), Some(account_id));
        self.respond("get", json!({"id": account_id, "state": "pending"}))
    }

    async fn accept_terms(&self, token: &str, account_id: &str) -> ApiResult {
        self.record("terms", Some(token), Some(account_id));
        self.respond("terms", json!({"accepted": true}))
    }

    async fn activate(&self, token: &str, account_id: &str) -> ApiResult {
        self.record("activate", Some(token), Some(account_id));
        self.respond("activate", json!({"state": "active"}))
    }

    async fn get_rfi(&self, token: &str, account_id: &str) -> ApiResult {
        self.record("rfi", Some(token), Some(account_id));
        self.respond("rfi", json!({"active_request": null}))
    }
}
