//! Remote onboarding API abstraction.
//!
//! The [`OnboardingApi`] trait is the only contract the harness relies on.
//! Production code talks HTTP through `HttpOnboardingApi` in the harness
//! crate; tests substitute a recording stub.
//!
//! Every operation resolves to a success [`Envelope`] (`{status, data}`) or
//! an [`ApiError`] carrying the HTTP status and optional `message`/`errors`.
//! The account-creation document is opaque and passed through verbatim.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Result of a single remote call.
pub type ApiResult = Result<Envelope, ApiError>;

/// Success envelope returned by the remote API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Free-form status string (usually `"success"`).
    #[serde(default)]
    pub status: Option<String>,
    /// Operation payload.
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    /// Envelope with `status = "success"` and the given payload.
    pub fn success(data: Value) -> Self {
        Self {
            status: Some("success".to_owned()),
            data,
        }
    }

    /// First non-empty string among `data.<name>` for the given names.
    ///
    /// Numeric identifiers are accepted and rendered as strings.
    pub fn data_str(&self, names: &[&str]) -> Option<String> {
        names.iter().find_map(|name| match self.data.get(*name)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    /// Parse a response body into an envelope.
    ///
    /// Bodies that are JSON but not shaped like an envelope are wrapped as
    /// `data`; an empty body yields an envelope with `data = null`.
    pub fn from_body(body: &str) -> Result<Self, ApiError> {
        if body.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_str(body)
            .map_err(|e| ApiError::InvalidResponse(format!("body is not JSON: {e}")))?;
        match value {
            Value::Object(ref map) if map.contains_key("data") || map.contains_key("status") => {
                serde_json::from_value(value)
                    .map_err(|e| ApiError::InvalidResponse(format!("malformed envelope: {e}")))
            }
            other => Ok(Self {
                status: None,
                data: other,
            }),
        }
    }
}

/// Operations of the onboarding API under test.
///
/// Calls that require a session take the bearer token explicitly; there is
/// no ambient session inside implementations.
pub trait OnboardingApi: Send + Sync + 'static {
    /// Service liveness probe.
    fn health(&self) -> impl Future<Output = ApiResult> + Send;

    /// Integration status probe (may be called with or without a token).
    fn integration_status(&self, token: Option<&str>) -> impl Future<Output = ApiResult> + Send;

    /// Token issuance request (no body).
    fn issue_token(&self, token: Option<&str>) -> impl Future<Output = ApiResult> + Send;

    /// Create an account from an opaque business/identity document.
    fn create_account(
        &self,
        token: &str,
        document: &Value,
    ) -> impl Future<Output = ApiResult> + Send;

    /// Fetch an account by id.
    fn get_account(&self, token: &str, account_id: &str)
    -> impl Future<Output = ApiResult> + Send;

    /// Accept terms for an account.
    fn accept_terms(
        &self,
        token: &str,
        account_id: &str,
    ) -> impl Future<Output = ApiResult> + Send;

    /// Activate an account.
    fn activate(&self, token: &str, account_id: &str) -> impl Future<Output = ApiResult> + Send;

    /// Fetch the request-for-information state of an account.
    fn get_rfi(&self, token: &str, account_id: &str) -> impl Future<Output = ApiResult> + Send;
}
