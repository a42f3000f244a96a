//! HTTP implementation of [`OnboardingApi`] on top of `reqwest`
//!
//! Routes are templates relative to the base URL; a `{id}` segment is
//! replaced by the account id, percent-encoded as a single path segment so
//! an id never changes which route is called. Authenticated calls carry `Authorization: Bearer <token>`.
//! The client sets no request timeout of its own: the runner bounds every
//! call with the step's timeout.

use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;
use tracing::debug;

use onboardcheck_core::api::{ApiResult, Envelope, OnboardingApi};
use onboardcheck_core::config::{ApiConfig, RoutesConfig};
use onboardcheck_core::error::ApiError;

use crate::error::HarnessError;

const USER_AGENT: &str = concat!("onboardcheck/", env!("CARGO_PKG_VERSION"));

const ID_SEGMENT: &str = "{id}";

/// `reqwest`-backed onboarding API client.
#[derive(Debug, Clone)]
pub struct HttpOnboardingApi {
    client: Client,
    base_url: String,
    routes: RoutesConfig,
}

impl HttpOnboardingApi {
    /// Build a client for the `[api]` config section.
    pub fn new(config: &ApiConfig) -> Result<Self, HarnessError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| HarnessError::Client(e.to_string()))?;
        Ok(Self::with_client(
            config.base_url.as_str(),
            config.routes.clone(),
            client,
        ))
    }

    /// Use a preconfigured `reqwest` client.
    pub fn with_client(base_url: impl Into<String>, routes: RoutesConfig, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.into().trim().trim_end_matches('/').to_owned(),
            routes,
        }
    }

    /// Absolute URL for a route template.
    fn url(&self, template: &str, account_id: Option<&str>) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidRequest(format!("base url '{}': {e}", self.base_url)))?;

        let id = match account_id {
            Some(id) if id == "." || id == ".." => {
                return Err(ApiError::InvalidRequest(format!(
                    "account id '{id}' is not a valid path segment"
                )));
            }
            other => other,
        };

        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                ApiError::InvalidRequest(format!("base url '{}' cannot carry a path", self.base_url))
            })?;
            segments.pop_if_empty();
            for segment in template.split('/').filter(|s| !s.is_empty()) {
                match id {
                    Some(id) if segment == ID_SEGMENT => segments.push(id),
                    _ => segments.push(segment),
                };
            }
        }
        Ok(url)
    }

    fn get(
        &self,
        template: &str,
        account_id: Option<&str>,
        token: Option<&str>,
    ) -> Result<RequestBuilder, ApiError> {
        let url = self.url(template, account_id)?;
        Ok(with_bearer(self.client.get(url), token))
    }

    fn post(
        &self,
        template: &str,
        account_id: Option<&str>,
        token: Option<&str>,
    ) -> Result<RequestBuilder, ApiError> {
        let url = self.url(template, account_id)?;
        Ok(with_bearer(self.client.post(url), token))
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let url = response.url().path().to_owned();
        let body = response.text().await.map_err(transport_error)?;

        debug!(path = %url, status = status.as_u16(), bytes = body.len(), "response received");

        if status.is_success() {
            Envelope::from_body(&body)
        } else {
            Err(ApiError::from_response(status.as_u16(), &body))
        }
    }
}

fn with_bearer(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) if !token.is_empty() => request.bearer_auth(token),
        _ => request,
    }
}

fn transport_error(err: reqwest::Error) -> ApiError {
    let kind = if err.is_connect() {
        "connection failed"
    } else if err.is_timeout() {
        "timed out"
    } else if err.is_body() || err.is_decode() {
        "response body unreadable"
    } else {
        "request failed"
    };
    ApiError::Transport(format!("{kind}: {err}"))
}

impl OnboardingApi for HttpOnboardingApi {
    async fn health(&self) -> ApiResult {
        self.send(self.get(&self.routes.health, None, None)?).await
    }

    async fn integration_status(&self, token: Option<&str>) -> ApiResult {
        self.send(self.get(&self.routes.integration_status, None, token)?)
            .await
    }

    async fn issue_token(&self, token: Option<&str>) -> ApiResult {
        self.send(self.post(&self.routes.issue_token, None, token)?)
            .await
    }

    async fn create_account(&self, token: &str, document: &Value) -> ApiResult {
        let request = self
            .post(&self.routes.create_account, None, Some(token))?
            .json(document);
        self.send(request).await
    }

    async fn get_account(&self, token: &str, account_id: &str) -> ApiResult {
        self.send(self.get(&self.routes.account, Some(account_id), Some(token))?)
            .await
    }

    async fn accept_terms(&self, token: &str, account_id: &str) -> ApiResult {
        self.send(self.post(&self.routes.accept_terms, Some(account_id), Some(token))?)
            .await
    }

    async fn activate(&self, token: &str, account_id: &str) -> ApiResult {
        self.send(self.post(&self.routes.activate, Some(account_id), Some(token))?)
            .await
    }

    async fn get_rfi(&self, token: &str, account_id: &str) -> ApiResult {
        self.send(self.get(&self.routes.rfi, Some(account_id), Some(token))?)
            .await
    }
}
