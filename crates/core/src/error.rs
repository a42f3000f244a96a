//! Error types -- one enum per concern

use std::time::Duration;

use serde_json::Value;

/// Top-level onboardcheck error.
#[derive(Debug, thiserror::Error)]
pub enum OnboardError {
    /// Configuration loading or validation failure
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Durable state side-channel failure
    #[error("state error: {0}")]
    State(#[from] StateError),

    /// Remote API failure
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file does not exist
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// Config file is not valid TOML
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// A field holds an unusable value
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Durable state side-channel errors.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// Key is empty or would escape the state directory
    #[error("invalid state key '{0}'")]
    InvalidKey(String),

    /// Reading a persisted value failed
    #[error("failed to read state '{key}': {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing a persisted value failed
    #[error("failed to write state '{key}': {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Removing a persisted value failed
    #[error("failed to remove state '{key}': {source}")]
    Remove {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors returned by an [`OnboardingApi`](crate::api::OnboardingApi) call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// `message` (or `error`) field of the body, raw body text otherwise.
        message: String,
        /// Structured `errors` field, when present.
        errors: Option<Value>,
        /// Full JSON body, when the body was JSON.
        body: Option<Value>,
    },

    /// The call did not resolve within its budget.
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Connection refused, DNS failure, broken stream and the like.
    #[error("transport error: {0}")]
    Transport(String),

    /// A success status whose body could not be decoded.
    #[error("invalid response body: {0}")]
    InvalidResponse(String),

    /// The request URL could not be built (bad base URL or account id).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Build a [`ApiError::Status`] from a status code and raw response body.
    ///
    /// Error bodies look like `{"message": "...", "errors": {...}}`; some
    /// servers use `error` instead of `message`. Non-JSON bodies are kept
    /// as the message verbatim.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();

        let message = parsed
            .as_ref()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("error"))
                    .and_then(Value::as_str)
            })
            .map(str::to_owned)
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty() && parsed.is_none()).then(|| trimmed.to_owned())
            })
            .unwrap_or_else(|| format!("request failed with status {status}"));

        let errors = parsed
            .as_ref()
            .and_then(|v| v.get("errors"))
            .filter(|e| !e.is_null())
            .cloned();

        Self::Status {
            status,
            message,
            errors,
            body: parsed,
        }
    }

    /// HTTP status code, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human-readable message without the status prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
