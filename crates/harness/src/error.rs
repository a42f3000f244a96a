//! Harness error types

/// Errors raised while assembling a run.
///
/// Step failures never surface here; they are classified into
/// [`StepOutcome`](onboardcheck_core::outcome::StepOutcome)s instead.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// A classifier marker is not a valid regular expression
    #[error("invalid classifier marker '{pattern}': {reason}")]
    InvalidMarker { pattern: String, reason: String },

    /// Step selection named a step that is not registered
    #[error("unknown step '{name}' (known steps: {known})")]
    UnknownStep { name: String, known: String },

    /// Account-creation document could not be loaded
    #[error("failed to load payload '{path}': {reason}")]
    Payload { path: String, reason: String },

    /// HTTP client could not be constructed
    #[error("http client error: {0}")]
    Client(String),
}
