//! CLI-specific error types and exit code mapping

use onboardcheck_core::error::{OnboardError, StateError};
use onboardcheck_harness::HarnessError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// The workflow ran but at least one step did not pass.
    #[error("{failed} of {total} steps did not pass")]
    RunFailed { failed: usize, total: usize },

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from onboardcheck-core.
    #[error("{0}")]
    Core(#[from] OnboardError),

    /// Wrapped error from onboardcheck-harness.
    #[error("{0}")]
    Harness(#[from] HarnessError),
}

impl From<StateError> for CliError {
    fn from(e: StateError) -> Self {
        Self::Core(OnboardError::State(e))
    }
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                  |
    /// |------|------------------------------------------|
    /// | 0    | Success (every step passed)              |
    /// | 1    | General error / a step failed or skipped |
    /// | 2    | Configuration error                      |
    /// | 10   | IO error                                 |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Io(_) => 10,
            Self::Core(OnboardError::Config(_)) => 2,
            Self::Core(OnboardError::Io(_)) => 10,
            Self::Harness(HarnessError::InvalidMarker { .. } | HarnessError::UnknownStep { .. }) => {
                2
            }
            Self::Harness(HarnessError::Payload { .. }) => 10,
            Self::RunFailed { .. }
            | Self::JsonSerialize(_)
            | Self::Core(_)
            | Self::Harness(HarnessError::Client(_)) => 1,
        }
    }
}
