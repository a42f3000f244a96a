//! Step outcomes, diagnostics and the aggregate run summary.
//!
//! A [`StepOutcome`] is produced exactly once per executed step and never
//! mutated afterwards. [`RunSummary`] folds a sequence of outcomes;
//! `Skipped` counts as failed so that a run with missing prerequisites
//! never gates green.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Failure taxonomy attached to every diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Required session value absent; the step was not attempted.
    PrerequisiteMissing,
    /// Resource already exists; tolerated as a pass.
    ExpectedConflict,
    /// Request payload rejected by validation.
    Validation,
    /// Missing or invalid credentials.
    Auth,
    /// Business precondition unmet (e.g. pending information request).
    DomainBlocked,
    /// Timeout, connection failure, unexpected status or response.
    Transport,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrerequisiteMissing => write!(f, "prerequisite_missing"),
            Self::ExpectedConflict => write!(f, "expected_conflict"),
            Self::Validation => write!(f, "validation"),
            Self::Auth => write!(f, "auth"),
            Self::DomainBlocked => write!(f, "domain_blocked"),
            Self::Transport => write!(f, "transport"),
        }
    }
}

/// Diagnostic payload carried by an outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl Diagnostic {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
            hint: None,
            detail: None,
        }
    }

    pub fn with_status(mut self, status: Option<u16>) -> Self {
        self.status = status;
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_detail(mut self, detail: Option<Value>) -> Self {
        self.detail = detail;
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "[{}] HTTP {}: {}", self.kind, status, self.message)?,
            None => write!(f, "[{}] {}", self.kind, self.message)?,
        }
        if let Some(hint) = &self.hint {
            write!(f, " (hint: {hint})")?;
        }
        Ok(())
    }
}

/// Classified result of one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Step succeeded (optionally with a note, e.g. an expected conflict).
    Pass {
        #[serde(skip_serializing_if = "Option::is_none")]
        diagnostic: Option<Diagnostic>,
    },
    /// Step failed.
    Fail { diagnostic: Diagnostic },
    /// Step was not attempted because a prerequisite was missing.
    Skipped { diagnostic: Diagnostic },
}

impl StepOutcome {
    pub fn pass() -> Self {
        Self::Pass { diagnostic: None }
    }

    pub fn pass_with(diagnostic: Diagnostic) -> Self {
        Self::Pass {
            diagnostic: Some(diagnostic),
        }
    }

    pub fn fail(diagnostic: Diagnostic) -> Self {
        Self::Fail { diagnostic }
    }

    pub fn skipped(diagnostic: Diagnostic) -> Self {
        Self::Skipped { diagnostic }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::Pass { diagnostic } => diagnostic.as_ref(),
            Self::Fail { diagnostic } | Self::Skipped { diagnostic } => Some(diagnostic),
        }
    }

    /// Fixed-width label for report lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pass { .. } => "PASS",
            Self::Fail { .. } => "FAIL",
            Self::Skipped { .. } => "SKIP",
        }
    }
}

/// Aggregate counts over one run.
///
/// Invariant: `total == passed + failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl RunSummary {
    /// Fold outcomes into a summary. `Skipped` counts as failed.
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a StepOutcome>) -> Self {
        outcomes
            .into_iter()
            .fold(Self::default(), |mut summary, outcome| {
                summary.total += 1;
                if outcome.is_pass() {
                    summary.passed += 1;
                } else {
                    summary.failed += 1;
                }
                summary
            })
    }

    /// `round(passed / total * 100)`, or 0 for an empty run.
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.passed as f64 / self.total as f64) * 100.0).round() as u32
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}
