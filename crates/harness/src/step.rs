//! Step catalogue -- the registered onboarding workflow
//!
//! A [`StepDescriptor`] names one remote operation ([`StepKind`]) and the
//! timeout it runs under. [`Workflow::standard`] assembles the eight steps in
//! declaration order; [`Workflow::select`] narrows it to a subset without
//! reordering.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use onboardcheck_core::config::TimeoutsConfig;

use crate::error::HarnessError;

/// Remote operation performed by a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Health,
    IntegrationStatus,
    Authenticate,
    CreateAccount,
    FetchAccount,
    AcceptTerms,
    Activate,
    FetchRfi,
}

impl StepKind {
    /// Every kind, in workflow order.
    pub const ALL: [StepKind; 8] = [
        Self::Health,
        Self::IntegrationStatus,
        Self::Authenticate,
        Self::CreateAccount,
        Self::FetchAccount,
        Self::AcceptTerms,
        Self::Activate,
        Self::FetchRfi,
    ];

    /// Short name used on the command line and in reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::IntegrationStatus => "status",
            Self::Authenticate => "auth",
            Self::CreateAccount => "create",
            Self::FetchAccount => "get",
            Self::AcceptTerms => "terms",
            Self::Activate => "activate",
            Self::FetchRfi => "rfi",
        }
    }

    /// Session values the step needs before it may call the API.
    pub fn requirement(&self) -> Requirement {
        match self {
            Self::Health | Self::IntegrationStatus | Self::Authenticate => Requirement::Nothing,
            Self::CreateAccount => Requirement::Token,
            Self::FetchAccount | Self::AcceptTerms | Self::Activate | Self::FetchRfi => {
                Requirement::TokenAndAccount
            }
        }
    }

    /// Whether a conflict response means "already done".
    pub fn is_idempotent_create(&self) -> bool {
        matches!(self, Self::CreateAccount)
    }

    /// Timeout for this kind from the `[timeouts]` section.
    pub fn timeout(&self, timeouts: &TimeoutsConfig) -> Duration {
        let secs = match self {
            Self::Health => timeouts.health_secs,
            Self::IntegrationStatus => timeouts.status_secs,
            Self::Authenticate => timeouts.auth_secs,
            Self::CreateAccount => timeouts.create_secs,
            Self::FetchAccount => timeouts.fetch_secs,
            Self::AcceptTerms => timeouts.terms_secs,
            Self::Activate => timeouts.activate_secs,
            Self::FetchRfi => timeouts.rfi_secs,
        };
        Duration::from_secs(secs)
    }

    /// One-line description for step listings.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Health => "service liveness probe",
            Self::IntegrationStatus => "integration status probe",
            Self::Authenticate => "issue a bearer token",
            Self::CreateAccount => "create an account from the payload document",
            Self::FetchAccount => "fetch the created account by id",
            Self::AcceptTerms => "accept terms for the account",
            Self::Activate => "activate the account",
            Self::FetchRfi => "fetch the account's request-for-information state",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Prerequisite session values of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    Nothing,
    Token,
    TokenAndAccount,
}

impl Requirement {
    pub fn needs_token(&self) -> bool {
        !matches!(self, Self::Nothing)
    }

    pub fn needs_account(&self) -> bool {
        matches!(self, Self::TokenAndAccount)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nothing => write!(f, "-"),
            Self::Token => write!(f, "token"),
            Self::TokenAndAccount => write!(f, "token, account id"),
        }
    }
}

/// One registered step. Immutable once the workflow is assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDescriptor {
    pub name: &'static str,
    pub kind: StepKind,
    pub timeout: Duration,
}

impl StepDescriptor {
    pub fn new(kind: StepKind, timeout: Duration) -> Self {
        Self {
            name: kind.name(),
            kind,
            timeout,
        }
    }
}

/// Ordered list of steps to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workflow {
    steps: Vec<StepDescriptor>,
    /// False once [`select`](Self::select) has dropped any step
    complete: bool,
}

impl Workflow {
    /// The full eight-step onboarding workflow.
    pub fn standard(timeouts: &TimeoutsConfig) -> Self {
        Self {
            steps: StepKind::ALL
                .iter()
                .map(|kind| StepDescriptor::new(*kind, kind.timeout(timeouts)))
                .collect(),
            complete: true,
        }
    }

    /// Keep only the named steps, preserving declaration order.
    ///
    /// An empty selection keeps every step.
    pub fn select<S: AsRef<str>>(self, names: &[S]) -> Result<Self, HarnessError> {
        if names.is_empty() {
            return Ok(self);
        }

        for name in names {
            let name = name.as_ref();
            if !self.steps.iter().any(|s| s.name == name) {
                return Err(HarnessError::UnknownStep {
                    name: name.to_owned(),
                    known: self.names().join(", "),
                });
            }
        }

        let registered = self.steps.len();
        let steps: Vec<_> = self
            .steps
            .into_iter()
            .filter(|s| names.iter().any(|n| n.as_ref() == s.name))
            .collect();
        Ok(Self {
            complete: self.complete && steps.len() == registered,
            steps,
        })
    }

    pub fn steps(&self) -> &[StepDescriptor] {
        &self.steps
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name).collect()
    }

    /// Whether every registered step is part of this workflow.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
