//! Step runner -- executes one step against the API
//!
//! [`StepRunner::run`] checks prerequisites, invokes the remote operation
//! under the step's timeout, classifies the result and writes produced
//! values back into the [`StateStore`]. It never returns an error: every
//! failure ends up in the returned [`StepOutcome`].

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use onboardcheck_core::api::{ApiResult, OnboardingApi};
use onboardcheck_core::error::ApiError;
use onboardcheck_core::outcome::{Diagnostic, ErrorKind, StepOutcome};
use onboardcheck_core::session::StateStore;

use crate::classifier::ClassifierRules;
use crate::step::{StepDescriptor, StepKind};

/// Inputs resolved from the session before the call.
struct StepInputs {
    token: Option<String>,
    account_id: Option<String>,
}

/// Runs individual steps against an [`OnboardingApi`].
pub struct StepRunner<A: OnboardingApi> {
    api: Arc<A>,
    rules: ClassifierRules,
    /// Opaque account-creation document, sent verbatim
    document: Value,
}

impl<A: OnboardingApi> StepRunner<A> {
    pub fn new(api: Arc<A>, rules: ClassifierRules, document: Value) -> Self {
        Self {
            api,
            rules,
            document,
        }
    }

    /// Execute `step`, reading and updating `store`.
    pub async fn run(&self, step: &StepDescriptor, store: &mut StateStore) -> StepOutcome {
        let inputs = match resolve_inputs(step, store) {
            Ok(inputs) => inputs,
            Err(diagnostic) => {
                info!(step = step.name, reason = %diagnostic.message, "step skipped");
                return StepOutcome::skipped(diagnostic);
            }
        };

        debug!(
            step = step.name,
            timeout_ms = u64::try_from(step.timeout.as_millis()).unwrap_or(u64::MAX),
            "invoking remote operation"
        );

        let result = match tokio::time::timeout(step.timeout, self.invoke(step.kind, &inputs)).await
        {
            Ok(result) => result,
            Err(_elapsed) => Err(ApiError::Timeout(step.timeout)),
        };

        let classification = self.rules.classify(step.kind, &result);
        let produced = classification.produced;

        if !produced.is_empty() {
            let produced_account = produced.account_id.is_some();
            store.set(produced);
            if produced_account {
                // later processes resume from this value
                if let Err(e) = store.persist() {
                    warn!(step = step.name, error = %e, "failed to persist account id");
                }
            }
        }

        classification.outcome
    }

    async fn invoke(&self, kind: StepKind, inputs: &StepInputs) -> ApiResult {
        let token = inputs.token.as_deref();
        // prerequisites were checked by resolve_inputs; empty strings only
        // reach here when the step does not need the value
        let bearer = token.unwrap_or_default();
        let account_id = inputs.account_id.as_deref().unwrap_or_default();

        match kind {
            StepKind::Health => self.api.health().await,
            StepKind::IntegrationStatus => self.api.integration_status(token).await,
            StepKind::Authenticate => self.api.issue_token(token).await,
            StepKind::CreateAccount => self.api.create_account(bearer, &self.document).await,
            StepKind::FetchAccount => self.api.get_account(bearer, account_id).await,
            StepKind::AcceptTerms => self.api.accept_terms(bearer, account_id).await,
            StepKind::Activate => self.api.activate(bearer, account_id).await,
            StepKind::FetchRfi => self.api.get_rfi(bearer, account_id).await,
        }
    }
}

/// Collect the session values `step` needs, or the reason it must be skipped.
fn resolve_inputs(step: &StepDescriptor, store: &mut StateStore) -> Result<StepInputs, Diagnostic> {
    let requirement = step.kind.requirement();
    let token = store.get().auth_token.clone();

    if requirement.needs_token() && token.is_none() {
        return Err(Diagnostic::new(
            ErrorKind::PrerequisiteMissing,
            "missing auth token",
        )
        .with_hint("run the auth step or pass --auth-token"));
    }

    let account_id = if requirement.needs_account() {
        match store.resolve_account_id() {
            Some(id) => Some(id),
            None => {
                return Err(Diagnostic::new(
                    ErrorKind::PrerequisiteMissing,
                    "missing account id (none in session or persisted state)",
                )
                .with_hint("run the create step first"));
            }
        }
    } else {
        store.get().account_id.clone()
    };

    Ok(StepInputs { token, account_id })
}
