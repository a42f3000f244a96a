//! Outcome classifier -- maps raw API results to step outcomes
//!
//! [`ClassifierRules`] is a data table built from the `[classifier]` config
//! section. Marker patterns are compiled once when the table is built.
//!
//! Rules are evaluated in order and the first match wins:
//!
//! 1. success with the shape the step expects -> `Pass` (produced values extracted)
//! 2. conflict on an idempotent-creation step -> `Pass` (`expected_conflict`)
//! 3. validation status carrying an `errors` payload -> `Fail` (`validation`)
//! 4. authorization status -> `Fail` (`auth`, with remediation hint)
//! 5. message matching a blocking marker -> `Fail` (`domain_blocked`)
//! 6. anything else -> `Fail` (`transport`, raw message)

use regex::Regex;
use serde_json::Value;

use onboardcheck_core::api::{ApiResult, Envelope};
use onboardcheck_core::config::ClassifierConfig;
use onboardcheck_core::error::ApiError;
use onboardcheck_core::outcome::{Diagnostic, ErrorKind, StepOutcome};
use onboardcheck_core::session::SessionUpdate;

use crate::error::HarnessError;
use crate::step::StepKind;

/// Field names a token may be returned under.
pub const TOKEN_FIELDS: [&str; 3] = ["token", "access_token", "accessToken"];

/// Field names an account id may be returned under.
pub const ACCOUNT_ID_FIELDS: [&str; 3] = ["accountId", "account_id", "id"];

const AUTH_HINT: &str =
    "credentials or session required; pass --auth-token or check the auth step";
const BLOCKED_HINT: &str = "blocked by pending request";

/// Classified step result plus the session values it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub outcome: StepOutcome,
    pub produced: SessionUpdate,
}

impl Classification {
    fn pass(produced: SessionUpdate) -> Self {
        Self {
            outcome: StepOutcome::pass(),
            produced,
        }
    }

    fn fail(diagnostic: Diagnostic) -> Self {
        Self {
            outcome: StepOutcome::fail(diagnostic),
            produced: SessionUpdate::default(),
        }
    }
}

/// Classification rule table.
#[derive(Debug, Clone)]
pub struct ClassifierRules {
    blocked_markers: Vec<Regex>,
    conflict_statuses: Vec<u16>,
    validation_statuses: Vec<u16>,
    auth_statuses: Vec<u16>,
}

impl ClassifierRules {
    /// Build the table, compiling every marker pattern.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, HarnessError> {
        let blocked_markers = config
            .blocked_markers
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| HarnessError::InvalidMarker {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            blocked_markers,
            conflict_statuses: config.conflict_statuses.clone(),
            validation_statuses: config.validation_statuses.clone(),
            auth_statuses: config.auth_statuses.clone(),
        })
    }

    /// Whether `message` matches any blocking marker.
    pub fn is_blocked(&self, message: &str) -> bool {
        self.blocked_markers.iter().any(|re| re.is_match(message))
    }

    /// Map a step's raw result to its outcome. Total: every input maps.
    pub fn classify(&self, kind: StepKind, result: &ApiResult) -> Classification {
        match result {
            Ok(envelope) => classify_success(kind, envelope),
            Err(err) => self.classify_error(kind, err),
        }
    }

    fn classify_error(&self, kind: StepKind, err: &ApiError) -> Classification {
        let status = err.status();
        let message = err.message();

        // rule 2
        if let (Some(code), ApiError::Status { body, .. }) = (status, err) {
            if kind.is_idempotent_create() && self.conflict_statuses.contains(&code) {
                let produced = body
                    .as_ref()
                    .and_then(existing_account_id)
                    .map(SessionUpdate::account)
                    .unwrap_or_default();
                return Classification {
                    outcome: StepOutcome::pass_with(
                        Diagnostic::new(ErrorKind::ExpectedConflict, message)
                            .with_status(status),
                    ),
                    produced,
                };
            }
        }

        // rule 3
        if let (Some(code), ApiError::Status { errors: Some(errors), .. }) = (status, err) {
            if self.validation_statuses.contains(&code) {
                return Classification::fail(
                    Diagnostic::new(ErrorKind::Validation, message)
                        .with_status(status)
                        .with_detail(Some(errors.clone())),
                );
            }
        }

        // rule 4
        if status.is_some_and(|code| self.auth_statuses.contains(&code)) {
            return Classification::fail(
                Diagnostic::new(ErrorKind::Auth, message)
                    .with_status(status)
                    .with_hint(AUTH_HINT),
            );
        }

        // rule 5
        if self.is_blocked(&message) {
            return Classification::fail(
                Diagnostic::new(ErrorKind::DomainBlocked, message)
                    .with_status(status)
                    .with_hint(BLOCKED_HINT),
            );
        }

        // rule 6
        Classification::fail(Diagnostic::new(ErrorKind::Transport, message).with_status(status))
    }
}

fn classify_success(kind: StepKind, envelope: &Envelope) -> Classification {
    match kind {
        StepKind::Authenticate => match envelope.data_str(&TOKEN_FIELDS) {
            Some(token) => Classification::pass(SessionUpdate::token(token)),
            None => Classification::fail(Diagnostic::new(
                ErrorKind::Transport,
                "token issuance succeeded but the response carried no token",
            )),
        },
        StepKind::CreateAccount => match envelope.data_str(&ACCOUNT_ID_FIELDS) {
            Some(id) => Classification::pass(SessionUpdate::account(id)),
            None => Classification::fail(Diagnostic::new(
                ErrorKind::Transport,
                "account creation succeeded but the response carried no account id",
            )),
        },
        StepKind::FetchRfi => match envelope.data.get("active_request") {
            Some(request) if !request.is_null() => Classification {
                outcome: StepOutcome::pass_with(
                    Diagnostic::new(ErrorKind::DomainBlocked, "information request pending")
                        .with_detail(Some(request.clone())),
                ),
                produced: SessionUpdate::default(),
            },
            _ => Classification::pass(SessionUpdate::default()),
        },
        _ => Classification::pass(SessionUpdate::default()),
    }
}

/// Account id named by a conflict body, either at the top level or under `data`.
fn existing_account_id(body: &Value) -> Option<String> {
    let scopes = [body.get("data"), Some(body)];
    scopes.into_iter().flatten().find_map(|scope| {
        ACCOUNT_ID_FIELDS
            .iter()
            .find_map(|name| match scope.get(*name)? {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
    })
}
