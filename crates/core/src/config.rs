//! Configuration -- `onboardcheck.toml` parsing and runtime settings
//!
//! [`OnboardConfig`] is the top-level structure; each component reads only
//! its own section.
//!
//! # Precedence
//! 1. CLI arguments (highest)
//! 2. Environment variables (`ONBOARDCHECK_API_BASE_URL=...`)
//! 3. Config file (`onboardcheck.toml`)
//! 4. Defaults (`Default` impls)
//!
//! # Example
//! ```no_run
//! # async fn example() -> Result<(), onboardcheck_core::error::OnboardError> {
//! use onboardcheck_core::config::OnboardConfig;
//!
//! // file + env overrides, defaults when the file is absent
//! let config = OnboardConfig::load_or_default("onboardcheck.toml").await?;
//!
//! // straight from a TOML string
//! let config = OnboardConfig::parse("[api]\nbase_url = \"http://localhost:8080\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, OnboardError};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "onboardcheck.toml";

/// onboardcheck configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OnboardConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

impl OnboardConfig {
    /// Load a TOML file, apply env overrides and validate.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, OnboardError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, OnboardError> {
        match Self::from_file(path).await {
            Ok(mut config) => {
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
            Err(OnboardError::Config(ConfigError::FileNotFound { .. })) => {
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
            Err(e) => Err(e),
        }
    }

    /// Load a TOML file without env overrides.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, OnboardError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                OnboardError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                OnboardError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// Parse a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, OnboardError> {
        toml::from_str(toml_str).map_err(|e| {
            OnboardError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// Apply `ONBOARDCHECK_{SECTION}_{FIELD}` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "ONBOARDCHECK_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "ONBOARDCHECK_GENERAL_LOG_FORMAT");

        // API
        override_string(&mut self.api.base_url, "ONBOARDCHECK_API_BASE_URL");
        override_opt_string(&mut self.api.auth_token, "ONBOARDCHECK_API_AUTH_TOKEN");
        override_opt_string(&mut self.api.payload_path, "ONBOARDCHECK_API_PAYLOAD_PATH");

        // API routes, e.g. ONBOARDCHECK_API_ROUTES_HEALTH
        let routes = &mut self.api.routes;
        for (field, target) in [
            ("HEALTH", &mut routes.health),
            ("INTEGRATION_STATUS", &mut routes.integration_status),
            ("ISSUE_TOKEN", &mut routes.issue_token),
            ("CREATE_ACCOUNT", &mut routes.create_account),
            ("ACCOUNT", &mut routes.account),
            ("ACCEPT_TERMS", &mut routes.accept_terms),
            ("ACTIVATE", &mut routes.activate),
            ("RFI", &mut routes.rfi),
        ] {
            override_string(target, &format!("ONBOARDCHECK_API_ROUTES_{field}"));
        }

        // Run
        override_u64(&mut self.run.step_delay_ms, "ONBOARDCHECK_RUN_STEP_DELAY_MS");
        override_string(&mut self.run.state_dir, "ONBOARDCHECK_RUN_STATE_DIR");

        // Timeouts
        let timeouts = &mut self.timeouts;
        for (field, target) in [
            ("HEALTH_SECS", &mut timeouts.health_secs),
            ("STATUS_SECS", &mut timeouts.status_secs),
            ("AUTH_SECS", &mut timeouts.auth_secs),
            ("CREATE_SECS", &mut timeouts.create_secs),
            ("FETCH_SECS", &mut timeouts.fetch_secs),
            ("TERMS_SECS", &mut timeouts.terms_secs),
            ("ACTIVATE_SECS", &mut timeouts.activate_secs),
            ("RFI_SECS", &mut timeouts.rfi_secs),
        ] {
            override_u64(target, &format!("ONBOARDCHECK_TIMEOUTS_{field}"));
        }

        // Classifier
        override_patterns(
            &mut self.classifier.blocked_markers,
            "ONBOARDCHECK_CLASSIFIER_BLOCKED_MARKERS",
        );
        override_status_list(
            &mut self.classifier.conflict_statuses,
            "ONBOARDCHECK_CLASSIFIER_CONFLICT_STATUSES",
        );
        override_status_list(
            &mut self.classifier.validation_statuses,
            "ONBOARDCHECK_CLASSIFIER_VALIDATION_STATUSES",
        );
        override_status_list(
            &mut self.classifier.auth_statuses,
            "ONBOARDCHECK_CLASSIFIER_AUTH_STATUSES",
        );
    }

    /// Validate field values.
    pub fn validate(&self) -> Result<(), OnboardError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(invalid("api.base_url", "must not be empty"));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(invalid("api.base_url", "must start with http:// or https://"));
        }

        for (field, route) in self.api.routes.entries() {
            if !route.starts_with('/') {
                return Err(invalid(
                    &format!("api.routes.{field}"),
                    "must start with '/'",
                ));
            }
        }

        for (field, secs) in self.timeouts.entries() {
            if secs == 0 {
                return Err(invalid(
                    &format!("timeouts.{field}"),
                    "must be greater than 0",
                ));
            }
        }

        for marker in &self.classifier.blocked_markers {
            if let Err(e) = Regex::new(marker) {
                return Err(invalid(
                    "classifier.blocked_markers",
                    format!("invalid pattern '{marker}': {e}"),
                ));
            }
        }

        let status_lists = [
            ("classifier.conflict_statuses", &self.classifier.conflict_statuses),
            ("classifier.validation_statuses", &self.classifier.validation_statuses),
            ("classifier.auth_statuses", &self.classifier.auth_statuses),
        ];
        for (field, statuses) in status_lists {
            if let Some(bad) = statuses.iter().find(|s| !(100..=599).contains(*s)) {
                return Err(invalid(field, format!("{bad} is not an HTTP status code")));
            }
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> OnboardError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.into(),
    }
    .into()
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log format (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// Remote API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the API under test
    pub base_url: String,
    /// Pre-supplied bearer token
    pub auth_token: Option<String>,
    /// Path to the account-creation document (built-in sample when unset)
    pub payload_path: Option<String>,
    /// Route templates; `{id}` is replaced by the account id
    pub routes: RoutesConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_owned(),
            auth_token: None,
            payload_path: None,
            routes: RoutesConfig::default(),
        }
    }
}

/// Route templates relative to `api.base_url`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    pub health: String,
    pub integration_status: String,
    pub issue_token: String,
    pub create_account: String,
    pub account: String,
    pub accept_terms: String,
    pub activate: String,
    pub rfi: String,
}

impl RoutesConfig {
    fn entries(&self) -> [(&'static str, &str); 8] {
        [
            ("health", &self.health),
            ("integration_status", &self.integration_status),
            ("issue_token", &self.issue_token),
            ("create_account", &self.create_account),
            ("account", &self.account),
            ("accept_terms", &self.accept_terms),
            ("activate", &self.activate),
            ("rfi", &self.rfi),
        ]
    }
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            health: "/health".to_owned(),
            integration_status: "/api/v1/integration/status".to_owned(),
            issue_token: "/api/v1/auth/token".to_owned(),
            create_account: "/api/v1/accounts".to_owned(),
            account: "/api/v1/accounts/{id}".to_owned(),
            accept_terms: "/api/v1/accounts/{id}/accept-terms".to_owned(),
            activate: "/api/v1/accounts/{id}/activate".to_owned(),
            rfi: "/api/v1/accounts/{id}/rfi".to_owned(),
        }
    }
}

/// Sequencing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Pause between consecutive steps, in milliseconds
    pub step_delay_ms: u64,
    /// Directory holding the persisted account id
    pub state_dir: String,
}

impl RunConfig {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: 500,
            state_dir: ".".to_owned(),
        }
    }
}

/// Per-step timeouts, in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutsConfig {
    pub health_secs: u64,
    pub status_secs: u64,
    pub auth_secs: u64,
    pub create_secs: u64,
    pub fetch_secs: u64,
    pub terms_secs: u64,
    pub activate_secs: u64,
    pub rfi_secs: u64,
}

impl TimeoutsConfig {
    fn entries(&self) -> [(&'static str, u64); 8] {
        [
            ("health_secs", self.health_secs),
            ("status_secs", self.status_secs),
            ("auth_secs", self.auth_secs),
            ("create_secs", self.create_secs),
            ("fetch_secs", self.fetch_secs),
            ("terms_secs", self.terms_secs),
            ("activate_secs", self.activate_secs),
            ("rfi_secs", self.rfi_secs),
        ]
    }
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        // read-only probes are short; creation and activation may wait on
        // downstream verification
        Self {
            health_secs: 5,
            status_secs: 5,
            auth_secs: 10,
            create_secs: 30,
            fetch_secs: 10,
            terms_secs: 15,
            activate_secs: 30,
            rfi_secs: 10,
        }
    }
}

/// Outcome classifier rule table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Message patterns (regex) that mark a failure as blocked by a
    /// pending business precondition
    pub blocked_markers: Vec<String>,
    /// Statuses tolerated on idempotent creation
    pub conflict_statuses: Vec<u16>,
    /// Statuses that carry a validation payload
    pub validation_statuses: Vec<u16>,
    /// Statuses that signal missing or invalid credentials
    pub auth_statuses: Vec<u16>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            blocked_markers: vec![
                r"(?i)\bactive[ _]request\b".to_owned(),
                r"(?i)pending (information|rfi) request".to_owned(),
                r"(?i)outstanding request for information".to_owned(),
                r"(?i)\brfi\b.*\b(open|pending|outstanding)\b".to_owned(),
            ],
            conflict_statuses: vec![409],
            validation_statuses: vec![400, 422],
            auth_statuses: vec![401, 403],
        }
    }
}

// --- env override helpers ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_opt_string(target: &mut Option<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = (!val.is_empty()).then_some(val);
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

/// Comma-separated regex list. Commas inside `{}`, `[]` or `()` and
/// backslash-escaped commas belong to the pattern, so `a{1,3}` survives.
fn override_patterns(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = split_patterns(&val);
    }
}

fn split_patterns(val: &str) -> Vec<String> {
    let mut patterns = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut chars = val.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                continue;
            }
            '{' | '[' | '(' => depth += 1,
            '}' | ']' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                patterns.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    patterns.push(current);

    patterns
        .into_iter()
        .map(|p| p.trim().to_owned())
        .filter(|p| !p.is_empty())
        .collect()
}

fn override_status_list(target: &mut Vec<u16>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        let parsed: Result<Vec<u16>, _> = val
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<u16>)
            .collect();
        match parsed {
            Ok(statuses) => *target = statuses,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse status list from env var, ignoring"
            ),
        }
    }
}
