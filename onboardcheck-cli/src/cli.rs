//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative apart from [`Cli::apply_overrides`], which layers
//! flag values on top of the loaded configuration.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use onboardcheck_core::config::OnboardConfig;

/// onboardcheck -- end-to-end checks for a remote onboarding API.
///
/// Without a subcommand the full workflow is run (same as `onboardcheck run`).
#[derive(Parser, Debug)]
#[command(name = "onboardcheck", version, about, long_about = None)]
pub struct Cli {
    /// Path to the onboardcheck.toml configuration file
    /// (default: ./onboardcheck.toml, optional).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Flags shared by every subcommand.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Base URL of the API under test.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Pre-supplied bearer token.
    #[arg(long, global = true)]
    pub auth_token: Option<String>,

    /// Run only these steps (comma separated, declaration order is kept).
    #[arg(long, global = true, value_delimiter = ',')]
    pub only: Vec<String>,

    /// JSON document sent on account creation (default: built-in sample).
    #[arg(long, global = true)]
    pub payload: Option<PathBuf>,

    /// Directory holding the persisted account id.
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    /// Pause between steps in milliseconds.
    #[arg(long, global = true)]
    pub step_delay_ms: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the onboarding workflow and report per-step results.
    Run,

    /// Inspect or clear the persisted account id.
    State(StateArgs),

    /// List the registered workflow steps.
    Steps,
}

// ---- state ----

/// Manage the persisted account id.
#[derive(Args, Debug)]
pub struct StateArgs {
    #[command(subcommand)]
    pub action: StateAction,
}

#[derive(Subcommand, Debug)]
pub enum StateAction {
    /// Show the persisted account id, if any.
    Show,
    /// Remove the persisted account id.
    Clear,
}

impl Cli {
    /// Apply flag values on top of `config` (flags win over file and env).
    pub fn apply_overrides(&self, config: &mut OnboardConfig) {
        if let Some(level) = &self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.general.log_format = format.clone();
        }
        if let Some(url) = &self.run.api_url {
            config.api.base_url = url.clone();
        }
        if let Some(token) = &self.run.auth_token {
            config.api.auth_token = (!token.is_empty()).then(|| token.clone());
        }
        if let Some(payload) = &self.run.payload {
            config.api.payload_path = Some(payload.display().to_string());
        }
        if let Some(dir) = &self.run.state_dir {
            config.run.state_dir = dir.display().to_string();
        }
        if let Some(delay) = self.run.step_delay_ms {
            config.run.step_delay_ms = delay;
        }
    }
}
