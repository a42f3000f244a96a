//! Command handlers -- one module per subcommand

pub mod run;
pub mod state;
pub mod steps;

use tracing::debug;

use onboardcheck_core::config::{DEFAULT_CONFIG_FILE, OnboardConfig};

use crate::cli::Cli;
use crate::error::CliError;

/// Build the effective configuration: defaults < file < env < flags.
///
/// An explicit `--config` path must exist; the default file is optional.
pub async fn load_config(cli: &Cli) -> Result<OnboardConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => OnboardConfig::load(path).await?,
        None => OnboardConfig::load_or_default(DEFAULT_CONFIG_FILE).await?,
    };

    cli.apply_overrides(&mut config);
    config
        .validate()
        .map_err(|e| CliError::Config(e.to_string()))?;

    debug!(
        base_url = %config.api.base_url,
        state_dir = %config.run.state_dir,
        step_delay_ms = config.run.step_delay_ms,
        "configuration loaded"
    );
    Ok(config)
}
