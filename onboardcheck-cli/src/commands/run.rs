//! `onboardcheck run` command handler

use std::io::Write;
use std::sync::Arc;

use tracing::info;

use onboardcheck_core::config::OnboardConfig;
use onboardcheck_core::outcome::StepOutcome;
use onboardcheck_core::session::{FileSideChannel, StateStore};
use onboardcheck_harness::{
    ClassifierRules, HttpOnboardingApi, RunReport, Sequencer, StepRunner, Workflow, load_document,
    render_report_with,
};

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the workflow (or the `only` subset) and render the report.
///
/// Returns [`CliError::RunFailed`] after rendering when any step did not pass.
pub async fn execute(
    config: &OnboardConfig,
    only: &[String],
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let rules = ClassifierRules::from_config(&config.classifier)?;
    let workflow = Workflow::standard(&config.timeouts).select(only)?;
    let document = load_document(config.api.payload_path.as_deref())?;
    let api = Arc::new(HttpOnboardingApi::new(&config.api)?);

    info!(
        base_url = %config.api.base_url,
        steps = workflow.len(),
        has_token = config.api.auth_token.is_some(),
        "starting onboarding workflow"
    );

    let mut store = StateStore::new(FileSideChannel::new(&config.run.state_dir))
        .with_token(config.api.auth_token.clone());
    let mut sequencer = Sequencer::new(
        StepRunner::new(api, rules, document),
        workflow,
        config.run.step_delay(),
    );
    let report = sequencer.run(&mut store).await;

    writer.render(&report)?;

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::RunFailed {
            failed: report.summary.failed,
            total: report.summary.total,
        })
    }
}

impl Render for RunReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let text = render_report_with(
            self,
            |outcome| {
                let label = outcome.label();
                match outcome {
                    StepOutcome::Pass { .. } => label.green().to_string(),
                    StepOutcome::Fail { .. } => label.red().to_string(),
                    StepOutcome::Skipped { .. } => label.yellow().to_string(),
                }
            },
            |summary| summary.bold().to_string(),
        );
        write!(w, "{text}")
    }
}
