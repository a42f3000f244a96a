//! `onboardcheck steps` command handler

use std::io::Write;

use serde::Serialize;

use onboardcheck_core::config::OnboardConfig;
use onboardcheck_harness::Workflow;

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `steps` command.
pub fn execute(config: &OnboardConfig, writer: &OutputWriter) -> Result<(), CliError> {
    let workflow = Workflow::standard(&config.timeouts);
    let report = StepsReport {
        steps: workflow
            .steps()
            .iter()
            .map(|step| StepInfo {
                name: step.name,
                description: step.kind.description(),
                requires: step.kind.requirement().to_string(),
                timeout_secs: step.timeout.as_secs(),
            })
            .collect(),
    };
    writer.render(&report)
}

#[derive(Debug, Serialize)]
pub struct StepsReport {
    pub steps: Vec<StepInfo>,
}

#[derive(Debug, Serialize)]
pub struct StepInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub requires: String,
    pub timeout_secs: u64,
}

impl Render for StepsReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            w,
            "{:<10} {:<18} {:>8}  {}",
            "STEP", "REQUIRES", "TIMEOUT", "DESCRIPTION"
        )?;
        for step in &self.steps {
            writeln!(
                w,
                "{:<10} {:<18} {:>7}s  {}",
                step.name, step.requires, step.timeout_secs, step.description
            )?;
        }
        Ok(())
    }
}
