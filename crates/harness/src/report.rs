//! Run report and summary rendering
//!
//! Rendering is pure: it never influences the exit status, which is derived
//! from [`RunSummary`] alone.

use std::fmt::Write as _;

use serde::Serialize;

use onboardcheck_core::outcome::{RunSummary, StepOutcome};

/// Result of one executed step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub name: String,
    #[serde(flatten)]
    pub outcome: StepOutcome,
    pub elapsed_ms: u64,
}

/// Result of a whole run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub steps: Vec<StepRecord>,
    pub summary: RunSummary,
}

impl RunReport {
    /// Process exit code: 0 only when every step passed.
    pub fn exit_code(&self) -> i32 {
        if self.summary.all_passed() { 0 } else { 1 }
    }

    pub fn is_success(&self) -> bool {
        self.summary.all_passed()
    }

    /// Outcome recorded for `name`, if that step was part of the run.
    pub fn outcome_of(&self, name: &str) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|record| record.name == name)
            .map(|record| &record.outcome)
    }
}

/// Aggregate line, e.g. `Total: 8  Passed: 7  Failed: 1  (88%)`.
pub fn render_summary(summary: &RunSummary) -> String {
    format!(
        "Total: {}  Passed: {}  Failed: {}  ({}%)",
        summary.total,
        summary.passed,
        summary.failed,
        summary.percentage()
    )
}

/// Per-step lines followed by the aggregate line.
pub fn render_report(report: &RunReport) -> String {
    render_report_with(
        report,
        |outcome| outcome.label().to_owned(),
        str::to_owned,
    )
}

/// Layout of [`render_report`] with the status label and the aggregate line
/// passed through `label` and `summary`, e.g. to colour them for a terminal.
/// Label width is fixed, so decorations never shift the columns.
pub fn render_report_with(
    report: &RunReport,
    label: impl Fn(&StepOutcome) -> String,
    summary: impl Fn(&str) -> String,
) -> String {
    let width = report
        .steps
        .iter()
        .map(|record| record.name.len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for record in &report.steps {
        let _ = writeln!(
            out,
            "[{}] {:<width$}  {:>6} ms",
            label(&record.outcome),
            record.name,
            record.elapsed_ms,
        );
        if let Some(diagnostic) = record.outcome.diagnostic() {
            let _ = writeln!(out, "       {diagnostic}");
        }
    }
    out.push('\n');
    out.push_str(&summary(&render_summary(&report.summary)));
    out.push('\n');
    out
}
