//! Sequencer -- runs the workflow in order and aggregates the result
//!
//! # Lifecycle
//! ```text
//! NotStarted -> InProgress -> Finished
//! ```
//! Each step moves `Pending -> Running -> {Completed, Skipped}`. A failing
//! step never aborts the run. A fixed delay separates consecutive steps.
//! Persisted state is discarded only when the complete workflow ran and
//! every step passed; a passing subset run keeps it for later resumes.

use std::time::{Duration, Instant};

use tracing::{Instrument, error, info, info_span};

use onboardcheck_core::api::OnboardingApi;
use onboardcheck_core::outcome::{RunSummary, StepOutcome};
use onboardcheck_core::session::StateStore;

use crate::report::{RunReport, StepRecord};
use crate::runner::StepRunner;
use crate::step::Workflow;

/// Sequencer lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    NotStarted,
    InProgress,
    Finished,
}

/// Per-step execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Pending,
    Running,
    Completed,
    Skipped,
}

/// Owns the ordered workflow and drives it through a [`StepRunner`].
pub struct Sequencer<A: OnboardingApi> {
    runner: StepRunner<A>,
    workflow: Workflow,
    step_delay: Duration,
    state: SequencerState,
    step_states: Vec<StepState>,
}

impl<A: OnboardingApi> Sequencer<A> {
    pub fn new(runner: StepRunner<A>, workflow: Workflow, step_delay: Duration) -> Self {
        let step_states = vec![StepState::Pending; workflow.len()];
        Self {
            runner,
            workflow,
            step_delay,
            state: SequencerState::NotStarted,
            step_states,
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn step_states(&self) -> &[StepState] {
        &self.step_states
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    /// Run every step once, in declaration order.
    pub async fn run(&mut self, store: &mut StateStore) -> RunReport {
        let run_id = uuid::Uuid::new_v4().to_string();
        let span = info_span!("run", run_id = %run_id);
        self.run_steps(run_id, store).instrument(span).await
    }

    async fn run_steps(&mut self, run_id: String, store: &mut StateStore) -> RunReport {
        self.state = SequencerState::InProgress;
        self.step_states.fill(StepState::Pending);
        info!(steps = self.workflow.len(), "workflow started");

        let total = self.workflow.len();
        let mut records = Vec::with_capacity(total);

        for (idx, step) in self.workflow.steps().iter().enumerate() {
            if idx > 0 && !self.step_delay.is_zero() {
                tokio::time::sleep(self.step_delay).await;
            }

            self.step_states[idx] = StepState::Running;
            let started = Instant::now();
            let outcome = self.runner.run(step, store).await;
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

            self.step_states[idx] = if outcome.is_skipped() {
                StepState::Skipped
            } else {
                StepState::Completed
            };
            log_outcome(step.name, &outcome, elapsed_ms);

            records.push(StepRecord {
                name: step.name.to_owned(),
                outcome,
                elapsed_ms,
            });
        }

        let summary = RunSummary::from_outcomes(records.iter().map(|r| &r.outcome));
        self.state = SequencerState::Finished;

        if summary.all_passed() && self.workflow.is_complete() {
            store.discard();
        }

        info!(
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            "workflow finished"
        );

        RunReport {
            run_id,
            steps: records,
            summary,
        }
    }
}

fn log_outcome(step: &str, outcome: &StepOutcome, elapsed_ms: u64) {
    match outcome {
        StepOutcome::Pass { diagnostic: None } => info!(step, elapsed_ms, "step passed"),
        StepOutcome::Pass {
            diagnostic: Some(d),
        } => info!(step, elapsed_ms, kind = %d.kind, note = %d.message, "step passed"),
        StepOutcome::Fail { diagnostic } => error!(
            step,
            elapsed_ms,
            kind = %diagnostic.kind,
            status = diagnostic.status,
            error = %diagnostic.message,
            "step failed"
        ),
        StepOutcome::Skipped { diagnostic } => {
            info!(step, reason = %diagnostic.message, "step skipped")
        }
    }
}
