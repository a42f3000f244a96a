//! Builders that wire the stub API into a sequencer.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use onboardcheck_core::config::OnboardConfig;
use onboardcheck_core::session::{FileSideChannel, StateStore};
use onboardcheck_harness::{ClassifierRules, RunReport, Sequencer, StepRunner, Workflow};

use super::stub_api::StubApi;

/// Sequencer over the standard workflow (or the `only` subset), no delay.
pub fn sequencer(api: &Arc<StubApi>, only: &[&str]) -> Sequencer<StubApi> {
    let config = OnboardConfig::default();
    let rules = ClassifierRules::from_config(&config.classifier).unwrap();
    let runner = StepRunner::new(
        Arc::clone(api),
        rules,
        json!({"business": {"legal_name": "E2E Test Co"}}),
    );
    let workflow = Workflow::standard(&config.timeouts).select(only).unwrap();
    Sequencer::new(runner, workflow, Duration::ZERO)
}

/// Fresh store over the side-channel in `dir`.
pub fn store(dir: &Path, token: Option<&str>) -> StateStore {
    StateStore::new(FileSideChannel::new(dir)).with_token(token.map(str::to_owned))
}

/// Run one full process-equivalent invocation: new sequencer, new store.
pub async fn run_once(api: &Arc<StubApi>, dir: &Path, only: &[&str]) -> RunReport {
    let mut seq = sequencer(api, only);
    let mut store = store(dir, None);
    seq.run(&mut store).await
}

/// Outcome labels in step order, e.g. `["PASS", "FAIL", "SKIP"]`.
pub fn labels(report: &RunReport) -> Vec<&'static str> {
    report.steps.iter().map(|s| s.outcome.label()).collect()
}
