//! Onboarding workflow engine.
//!
//! # Module Structure
//!
//! - [`step`]: Step catalogue (`StepKind`, `StepDescriptor`, `Workflow`)
//! - [`classifier`]: Outcome classification rule table (`ClassifierRules`)
//! - [`runner`]: Single-step execution with timeout and prerequisites (`StepRunner`)
//! - [`sequencer`]: Ordered execution and aggregation (`Sequencer`)
//! - [`report`]: Run report and summary rendering
//! - [`http`]: `reqwest` implementation of `OnboardingApi` (`HttpOnboardingApi`)
//! - [`error`]: Harness error types (`HarnessError`)
//!
//! # Architecture
//!
//! ```text
//! Sequencer --step--> StepRunner --call--> OnboardingApi
//!     |                   |
//!     |              ClassifierRules.classify()
//!     |                   |
//!     |              StateStore.set() / persist()
//!     v
//! RunReport --> render_report()
//! ```

pub mod classifier;
pub mod error;
pub mod http;
pub mod report;
pub mod runner;
pub mod sequencer;
pub mod step;

// --- Public API Re-exports ---

pub use classifier::{Classification, ClassifierRules};
pub use error::HarnessError;
pub use http::HttpOnboardingApi;
pub use report::{RunReport, StepRecord, render_report, render_report_with, render_summary};
pub use runner::StepRunner;
pub use sequencer::{Sequencer, SequencerState, StepState};
pub use step::{Requirement, StepDescriptor, StepKind, Workflow};

/// Built-in account-creation document used when no payload file is given.
pub const SAMPLE_DOCUMENT: &str = include_str!("../fixtures/account.json");

/// Load the account-creation document from `path`, or the built-in sample.
pub fn load_document(path: Option<&str>) -> Result<serde_json::Value, HarnessError> {
    let (source, content) = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| HarnessError::Payload {
                path: path.to_owned(),
                reason: e.to_string(),
            })?;
            (path, content)
        }
        None => ("<built-in>", SAMPLE_DOCUMENT.to_owned()),
    };

    serde_json::from_str(&content).map_err(|e| HarnessError::Payload {
        path: source.to_owned(),
        reason: format!("not valid JSON: {e}"),
    })
}
