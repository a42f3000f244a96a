//! Shared E2E test helpers.
//!
//! Provides a recording stub `OnboardingApi` with failure injection and a
//! builder that wires it into a sequencer over a temporary state directory.

pub mod stub_api;
pub mod workflow;
