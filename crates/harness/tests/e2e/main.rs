//! E2E tests for the onboarding workflow engine.
//!
//! These tests drive the full sequencer against a recording stub API and a
//! real file-backed side-channel in a temporary directory.
//!
//! # Test Structure
//!
//! - `helpers/` -- Stub API and workflow builders
//! - `scenarios/` -- Test files organized by scenario
//!
//! # Running
//!
//! ```bash
//! cargo test -p onboardcheck-harness --test e2e
//! ```

mod helpers;
mod scenarios;
