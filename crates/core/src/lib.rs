//! Shared building blocks for the onboarding workflow harness.
//!
//! - [`config`] -- `onboardcheck.toml` parsing, env overrides and validation
//! - [`error`] -- error enums for every concern
//! - [`api`] -- the [`OnboardingApi`] trait and its response envelope
//! - [`session`] -- session state, the durable side-channel and the [`StateStore`]
//! - [`outcome`] -- step outcomes, diagnostics and the run summary

pub mod api;
pub mod config;
pub mod error;
pub mod outcome;
pub mod session;

// --- re-exports ---

pub use api::{ApiResult, Envelope, OnboardingApi};
pub use config::OnboardConfig;
pub use error::{ApiError, ConfigError, OnboardError, StateError};
pub use outcome::{Diagnostic, ErrorKind, RunSummary, StepOutcome};
pub use session::{FileSideChannel, SessionState, SessionUpdate, SideChannel, StateStore};
