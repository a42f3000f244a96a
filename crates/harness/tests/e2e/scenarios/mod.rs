//! E2E test scenarios.

mod auth_failure;
mod happy_path;
mod idempotence;
mod prerequisites;
mod resume;
