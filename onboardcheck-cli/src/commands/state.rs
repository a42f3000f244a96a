//! `onboardcheck state` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use onboardcheck_core::config::OnboardConfig;
use onboardcheck_core::session::{ACCOUNT_ID_KEY, FileSideChannel, SideChannel};

use crate::cli::{StateAction, StateArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `state` command.
pub fn execute(
    args: StateArgs,
    config: &OnboardConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let channel = FileSideChannel::new(&config.run.state_dir);
    let report = match args.action {
        StateAction::Show => StateReport {
            state_dir: config.run.state_dir.clone(),
            account_id: channel.read(ACCOUNT_ID_KEY)?,
            removed: None,
        },
        StateAction::Clear => {
            let previous = channel.read(ACCOUNT_ID_KEY)?;
            let removed = channel.remove(ACCOUNT_ID_KEY)?;
            info!(removed, state_dir = %config.run.state_dir, "persisted state cleared");
            StateReport {
                state_dir: config.run.state_dir.clone(),
                account_id: previous,
                removed: Some(removed),
            }
        }
    };
    writer.render(&report)
}

/// Persisted state as seen by `state show` / `state clear`.
#[derive(Debug, Serialize)]
pub struct StateReport {
    pub state_dir: String,
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed: Option<bool>,
}

impl Render for StateReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        match (self.removed, &self.account_id) {
            (Some(true), Some(id)) => writeln!(w, "Removed persisted account id {id}"),
            (Some(true), None) => writeln!(w, "Removed persisted account id"),
            (Some(false), _) => writeln!(w, "Nothing to clear in {}", self.state_dir),
            (None, Some(id)) => writeln!(w, "Persisted account id: {id}"),
            (None, None) => writeln!(w, "No persisted account id in {}", self.state_dir),
        }
    }
}
