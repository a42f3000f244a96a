//! Session state and its durable side-channel.
//!
//! [`SessionState`] holds the values one step produces for later steps
//! (bearer token, created account id). [`StateStore`] owns it for the
//! duration of a run and is lent to one step at a time.
//!
//! The account id also survives the process through a [`SideChannel`]: a
//! tiny key-value store whose file-backed implementation writes one file
//! per key into the state directory. A later run that skips account
//! creation can still exercise the dependent steps with it.
//!
//! ```text
//! create_account ──> StateStore::set ──> StateStore::persist ──> .onboardcheck-account-id
//!                                                                        │
//! (next process) get_account <── StateStore::resolve_account_id <────────┘
//! ```

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::StateError;

/// Well-known side-channel key for the created account id.
pub const ACCOUNT_ID_KEY: &str = ".onboardcheck-account-id";

/// Values threaded between steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub auth_token: Option<String>,
    pub account_id: Option<String>,
}

/// Partial update applied by a successful step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionUpdate {
    pub auth_token: Option<String>,
    pub account_id: Option<String>,
}

impl SessionUpdate {
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            auth_token: Some(token.into()),
            account_id: None,
        }
    }

    pub fn account(account_id: impl Into<String>) -> Self {
        Self {
            auth_token: None,
            account_id: Some(account_id.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.auth_token.is_none() && self.account_id.is_none()
    }
}

/// Durable key-value side-channel.
pub trait SideChannel: Send + Sync {
    /// Read a value; `Ok(None)` when nothing was persisted.
    fn read(&self, key: &str) -> Result<Option<String>, StateError>;

    /// Write a value, replacing any previous one.
    fn write(&self, key: &str, value: &str) -> Result<(), StateError>;

    /// Remove a value. Returns `false` when there was nothing to remove.
    fn remove(&self, key: &str) -> Result<bool, StateError>;
}

/// File-backed side-channel: one file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileSideChannel {
    dir: PathBuf,
}

impl FileSideChannel {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Side-channel scoped to the current working directory.
    pub fn in_current_dir() -> Self {
        Self::new(".")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file that backs `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StateError> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(StateError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(key))
    }
}

impl SideChannel for FileSideChannel {
    fn read(&self, key: &str) -> Result<Option<String>, StateError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => {
                let value = content.trim();
                Ok((!value.is_empty()).then(|| value.to_owned()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StateError::Read {
                key: key.to_owned(),
                source,
            }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StateError> {
        let path = self.path_for(key)?;
        let write_err = |source| StateError::Write {
            key: key.to_owned(),
            source,
        };

        if !self.dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.dir).map_err(write_err)?;
        }

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(write_err)?;

        // Persisted values identify real accounts; keep them owner-only.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(write_err)?;
        }

        writeln!(file, "{value}").map_err(write_err)?;
        debug!(path = %path.display(), "state value written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StateError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StateError::Remove {
                key: key.to_owned(),
                source,
            }),
        }
    }
}

/// In-memory session state backed by a durable side-channel.
pub struct StateStore {
    session: SessionState,
    channel: Box<dyn SideChannel>,
    /// Set once the side-channel has been consulted for an account id.
    persisted_checked: bool,
}

impl StateStore {
    /// Empty store on top of `channel`.
    pub fn new(channel: impl SideChannel + 'static) -> Self {
        Self {
            session: SessionState::default(),
            channel: Box::new(channel),
            persisted_checked: false,
        }
    }

    /// Seed the store with a pre-supplied bearer token.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.session.auth_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn get(&self) -> &SessionState {
        &self.session
    }

    /// Merge produced values into the session. `None` fields are left as-is.
    pub fn set(&mut self, update: SessionUpdate) {
        if let Some(token) = update.auth_token {
            self.session.auth_token = Some(token);
        }
        if let Some(account_id) = update.account_id {
            self.session.account_id = Some(account_id);
        }
    }

    /// Write the current account id to the side-channel.
    ///
    /// Returns `false` when there is no account id to persist.
    pub fn persist(&self) -> Result<bool, StateError> {
        let Some(account_id) = self.session.account_id.as_deref() else {
            return Ok(false);
        };
        self.channel.write(ACCOUNT_ID_KEY, account_id)?;
        info!(account_id, "account id persisted");
        Ok(true)
    }

    /// Account id persisted by an earlier run, if any.
    pub fn load_persisted(&self) -> Result<Option<String>, StateError> {
        self.channel.read(ACCOUNT_ID_KEY)
    }

    /// Account id from memory, falling back to the side-channel.
    ///
    /// The side-channel is read at most once per store; a value found there
    /// is cached in the session. Read failures are logged and treated as
    /// absence.
    pub fn resolve_account_id(&mut self) -> Option<String> {
        if let Some(id) = &self.session.account_id {
            return Some(id.clone());
        }
        if self.persisted_checked {
            return None;
        }
        self.persisted_checked = true;

        match self.load_persisted() {
            Ok(Some(id)) => {
                info!(account_id = %id, "resuming with persisted account id");
                self.session.account_id = Some(id.clone());
                Some(id)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "failed to read persisted account id");
                None
            }
        }
    }

    /// Remove the persisted account id. Failures are logged, never returned.
    pub fn discard(&mut self) {
        match self.channel.remove(ACCOUNT_ID_KEY) {
            Ok(true) => info!("persisted account id discarded"),
            Ok(false) => debug!("no persisted account id to discard"),
            Err(e) => warn!(error = %e, "failed to discard persisted account id"),
        }
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("has_token", &self.session.auth_token.is_some())
            .field("account_id", &self.session.account_id)
            .field("persisted_checked", &self.persisted_checked)
            .finish()
    }
}
