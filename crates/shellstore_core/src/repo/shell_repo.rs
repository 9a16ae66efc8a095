//! Shell repository bound to a single shell identifier.
//!
//! # Responsibility
//! - Present one stored shell as a get/set object.
//! - Layer submodel-reference add/remove on top of whole-document writes.
//!
//! # Invariants
//! - The bound identifier is fixed at construction; writes of a shell with
//!   any other identifier are rejected with `IdentityMismatch`.
//! - Adding a reference whose target is already present, or removing a
//!   short name that matches nothing, performs no write.
//! - Store failures are never retried here except version conflicts in
//!   `UpdateMode::CompareAndSwap`.
//!
//! # Concurrency
//! With `UpdateMode::ReplaceWhole` add/remove are read-modify-write without
//! isolation: two concurrent writers can each overwrite the other's change.
//! `UpdateMode::CompareAndSwap` closes that gap with a version check.

use crate::model::identifier::Identifier;
use crate::model::reference::Reference;
use crate::model::shell::Shell;
use crate::store::{DocumentStore, StoreError, Versioned};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default retry budget for `UpdateMode::CompareAndSwap`.
pub const DEFAULT_CAS_ATTEMPTS: u32 = 5;

pub type ShellRepoResult<T> = Result<T, ShellRepoError>;

#[derive(Debug)]
pub enum ShellRepoError {
    /// The bound shell has never been set (or was deleted).
    NotFound(String),
    IdentityMismatch {
        bound: Identifier,
        actual: Identifier,
    },
    /// Version-checked update lost every race it attempted.
    Conflict { id: String, attempts: u32 },
    InvalidData(String),
    StoreUnavailable(StoreError),
}

impl Display for ShellRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "shell not found: {id}"),
            Self::IdentityMismatch { bound, actual } => write!(
                f,
                "shell identifier {actual} does not match repository binding {bound}"
            ),
            Self::Conflict { id, attempts } => write!(
                f,
                "shell {id} was modified concurrently; gave up after {attempts} attempts"
            ),
            Self::InvalidData(message) => write!(f, "{message}"),
            Self::StoreUnavailable(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ShellRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StoreUnavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ShellRepoError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { id, .. } => Self::NotFound(id),
            StoreError::VersionConflict { id, .. } => Self::Conflict { id, attempts: 1 },
            StoreError::InvalidData(message) => Self::InvalidData(message),
            StoreError::Encode(err) => Self::InvalidData(format!("failed to encode shell: {err}")),
            other => Self::StoreUnavailable(other),
        }
    }
}

/// How add/remove persist their change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Read, modify, then overwrite the whole document.
    #[default]
    ReplaceWhole,
    /// Read with version, modify, write only if the version is unchanged;
    /// re-read and retry on conflict.
    CompareAndSwap { max_attempts: u32 },
}

impl UpdateMode {
    pub fn compare_and_swap() -> Self {
        Self::CompareAndSwap {
            max_attempts: DEFAULT_CAS_ATTEMPTS,
        }
    }
}

/// Get/set façade over the shell stored under one identifier.
pub struct ShellRepository<S> {
    store: S,
    bound: Identifier,
    update_mode: UpdateMode,
}

impl<S: DocumentStore<Shell>> ShellRepository<S> {
    pub fn new(store: S, bound: Identifier) -> Self {
        Self {
            store,
            bound,
            update_mode: UpdateMode::default(),
        }
    }

    pub fn with_update_mode(mut self, update_mode: UpdateMode) -> Self {
        self.update_mode = update_mode;
        self
    }

    pub fn bound_identifier(&self) -> &Identifier {
        &self.bound
    }

    pub fn update_mode(&self) -> UpdateMode {
        self.update_mode
    }

    /// Returns the bound shell.
    ///
    /// # Errors
    /// - `NotFound` when the shell was never set.
    pub fn get_shell(&self) -> ShellRepoResult<Shell> {
        Ok(self.store.retrieve(self.bound.id())?)
    }

    /// Stores `shell`, replacing the whole previous document.
    ///
    /// # Errors
    /// - `IdentityMismatch` when `shell` is not the bound shell.
    pub fn set_shell(&self, shell: &Shell) -> ShellRepoResult<()> {
        self.ensure_bound(shell)?;
        self.store.create_or_replace(shell)?;
        Ok(())
    }

    /// Appends `reference` to the bound shell unless its target is present.
    ///
    /// # Errors
    /// - `NotFound` when the shell was never set; no shell is created.
    pub fn add_submodel_reference(&self, reference: &Reference) -> ShellRepoResult<()> {
        self.mutate("shell_reference_add", |shell| {
            shell.add_submodel_reference(reference.clone())
        })
    }

    /// Drops every reference resolving to `id_short`. No match is a no-op.
    pub fn remove_submodel_reference(&self, id_short: &str) -> ShellRepoResult<()> {
        self.mutate("shell_reference_remove", |shell| {
            shell.remove_submodel_references(id_short) > 0
        })
    }

    /// Deletes the bound shell. Deleting an absent shell is a no-op.
    pub fn delete_shell(&self) -> ShellRepoResult<()> {
        self.store.delete(self.bound.id())?;
        Ok(())
    }

    fn ensure_bound(&self, shell: &Shell) -> ShellRepoResult<()> {
        if shell.identification() == &self.bound {
            return Ok(());
        }
        Err(ShellRepoError::IdentityMismatch {
            bound: self.bound.clone(),
            actual: shell.identification().clone(),
        })
    }

    fn mutate(
        &self,
        event: &'static str,
        mut apply: impl FnMut(&mut Shell) -> bool,
    ) -> ShellRepoResult<()> {
        let max_attempts = match self.update_mode {
            UpdateMode::ReplaceWhole => {
                let mut shell = self.get_shell()?;
                if !apply(&mut shell) {
                    debug!("event={event} module=repo status=noop");
                    return Ok(());
                }
                return self.set_shell(&shell);
            }
            UpdateMode::CompareAndSwap { max_attempts } => max_attempts.max(1),
        };

        for attempt in 1..=max_attempts {
            let Versioned {
                document: mut shell,
                version,
            } = self.store.retrieve_versioned(self.bound.id())?;
            if !apply(&mut shell) {
                debug!("event={event} module=repo status=noop attempt={attempt}");
                return Ok(());
            }
            self.ensure_bound(&shell)?;

            match self.store.replace_if_version(&shell, version) {
                Ok(_) => return Ok(()),
                Err(StoreError::VersionConflict {
                    expected, actual, ..
                }) => {
                    warn!(
                        "event={event} module=repo status=retry attempt={attempt} expected_version={expected} actual_version={actual}"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(ShellRepoError::Conflict {
            id: self.bound.id().to_string(),
            attempts: max_attempts,
        })
    }
}
