//! Backend port for reading and mutating the served git repository.

use crate::vcs::domain::{Branch, BranchName, Commit, CommitId, MergeOutcome, VcsDomainError};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for version-control backend operations.
pub type VcsResult<T> = Result<T, VcsError>;

/// Version-control backend contract.
///
/// Read methods have no side effects. `checkout`, `merge` and `abort_merge`
/// mutate the repository's single working tree; callers are responsible for
/// serialising them.
#[async_trait]
pub trait VcsBackend: Send + Sync {
    /// Lists all local branches, ordered by name.
    async fn list_branches(&self) -> VcsResult<Vec<Branch>>;

    /// Finds a local branch by exact name.
    ///
    /// Returns `None` when no such branch exists.
    async fn find_branch(&self, name: &BranchName) -> VcsResult<Option<Branch>>;

    /// Resolves a (possibly abbreviated) commit identifier.
    ///
    /// Returns `None` when the identifier does not name a commit.
    async fn find_commit(&self, id: &CommitId) -> VcsResult<Option<Commit>>;

    /// Lists commits reachable from the branch tip, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::BranchNotFound`] when the branch does not exist.
    async fn list_commits(&self, branch: &BranchName) -> VcsResult<Vec<Commit>>;

    /// Switches the working tree to `branch`.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::BranchNotFound`] when the branch does not exist
    /// and [`VcsError::CommandFailed`] when the backend refuses the switch.
    async fn checkout(&self, branch: &BranchName) -> VcsResult<()>;

    /// Merges `source` into the checked-out branch.
    ///
    /// Content conflicts are reported as [`MergeOutcome::Conflict`] and leave
    /// the merge in progress; every other failure is an error.
    async fn merge(&self, source: &BranchName) -> VcsResult<MergeOutcome>;

    /// Aborts the in-progress merge and restores the pre-merge working tree.
    async fn abort_merge(&self) -> VcsResult<()>;

    /// Reports whether a merge is currently in progress.
    async fn merge_in_progress(&self) -> VcsResult<bool>;

    /// Returns the identity configured for the repository (`user.email`).
    ///
    /// Returns `None` when no identity is configured.
    async fn configured_identity(&self) -> VcsResult<Option<String>>;
}

/// Errors returned by version-control backend adapters.
#[derive(Debug, Clone, Error)]
pub enum VcsError {
    /// The named branch does not exist.
    #[error("branch '{0}' does not exist")]
    BranchNotFound(BranchName),

    /// A merge was requested without a branch checked out.
    #[error("no branch is checked out")]
    NoBranchCheckedOut,

    /// The backend ran the operation and reported failure.
    #[error("{diagnostic}")]
    CommandFailed {
        /// Operation that failed, e.g. `git merge`.
        command: String,
        /// Backend diagnostic text.
        diagnostic: String,
    },

    /// The backend produced output this adapter could not interpret.
    #[error("unexpected output from {command}: {detail}")]
    MalformedOutput {
        /// Operation whose output was rejected.
        command: String,
        /// What was wrong with it.
        detail: String,
    },

    /// A value handed to or produced by the backend failed validation.
    #[error(transparent)]
    Domain(#[from] VcsDomainError),

    /// The backend could not be reached or run.
    #[error("version-control backend unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl VcsError {
    /// Wraps an error raised while reaching the backend.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }

    /// Builds a [`VcsError::CommandFailed`].
    pub fn command_failed(command: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            diagnostic: diagnostic.into(),
        }
    }
}
