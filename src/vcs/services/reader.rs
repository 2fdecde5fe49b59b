//! Read-only queries over the served repository.

use crate::vcs::{
    domain::{Branch, BranchName, Commit, CommitId},
    ports::{VcsBackend, VcsError, VcsResult},
};
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by [`RepositoryReader`].
#[derive(Debug, Error)]
pub enum RepositoryReadError {
    /// No branch has the requested name.
    #[error("No branch found with id {0}")]
    BranchNotFound(String),

    /// The identifier does not resolve to a commit.
    #[error("No commit found with id {0}")]
    CommitNotFound(String),

    /// The backend failed while answering the query.
    #[error(transparent)]
    Backend(#[from] VcsError),
}

/// Result type for repository read operations.
pub type RepositoryReadResult<T> = Result<T, RepositoryReadError>;

/// Stateless branch and commit queries.
///
/// Takes no locks: reads may observe the working tree mid-merge, which is
/// harmless because branch tips and commits are read from the object store.
pub struct RepositoryReader<V>
where
    V: VcsBackend,
{
    backend: Arc<V>,
}

impl<V> Clone for RepositoryReader<V>
where
    V: VcsBackend,
{
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<V> RepositoryReader<V>
where
    V: VcsBackend,
{
    /// Creates a reader over `backend`.
    #[must_use]
    pub const fn new(backend: Arc<V>) -> Self {
        Self { backend }
    }

    /// Lists every branch; empty when the repository has none.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryReadError::Backend`] when the backend fails.
    pub async fn list_branches(&self) -> RepositoryReadResult<Vec<Branch>> {
        Ok(self.backend.list_branches().await?)
    }

    /// Finds a branch by exact name.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryReadError::BranchNotFound`] when no branch has
    /// that name, including names git would reject outright.
    pub async fn find_branch(&self, name: &str) -> RepositoryReadResult<Branch> {
        let branch_name = parse_branch_name(name)?;
        self.backend
            .find_branch(&branch_name)
            .await?
            .ok_or_else(|| RepositoryReadError::BranchNotFound(name.to_owned()))
    }

    /// Reports whether a branch with this exact name exists.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the lookup itself fails.
    pub async fn branch_exists(&self, name: &BranchName) -> VcsResult<bool> {
        Ok(self.backend.find_branch(name).await?.is_some())
    }

    /// Resolves a full or abbreviated commit identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryReadError::CommitNotFound`] when the identifier is
    /// malformed or unknown.
    pub async fn find_commit(&self, id: &str) -> RepositoryReadResult<Commit> {
        let not_found = || RepositoryReadError::CommitNotFound(id.to_owned());
        let commit_id = CommitId::parse(id).map_err(|_| not_found())?;
        self.backend
            .find_commit(&commit_id)
            .await?
            .ok_or_else(not_found)
    }

    /// Lists commits reachable from the branch tip, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryReadError::BranchNotFound`] when the branch does
    /// not exist.
    pub async fn list_commits(&self, branch: &str) -> RepositoryReadResult<Vec<Commit>> {
        let branch_name = parse_branch_name(branch)?;
        match self.backend.list_commits(&branch_name).await {
            Ok(commits) => Ok(commits),
            Err(VcsError::BranchNotFound(_)) => {
                Err(RepositoryReadError::BranchNotFound(branch.to_owned()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn parse_branch_name(name: &str) -> RepositoryReadResult<BranchName> {
    BranchName::new(name).map_err(|_| RepositoryReadError::BranchNotFound(name.to_owned()))
}
