//! Store port for pull request persistence and status transitions.

use crate::pull_request::domain::{NewPullRequest, PullRequest, PullRequestId, PullRequestState};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for pull request repository operations.
pub type PullRequestRepositoryResult<T> = Result<T, PullRequestRepositoryError>;

/// Pull request persistence contract.
///
/// Every operation is atomic with respect to a single record.
#[async_trait]
pub trait PullRequestRepository: Send + Sync {
    /// Stores a new pull request and returns it with its assigned id.
    ///
    /// Identifiers are assigned monotonically starting at 1.
    async fn insert(&self, pull_request: &NewPullRequest) -> PullRequestRepositoryResult<PullRequest>;

    /// Replaces a stored pull request keyed by its id.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestRepositoryError::NotFound`] when the record does
    /// not exist.
    async fn update(&self, pull_request: &PullRequest) -> PullRequestRepositoryResult<()>;

    /// Replaces a stored pull request only while its stored state is still
    /// `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestRepositoryError::NotFound`] when the record does
    /// not exist and [`PullRequestRepositoryError::StatusChanged`] when the
    /// stored state differs from `expected`.
    async fn compare_and_update(
        &self,
        pull_request: &PullRequest,
        expected: PullRequestState,
    ) -> PullRequestRepositoryResult<()>;

    /// Finds a pull request by id.
    ///
    /// Returns `None` when the record does not exist.
    async fn find_by_id(&self, id: PullRequestId)
    -> PullRequestRepositoryResult<Option<PullRequest>>;

    /// Returns every stored pull request. Callers must not rely on ordering.
    async fn list_all(&self) -> PullRequestRepositoryResult<Vec<PullRequest>>;
}

/// Errors returned by pull request repository implementations.
#[derive(Debug, Clone, Error)]
pub enum PullRequestRepositoryError {
    /// The pull request was not found.
    #[error("pull request not found: {0}")]
    NotFound(PullRequestId),

    /// The stored state no longer matches the expected state.
    #[error("pull request {id} is {actual}, expected {expected}")]
    StatusChanged {
        /// Pull request identifier.
        id: PullRequestId,
        /// State the caller expected.
        expected: PullRequestState,
        /// State found in storage.
        actual: PullRequestState,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl PullRequestRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
