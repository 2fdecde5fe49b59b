//! Service layer for the pull request lifecycle and merge orchestration.

use crate::pull_request::{
    domain::{
        Author, NewPullRequest, PullRequest, PullRequestDescription, PullRequestDomainError,
        PullRequestId, PullRequestState, PullRequestTitle,
    },
    ports::{PullRequestRepository, PullRequestRepositoryError},
};
use crate::vcs::{
    domain::{BranchName, MergeOutcome},
    ports::{VcsBackend, VcsError},
    services::RepositoryReader,
};
use mockable::Clock;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Request payload for opening a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePullRequestRequest {
    title: String,
    description: Option<String>,
    source_branch: String,
    destiny_branch: String,
}

impl CreatePullRequestRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        source_branch: impl Into<String>,
        destiny_branch: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: None,
            source_branch: source_branch.into(),
            destiny_branch: destiny_branch.into(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Which side of a pull request a branch was supplied for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchRole {
    /// The branch merged from.
    Source,
    /// The branch merged into.
    Destiny,
}

impl fmt::Display for BranchRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Source => "source_branch",
            Self::Destiny => "destiny_branch",
        })
    }
}

/// Transition requested on an existing pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullRequestAction {
    /// `open -> merged`.
    Merge,
    /// `open -> closed`.
    Close,
}

impl fmt::Display for PullRequestAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Merge => "merge",
            Self::Close => "close",
        })
    }
}

/// Service-level errors for pull request lifecycle operations.
#[derive(Debug, Error)]
pub enum PullRequestLifecycleError {
    /// Input failed domain validation.
    #[error(transparent)]
    Validation(#[from] PullRequestDomainError),

    /// A branch named at creation does not exist.
    #[error("Invalid {role} {name}")]
    InvalidBranch {
        /// Field the branch was supplied for.
        role: BranchRole,
        /// Name as supplied.
        name: String,
    },

    /// No pull request has this id.
    #[error("No pull request found with id {0}")]
    NotFound(PullRequestId),

    /// The pull request is no longer open.
    #[error("Cannot {action} a pull request with status {status}")]
    InvalidState {
        /// Pull request identifier.
        id: PullRequestId,
        /// Requested transition.
        action: PullRequestAction,
        /// Status that blocked it.
        status: PullRequestState,
    },

    /// The backend reported a content conflict; the merge was aborted.
    #[error("Merge was aborted because of server response: {diagnostic}")]
    MergeConflict {
        /// Pull request identifier.
        id: PullRequestId,
        /// Backend diagnostic text.
        diagnostic: String,
    },

    /// Any other backend failure.
    #[error(transparent)]
    Backend(#[from] VcsError),

    /// Store failure.
    #[error(transparent)]
    Repository(#[from] PullRequestRepositoryError),
}

/// A merged pull request together with the backend's merge summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pull_request: PullRequest,
    summary: String,
}

impl MergeReport {
    /// Returns the merged pull request.
    #[must_use]
    pub const fn pull_request(&self) -> &PullRequest {
        &self.pull_request
    }

    /// Returns the backend's merge summary, e.g. `Fast-forward`.
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Consumes the report, returning the merged pull request.
    #[must_use]
    pub fn into_pull_request(self) -> PullRequest {
        self.pull_request
    }
}

/// Result type for pull request lifecycle operations.
pub type PullRequestLifecycleResult<T> = Result<T, PullRequestLifecycleError>;

/// Pull request lifecycle orchestration service.
///
/// Clones share one `working_tree` lock. Every `merge` and `close` holds it
/// from lookup to persistence, so backend mutations never interleave and a
/// status check cannot go stale before the transition is stored.
pub struct PullRequestLifecycleService<R, V, C>
where
    R: PullRequestRepository,
    V: VcsBackend,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    reader: RepositoryReader<V>,
    backend: Arc<V>,
    clock: Arc<C>,
    author: Author,
    working_tree: Arc<Mutex<()>>,
}

impl<R, V, C> Clone for PullRequestLifecycleService<R, V, C>
where
    R: PullRequestRepository,
    V: VcsBackend,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            reader: self.reader.clone(),
            backend: Arc::clone(&self.backend),
            clock: Arc::clone(&self.clock),
            author: self.author.clone(),
            working_tree: Arc::clone(&self.working_tree),
        }
    }
}

impl<R, V, C> PullRequestLifecycleService<R, V, C>
where
    R: PullRequestRepository,
    V: VcsBackend,
    C: Clock + Send + Sync,
{
    /// Creates a new lifecycle service recording `author` on new pull
    /// requests.
    #[must_use]
    pub fn new(repository: Arc<R>, backend: Arc<V>, clock: Arc<C>, author: Author) -> Self {
        Self {
            repository,
            reader: RepositoryReader::new(Arc::clone(&backend)),
            backend,
            clock,
            author,
            working_tree: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the identity recorded as author of new pull requests.
    #[must_use]
    pub const fn author(&self) -> &Author {
        &self.author
    }

    /// Opens a pull request between two existing branches.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestLifecycleError::Validation`] for a blank or
    /// oversized title or description, and
    /// [`PullRequestLifecycleError::InvalidBranch`] naming the first branch
    /// (source before destination) that does not exist. Nothing is stored
    /// on failure.
    pub async fn create(
        &self,
        request: CreatePullRequestRequest,
    ) -> PullRequestLifecycleResult<PullRequest> {
        let title = PullRequestTitle::new(&request.title)?;
        let description = request
            .description
            .map(PullRequestDescription::new)
            .transpose()?;
        let source = self
            .require_branch(BranchRole::Source, request.source_branch)
            .await?;
        let destiny = self
            .require_branch(BranchRole::Destiny, request.destiny_branch)
            .await?;

        let draft = NewPullRequest::new(title, self.author.clone(), source, destiny, &*self.clock)
            .with_description(description);
        let stored = self.repository.insert(&draft).await?;
        info!(
            pull_request_id = %stored.id(),
            source = %stored.source_branch(),
            destiny = %stored.destiny_branch(),
            "pull request opened"
        );
        Ok(stored)
    }

    /// Lists every pull request.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestLifecycleError::Repository`] when the store
    /// fails.
    pub async fn list(&self) -> PullRequestLifecycleResult<Vec<PullRequest>> {
        Ok(self.repository.list_all().await?)
    }

    /// Finds a pull request by id.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestLifecycleError::NotFound`] when absent.
    pub async fn find(&self, id: PullRequestId) -> PullRequestLifecycleResult<PullRequest> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(PullRequestLifecycleError::NotFound(id))
    }

    /// Merges an open pull request's source branch into its destination.
    ///
    /// On success the record becomes merged with the destination's new head
    /// as its merge commit. A conflict is aborted in the backend and leaves
    /// the record open.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestLifecycleError::NotFound`],
    /// [`PullRequestLifecycleError::InvalidState`] when the record is not
    /// open, [`PullRequestLifecycleError::MergeConflict`] on a content
    /// conflict and [`PullRequestLifecycleError::Backend`] for any other
    /// backend failure.
    pub async fn merge(&self, id: PullRequestId) -> PullRequestLifecycleResult<PullRequest> {
        self.merge_with_report(id)
            .await
            .map(MergeReport::into_pull_request)
    }

    /// Merges like [`Self::merge`] and also returns the backend's merge
    /// summary.
    ///
    /// # Errors
    ///
    /// Fails exactly as [`Self::merge`] does.
    pub async fn merge_with_report(
        &self,
        id: PullRequestId,
    ) -> PullRequestLifecycleResult<MergeReport> {
        let _working_tree = self.working_tree.lock().await;
        let mut pull_request = self.load_open(id, PullRequestAction::Merge).await?;

        if let Err(err) = self.backend.checkout(pull_request.destiny_branch()).await {
            error!(pull_request_id = %id, error = %err, "checkout of destination branch failed");
            return Err(err.into());
        }

        let outcome = match self.backend.merge(pull_request.source_branch()).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(pull_request_id = %id, error = %err, "merge failed");
                self.abort_if_merging(id).await;
                return Err(err.into());
            }
        };

        match outcome {
            MergeOutcome::Conflict { diagnostic } => {
                warn!(pull_request_id = %id, %diagnostic, "merge conflict, aborting");
                self.backend.abort_merge().await?;
                Err(PullRequestLifecycleError::MergeConflict { id, diagnostic })
            }
            MergeOutcome::Merged { head, summary } => {
                pull_request.merge(head)?;
                self.persist_transition(&pull_request, PullRequestAction::Merge)
                    .await
                    .inspect_err(|err| {
                        error!(
                            pull_request_id = %id,
                            error = %err,
                            "branches merged but the pull request could not be stored"
                        );
                    })?;
                info!(pull_request_id = %id, %summary, "pull request merged");
                Ok(MergeReport {
                    pull_request,
                    summary,
                })
            }
        }
    }

    /// Closes an open pull request without touching the backend.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestLifecycleError::NotFound`] or
    /// [`PullRequestLifecycleError::InvalidState`] when the record is not
    /// open.
    pub async fn close(&self, id: PullRequestId) -> PullRequestLifecycleResult<PullRequest> {
        let _working_tree = self.working_tree.lock().await;
        let mut pull_request = self.load_open(id, PullRequestAction::Close).await?;
        pull_request.close()?;
        self.persist_transition(&pull_request, PullRequestAction::Close)
            .await?;
        info!(pull_request_id = %id, "pull request closed");
        Ok(pull_request)
    }

    async fn require_branch(
        &self,
        role: BranchRole,
        name: String,
    ) -> PullRequestLifecycleResult<BranchName> {
        let Ok(branch) = BranchName::new(name.as_str()) else {
            return Err(PullRequestLifecycleError::InvalidBranch { role, name });
        };
        if self.reader.branch_exists(&branch).await? {
            Ok(branch)
        } else {
            Err(PullRequestLifecycleError::InvalidBranch { role, name })
        }
    }

    async fn load_open(
        &self,
        id: PullRequestId,
        action: PullRequestAction,
    ) -> PullRequestLifecycleResult<PullRequest> {
        let pull_request = self.find(id).await?;
        let status = pull_request.state();
        if status.is_terminal() {
            warn!(pull_request_id = %id, %action, %status, "transition rejected");
            return Err(PullRequestLifecycleError::InvalidState { id, action, status });
        }
        Ok(pull_request)
    }

    async fn persist_transition(
        &self,
        pull_request: &PullRequest,
        action: PullRequestAction,
    ) -> PullRequestLifecycleResult<()> {
        let id = pull_request.id();
        match self
            .repository
            .compare_and_update(pull_request, PullRequestState::Open)
            .await
        {
            Ok(()) => Ok(()),
            Err(PullRequestRepositoryError::StatusChanged { actual, .. }) => {
                Err(PullRequestLifecycleError::InvalidState {
                    id,
                    action,
                    status: actual,
                })
            }
            Err(PullRequestRepositoryError::NotFound(_)) => {
                Err(PullRequestLifecycleError::NotFound(id))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Leaves the working tree clean after an unclassified merge failure.
    async fn abort_if_merging(&self, id: PullRequestId) {
        match self.backend.merge_in_progress().await {
            Ok(true) => {
                if let Err(err) = self.backend.abort_merge().await {
                    warn!(pull_request_id = %id, error = %err, "best-effort merge abort failed");
                }
            }
            Ok(false) => {}
            Err(err) => {
                warn!(pull_request_id = %id, error = %err, "could not inspect merge state");
            }
        }
    }
}
