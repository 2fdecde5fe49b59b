//! Pull request aggregate root and its validated field types.

use super::{PullRequestDomainError, PullRequestId, PullRequestState, PullRequestStatus};
use crate::vcs::domain::{BranchName, CommitId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum title length in characters.
pub const MAX_TITLE_LENGTH: usize = 80;

/// Maximum description length in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 255;

/// Maximum author identity length in characters.
pub const MAX_AUTHOR_LENGTH: usize = 150;

/// Validated pull request title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PullRequestTitle(String);

impl PullRequestTitle {
    /// Creates a title, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestDomainError::EmptyTitle`] for blank input and
    /// [`PullRequestDomainError::TitleTooLong`] past [`MAX_TITLE_LENGTH`].
    pub fn new(value: impl AsRef<str>) -> Result<Self, PullRequestDomainError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PullRequestDomainError::EmptyTitle);
        }
        let actual = trimmed.chars().count();
        if actual > MAX_TITLE_LENGTH {
            return Err(PullRequestDomainError::TitleTooLong {
                max: MAX_TITLE_LENGTH,
                actual,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PullRequestTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated free-form pull request description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PullRequestDescription(String);

impl PullRequestDescription {
    /// Creates a description. Content is kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestDomainError::DescriptionTooLong`] past
    /// [`MAX_DESCRIPTION_LENGTH`].
    pub fn new(value: impl Into<String>) -> Result<Self, PullRequestDomainError> {
        let text = value.into();
        let actual = text.chars().count();
        if actual > MAX_DESCRIPTION_LENGTH {
            return Err(PullRequestDomainError::DescriptionTooLong {
                max: MAX_DESCRIPTION_LENGTH,
                actual,
            });
        }
        Ok(Self(text))
    }

    /// Returns the description text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identity recorded as the author of a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Author(String);

impl Author {
    /// Creates an author identity, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestDomainError::EmptyAuthor`] for blank input and
    /// [`PullRequestDomainError::AuthorTooLong`] past [`MAX_AUTHOR_LENGTH`].
    pub fn new(value: impl AsRef<str>) -> Result<Self, PullRequestDomainError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PullRequestDomainError::EmptyAuthor);
        }
        let actual = trimmed.chars().count();
        if actual > MAX_AUTHOR_LENGTH {
            return Err(PullRequestDomainError::AuthorTooLong {
                max: MAX_AUTHOR_LENGTH,
                actual,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identity text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated pull request that has not been stored yet.
///
/// Carries no identifier and no status: the store assigns the id and every
/// new record starts [`PullRequestStatus::Open`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    title: PullRequestTitle,
    description: Option<PullRequestDescription>,
    author: Author,
    source_branch: BranchName,
    destiny_branch: BranchName,
    created_at: DateTime<Utc>,
}

impl NewPullRequest {
    /// Creates a draft stamped with the current clock time.
    #[must_use]
    pub fn new(
        title: PullRequestTitle,
        author: Author,
        source_branch: BranchName,
        destiny_branch: BranchName,
        clock: &impl Clock,
    ) -> Self {
        Self {
            title,
            description: None,
            author,
            source_branch,
            destiny_branch,
            created_at: clock.utc(),
        }
    }

    /// Attaches an optional description.
    #[must_use]
    pub fn with_description(mut self, description: Option<PullRequestDescription>) -> Self {
        self.description = description;
        self
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &PullRequestTitle {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub const fn description(&self) -> Option<&PullRequestDescription> {
        self.description.as_ref()
    }

    /// Returns the author.
    #[must_use]
    pub const fn author(&self) -> &Author {
        &self.author
    }

    /// Returns the branch to merge from.
    #[must_use]
    pub const fn source_branch(&self) -> &BranchName {
        &self.source_branch
    }

    /// Returns the branch to merge into.
    #[must_use]
    pub const fn destiny_branch(&self) -> &BranchName {
        &self.destiny_branch
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Turns the draft into a stored aggregate with the assigned id.
    #[must_use]
    pub fn into_stored(self, id: PullRequestId) -> PullRequest {
        PullRequest {
            id,
            title: self.title,
            description: self.description,
            status: PullRequestStatus::Open,
            author: self.author,
            source_branch: self.source_branch,
            destiny_branch: self.destiny_branch,
            created_at: self.created_at,
        }
    }
}

/// Pull request aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    id: PullRequestId,
    title: PullRequestTitle,
    description: Option<PullRequestDescription>,
    status: PullRequestStatus,
    author: Author,
    source_branch: BranchName,
    destiny_branch: BranchName,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedPullRequestData {
    /// Persisted identifier.
    pub id: PullRequestId,
    /// Persisted title.
    pub title: PullRequestTitle,
    /// Persisted description, if any.
    pub description: Option<PullRequestDescription>,
    /// Persisted status, including the merge commit when merged.
    pub status: PullRequestStatus,
    /// Persisted author identity.
    pub author: Author,
    /// Persisted source branch name.
    pub source_branch: BranchName,
    /// Persisted destination branch name.
    pub destiny_branch: BranchName,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl PullRequest {
    /// Reconstructs a pull request from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedPullRequestData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            status: data.status,
            author: data.author,
            source_branch: data.source_branch,
            destiny_branch: data.destiny_branch,
            created_at: data.created_at,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> PullRequestId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &PullRequestTitle {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub const fn description(&self) -> Option<&PullRequestDescription> {
        self.description.as_ref()
    }

    /// Returns the full status.
    #[must_use]
    pub const fn status(&self) -> &PullRequestStatus {
        &self.status
    }

    /// Returns the status discriminant.
    #[must_use]
    pub const fn state(&self) -> PullRequestState {
        self.status.state()
    }

    /// Returns the merge commit when merged.
    #[must_use]
    pub const fn merge_commit(&self) -> Option<&CommitId> {
        self.status.merge_commit()
    }

    /// Returns the author.
    #[must_use]
    pub const fn author(&self) -> &Author {
        &self.author
    }

    /// Returns the branch to merge from.
    #[must_use]
    pub const fn source_branch(&self) -> &BranchName {
        &self.source_branch
    }

    /// Returns the branch to merge into.
    #[must_use]
    pub const fn destiny_branch(&self) -> &BranchName {
        &self.destiny_branch
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Marks the pull request merged at `commit`.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestDomainError::InvalidTransition`] unless open.
    pub fn merge(&mut self, commit: CommitId) -> Result<(), PullRequestDomainError> {
        self.status = self.status.merged(commit)?;
        Ok(())
    }

    /// Marks the pull request closed.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestDomainError::InvalidTransition`] unless open.
    pub fn close(&mut self) -> Result<(), PullRequestDomainError> {
        self.status = self.status.closed()?;
        Ok(())
    }
}
