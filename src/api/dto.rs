//! Response and request shapes for the HTTP surface.

use crate::pull_request::domain::{PullRequest, PullRequestState};
use crate::vcs::domain::{Branch, Commit};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Branch projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchDto {
    /// Branch name.
    pub name: String,
    /// Head commit id.
    pub commit: String,
    /// Head commit timestamp.
    pub datetime: DateTime<FixedOffset>,
}

impl From<&Branch> for BranchDto {
    fn from(branch: &Branch) -> Self {
        Self {
            name: branch.name().as_str().to_owned(),
            commit: branch.head().as_str().to_owned(),
            datetime: branch.head_committed_at(),
        }
    }
}

/// Commit projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDto {
    /// Commit id.
    pub commit: String,
    /// Author name.
    pub author: String,
    /// Author email.
    pub email: String,
    /// Full commit message.
    pub message: String,
    /// Number of files touched.
    pub files: usize,
    /// Committer timestamp.
    pub datetime: DateTime<FixedOffset>,
}

impl From<&Commit> for CommitDto {
    fn from(commit: &Commit) -> Self {
        Self {
            commit: commit.id().as_str().to_owned(),
            author: commit.author_name().to_owned(),
            email: commit.author_email().to_owned(),
            message: commit.message().to_owned(),
            files: commit.files_changed(),
            datetime: commit.committed_at(),
        }
    }
}

/// Pull request record as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestDto {
    /// Identifier.
    pub id: i64,
    /// Title.
    pub title: String,
    /// Description, if any.
    pub description: Option<String>,
    /// `open`, `merged` or `closed`.
    pub status: PullRequestState,
    /// Author identity.
    pub author: String,
    /// Branch merged from.
    pub source_branch: String,
    /// Branch merged into.
    pub destiny_branch: String,
    /// Merge commit; `null` until merged.
    pub commit: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&PullRequest> for PullRequestDto {
    fn from(pull_request: &PullRequest) -> Self {
        Self {
            id: pull_request.id().value(),
            title: pull_request.title().as_str().to_owned(),
            description: pull_request
                .description()
                .map(|description| description.as_str().to_owned()),
            status: pull_request.state(),
            author: pull_request.author().as_str().to_owned(),
            source_branch: pull_request.source_branch().as_str().to_owned(),
            destiny_branch: pull_request.destiny_branch().as_str().to_owned(),
            commit: pull_request
                .merge_commit()
                .map(|commit| commit.as_str().to_owned()),
            created_at: pull_request.created_at(),
        }
    }
}

/// Single-message body used for errors and transition acknowledgements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    /// Human-readable message.
    pub message: String,
}

impl MessageDto {
    /// Creates a message body.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Fields accepted when opening a pull request.
///
/// Every field is optional at the parsing stage so missing ones can be
/// reported by name. Unknown fields such as `status` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreatePullRequestForm {
    /// Required title.
    pub title: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Required source branch.
    pub source_branch: Option<String>,
    /// Required destination branch.
    pub destiny_branch: Option<String>,
}
