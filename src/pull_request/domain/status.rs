//! Pull request status and its forward-only state machine.

use super::{ParsePullRequestStateError, PullRequestDomainError};
use crate::vcs::domain::CommitId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status discriminant, as stored and as reported over the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestState {
    /// Awaiting merge or close.
    Open,
    /// Merged into the destination branch.
    Merged,
    /// Closed without merging.
    Closed,
}

impl PullRequestState {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Merged => "merged",
            Self::Closed => "closed",
        }
    }

    /// Returns whether no transition can leave this state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Merged | Self::Closed)
    }
}

impl fmt::Display for PullRequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for PullRequestState {
    type Error = ParsePullRequestStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "merged" => Ok(Self::Merged),
            "closed" => Ok(Self::Closed),
            _ => Err(ParsePullRequestStateError(value.to_owned())),
        }
    }
}

/// Pull request status.
///
/// The merge commit lives inside [`PullRequestStatus::Merged`], so a record
/// carries a merge commit exactly when it is merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PullRequestStatus {
    /// Awaiting merge or close.
    Open,
    /// Merged; `commit` is the destination branch head after the merge.
    Merged {
        /// Destination head produced by the merge.
        commit: CommitId,
    },
    /// Closed without merging.
    Closed,
}

impl PullRequestStatus {
    /// Returns the status discriminant.
    #[must_use]
    pub const fn state(&self) -> PullRequestState {
        match self {
            Self::Open => PullRequestState::Open,
            Self::Merged { .. } => PullRequestState::Merged,
            Self::Closed => PullRequestState::Closed,
        }
    }

    /// Returns the merge commit when merged.
    #[must_use]
    pub const fn merge_commit(&self) -> Option<&CommitId> {
        match self {
            Self::Merged { commit } => Some(commit),
            Self::Open | Self::Closed => None,
        }
    }

    /// Returns the successor status for a successful merge.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestDomainError::InvalidTransition`] unless the
    /// status is [`PullRequestStatus::Open`].
    pub fn merged(&self, commit: CommitId) -> Result<Self, PullRequestDomainError> {
        self.ensure_open(PullRequestState::Merged)?;
        Ok(Self::Merged { commit })
    }

    /// Returns the successor status for a close.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestDomainError::InvalidTransition`] unless the
    /// status is [`PullRequestStatus::Open`].
    pub fn closed(&self) -> Result<Self, PullRequestDomainError> {
        self.ensure_open(PullRequestState::Closed)?;
        Ok(Self::Closed)
    }

    const fn ensure_open(&self, to: PullRequestState) -> Result<(), PullRequestDomainError> {
        match self {
            Self::Open => Ok(()),
            Self::Merged { .. } | Self::Closed => Err(PullRequestDomainError::InvalidTransition {
                from: self.state(),
                to,
            }),
        }
    }
}
