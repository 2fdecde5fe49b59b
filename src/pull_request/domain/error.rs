//! Error types for pull request domain validation and parsing.

use super::PullRequestState;
use thiserror::Error;

/// Errors returned while constructing or transitioning pull request values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PullRequestDomainError {
    /// The title is missing or empty after trimming.
    #[error("title: This field cannot be blank.")]
    EmptyTitle,

    /// The title exceeds the storage limit.
    #[error("title must be at most {max} characters, got {actual}")]
    TitleTooLong {
        /// Maximum accepted length.
        max: usize,
        /// Length supplied.
        actual: usize,
    },

    /// The description exceeds the storage limit.
    #[error("description must be at most {max} characters, got {actual}")]
    DescriptionTooLong {
        /// Maximum accepted length.
        max: usize,
        /// Length supplied.
        actual: usize,
    },

    /// The author identity is empty after trimming.
    #[error("author identity must not be empty")]
    EmptyAuthor,

    /// The author identity exceeds the storage limit.
    #[error("author identity must be at most {max} characters, got {actual}")]
    AuthorTooLong {
        /// Maximum accepted length.
        max: usize,
        /// Length supplied.
        actual: usize,
    },

    /// Pull request identifiers are positive integers.
    #[error("invalid pull request id {0}, expected a positive integer")]
    InvalidPullRequestId(i64),

    /// Only open pull requests can be merged or closed.
    #[error("cannot move a pull request from {from} to {to}")]
    InvalidTransition {
        /// Current state.
        from: PullRequestState,
        /// Requested state.
        to: PullRequestState,
    },
}

/// Error returned while parsing pull request states from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown pull request state: {0}")]
pub struct ParsePullRequestStateError(pub String);
