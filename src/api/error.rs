//! Mapping from service errors to HTTP responses.

use super::dto::MessageDto;
use crate::pull_request::{
    ports::PullRequestRepositoryError, services::PullRequestLifecycleError,
};
use crate::vcs::services::RepositoryReadError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Errors surfaced by HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body or a required field is missing or malformed.
    #[error("{0}")]
    BadRequest(String),

    /// A path segment does not name a pull request.
    #[error("No pull request found with id {0}")]
    PullRequestNotFound(String),

    /// Branch or commit query failed.
    #[error(transparent)]
    Read(#[from] RepositoryReadError),

    /// Pull request operation failed.
    #[error(transparent)]
    Lifecycle(#[from] PullRequestLifecycleError),
}

impl ApiError {
    /// Returns the response status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PullRequestNotFound(_) => StatusCode::NOT_FOUND,
            Self::Read(err) => match err {
                RepositoryReadError::BranchNotFound(_) | RepositoryReadError::CommitNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                RepositoryReadError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Lifecycle(err) => match err {
                PullRequestLifecycleError::Validation(_)
                | PullRequestLifecycleError::InvalidBranch { .. }
                | PullRequestLifecycleError::InvalidState { .. }
                | PullRequestLifecycleError::MergeConflict { .. } => StatusCode::BAD_REQUEST,
                PullRequestLifecycleError::NotFound(_)
                | PullRequestLifecycleError::Repository(PullRequestRepositoryError::NotFound(_)) => {
                    StatusCode::NOT_FOUND
                }
                PullRequestLifecycleError::Backend(_)
                | PullRequestLifecycleError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(MessageDto::new(self.to_string()))).into_response()
    }
}
