//! Domain model for pull requests.

mod error;
mod ids;
mod pull_request;
mod status;

pub use error::{ParsePullRequestStateError, PullRequestDomainError};
pub use ids::PullRequestId;
pub use pull_request::{
    Author, MAX_AUTHOR_LENGTH, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH, NewPullRequest,
    PersistedPullRequestData, PullRequest, PullRequestDescription, PullRequestTitle,
};
pub use status::{PullRequestState, PullRequestStatus};
