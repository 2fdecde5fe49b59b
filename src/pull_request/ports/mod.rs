//! Port contracts for pull request persistence.

pub mod repository;

pub use repository::{
    PullRequestRepository, PullRequestRepositoryError, PullRequestRepositoryResult,
};
