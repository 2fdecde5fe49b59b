//! In-memory pull request store for tests and database-less runs.

mod repository;

pub use repository::InMemoryPullRequestRepository;
