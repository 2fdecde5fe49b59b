//! `PostgreSQL` adapter for pull request persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresPullRequestRepository, PullRequestPgPool, SCHEMA_SQL};
