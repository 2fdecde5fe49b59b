//! Diesel row models for pull request persistence.

use super::schema::pull_requests;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for pull request records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = pull_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PullRequestRow {
    /// Store-assigned identifier.
    pub id: i64,
    /// Title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Lifecycle state.
    pub status: String,
    /// Author identity.
    pub author: String,
    /// Branch merged from.
    pub source_branch: String,
    /// Branch merged into.
    pub destiny_branch: String,
    /// Destination head after a successful merge.
    pub merge_commit: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for pull request records. The id comes from the sequence.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = pull_requests)]
pub struct NewPullRequestRow {
    /// Title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Lifecycle state.
    pub status: String,
    /// Author identity.
    pub author: String,
    /// Branch merged from.
    pub source_branch: String,
    /// Branch merged into.
    pub destiny_branch: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Full-replace changeset for an existing record.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = pull_requests)]
#[diesel(treat_none_as_null = true)]
pub struct PullRequestChangeset {
    /// Title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Lifecycle state.
    pub status: String,
    /// Author identity.
    pub author: String,
    /// Branch merged from.
    pub source_branch: String,
    /// Branch merged into.
    pub destiny_branch: String,
    /// Destination head after a successful merge.
    pub merge_commit: Option<String>,
}
