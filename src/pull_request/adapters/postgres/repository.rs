//! `PostgreSQL` repository implementation for pull request storage.

use super::{
    models::{NewPullRequestRow, PullRequestChangeset, PullRequestRow},
    schema::pull_requests,
};
use crate::pull_request::{
    domain::{
        Author, NewPullRequest, PersistedPullRequestData, PullRequest, PullRequestDescription,
        PullRequestId, PullRequestState, PullRequestStatus, PullRequestTitle,
    },
    ports::{PullRequestRepository, PullRequestRepositoryError, PullRequestRepositoryResult},
};
use crate::vcs::domain::{BranchName, CommitId};
use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use thiserror::Error;

/// `PostgreSQL` connection pool type used by the pull request adapter.
pub type PullRequestPgPool = Pool<ConnectionManager<PgConnection>>;

/// DDL creating the `pull_requests` table when it does not exist.
pub const SCHEMA_SQL: &str =
    include_str!("../../../../migrations/2026-10-19-000000_create_pull_requests/up.sql");

/// `PostgreSQL`-backed pull request repository.
#[derive(Debug, Clone)]
pub struct PostgresPullRequestRepository {
    pool: PullRequestPgPool,
}

#[derive(Debug, Error)]
enum CorruptRow {
    #[error("pull request {id} is merged but has no merge commit")]
    MissingMergeCommit { id: i64 },
    #[error("pull request {id} is {state} but carries merge commit {commit}")]
    UnexpectedMergeCommit {
        id: i64,
        state: PullRequestState,
        commit: String,
    },
}

impl PostgresPullRequestRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PullRequestPgPool) -> Self {
        Self { pool }
    }

    /// Creates the `pull_requests` table if it is missing.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestRepositoryError::Persistence`] when the DDL fails.
    pub async fn ensure_schema(&self) -> PullRequestRepositoryResult<()> {
        self.run_blocking(|connection| {
            connection
                .batch_execute(SCHEMA_SQL)
                .map_err(PullRequestRepositoryError::persistence)
        })
        .await
    }

    async fn run_blocking<F, T>(&self, f: F) -> PullRequestRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> PullRequestRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool
                .get()
                .map_err(PullRequestRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(PullRequestRepositoryError::persistence)?
    }
}

#[async_trait]
impl PullRequestRepository for PostgresPullRequestRepository {
    async fn insert(
        &self,
        pull_request: &NewPullRequest,
    ) -> PullRequestRepositoryResult<PullRequest> {
        let new_row = to_new_row(pull_request);
        self.run_blocking(move |connection| {
            let row = diesel::insert_into(pull_requests::table)
                .values(&new_row)
                .returning(PullRequestRow::as_returning())
                .get_result::<PullRequestRow>(connection)
                .map_err(PullRequestRepositoryError::persistence)?;
            row_to_pull_request(row)
        })
        .await
    }

    async fn update(&self, pull_request: &PullRequest) -> PullRequestRepositoryResult<()> {
        let id = pull_request.id();
        let changeset = to_changeset(pull_request);
        self.run_blocking(move |connection| {
            let updated = diesel::update(pull_requests::table.filter(pull_requests::id.eq(id.value())))
                .set(&changeset)
                .execute(connection)
                .map_err(PullRequestRepositoryError::persistence)?;
            if updated == 0 {
                return Err(PullRequestRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn compare_and_update(
        &self,
        pull_request: &PullRequest,
        expected: PullRequestState,
    ) -> PullRequestRepositoryResult<()> {
        let id = pull_request.id();
        let changeset = to_changeset(pull_request);
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                pull_requests::table
                    .filter(pull_requests::id.eq(id.value()))
                    .filter(pull_requests::status.eq(expected.as_str())),
            )
            .set(&changeset)
            .execute(connection)
            .map_err(PullRequestRepositoryError::persistence)?;
            if updated > 0 {
                return Ok(());
            }

            let stored = pull_requests::table
                .filter(pull_requests::id.eq(id.value()))
                .select(pull_requests::status)
                .first::<String>(connection)
                .optional()
                .map_err(PullRequestRepositoryError::persistence)?;
            match stored {
                None => Err(PullRequestRepositoryError::NotFound(id)),
                Some(status) => {
                    let actual = PullRequestState::try_from(status.as_str())
                        .map_err(PullRequestRepositoryError::persistence)?;
                    Err(PullRequestRepositoryError::StatusChanged {
                        id,
                        expected,
                        actual,
                    })
                }
            }
        })
        .await
    }

    async fn find_by_id(
        &self,
        id: PullRequestId,
    ) -> PullRequestRepositoryResult<Option<PullRequest>> {
        self.run_blocking(move |connection| {
            let row = pull_requests::table
                .filter(pull_requests::id.eq(id.value()))
                .select(PullRequestRow::as_select())
                .first::<PullRequestRow>(connection)
                .optional()
                .map_err(PullRequestRepositoryError::persistence)?;
            row.map(row_to_pull_request).transpose()
        })
        .await
    }

    async fn list_all(&self) -> PullRequestRepositoryResult<Vec<PullRequest>> {
        self.run_blocking(|connection| {
            let rows = pull_requests::table
                .order(pull_requests::id.asc())
                .select(PullRequestRow::as_select())
                .load::<PullRequestRow>(connection)
                .map_err(PullRequestRepositoryError::persistence)?;
            rows.into_iter().map(row_to_pull_request).collect()
        })
        .await
    }
}

fn to_new_row(pull_request: &NewPullRequest) -> NewPullRequestRow {
    NewPullRequestRow {
        title: pull_request.title().as_str().to_owned(),
        description: pull_request
            .description()
            .map(|description| description.as_str().to_owned()),
        status: PullRequestState::Open.as_str().to_owned(),
        author: pull_request.author().as_str().to_owned(),
        source_branch: pull_request.source_branch().as_str().to_owned(),
        destiny_branch: pull_request.destiny_branch().as_str().to_owned(),
        created_at: pull_request.created_at(),
    }
}

fn to_changeset(pull_request: &PullRequest) -> PullRequestChangeset {
    PullRequestChangeset {
        title: pull_request.title().as_str().to_owned(),
        description: pull_request
            .description()
            .map(|description| description.as_str().to_owned()),
        status: pull_request.state().as_str().to_owned(),
        author: pull_request.author().as_str().to_owned(),
        source_branch: pull_request.source_branch().as_str().to_owned(),
        destiny_branch: pull_request.destiny_branch().as_str().to_owned(),
        merge_commit: pull_request
            .merge_commit()
            .map(|commit| commit.as_str().to_owned()),
    }
}

fn row_to_pull_request(row: PullRequestRow) -> PullRequestRepositoryResult<PullRequest> {
    let PullRequestRow {
        id,
        title,
        description,
        status,
        author,
        source_branch,
        destiny_branch,
        merge_commit,
        created_at,
    } = row;

    let state =
        PullRequestState::try_from(status.as_str()).map_err(PullRequestRepositoryError::persistence)?;
    let status = match (state, merge_commit) {
        (PullRequestState::Merged, Some(commit)) => PullRequestStatus::Merged {
            commit: CommitId::parse(commit).map_err(PullRequestRepositoryError::persistence)?,
        },
        (PullRequestState::Merged, None) => {
            return Err(PullRequestRepositoryError::persistence(
                CorruptRow::MissingMergeCommit { id },
            ));
        }
        (PullRequestState::Open | PullRequestState::Closed, Some(commit)) => {
            return Err(PullRequestRepositoryError::persistence(
                CorruptRow::UnexpectedMergeCommit { id, state, commit },
            ));
        }
        (PullRequestState::Open, None) => PullRequestStatus::Open,
        (PullRequestState::Closed, None) => PullRequestStatus::Closed,
    };

    let data = PersistedPullRequestData {
        id: PullRequestId::new(id).map_err(PullRequestRepositoryError::persistence)?,
        title: PullRequestTitle::new(title).map_err(PullRequestRepositoryError::persistence)?,
        description: description
            .map(PullRequestDescription::new)
            .transpose()
            .map_err(PullRequestRepositoryError::persistence)?,
        status,
        author: Author::new(author).map_err(PullRequestRepositoryError::persistence)?,
        source_branch: BranchName::new(source_branch)
            .map_err(PullRequestRepositoryError::persistence)?,
        destiny_branch: BranchName::new(destiny_branch)
            .map_err(PullRequestRepositoryError::persistence)?,
        created_at,
    };
    Ok(PullRequest::from_persisted(data))
}
