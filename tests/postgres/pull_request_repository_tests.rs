//! Store operations and schema constraints for the `PostgreSQL` pull request
//! repository.

use crate::postgres::helpers::{
    CleanupGuard, database_name, ensure_template, postgres_cluster, setup_repository,
    test_runtime,
};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use eyre::{bail, ensure};
use guig::pull_request::{
    domain::{
        Author, NewPullRequest, PullRequestDescription, PullRequestId, PullRequestState,
        PullRequestTitle,
    },
    ports::{PullRequestRepository, PullRequestRepositoryError},
};
use guig::vcs::domain::{BranchName, CommitId};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use rstest::rstest;

const MERGE_COMMIT: &str = "0123456789abcdef0123456789abcdef01234567";

fn draft(title: &str) -> eyre::Result<NewPullRequest> {
    Ok(NewPullRequest::new(
        PullRequestTitle::new(title)?,
        Author::new("dev@example.com")?,
        BranchName::new("dev")?,
        BranchName::new("master")?,
        &DefaultClock,
    ))
}

fn prepare(cluster: &TestCluster) -> eyre::Result<()> {
    ensure_template(cluster).map_err(|e| eyre::eyre!("template setup: {e}"))
}

#[rstest]
fn insert_assigns_sequential_ids(
    postgres_cluster: Option<&'static TestCluster>,
) -> eyre::Result<()> {
    let Some(cluster) = postgres_cluster else { return Ok(()) };
    prepare(cluster)?;
    let db_name = database_name("pr_insert");
    let _guard = CleanupGuard::new(cluster, db_name.clone());
    let (repo, _pool) =
        setup_repository(cluster, &db_name).map_err(|e| eyre::eyre!("repository setup: {e}"))?;
    let rt = test_runtime();

    let first = rt.block_on(repo.insert(&draft("First")?))?;
    let second = rt.block_on(
        repo.insert(
            &draft("Second")?
                .with_description(Some(PullRequestDescription::new("Adds the thing")?)),
        ),
    )?;

    ensure!(first.id().value() == 1, "first id was {}", first.id());
    ensure!(second.id().value() == 2, "second id was {}", second.id());
    ensure!(first.state() == PullRequestState::Open);
    ensure!(first.merge_commit().is_none());

    let listed = rt.block_on(repo.list_all())?;
    let titles: Vec<&str> = listed.iter().map(|pr| pr.title().as_str()).collect();
    ensure!(titles == ["First", "Second"], "listed {titles:?}");
    let stored = listed
        .iter()
        .find(|pr| pr.id() == second.id())
        .ok_or_else(|| eyre::eyre!("second record missing"))?;
    ensure!(stored.description().map(PullRequestDescription::as_str) == Some("Adds the thing"));
    Ok(())
}

#[rstest]
fn merged_record_round_trips(postgres_cluster: Option<&'static TestCluster>) -> eyre::Result<()> {
    let Some(cluster) = postgres_cluster else { return Ok(()) };
    prepare(cluster)?;
    let db_name = database_name("pr_merged");
    let _guard = CleanupGuard::new(cluster, db_name.clone());
    let (repo, _pool) =
        setup_repository(cluster, &db_name).map_err(|e| eyre::eyre!("repository setup: {e}"))?;
    let rt = test_runtime();

    let mut pull_request = rt.block_on(repo.insert(&draft("Merge me")?))?;
    pull_request.merge(CommitId::parse(MERGE_COMMIT)?)?;
    rt.block_on(repo.compare_and_update(&pull_request, PullRequestState::Open))?;

    let reloaded = rt
        .block_on(repo.find_by_id(pull_request.id()))?
        .ok_or_else(|| eyre::eyre!("record should exist"))?;
    ensure!(reloaded.state() == PullRequestState::Merged);
    ensure!(reloaded.merge_commit().map(CommitId::as_str) == Some(MERGE_COMMIT));
    ensure!(reloaded.created_at() == pull_request.created_at());
    Ok(())
}

#[rstest]
fn compare_and_update_reports_lost_race(
    postgres_cluster: Option<&'static TestCluster>,
) -> eyre::Result<()> {
    let Some(cluster) = postgres_cluster else { return Ok(()) };
    prepare(cluster)?;
    let db_name = database_name("pr_race");
    let _guard = CleanupGuard::new(cluster, db_name.clone());
    let (repo, _pool) =
        setup_repository(cluster, &db_name).map_err(|e| eyre::eyre!("repository setup: {e}"))?;
    let rt = test_runtime();

    let stored = rt.block_on(repo.insert(&draft("Contended")?))?;
    let mut merging = stored.clone();
    let mut closing = stored;
    merging.merge(CommitId::parse(MERGE_COMMIT)?)?;
    closing.close()?;

    rt.block_on(repo.compare_and_update(&merging, PullRequestState::Open))?;
    let result = rt.block_on(repo.compare_and_update(&closing, PullRequestState::Open));

    let Err(PullRequestRepositoryError::StatusChanged {
        expected, actual, ..
    }) = result
    else {
        bail!("expected StatusChanged, got {result:?}");
    };
    ensure!(expected == PullRequestState::Open);
    ensure!(actual == PullRequestState::Merged);

    let reloaded = rt
        .block_on(repo.find_by_id(merging.id()))?
        .ok_or_else(|| eyre::eyre!("record should exist"))?;
    ensure!(reloaded.state() == PullRequestState::Merged);
    Ok(())
}

#[rstest]
fn unknown_ids_are_not_found(postgres_cluster: Option<&'static TestCluster>) -> eyre::Result<()> {
    let Some(cluster) = postgres_cluster else { return Ok(()) };
    prepare(cluster)?;
    let db_name = database_name("pr_missing");
    let _guard = CleanupGuard::new(cluster, db_name.clone());
    let (repo, _pool) =
        setup_repository(cluster, &db_name).map_err(|e| eyre::eyre!("repository setup: {e}"))?;
    let rt = test_runtime();

    let mut phantom = draft("Never stored")?.into_stored(PullRequestId::new(42)?);
    phantom.close()?;

    let swapped = rt.block_on(repo.compare_and_update(&phantom, PullRequestState::Open));
    ensure!(
        matches!(swapped, Err(PullRequestRepositoryError::NotFound(id)) if id.value() == 42),
        "compare_and_update gave {swapped:?}"
    );
    let updated = rt.block_on(repo.update(&phantom));
    ensure!(
        matches!(updated, Err(PullRequestRepositoryError::NotFound(_))),
        "update gave {updated:?}"
    );
    ensure!(rt.block_on(repo.find_by_id(phantom.id()))?.is_none());
    Ok(())
}

#[rstest]
fn ensure_schema_is_repeatable(postgres_cluster: Option<&'static TestCluster>) -> eyre::Result<()> {
    let Some(cluster) = postgres_cluster else { return Ok(()) };
    prepare(cluster)?;
    let db_name = database_name("pr_schema");
    let _guard = CleanupGuard::new(cluster, db_name.clone());
    let (repo, _pool) =
        setup_repository(cluster, &db_name).map_err(|e| eyre::eyre!("repository setup: {e}"))?;
    let rt = test_runtime();

    let existing = rt.block_on(repo.insert(&draft("Before")?))?;
    rt.block_on(repo.ensure_schema())?;
    rt.block_on(repo.ensure_schema())?;

    ensure!(rt.block_on(repo.find_by_id(existing.id()))?.is_some());
    let next = rt.block_on(repo.insert(&draft("After")?))?;
    ensure!(next.id().value() == 2);
    Ok(())
}

#[rstest]
#[case(
    "UPDATE pull_requests SET status = 'merged' WHERE id = 1",
    "pull_requests_merge_commit_check"
)]
#[case(
    "UPDATE pull_requests SET merge_commit = 'abcdef12' WHERE id = 1",
    "pull_requests_merge_commit_check"
)]
#[case(
    "UPDATE pull_requests SET status = 'reopened' WHERE id = 1",
    "pull_requests_status_check"
)]
fn schema_rejects_inconsistent_rows(
    postgres_cluster: Option<&'static TestCluster>,
    #[case] statement: &str,
    #[case] constraint: &str,
) -> eyre::Result<()> {
    let Some(cluster) = postgres_cluster else { return Ok(()) };
    prepare(cluster)?;
    let db_name = database_name("pr_check");
    let _guard = CleanupGuard::new(cluster, db_name.clone());
    let (repo, pool) =
        setup_repository(cluster, &db_name).map_err(|e| eyre::eyre!("repository setup: {e}"))?;
    let rt = test_runtime();
    let stored = rt.block_on(repo.insert(&draft("Constrained")?))?;
    ensure!(stored.id().value() == 1);

    let mut conn = pool.get()?;
    let result = diesel::sql_query(statement).execute(&mut conn);

    let Err(DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, info)) = result else {
        bail!("expected a check violation, got {result:?}");
    };
    ensure!(
        info.constraint_name() == Some(constraint),
        "violated {:?}",
        info.constraint_name()
    );
    Ok(())
}
