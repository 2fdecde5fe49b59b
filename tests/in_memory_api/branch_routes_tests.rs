//! Branch and commit routes.

use super::helpers::{TestApp, app, message};
use axum::http::StatusCode;
use eyre::ensure;
use rstest::rstest;
use serde_json::Value;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lists_branches_with_heads(app: TestApp) -> eyre::Result<()> {
    let (status, body) = app.get("/api/v1/branches").await?;

    ensure!(status == StatusCode::OK);
    let branches = body.as_array().ok_or_else(|| eyre::eyre!("expected a list"))?;
    let names: Vec<&str> = branches
        .iter()
        .filter_map(|branch| branch.get("name").and_then(Value::as_str))
        .collect();
    ensure!(names == ["dev", "master"], "unexpected branches {names:?}");
    for branch in branches {
        ensure!(branch.get("commit").and_then(Value::as_str).is_some());
        ensure!(branch.get("datetime").and_then(Value::as_str).is_some());
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn gets_a_single_branch(app: TestApp) -> eyre::Result<()> {
    let head = app
        .backend
        .branch_head("dev")?
        .ok_or_else(|| eyre::eyre!("dev has no head"))?;

    let (status, body) = app.get("/api/v1/branches/dev").await?;

    ensure!(status == StatusCode::OK);
    ensure!(body.get("name").and_then(Value::as_str) == Some("dev"));
    ensure!(body.get("commit").and_then(Value::as_str) == Some(head.as_str()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_branch_is_not_found(app: TestApp) -> eyre::Result<()> {
    let (status, body) = app.get("/api/v1/branches/this_branch_dont_exists").await?;

    ensure!(status == StatusCode::NOT_FOUND);
    ensure!(message(&body) == Some("No branch found with id this_branch_dont_exists"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lists_branch_commits_newest_first(app: TestApp) -> eyre::Result<()> {
    let (status, body) = app.get("/api/v1/branches/dev/commits").await?;

    ensure!(status == StatusCode::OK);
    let commits = body.as_array().ok_or_else(|| eyre::eyre!("expected a list"))?;
    let messages: Vec<&str> = commits
        .iter()
        .filter_map(|commit| commit.get("message").and_then(Value::as_str))
        .collect();
    ensure!(messages == ["Add feature", "Initial commit"]);
    let first = commits.first().ok_or_else(|| eyre::eyre!("empty log"))?;
    for field in ["commit", "author", "email", "datetime"] {
        ensure!(first.get(field).and_then(Value::as_str).is_some(), "missing {field}");
    }
    ensure!(first.get("files").and_then(Value::as_u64) == Some(2));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn commits_of_unknown_branch_are_not_found(app: TestApp) -> eyre::Result<()> {
    let (status, body) = app.get("/api/v1/branches/nope/commits").await?;

    ensure!(status == StatusCode::NOT_FOUND);
    ensure!(message(&body) == Some("No branch found with id nope"));
    Ok(())
}

#[rstest]
#[case("dev")]
#[case("master")]
#[case("any-branch")]
#[tokio::test(flavor = "multi_thread")]
async fn commit_lookup_ignores_branch_segment(
    #[case] branch: &str,
    app: TestApp,
) -> eyre::Result<()> {
    let head = app
        .backend
        .branch_head("dev")?
        .ok_or_else(|| eyre::eyre!("dev has no head"))?;

    let (status, body) = app
        .get(&format!("/api/v1/branches/{branch}/commits/{}", head.as_str()))
        .await?;

    ensure!(status == StatusCode::OK);
    ensure!(body.get("commit").and_then(Value::as_str) == Some(head.as_str()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_commit_is_not_found(app: TestApp) -> eyre::Result<()> {
    let (status, body) = app
        .get("/api/v1/branches/dev/commits/thisisawrongshahex")
        .await?;

    ensure!(status == StatusCode::NOT_FOUND);
    ensure!(message(&body) == Some("No commit found with id thisisawrongshahex"));
    Ok(())
}

#[rstest]
#[case("/api/v1/branches/")]
#[case("/api/v1/branches/dev/")]
#[case("/api/v1/branches/dev/commits/")]
#[case("/api/v1/pull-requests/")]
#[tokio::test(flavor = "multi_thread")]
async fn trailing_slash_reaches_the_same_route(
    #[case] uri: &str,
    app: TestApp,
) -> eyre::Result<()> {
    let (with_slash, slashed_body) = app.get(uri).await?;
    let (without_slash, body) = app.get(uri.trim_end_matches('/')).await?;

    ensure!(with_slash == StatusCode::OK, "{uri} returned {with_slash}");
    ensure!(without_slash == StatusCode::OK);
    ensure!(slashed_body == body);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn trailing_slash_on_commit_route(app: TestApp) -> eyre::Result<()> {
    let head = app
        .backend
        .branch_head("dev")?
        .ok_or_else(|| eyre::eyre!("dev has no head"))?;

    let (status, body) = app
        .get(&format!("/api/v1/branches/dev/commits/{}/", head.as_str()))
        .await?;

    ensure!(status == StatusCode::OK, "status was {status}");
    ensure!(body.get("commit").and_then(Value::as_str) == Some(head.as_str()));
    Ok(())
}
