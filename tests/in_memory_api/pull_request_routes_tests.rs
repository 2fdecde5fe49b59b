//! Pull request routes.

use super::helpers::{Payload, TestApp, app, message};
use axum::http::{Method, StatusCode};
use eyre::ensure;
use rstest::rstest;
use serde_json::{Value, json};

const CREATE_FORM: &str =
    "title=My+awesome+commit%21&description=Adds+a+feature&source_branch=dev&destiny_branch=master";

async fn create(app: &TestApp, form: &str) -> eyre::Result<(StatusCode, Value)> {
    app.send(Method::POST, "/api/v1/pull-requests", Payload::Form(form))
        .await
}

async fn list_len(app: &TestApp) -> eyre::Result<usize> {
    let (_, body) = app.get("/api/v1/pull-requests").await?;
    body.as_array()
        .map(Vec::len)
        .ok_or_else(|| eyre::eyre!("expected a list"))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn creates_open_pull_request(app: TestApp) -> eyre::Result<()> {
    let (status, body) = create(&app, CREATE_FORM).await?;

    ensure!(status == StatusCode::CREATED, "status was {status}");
    ensure!(body.get("id").and_then(Value::as_i64) == Some(1));
    ensure!(body.get("title").and_then(Value::as_str) == Some("My awesome commit!"));
    ensure!(body.get("description").and_then(Value::as_str) == Some("Adds a feature"));
    ensure!(body.get("status").and_then(Value::as_str) == Some("open"));
    ensure!(body.get("author").and_then(Value::as_str) == Some("dev@example.com"));
    ensure!(body.get("source_branch").and_then(Value::as_str) == Some("dev"));
    ensure!(body.get("destiny_branch").and_then(Value::as_str) == Some("master"));
    ensure!(body.get("commit") == Some(&Value::Null));
    ensure!(body.get("created_at").and_then(Value::as_str).is_some());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn client_supplied_status_is_ignored(app: TestApp) -> eyre::Result<()> {
    let (status, body) = create(&app, &format!("{CREATE_FORM}&status=merged")).await?;

    ensure!(status == StatusCode::CREATED);
    ensure!(body.get("status").and_then(Value::as_str) == Some("open"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn accepts_json_bodies(app: TestApp) -> eyre::Result<()> {
    let payload = json!({
        "title": "From JSON",
        "source_branch": "dev",
        "destiny_branch": "master",
    });

    let (status, body) = app
        .send(Method::POST, "/api/v1/pull-requests", Payload::Json(payload))
        .await?;

    ensure!(status == StatusCode::CREATED);
    ensure!(body.get("description") == Some(&Value::Null));
    Ok(())
}

#[rstest]
#[case("source_branch=dev&destiny_branch=master", "title: This field cannot be blank.")]
#[case("title=&source_branch=dev&destiny_branch=master", "title: This field cannot be blank.")]
#[case("title=x&destiny_branch=master", "source_branch: This field cannot be blank.")]
#[case("title=x&source_branch=nope&destiny_branch=master", "Invalid source_branch nope")]
#[case("title=x&source_branch=dev&destiny_branch=nope", "Invalid destiny_branch nope")]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_creation_is_rejected_and_not_stored(
    #[case] form: &str,
    #[case] expected: &str,
    app: TestApp,
) -> eyre::Result<()> {
    let (status, body) = create(&app, form).await?;

    ensure!(status == StatusCode::BAD_REQUEST, "status was {status}");
    ensure!(message(&body) == Some(expected), "body was {body}");
    ensure!(list_len(&app).await? == 0);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn merge_then_merge_again(app: TestApp) -> eyre::Result<()> {
    create(&app, CREATE_FORM).await?;

    let (status, body) = app.post("/api/v1/pull-requests/1/merge").await?;
    ensure!(status == StatusCode::OK, "merge failed with {body}");
    ensure!(message(&body) == Some("Fast-forward"), "message was {body}");

    let master_head = app
        .backend
        .branch_head("master")?
        .ok_or_else(|| eyre::eyre!("master has no head"))?;
    let (_, record) = app.get("/api/v1/pull-requests/1").await?;
    ensure!(record.get("status").and_then(Value::as_str) == Some("merged"));
    ensure!(record.get("commit").and_then(Value::as_str) == Some(master_head.as_str()));

    let (status, body) = app.post("/api/v1/pull-requests/1/merge").await?;
    ensure!(status == StatusCode::BAD_REQUEST);
    ensure!(message(&body) == Some("Cannot merge a pull request with status merged"));
    Ok(())
}

#[rstest]
#[case("/api/v1/pull-requests/99/merge", "No pull request found with id 99")]
#[case("/api/v1/pull-requests/abc/merge", "No pull request found with id abc")]
#[case("/api/v1/pull-requests/99/close", "No pull request found with id 99")]
#[case("/api/v1/pull-requests/0/close", "No pull request found with id 0")]
#[tokio::test(flavor = "multi_thread")]
async fn transitions_on_unknown_ids_are_not_found(
    #[case] uri: &str,
    #[case] expected: &str,
    app: TestApp,
) -> eyre::Result<()> {
    let (status, body) = app.post(uri).await?;

    ensure!(status == StatusCode::NOT_FOUND);
    ensure!(message(&body) == Some(expected));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn close_is_terminal(app: TestApp) -> eyre::Result<()> {
    create(&app, CREATE_FORM).await?;

    let (status, _) = app.post("/api/v1/pull-requests/1/close").await?;
    ensure!(status == StatusCode::OK);

    let (status, body) = app.post("/api/v1/pull-requests/1/close").await?;
    ensure!(status == StatusCode::BAD_REQUEST);
    ensure!(message(&body) == Some("Cannot close a pull request with status closed"));

    let (status, _) = app.post("/api/v1/pull-requests/1/merge").await?;
    ensure!(status == StatusCode::BAD_REQUEST);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn conflict_is_a_bad_request_and_keeps_record_open(app: TestApp) -> eyre::Result<()> {
    app.backend
        .script_conflict("dev", "master", "CONFLICT (content): Merge conflict in a.txt")?;
    create(&app, CREATE_FORM).await?;

    let (status, body) = app.post("/api/v1/pull-requests/1/merge").await?;

    ensure!(status == StatusCode::BAD_REQUEST);
    ensure!(
        message(&body).is_some_and(|text| text
            .starts_with("Merge was aborted because of server response: CONFLICT")),
        "body was {body}"
    );
    let (_, record) = app.get("/api/v1/pull-requests/1").await?;
    ensure!(record.get("status").and_then(Value::as_str) == Some("open"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unclassified_backend_failure_is_a_server_error(app: TestApp) -> eyre::Result<()> {
    app.backend
        .script_failure("dev", "fatal: unable to write new index file")?;
    create(&app, CREATE_FORM).await?;

    let (status, body) = app.post("/api/v1/pull-requests/1/merge").await?;

    ensure!(status == StatusCode::INTERNAL_SERVER_ERROR);
    ensure!(message(&body) == Some("fatal: unable to write new index file"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn merge_into_deleted_destination_is_a_server_error(app: TestApp) -> eyre::Result<()> {
    app.backend.create_branch("release", "master")?;
    let (status, _) = create(
        &app,
        "title=Release&source_branch=dev&destiny_branch=release",
    )
    .await?;
    ensure!(status == StatusCode::CREATED);
    app.backend.delete_branch("release")?;

    let (status, body) = app.post("/api/v1/pull-requests/1/merge").await?;

    ensure!(status == StatusCode::INTERNAL_SERVER_ERROR, "status was {status}");
    ensure!(message(&body) == Some("branch 'release' does not exist"), "body was {body}");
    let (_, record) = app.get("/api/v1/pull-requests/1").await?;
    ensure!(record.get("status").and_then(Value::as_str) == Some("open"));
    ensure!(list_len(&app).await? == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lists_every_pull_request(app: TestApp) -> eyre::Result<()> {
    ensure!(list_len(&app).await? == 0);
    create(&app, CREATE_FORM).await?;
    create(&app, CREATE_FORM).await?;
    ensure!(list_len(&app).await? == 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pull_request_routes_accept_a_trailing_slash(app: TestApp) -> eyre::Result<()> {
    let (status, _) = app
        .send(Method::POST, "/api/v1/pull-requests/", Payload::Form(CREATE_FORM))
        .await?;
    ensure!(status == StatusCode::CREATED, "create returned {status}");

    let (status, record) = app.get("/api/v1/pull-requests/1/").await?;
    ensure!(status == StatusCode::OK);
    ensure!(record.get("status").and_then(Value::as_str) == Some("open"));

    let (status, body) = app.post("/api/v1/pull-requests/1/close/").await?;
    ensure!(status == StatusCode::OK, "close returned {body}");

    create(&app, CREATE_FORM).await?;
    let (status, body) = app.post("/api/v1/pull-requests/2/merge/").await?;
    ensure!(status == StatusCode::OK, "merge returned {body}");
    Ok(())
}
