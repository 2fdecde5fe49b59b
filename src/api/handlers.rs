//! Request handlers. Each one translates a single service call.

use super::{
    AppState,
    dto::{BranchDto, CommitDto, CreatePullRequestForm, MessageDto, PullRequestDto},
    error::ApiError,
};
use crate::pull_request::{
    domain::PullRequestId, ports::PullRequestRepository, services::CreatePullRequestRequest,
};
use crate::vcs::ports::VcsBackend;
use axum::{
    Form, Json,
    extract::{FromRequest, Path, Request, State},
    http::{StatusCode, header::CONTENT_TYPE},
};
use mockable::Clock;

type ApiResult<T> = Result<T, ApiError>;

pub(super) async fn list_branches<R, V, C>(
    State(state): State<AppState<R, V, C>>,
) -> ApiResult<Json<Vec<BranchDto>>>
where
    R: PullRequestRepository,
    V: VcsBackend,
    C: Clock + Send + Sync,
{
    let branches = state.reader.list_branches().await?;
    Ok(Json(branches.iter().map(BranchDto::from).collect()))
}

pub(super) async fn get_branch<R, V, C>(
    State(state): State<AppState<R, V, C>>,
    Path(name): Path<String>,
) -> ApiResult<Json<BranchDto>>
where
    R: PullRequestRepository,
    V: VcsBackend,
    C: Clock + Send + Sync,
{
    let branch = state.reader.find_branch(&name).await?;
    Ok(Json(BranchDto::from(&branch)))
}

pub(super) async fn list_commits<R, V, C>(
    State(state): State<AppState<R, V, C>>,
    Path(name): Path<String>,
) -> ApiResult<Json<Vec<CommitDto>>>
where
    R: PullRequestRepository,
    V: VcsBackend,
    C: Clock + Send + Sync,
{
    let commits = state.reader.list_commits(&name).await?;
    Ok(Json(commits.iter().map(CommitDto::from).collect()))
}

/// The branch segment is not used to scope the lookup.
pub(super) async fn get_commit<R, V, C>(
    State(state): State<AppState<R, V, C>>,
    Path((_branch, sha)): Path<(String, String)>,
) -> ApiResult<Json<CommitDto>>
where
    R: PullRequestRepository,
    V: VcsBackend,
    C: Clock + Send + Sync,
{
    let commit = state.reader.find_commit(&sha).await?;
    Ok(Json(CommitDto::from(&commit)))
}

pub(super) async fn list_pull_requests<R, V, C>(
    State(state): State<AppState<R, V, C>>,
) -> ApiResult<Json<Vec<PullRequestDto>>>
where
    R: PullRequestRepository,
    V: VcsBackend,
    C: Clock + Send + Sync,
{
    let pull_requests = state.lifecycle.list().await?;
    Ok(Json(pull_requests.iter().map(PullRequestDto::from).collect()))
}

pub(super) async fn create_pull_request<R, V, C>(
    State(state): State<AppState<R, V, C>>,
    PullRequestInput(form): PullRequestInput,
) -> ApiResult<(StatusCode, Json<PullRequestDto>)>
where
    R: PullRequestRepository,
    V: VcsBackend,
    C: Clock + Send + Sync,
{
    let title = required(form.title, "title")?;
    let source_branch = required(form.source_branch, "source_branch")?;
    let destiny_branch = required(form.destiny_branch, "destiny_branch")?;
    let mut request = CreatePullRequestRequest::new(title, source_branch, destiny_branch);
    if let Some(description) = form.description {
        request = request.with_description(description);
    }

    let created = state.lifecycle.create(request).await?;
    Ok((StatusCode::CREATED, Json(PullRequestDto::from(&created))))
}

pub(super) async fn get_pull_request<R, V, C>(
    State(state): State<AppState<R, V, C>>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<PullRequestDto>>
where
    R: PullRequestRepository,
    V: VcsBackend,
    C: Clock + Send + Sync,
{
    let id = parse_id(raw_id)?;
    let pull_request = state.lifecycle.find(id).await?;
    Ok(Json(PullRequestDto::from(&pull_request)))
}

pub(super) async fn merge_pull_request<R, V, C>(
    State(state): State<AppState<R, V, C>>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<MessageDto>>
where
    R: PullRequestRepository,
    V: VcsBackend,
    C: Clock + Send + Sync,
{
    let id = parse_id(raw_id)?;
    let report = state.lifecycle.merge_with_report(id).await?;
    Ok(Json(MessageDto::new(merge_message(report.summary()))))
}

/// The backend's merge summary, or `success` when it reported nothing.
fn merge_message(summary: &str) -> &str {
    match summary.trim() {
        "" => "success",
        trimmed => trimmed,
    }
}

pub(super) async fn close_pull_request<R, V, C>(
    State(state): State<AppState<R, V, C>>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<MessageDto>>
where
    R: PullRequestRepository,
    V: VcsBackend,
    C: Clock + Send + Sync,
{
    let id = parse_id(raw_id)?;
    state.lifecycle.close(id).await?;
    Ok(Json(MessageDto::new("success")))
}

fn parse_id(raw: String) -> ApiResult<PullRequestId> {
    PullRequestId::parse(&raw).ok_or(ApiError::PullRequestNotFound(raw))
}

fn required(value: Option<String>, field: &str) -> ApiResult<String> {
    value.ok_or_else(|| ApiError::BadRequest(format!("{field}: This field cannot be blank.")))
}

/// Pull request fields read from a form-encoded or JSON body.
pub(super) struct PullRequestInput(CreatePullRequestForm);

impl<S> FromRequest<S> for PullRequestInput
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));
        let form = if is_json {
            let Json(form) = Json::<CreatePullRequestForm>::from_request(req, state)
                .await
                .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
            form
        } else {
            let Form(form) = Form::<CreatePullRequestForm>::from_request(req, state)
                .await
                .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
            form
        };
        Ok(Self(form))
    }
}
