//! HTTP surface for branch browsing and the pull request workflow.
//!
//! Every route lives under `/api/v1`. Handlers hold no logic of their own:
//! they parse the request, call [`RepositoryReader`] or
//! [`PullRequestLifecycleService`] and map the outcome through [`ApiError`].

mod dto;
mod error;
mod handlers;

pub use dto::{BranchDto, CommitDto, CreatePullRequestForm, MessageDto, PullRequestDto};
pub use error::ApiError;

use crate::pull_request::{ports::PullRequestRepository, services::PullRequestLifecycleService};
use crate::vcs::{ports::VcsBackend, services::RepositoryReader};
use axum::{
    Router,
    routing::{MethodRouter, get, post},
};
use mockable::Clock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Path prefix all routes are mounted under.
pub const API_PREFIX: &str = "/api/v1";

/// Services shared by every handler.
pub struct AppState<R, V, C>
where
    R: PullRequestRepository,
    V: VcsBackend,
    C: Clock + Send + Sync,
{
    reader: RepositoryReader<V>,
    lifecycle: PullRequestLifecycleService<R, V, C>,
}

impl<R, V, C> AppState<R, V, C>
where
    R: PullRequestRepository,
    V: VcsBackend,
    C: Clock + Send + Sync,
{
    /// Creates handler state from the two services.
    #[must_use]
    pub const fn new(
        reader: RepositoryReader<V>,
        lifecycle: PullRequestLifecycleService<R, V, C>,
    ) -> Self {
        Self { reader, lifecycle }
    }
}

impl<R, V, C> Clone for AppState<R, V, C>
where
    R: PullRequestRepository,
    V: VcsBackend,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            reader: self.reader.clone(),
            lifecycle: self.lifecycle.clone(),
        }
    }
}

/// Builds the application router with CORS and request tracing.
pub fn router<R, V, C>(state: AppState<R, V, C>) -> Router
where
    R: PullRequestRepository + 'static,
    V: VcsBackend + 'static,
    C: Clock + Send + Sync + 'static,
{
    let api = [
        ("/branches", get(handlers::list_branches::<R, V, C>)),
        ("/branches/{name}", get(handlers::get_branch::<R, V, C>)),
        (
            "/branches/{name}/commits",
            get(handlers::list_commits::<R, V, C>),
        ),
        (
            "/branches/{name}/commits/{sha}",
            get(handlers::get_commit::<R, V, C>),
        ),
        (
            "/pull-requests",
            get(handlers::list_pull_requests::<R, V, C>)
                .post(handlers::create_pull_request::<R, V, C>),
        ),
        (
            "/pull-requests/{id}",
            get(handlers::get_pull_request::<R, V, C>),
        ),
        (
            "/pull-requests/{id}/merge",
            post(handlers::merge_pull_request::<R, V, C>),
        ),
        (
            "/pull-requests/{id}/close",
            post(handlers::close_pull_request::<R, V, C>),
        ),
    ]
    .into_iter()
    .fold(Router::<AppState<R, V, C>>::new(), |api, (path, methods)| {
        with_trailing_slash(api, path, methods)
    });

    Router::new()
        .nest(API_PREFIX, api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Mounts `methods` at `path` and at `path/`.
fn with_trailing_slash<S>(router: Router<S>, path: &str, methods: MethodRouter<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .route(path, methods.clone())
        .route(&format!("{path}/"), methods)
}
