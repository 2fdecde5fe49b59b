//! HTTP server exposing a git repository and its pull requests.
//!
//! Usage:
//!
//! ```text
//! guig-server [--repository <path>] [--bind <addr>] [--database-url <url>]
//! ```
//!
//! Pull requests are stored in `PostgreSQL` when a database URL is given and
//! in memory otherwise. See `guig-server --help` for every flag and its
//! environment variable.

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use guig::{
    api::{self, AppState},
    config::{ConfigError, ServerConfig},
    pull_request::{
        adapters::{memory::InMemoryPullRequestRepository, postgres::PostgresPullRequestRepository},
        domain::Author,
        ports::{PullRequestRepository, PullRequestRepositoryError},
        services::PullRequestLifecycleService,
    },
    telemetry,
    vcs::{adapters::git::GitCliBackend, services::RepositoryReader},
};
use clap::Parser;
use mockable::DefaultClock;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that stop the server from starting or keep it from serving.
#[derive(Debug, Error)]
enum StartupError {
    #[error("failed to initialise tracing: {0}")]
    Telemetry(#[from] tracing_subscriber::util::TryInitError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to connect to the database: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("database pool setup was interrupted: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("failed to prepare the database schema: {0}")]
    Schema(#[from] PullRequestRepositoryError),
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = ServerConfig::parse();
    telemetry::init_tracing()?;

    let backend = Arc::new(
        GitCliBackend::new(&config.repository).with_git_binary(&config.git_binary),
    );
    let author = config.resolve_author(backend.as_ref()).await?;
    info!(repository = %config.repository.display(), %author, "serving repository");

    match config.database_url.clone() {
        Some(url) => {
            let pool_size = config.database_pool_size;
            let pool = tokio::task::spawn_blocking(move || {
                Pool::builder()
                    .max_size(pool_size)
                    .build(ConnectionManager::<PgConnection>::new(url))
            })
            .await??;
            let repository = PostgresPullRequestRepository::new(pool);
            repository.ensure_schema().await?;
            info!("pull requests stored in PostgreSQL");
            serve(config.bind, Arc::new(repository), backend, author).await
        }
        None => {
            warn!("no database configured; pull requests are kept in memory");
            serve(
                config.bind,
                Arc::new(InMemoryPullRequestRepository::new()),
                backend,
                author,
            )
            .await
        }
    }
}

async fn serve<R>(
    bind: SocketAddr,
    repository: Arc<R>,
    backend: Arc<GitCliBackend>,
    author: Author,
) -> Result<(), StartupError>
where
    R: PullRequestRepository + 'static,
{
    let lifecycle = PullRequestLifecycleService::new(
        repository,
        Arc::clone(&backend),
        Arc::new(DefaultClock),
        author,
    );
    let state = AppState::new(RepositoryReader::new(backend), lifecycle);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(address = %listener.local_addr()?, "listening");
    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
