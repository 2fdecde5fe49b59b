//! Server configuration from command-line flags and environment variables.

use crate::pull_request::domain::{Author, PullRequestDomainError};
use crate::vcs::ports::{VcsBackend, VcsError};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Runtime configuration for `guig-server`.
///
/// Every flag falls back to an environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "guig-server", version, about)]
pub struct ServerConfig {
    /// Working tree of the git repository to serve.
    #[arg(long, env = "GUIG_REPOSITORY", default_value = ".")]
    pub repository: PathBuf,

    /// Git executable used for every repository operation.
    #[arg(long, env = "GUIG_GIT_BINARY", default_value = "git")]
    pub git_binary: PathBuf,

    /// Address the HTTP server listens on.
    #[arg(long, env = "GUIG_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// `PostgreSQL` connection URL. Pull requests are kept in memory when
    /// absent.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum number of pooled database connections.
    #[arg(
        long,
        env = "GUIG_DATABASE_POOL_SIZE",
        default_value_t = 8,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub database_pool_size: u32,

    /// Identity recorded as author of new pull requests. Defaults to the
    /// repository's `user.email`.
    #[arg(long, env = "GUIG_AUTHOR")]
    pub author: Option<String>,
}

/// Errors raised while resolving configuration at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither `--author` nor the repository's `user.email` is set.
    #[error("no author identity: pass --author or set user.email in the repository")]
    MissingAuthor,

    /// The configured identity failed validation.
    #[error("invalid author identity: {0}")]
    InvalidAuthor(#[from] PullRequestDomainError),

    /// The repository could not be queried for its identity.
    #[error("could not read the repository identity: {0}")]
    Backend(#[from] VcsError),
}

impl ServerConfig {
    /// Resolves the pull request author: the explicit setting first, then
    /// the backend's configured identity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingAuthor`] when neither source provides
    /// an identity.
    pub async fn resolve_author<V>(&self, backend: &V) -> Result<Author, ConfigError>
    where
        V: VcsBackend + ?Sized,
    {
        let identity = match &self.author {
            Some(explicit) => Some(explicit.clone()),
            None => backend.configured_identity().await?,
        };
        let raw = identity.ok_or(ConfigError::MissingAuthor)?;
        Ok(Author::new(raw)?)
    }
}
