//! Shared world state for pull request lifecycle BDD scenarios.

use std::sync::Arc;

use guig::{
    pull_request::{
        adapters::memory::InMemoryPullRequestRepository,
        domain::{Author, PullRequest},
        services::{PullRequestLifecycleError, PullRequestLifecycleService},
    },
    vcs::adapters::memory::InMemoryVcsBackend,
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestLifecycleService =
    PullRequestLifecycleService<InMemoryPullRequestRepository, InMemoryVcsBackend, DefaultClock>;

/// Scenario world for pull request lifecycle behaviour tests.
pub struct PullRequestWorld {
    pub backend: Arc<InMemoryVcsBackend>,
    pub service: TestLifecycleService,
    pub current: Option<PullRequest>,
    pub last_result: Option<Result<PullRequest, PullRequestLifecycleError>>,
}

impl PullRequestWorld {
    /// Creates a world over an empty repository.
    ///
    /// # Panics
    ///
    /// Panics if the fixed author identity is rejected.
    #[must_use]
    pub fn new() -> Self {
        let backend = Arc::new(InMemoryVcsBackend::new());
        let service = PullRequestLifecycleService::new(
            Arc::new(InMemoryPullRequestRepository::new()),
            Arc::clone(&backend),
            Arc::new(DefaultClock),
            Author::new("reviewer@example.com").expect("valid author"),
        );
        Self {
            backend,
            service,
            current: None,
            last_result: None,
        }
    }

    /// Records an operation result, tracking the pull request on success.
    pub fn record(&mut self, result: Result<PullRequest, PullRequestLifecycleError>) {
        if let Ok(ref pull_request) = result {
            self.current = Some(pull_request.clone());
        }
        self.last_result = Some(result);
    }

    /// Returns the pull request tracked by the scenario.
    pub fn current(&self) -> Result<&PullRequest, eyre::Report> {
        self.current
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no pull request in scenario world"))
    }

    /// Returns the most recent operation result.
    pub fn last_result(
        &self,
    ) -> Result<&Result<PullRequest, PullRequestLifecycleError>, eyre::Report> {
        self.last_result
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no operation has run"))
    }
}

impl Default for PullRequestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> PullRequestWorld {
    PullRequestWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
