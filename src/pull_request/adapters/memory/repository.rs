//! `HashMap`-backed [`PullRequestRepository`] with store-assigned ids.
//!
//! Ids count up from 1 and are never reused. `compare_and_update` checks
//! the stored status under the write lock.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::pull_request::{
    domain::{NewPullRequest, PullRequest, PullRequestId, PullRequestState},
    ports::{PullRequestRepository, PullRequestRepositoryError, PullRequestRepositoryResult},
};

/// Thread-safe in-memory pull request repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPullRequestRepository {
    state: Arc<RwLock<InMemoryPullRequestState>>,
}

#[derive(Debug, Default)]
struct InMemoryPullRequestState {
    pull_requests: HashMap<PullRequestId, PullRequest>,
    last_id: i64,
}

impl InMemoryPullRequestRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> PullRequestRepositoryResult<RwLockReadGuard<'_, InMemoryPullRequestState>> {
        self.state.read().map_err(|err| {
            PullRequestRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(
        &self,
    ) -> PullRequestRepositoryResult<RwLockWriteGuard<'_, InMemoryPullRequestState>> {
        self.state.write().map_err(|err| {
            PullRequestRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl PullRequestRepository for InMemoryPullRequestRepository {
    async fn insert(
        &self,
        pull_request: &NewPullRequest,
    ) -> PullRequestRepositoryResult<PullRequest> {
        let mut state = self.write()?;
        let next = state.last_id.saturating_add(1);
        let id = PullRequestId::new(next).map_err(PullRequestRepositoryError::persistence)?;
        let stored = pull_request.clone().into_stored(id);
        state.last_id = next;
        state.pull_requests.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, pull_request: &PullRequest) -> PullRequestRepositoryResult<()> {
        let mut state = self.write()?;
        let slot = state
            .pull_requests
            .get_mut(&pull_request.id())
            .ok_or(PullRequestRepositoryError::NotFound(pull_request.id()))?;
        *slot = pull_request.clone();
        Ok(())
    }

    async fn compare_and_update(
        &self,
        pull_request: &PullRequest,
        expected: PullRequestState,
    ) -> PullRequestRepositoryResult<()> {
        let mut state = self.write()?;
        let slot = state
            .pull_requests
            .get_mut(&pull_request.id())
            .ok_or(PullRequestRepositoryError::NotFound(pull_request.id()))?;
        let actual = slot.state();
        if actual != expected {
            return Err(PullRequestRepositoryError::StatusChanged {
                id: pull_request.id(),
                expected,
                actual,
            });
        }
        *slot = pull_request.clone();
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: PullRequestId,
    ) -> PullRequestRepositoryResult<Option<PullRequest>> {
        Ok(self.read()?.pull_requests.get(&id).cloned())
    }

    async fn list_all(&self) -> PullRequestRepositoryResult<Vec<PullRequest>> {
        let state = self.read()?;
        let mut all: Vec<PullRequest> = state.pull_requests.values().cloned().collect();
        all.sort_by_key(PullRequest::id);
        Ok(all)
    }
}
