//! In-memory version-control backend.

use crate::vcs::{
    domain::{Branch, BranchName, Commit, CommitData, CommitId, MergeOutcome},
    ports::{VcsBackend, VcsError, VcsResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Timestamp of the first synthetic commit; each later commit is one second
/// newer.
const FIRST_COMMIT_EPOCH_SECONDS: i64 = 1_700_000_000;

const DEFAULT_AUTHOR_NAME: &str = "In-Memory Backend";
const DEFAULT_AUTHOR_EMAIL: &str = "in-memory@localhost";

/// Working-tree mutation recorded by [`InMemoryVcsBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsOperation {
    /// A branch was checked out.
    Checkout(BranchName),
    /// A merge was attempted.
    Merge {
        /// Branch being merged in.
        source: BranchName,
        /// Checked-out branch receiving the merge.
        destination: BranchName,
    },
    /// An in-progress merge was aborted.
    AbortMerge,
}

/// In-memory version-control backend.
///
/// Models branches, a commit graph, a single working tree and an
/// in-progress merge flag without touching the filesystem. Conflicts and
/// unclassified merge failures are scripted per branch so lifecycle
/// behaviour can be exercised deterministically. Every working-tree mutation
/// is appended to a journal that tests can inspect.
#[derive(Debug, Clone, Default)]
pub struct InMemoryVcsBackend {
    state: Arc<RwLock<InMemoryVcsState>>,
}

#[derive(Debug, Clone)]
struct StoredCommit {
    commit: Commit,
    parents: Vec<CommitId>,
    sequence: u64,
}

#[derive(Debug, Default)]
struct InMemoryVcsState {
    commits: HashMap<CommitId, StoredCommit>,
    branches: BTreeMap<BranchName, CommitId>,
    checked_out: Option<BranchName>,
    merging: Option<BranchName>,
    conflicts: HashMap<(BranchName, BranchName), String>,
    failures: HashMap<BranchName, String>,
    identity: Option<String>,
    journal: Vec<VcsOperation>,
    next_sequence: u64,
}

impl InMemoryVcsState {
    fn record_commit(
        &mut self,
        parents: Vec<CommitId>,
        message: &str,
        files_changed: usize,
    ) -> VcsResult<CommitId> {
        self.next_sequence += 1;
        let sequence = self.next_sequence;
        let id = CommitId::parse(format!("{sequence:040x}"))?;
        let offset = i64::try_from(sequence).map_err(VcsError::unavailable)?;
        let committed_at =
            DateTime::<Utc>::from_timestamp(FIRST_COMMIT_EPOCH_SECONDS.saturating_add(offset), 0)
                .ok_or_else(|| {
                    VcsError::command_failed("git commit", "commit timestamp out of range")
                })?
                .fixed_offset();
        let author_email = self
            .identity
            .clone()
            .unwrap_or_else(|| DEFAULT_AUTHOR_EMAIL.to_owned());

        let commit = Commit::new(CommitData {
            id: id.clone(),
            author_name: DEFAULT_AUTHOR_NAME.to_owned(),
            author_email,
            message: message.to_owned(),
            committed_at,
            files_changed,
        });
        self.commits.insert(
            id.clone(),
            StoredCommit {
                commit,
                parents,
                sequence,
            },
        );
        Ok(id)
    }

    fn ancestry(&self, tip: &CommitId) -> HashSet<CommitId> {
        let mut seen = HashSet::new();
        let mut pending = vec![tip.clone()];
        while let Some(id) = pending.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            if let Some(stored) = self.commits.get(&id) {
                pending.extend(stored.parents.iter().cloned());
            }
        }
        seen
    }

    fn is_ancestor(&self, ancestor: &CommitId, descendant: &CommitId) -> bool {
        self.ancestry(descendant).contains(ancestor)
    }

    fn log(&self, tip: &CommitId) -> Vec<Commit> {
        let mut reachable: Vec<&StoredCommit> = self
            .ancestry(tip)
            .iter()
            .filter_map(|id| self.commits.get(id))
            .collect();
        reachable.sort_by(|a, b| b.sequence.cmp(&a.sequence));
        reachable
            .into_iter()
            .map(|stored| stored.commit.clone())
            .collect()
    }

    /// Files brought in by commits reachable from `source` only.
    fn files_introduced(&self, source: &CommitId, destination: &CommitId) -> usize {
        let already_merged = self.ancestry(destination);
        self.ancestry(source)
            .difference(&already_merged)
            .filter_map(|id| self.commits.get(id))
            .map(|stored| stored.commit.files_changed())
            .sum()
    }

    fn project_branch(&self, name: &BranchName, head: &CommitId) -> Option<Branch> {
        self.commits.get(head).map(|stored| {
            Branch::new(
                name.clone(),
                head.clone(),
                stored.commit.committed_at(),
            )
        })
    }

    fn merge_into_checked_out(&mut self, source: &BranchName) -> VcsResult<MergeOutcome> {
        let destination = self
            .checked_out
            .clone()
            .ok_or(VcsError::NoBranchCheckedOut)?;
        if self.merging.is_some() {
            return Err(VcsError::command_failed(
                format!("git merge {source}"),
                "You have not concluded your merge (MERGE_HEAD exists).",
            ));
        }
        self.journal.push(VcsOperation::Merge {
            source: source.clone(),
            destination: destination.clone(),
        });

        if let Some(diagnostic) = self.failures.get(source).cloned() {
            return Err(VcsError::command_failed(
                format!("git merge {source}"),
                diagnostic,
            ));
        }
        let source_head = self.branches.get(source).cloned().ok_or_else(|| {
            VcsError::command_failed(
                format!("git merge {source}"),
                format!("merge: {source} - not something we can merge"),
            )
        })?;
        let destination_head = self
            .branches
            .get(&destination)
            .cloned()
            .ok_or_else(|| VcsError::BranchNotFound(destination.clone()))?;

        let scripted_conflict = self
            .conflicts
            .get(&(source.clone(), destination.clone()))
            .cloned();
        if let Some(diagnostic) = scripted_conflict {
            self.merging = Some(source.clone());
            return Ok(MergeOutcome::Conflict { diagnostic });
        }

        if self.is_ancestor(&source_head, &destination_head) {
            return Ok(MergeOutcome::Merged {
                head: destination_head,
                summary: "Already up to date.".to_owned(),
            });
        }
        if self.is_ancestor(&destination_head, &source_head) {
            self.branches.insert(destination, source_head.clone());
            return Ok(MergeOutcome::Merged {
                head: source_head,
                summary: "Fast-forward".to_owned(),
            });
        }

        let files_changed = self.files_introduced(&source_head, &destination_head);
        let message = format!("Merge branch '{source}' into {destination}");
        let head = self.record_commit(
            vec![destination_head, source_head],
            &message,
            files_changed,
        )?;
        self.branches.insert(destination, head.clone());
        Ok(MergeOutcome::Merged {
            head,
            summary: "Merge made by the 'ort' strategy.".to_owned(),
        })
    }
}

impl InMemoryVcsBackend {
    /// Creates an empty repository with no branches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> VcsResult<RwLockReadGuard<'_, InMemoryVcsState>> {
        self.state
            .read()
            .map_err(|err| VcsError::unavailable(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> VcsResult<RwLockWriteGuard<'_, InMemoryVcsState>> {
        self.state
            .write()
            .map_err(|err| VcsError::unavailable(std::io::Error::other(err.to_string())))
    }

    /// Sets the identity reported as `user.email`.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Unavailable`] when lock acquisition fails.
    pub fn set_identity(&self, identity: impl Into<String>) -> VcsResult<()> {
        self.write()?.identity = Some(identity.into());
        Ok(())
    }

    /// Commits onto `branch`, creating the branch when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns domain errors for invalid branch names and
    /// [`VcsError::Unavailable`] when lock acquisition fails.
    pub fn commit(
        &self,
        branch: &str,
        message: &str,
        files_changed: usize,
    ) -> VcsResult<CommitId> {
        let name = BranchName::new(branch)?;
        let mut state = self.write()?;
        let parents: Vec<CommitId> = state.branches.get(&name).cloned().into_iter().collect();
        let id = state.record_commit(parents, message, files_changed)?;
        state.branches.insert(name, id.clone());
        Ok(id)
    }

    /// Creates `name` pointing at the tip of `from`.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::BranchNotFound`] when `from` does not exist.
    pub fn create_branch(&self, name: &str, from: &str) -> VcsResult<()> {
        let new_branch = BranchName::new(name)?;
        let start = BranchName::new(from)?;
        let mut state = self.write()?;
        let head = state
            .branches
            .get(&start)
            .cloned()
            .ok_or(VcsError::BranchNotFound(start))?;
        state.branches.insert(new_branch, head);
        Ok(())
    }

    /// Deletes a branch; its commits stay resolvable by id.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::BranchNotFound`] when the branch does not exist.
    pub fn delete_branch(&self, name: &str) -> VcsResult<()> {
        let branch = BranchName::new(name)?;
        let mut state = self.write()?;
        if state.branches.remove(&branch).is_none() {
            return Err(VcsError::BranchNotFound(branch));
        }
        if state.checked_out.as_ref() == Some(&branch) {
            state.checked_out = None;
        }
        Ok(())
    }

    /// Makes every merge of `source` into `destination` stop on a conflict.
    ///
    /// # Errors
    ///
    /// Returns domain errors for invalid branch names.
    pub fn script_conflict(
        &self,
        source: &str,
        destination: &str,
        diagnostic: impl Into<String>,
    ) -> VcsResult<()> {
        let key = (BranchName::new(source)?, BranchName::new(destination)?);
        self.write()?.conflicts.insert(key, diagnostic.into());
        Ok(())
    }

    /// Makes every merge of `source` fail without a conflict.
    ///
    /// # Errors
    ///
    /// Returns domain errors for invalid branch names.
    pub fn script_failure(&self, source: &str, diagnostic: impl Into<String>) -> VcsResult<()> {
        let branch = BranchName::new(source)?;
        self.write()?.failures.insert(branch, diagnostic.into());
        Ok(())
    }

    /// Returns the checked-out branch, if any.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Unavailable`] when lock acquisition fails.
    pub fn checked_out_branch(&self) -> VcsResult<Option<BranchName>> {
        Ok(self.read()?.checked_out.clone())
    }

    /// Returns the tip of `branch`, if it exists.
    ///
    /// # Errors
    ///
    /// Returns domain errors for invalid branch names.
    pub fn branch_head(&self, branch: &str) -> VcsResult<Option<CommitId>> {
        let name = BranchName::new(branch)?;
        Ok(self.read()?.branches.get(&name).cloned())
    }

    /// Returns every working-tree mutation in the order it happened.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Unavailable`] when lock acquisition fails.
    pub fn journal(&self) -> VcsResult<Vec<VcsOperation>> {
        Ok(self.read()?.journal.clone())
    }
}

#[async_trait]
impl VcsBackend for InMemoryVcsBackend {
    async fn list_branches(&self) -> VcsResult<Vec<Branch>> {
        let state = self.read()?;
        Ok(state
            .branches
            .iter()
            .filter_map(|(name, head)| state.project_branch(name, head))
            .collect())
    }

    async fn find_branch(&self, name: &BranchName) -> VcsResult<Option<Branch>> {
        let state = self.read()?;
        Ok(state
            .branches
            .get(name)
            .and_then(|head| state.project_branch(name, head)))
    }

    async fn find_commit(&self, id: &CommitId) -> VcsResult<Option<Commit>> {
        let state = self.read()?;
        let mut matches = state
            .commits
            .iter()
            .filter(|(candidate, _)| candidate.as_str().starts_with(id.as_str()));
        // Ambiguous abbreviations resolve to nothing, as in git.
        let first = matches.next();
        if matches.next().is_some() {
            return Ok(None);
        }
        Ok(first.map(|(_, stored)| stored.commit.clone()))
    }

    async fn list_commits(&self, branch: &BranchName) -> VcsResult<Vec<Commit>> {
        let state = self.read()?;
        let head = state
            .branches
            .get(branch)
            .ok_or_else(|| VcsError::BranchNotFound(branch.clone()))?;
        Ok(state.log(head))
    }

    async fn checkout(&self, branch: &BranchName) -> VcsResult<()> {
        // Give concurrent callers a chance to interleave, as a real process would.
        tokio::task::yield_now().await;
        let mut state = self.write()?;
        if state.merging.is_some() {
            return Err(VcsError::command_failed(
                format!("git checkout {branch}"),
                "you need to resolve your current index first",
            ));
        }
        if !state.branches.contains_key(branch) {
            return Err(VcsError::BranchNotFound(branch.clone()));
        }
        state.checked_out = Some(branch.clone());
        state.journal.push(VcsOperation::Checkout(branch.clone()));
        Ok(())
    }

    async fn merge(&self, source: &BranchName) -> VcsResult<MergeOutcome> {
        tokio::task::yield_now().await;
        self.write()?.merge_into_checked_out(source)
    }

    async fn abort_merge(&self) -> VcsResult<()> {
        let mut state = self.write()?;
        if state.merging.take().is_none() {
            return Err(VcsError::command_failed(
                "git merge --abort",
                "There is no merge to abort (MERGE_HEAD missing).",
            ));
        }
        state.journal.push(VcsOperation::AbortMerge);
        Ok(())
    }

    async fn merge_in_progress(&self) -> VcsResult<bool> {
        Ok(self.read()?.merging.is_some())
    }

    async fn configured_identity(&self) -> VcsResult<Option<String>> {
        Ok(self.read()?.identity.clone())
    }
}
