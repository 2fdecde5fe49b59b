//! `git` command-line adapter for the version-control backend port.
//!
//! Each port call runs one or more `git` subprocesses against a fixed working
//! tree with `tokio::process::Command`. Output formats are pinned (see
//! [`parse`]) and the C locale is forced so diagnostics are stable.

mod parse;

use crate::vcs::{
    domain::{Branch, BranchName, Commit, CommitId, MergeOutcome},
    ports::{VcsBackend, VcsError, VcsResult},
};
use async_trait::async_trait;
use parse::{BRANCH_FORMAT, COMMIT_FORMAT};
use std::path::PathBuf;
use tracing::debug;

/// Captured result of one `git` invocation.
#[derive(Debug)]
struct GitOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

impl GitOutput {
    /// Prefers stdout, which is where `git merge` reports conflicts.
    fn diagnostic(&self) -> String {
        let stdout = self.stdout.trim();
        if stdout.is_empty() {
            self.stderr.trim().to_owned()
        } else {
            stdout.to_owned()
        }
    }
}

/// Version-control backend driving a local working tree through `git`.
#[derive(Debug, Clone)]
pub struct GitCliBackend {
    git_binary: PathBuf,
    work_tree: PathBuf,
}

impl GitCliBackend {
    /// Creates a backend for the working tree at `work_tree`, using `git`
    /// from `PATH`.
    #[must_use]
    pub fn new(work_tree: impl Into<PathBuf>) -> Self {
        Self {
            git_binary: PathBuf::from("git"),
            work_tree: work_tree.into(),
        }
    }

    /// Overrides the `git` executable.
    #[must_use]
    pub fn with_git_binary(mut self, git_binary: impl Into<PathBuf>) -> Self {
        self.git_binary = git_binary.into();
        self
    }

    async fn run(&self, args: &[&str]) -> VcsResult<GitOutput> {
        debug!(work_tree = %self.work_tree.display(), ?args, "running git");
        let output = tokio::process::Command::new(&self.git_binary)
            .arg("-C")
            .arg(&self.work_tree)
            .args(args)
            .env("LC_ALL", "C")
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_MERGE_AUTOEDIT", "no")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(VcsError::unavailable)?;

        Ok(GitOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn run_checked(&self, args: &[&str]) -> VcsResult<String> {
        let output = self.run(args).await?;
        if !output.success {
            return Err(VcsError::command_failed(
                describe(args),
                output.diagnostic(),
            ));
        }
        Ok(output.stdout)
    }

    async fn branch_exists(&self, branch: &BranchName) -> VcsResult<bool> {
        let reference = branch.to_ref();
        let output = self
            .run(&["rev-parse", "--verify", "--quiet", &reference])
            .await?;
        Ok(output.success)
    }

    async fn unmerged_paths(&self) -> VcsResult<Vec<String>> {
        let stdout = self
            .run_checked(&["diff", "--name-only", "--diff-filter=U"])
            .await?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect())
    }

    async fn head_commit(&self) -> VcsResult<CommitId> {
        let stdout = self.run_checked(&["rev-parse", "HEAD"]).await?;
        Ok(CommitId::parse(stdout.trim())?)
    }
}

fn describe(args: &[&str]) -> String {
    let mut command = String::from("git");
    for arg in args {
        command.push(' ');
        command.push_str(arg);
    }
    command
}

#[async_trait]
impl VcsBackend for GitCliBackend {
    async fn list_branches(&self) -> VcsResult<Vec<Branch>> {
        let format = format!("--format={BRANCH_FORMAT}");
        let stdout = self
            .run_checked(&["for-each-ref", "--sort=refname", &format, "refs/heads"])
            .await?;
        parse::parse_branches(&stdout)
    }

    async fn find_branch(&self, name: &BranchName) -> VcsResult<Option<Branch>> {
        let format = format!("--format={BRANCH_FORMAT}");
        let reference = name.to_ref();
        let stdout = self
            .run_checked(&["for-each-ref", &format, &reference])
            .await?;
        // for-each-ref patterns also match everything below `refs/heads/<name>/`.
        Ok(parse::parse_branches(&stdout)?
            .into_iter()
            .find(|branch| branch.name() == name))
    }

    async fn find_commit(&self, id: &CommitId) -> VcsResult<Option<Commit>> {
        let revision = format!("{id}^{{commit}}");
        let resolved = self
            .run(&["rev-parse", "--verify", "--quiet", &revision])
            .await?;
        if !resolved.success {
            return Ok(None);
        }
        let full_id = resolved.stdout.trim().to_owned();
        let stdout = self
            .run_checked(&[
                "show",
                COMMIT_FORMAT,
                "--name-only",
                "--diff-merges=first-parent",
                &full_id,
                "--",
            ])
            .await?;
        Ok(parse::parse_commits(&stdout)?.into_iter().next())
    }

    async fn list_commits(&self, branch: &BranchName) -> VcsResult<Vec<Commit>> {
        if !self.branch_exists(branch).await? {
            return Err(VcsError::BranchNotFound(branch.clone()));
        }
        let reference = branch.to_ref();
        let stdout = self
            .run_checked(&[
                "log",
                COMMIT_FORMAT,
                "--name-only",
                "--diff-merges=first-parent",
                &reference,
                "--",
            ])
            .await?;
        parse::parse_commits(&stdout)
    }

    async fn checkout(&self, branch: &BranchName) -> VcsResult<()> {
        if !self.branch_exists(branch).await? {
            return Err(VcsError::BranchNotFound(branch.clone()));
        }
        self.run_checked(&["checkout", "--quiet", branch.as_str(), "--"])
            .await?;
        Ok(())
    }

    async fn merge(&self, source: &BranchName) -> VcsResult<MergeOutcome> {
        let output = self.run(&["merge", "--no-edit", source.as_str()]).await?;
        if output.success {
            return Ok(MergeOutcome::Merged {
                head: self.head_commit().await?,
                summary: output.stdout.trim().to_owned(),
            });
        }

        let has_unmerged_paths = !self.unmerged_paths().await?.is_empty();
        if has_unmerged_paths || parse::mentions_conflict(&output.stdout) {
            return Ok(MergeOutcome::Conflict {
                diagnostic: output.diagnostic(),
            });
        }
        Err(VcsError::command_failed(
            format!("git merge {source}"),
            output.diagnostic(),
        ))
    }

    async fn abort_merge(&self) -> VcsResult<()> {
        self.run_checked(&["merge", "--abort"]).await?;
        Ok(())
    }

    async fn merge_in_progress(&self) -> VcsResult<bool> {
        let output = self
            .run(&["rev-parse", "--verify", "--quiet", "MERGE_HEAD"])
            .await?;
        Ok(output.success)
    }

    async fn configured_identity(&self) -> VcsResult<Option<String>> {
        let output = self.run(&["config", "--get", "user.email"]).await?;
        let identity = output.stdout.trim();
        if !output.success || identity.is_empty() {
            return Ok(None);
        }
        Ok(Some(identity.to_owned()))
    }
}
