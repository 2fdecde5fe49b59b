//! Domain model for the version-control read projections.
//!
//! Branches and commits are transient: they are computed from the backend on
//! every request and never persisted.

mod branch;
mod commit;
mod error;
mod merge;

pub use branch::{Branch, BranchName, MAX_BRANCH_NAME_LENGTH};
pub use commit::{Commit, CommitData, CommitId, MAX_COMMIT_ID_LENGTH};
pub use error::VcsDomainError;
pub use merge::MergeOutcome;
