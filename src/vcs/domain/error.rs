//! Error types for version-control domain validation.

use thiserror::Error;

/// Errors returned while constructing version-control domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VcsDomainError {
    /// The branch name violates git reference naming rules.
    #[error("invalid branch name '{0}'")]
    InvalidBranchName(String),

    /// The commit identifier is not a hexadecimal object name.
    #[error("invalid commit id '{0}', expected 4 to 64 hexadecimal characters")]
    InvalidCommitId(String),
}
