//! Branch value objects projected from the version-control backend.

use super::{CommitId, VcsDomainError};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a validated branch name.
///
/// Matches the width of the `source_branch` and `destiny_branch` columns.
pub const MAX_BRANCH_NAME_LENGTH: usize = 200;

/// Characters git refuses anywhere in a reference name.
const FORBIDDEN_CHARS: [char; 7] = [':', '~', '^', '?', '*', '[', '\\'];

/// Validated local branch name, without the `refs/heads/` prefix.
///
/// Names are kept exactly as given: lookups are by exact name, so no
/// trimming or case folding takes place. A subset of
/// `git check-ref-format` is enforced, which is enough to keep names from
/// being interpreted as command-line options or revision expressions.
///
/// # Examples
///
///     use guig::vcs::domain::BranchName;
///
///     let name = BranchName::new("feature/login").expect("valid");
///     assert_eq!(name.as_str(), "feature/login");
///     assert!(BranchName::new("--force").is_err());
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Creates a validated branch name.
    ///
    /// # Errors
    ///
    /// Returns [`VcsDomainError::InvalidBranchName`] when the value is empty,
    /// too long, or breaks git reference naming rules.
    pub fn new(value: impl Into<String>) -> Result<Self, VcsDomainError> {
        let raw = value.into();
        if Self::is_invalid_branch_name(&raw) {
            return Err(VcsDomainError::InvalidBranchName(raw));
        }
        Ok(Self(raw))
    }

    fn is_invalid_branch_name(name: &str) -> bool {
        let is_empty = name.is_empty();
        let exceeds_length_limit = name.len() > MAX_BRANCH_NAME_LENGTH;
        let has_forbidden_char = name
            .chars()
            .any(|ch| ch.is_control() || ch.is_whitespace() || FORBIDDEN_CHARS.contains(&ch));
        let has_forbidden_sequence =
            name.contains("..") || name.contains("@{") || name.contains("//") || name == "@";
        let has_bad_edges = name.starts_with('-')
            || name.starts_with('/')
            || name.ends_with('/')
            || name.ends_with('.')
            || name.ends_with(".lock");
        let has_hidden_component = name.split('/').any(|part| part.starts_with('.'));

        is_empty
            || exceeds_length_limit
            || has_forbidden_char
            || has_forbidden_sequence
            || has_bad_edges
            || has_hidden_component
    }

    /// Returns the branch name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the fully qualified reference, e.g. `refs/heads/main`.
    #[must_use]
    pub fn to_ref(&self) -> String {
        format!("refs/heads/{}", self.0)
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for BranchName {
    type Error = VcsDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for BranchName {
    type Error = VcsDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BranchName> for String {
    fn from(value: BranchName) -> Self {
        value.0
    }
}

/// Branch as currently seen by the backend: its name and tip commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    name: BranchName,
    head: CommitId,
    head_committed_at: DateTime<FixedOffset>,
}

impl Branch {
    /// Creates a branch projection.
    #[must_use]
    pub const fn new(
        name: BranchName,
        head: CommitId,
        head_committed_at: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            name,
            head,
            head_committed_at,
        }
    }

    /// Returns the branch name.
    #[must_use]
    pub const fn name(&self) -> &BranchName {
        &self.name
    }

    /// Returns the tip commit identifier.
    #[must_use]
    pub const fn head(&self) -> &CommitId {
        &self.head
    }

    /// Returns the committer timestamp of the tip commit.
    #[must_use]
    pub const fn head_committed_at(&self) -> DateTime<FixedOffset> {
        self.head_committed_at
    }
}
