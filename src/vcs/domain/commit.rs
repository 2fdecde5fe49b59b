//! Commit value objects projected from the version-control backend.

use super::VcsDomainError;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shortest abbreviated object name git accepts.
const MIN_COMMIT_ID_LENGTH: usize = 4;

/// Length of a SHA-256 object name; SHA-1 names are 40 characters.
pub const MAX_COMMIT_ID_LENGTH: usize = 64;

/// Hexadecimal commit object name, full or abbreviated.
///
/// Stored lowercase. Anything that is not 4–64 hex digits is rejected, so a
/// malformed identifier never reaches the backend.
///
/// # Examples
///
///     use guig::vcs::domain::CommitId;
///
///     let id = CommitId::parse("94181465ECC0").expect("valid");
///     assert_eq!(id.as_str(), "94181465ecc0");
///     assert!(CommitId::parse("thisisawrongshahex").is_err());
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitId(String);

impl CommitId {
    /// Parses and normalises a commit identifier.
    ///
    /// # Errors
    ///
    /// Returns [`VcsDomainError::InvalidCommitId`] when the value is not a
    /// 4–64 character hexadecimal string.
    pub fn parse(value: impl Into<String>) -> Result<Self, VcsDomainError> {
        let raw = value.into();
        let length_ok = (MIN_COMMIT_ID_LENGTH..=MAX_COMMIT_ID_LENGTH).contains(&raw.len());
        if !length_ok || !raw.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(VcsDomainError::InvalidCommitId(raw));
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CommitId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for CommitId {
    type Error = VcsDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CommitId> for String {
    fn from(value: CommitId) -> Self {
        value.0
    }
}

/// Commit metadata as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    id: CommitId,
    author_name: String,
    author_email: String,
    message: String,
    committed_at: DateTime<FixedOffset>,
    files_changed: usize,
}

/// Parameter object for building a [`Commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitData {
    /// Full object name.
    pub id: CommitId,
    /// Author display name.
    pub author_name: String,
    /// Author e-mail address.
    pub author_email: String,
    /// Full commit message.
    pub message: String,
    /// Committer timestamp, keeping the committer's UTC offset.
    pub committed_at: DateTime<FixedOffset>,
    /// Number of files touched relative to the first parent.
    pub files_changed: usize,
}

impl Commit {
    /// Creates a commit projection.
    #[must_use]
    pub fn new(data: CommitData) -> Self {
        Self {
            id: data.id,
            author_name: data.author_name,
            author_email: data.author_email,
            message: data.message,
            committed_at: data.committed_at,
            files_changed: data.files_changed,
        }
    }

    /// Returns the commit identifier.
    #[must_use]
    pub const fn id(&self) -> &CommitId {
        &self.id
    }

    /// Returns the author display name.
    #[must_use]
    pub fn author_name(&self) -> &str {
        &self.author_name
    }

    /// Returns the author e-mail address.
    #[must_use]
    pub fn author_email(&self) -> &str {
        &self.author_email
    }

    /// Returns the commit message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the committer timestamp.
    #[must_use]
    pub const fn committed_at(&self) -> DateTime<FixedOffset> {
        self.committed_at
    }

    /// Returns the number of files touched by the commit.
    #[must_use]
    pub const fn files_changed(&self) -> usize {
        self.files_changed
    }
}
