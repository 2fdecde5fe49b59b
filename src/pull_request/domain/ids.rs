//! Identifier type for pull request records.

use super::PullRequestDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned pull request identifier.
///
/// Backed by `i64` so it maps onto a `BIGSERIAL` column without conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PullRequestId(i64);

impl PullRequestId {
    /// Creates a validated identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestDomainError::InvalidPullRequestId`] when the value
    /// is zero or negative.
    pub const fn new(value: i64) -> Result<Self, PullRequestDomainError> {
        if value <= 0 {
            return Err(PullRequestDomainError::InvalidPullRequestId(value));
        }
        Ok(Self(value))
    }

    /// Parses an identifier from a path segment.
    ///
    /// Returns `None` for anything that is not a positive integer.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        raw.parse::<i64>().ok().and_then(|value| Self::new(value).ok())
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PullRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
