//! Classified outcomes of a backend merge.

use super::CommitId;

/// Result of merging one branch into the checked-out branch.
///
/// Failures that are not content conflicts are reported as errors by the
/// backend port rather than as an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The merge completed and the checked-out branch now points at `head`.
    Merged {
        /// New tip of the checked-out branch.
        head: CommitId,
        /// Backend summary, e.g. `Already up to date.`.
        summary: String,
    },
    /// The merge stopped on conflicting content and is still in progress.
    Conflict {
        /// Backend diagnostic describing the conflict.
        diagnostic: String,
    },
}
