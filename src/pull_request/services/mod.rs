//! Application services for the pull request lifecycle.

mod lifecycle;

pub use lifecycle::{
    BranchRole, CreatePullRequestRequest, MergeReport, PullRequestAction,
    PullRequestLifecycleError, PullRequestLifecycleResult, PullRequestLifecycleService,
};
