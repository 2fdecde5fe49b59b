//! Step definitions for pull request lifecycle scenarios.

pub mod when;
pub mod world;
