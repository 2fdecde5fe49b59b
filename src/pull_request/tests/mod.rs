//! Unit tests for the pull request context.
