//! Unit tests for the version-control context.
