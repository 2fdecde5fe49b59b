//! In-memory version-control backend for tests and local runs.

mod backend;

pub use backend::{InMemoryVcsBackend, VcsOperation};
