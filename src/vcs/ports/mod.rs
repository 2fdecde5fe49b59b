//! Port contracts for the version-control backend.

mod backend;

pub use backend::{VcsBackend, VcsError, VcsResult};
