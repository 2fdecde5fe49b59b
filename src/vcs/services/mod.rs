//! Application services for repository browsing.

mod reader;

pub use reader::{RepositoryReadError, RepositoryReadResult, RepositoryReader};
