//! Pull request lifecycle for the served repository.
//!
//! A pull request is a persisted proposal to merge one branch into another.
//! Its status moves forward only, `open` to `merged` or `closed`, and a
//! merge is performed against the live repository before the transition is
//! stored. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
