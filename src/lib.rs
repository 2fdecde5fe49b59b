//! Guig: an HTTP API over a git repository with a lightweight pull-request
//! workflow.
//!
//! Branches and commits are read straight from the repository. Pull
//! requests are stored separately and merged into the live repository on
//! request, with content conflicts aborted and reported.
//!
//! # Architecture
//!
//! [`vcs`] and [`pull_request`] are split into `domain`, `ports`,
//! `adapters` and `services`. Services only see the port traits, so the
//! `git` executable and `PostgreSQL` can be swapped for the in-memory
//! adapters in tests and local runs.
//!
//! # Modules
//!
//! - [`vcs`]: Branch and commit queries and the version-control backend port
//! - [`pull_request`]: Pull request storage and merge orchestration
//! - [`api`]: HTTP routes
//! - [`config`]: Server configuration
//! - [`telemetry`]: Tracing setup

pub mod api;
pub mod config;
pub mod pull_request;
pub mod telemetry;
pub mod vcs;
