//! Adapter implementations for pull request ports.

pub mod memory;
pub mod postgres;
