//! Adapter implementations for the version-control backend port.

pub mod git;
pub mod memory;
