//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - Session fixtures wired to an in-process transport
//! - Frame and document builders
//! - Custom assertion macros

pub mod assertions;
pub mod fixtures;

// Re-export commonly used utilities
pub use fixtures::*;
