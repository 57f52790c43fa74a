//! Document identifiers
//!
//! A document view only opens a transport once it holds a usable identifier.
//! Route parameters that were never filled in arrive as the literal strings
//! `"undefined"` or `"null"`; those are treated the same as an empty id.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier strings that mean "no document yet"
const SENTINELS: [&str; 2] = ["undefined", "null"];

/// A validated, non-sentinel document identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Parse a raw identifier, rejecting empty and sentinel values
    ///
    /// # Example
    /// ```rust
    /// use lexdraft::shared::DocumentId;
    ///
    /// assert!(DocumentId::parse("6910a447ba10e245c89b8e70").is_some());
    /// assert!(DocumentId::parse("undefined").is_none());
    /// assert!(DocumentId::parse("  ").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || SENTINELS.contains(&trimmed) {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
