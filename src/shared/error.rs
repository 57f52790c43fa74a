//! Shared Error Types
//!
//! This module defines error types that are shared between the realtime layer,
//! the comment store and the editor. These errors represent common failure
//! cases that can occur when handling wire frames or user input.
//!
//! # Error Categories
//!
//! - `SerializationError` - JSON serialization/deserialization failures
//! - `ValidationError` - Data validation failures (e.g. an empty comment)
//! - `MessageError` - Frame or listener related errors
//!
//! # Usage
//!
//! ```rust
//! use lexdraft::shared::error::SharedError;
//!
//! // Create a validation error
//! let error = SharedError::validation("content", "Comment cannot be empty");
//! ```
use thiserror::Error;

/// Shared error types used across the realtime, offline and editor modules
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Message-related error
    #[error("Message error: {message}")]
    MessageError {
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new message error
    pub fn message(message: impl Into<String>) -> Self {
        Self::MessageError {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
