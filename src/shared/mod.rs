//! Shared Module
//!
//! Types used across the realtime layer, the comment store, the editor and
//! the HTTP collaborator: wire frames, comments, document identifiers,
//! configuration and the shared error type.

/// Comment data structure
pub mod comment;

/// Realtime wire frames
pub mod event;

/// Validated document identifiers
pub mod document_id;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use comment::{Comment, CommentDraft, CommentId};
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use document_id::DocumentId;
pub use error::SharedError;
pub use event::{InboundMessage, OutboundMessage, Suggestion};
