//! Document store collaborator
//!
//! HTTP access to documents, their versions and their comment lists. The
//! realtime layer only consumes what this module fetches.

pub mod client;
pub mod types;

pub use client::{ApiError, DocumentApi};
pub use types::{DocumentRecord, DocumentVersion, NewDocument, SHARED_DOCUMENT_TITLE};
