//! Document store records
//!
//! Shapes returned by the document store's HTTP API. Documents are stored as
//! conversation records with an append-only list of content versions.

use crate::shared::comment::parse_timestamp;
use crate::shared::Comment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Title used when a document is shared without one
pub const SHARED_DOCUMENT_TITLE: &str = "Shared Document";

/// One saved version of a document's content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentVersion {
    pub version_number: u32,
    pub content: Value,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub uploaded_by: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A stored document with its version history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub messages: Vec<Value>,
    #[serde(default)]
    pub document_versions: Vec<DocumentVersion>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DocumentRecord {
    /// The version with the highest version number
    pub fn latest_version(&self) -> Option<&DocumentVersion> {
        self.document_versions
            .iter()
            .max_by_key(|version| version.version_number)
    }

    pub fn version(&self, version_number: u32) -> Option<&DocumentVersion> {
        self.document_versions
            .iter()
            .find(|version| version.version_number == version_number)
    }
}

/// Request body for creating a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_document_content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewDocument {
    pub fn new(title: impl Into<String>, content: Value) -> Self {
        Self {
            title: title.into(),
            messages: Vec::new(),
            initial_document_content: Some(content),
            notes: None,
        }
    }

    /// Body used when sharing a document
    pub fn shared(content: Value, title: Option<String>) -> Self {
        Self {
            notes: Some("Shared document".to_string()),
            ..Self::new(title.unwrap_or_else(|| SHARED_DOCUMENT_TITLE.to_string()), content)
        }
    }
}

/// The comment endpoint answers with a bare list or a `{"comments": [...]}` wrapper
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CommentList {
    Bare(Vec<Comment>),
    Wrapped { comments: Vec<Comment> },
}

impl CommentList {
    pub(crate) fn into_vec(self) -> Vec<Comment> {
        match self {
            Self::Bare(comments) | Self::Wrapped { comments } => comments,
        }
    }
}

fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
