/**
 * Comment Data Structure
 *
 * This module defines the Comment struct used for threaded document
 * discussion and its serialization for the realtime wire protocol and
 * the comment-list endpoint.
 *
 * A comment is either provisional (created locally, not yet confirmed by
 * the server) or persisted (carries the server-assigned id). Comments are
 * never mutated in place; a provisional entry is replaced by its persisted
 * counterpart during reconciliation.
 */
use crate::shared::error::SharedError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Prefix carried by every locally-assigned comment identifier
pub const PROVISIONAL_PREFIX: &str = "tmp-";

/// Comment identifier
///
/// Persisted comments use the id assigned by the server, which arrives as a
/// JSON number or string. Provisional comments use a synthetic `tmp-` id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CommentId(String);

impl CommentId {
    /// Wrap a server-assigned identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh provisional identifier
    pub fn provisional() -> Self {
        Self(format!("{}{}", PROVISIONAL_PREFIX, uuid::Uuid::new_v4()))
    }

    /// Whether this id was synthesised locally
    pub fn is_provisional(&self) -> bool {
        self.0.starts_with(PROVISIONAL_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CommentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => Self(text),
            RawId::Number(number) => Self(number.to_string()),
        })
    }
}

/// A single comment on a document
///
/// # Fields
/// * `id` - Server id, or a `tmp-` id while provisional
/// * `author` - Author identifier (`user` on the wire)
/// * `content` - Comment body
/// * `position` - Optional opaque anchor into the document
/// * `created_at` - Creation timestamp
/// * `parent_comment_id` - Parent comment for threaded replies
/// * `pending` - Local-only flag; `true` until the server confirms the comment
///
/// # Example
/// ```rust
/// use lexdraft::shared::Comment;
///
/// let comment = Comment::provisional("alice", "looks good");
/// assert!(comment.pending);
/// assert!(comment.id.is_provisional());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    #[serde(rename = "user")]
    pub author: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<serde_json::Value>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<CommentId>,
    /// Never on the wire: everything the server sends is persisted
    #[serde(skip)]
    pub pending: bool,
}

impl Comment {
    /// Create a provisional comment stamped with the current time
    pub fn provisional(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: CommentId::provisional(),
            author: author.into(),
            content: content.into(),
            position: None,
            created_at: Utc::now(),
            parent_comment_id: None,
            pending: true,
        }
    }

    /// Create a persisted comment, as the server would deliver it
    pub fn persisted(
        id: impl Into<String>,
        author: impl Into<String>,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: CommentId::new(id),
            author: author.into(),
            content: content.into(),
            position: None,
            created_at,
            parent_comment_id: None,
            pending: false,
        }
    }

    /// Whether this comment is a reply to another comment
    pub fn is_reply(&self) -> bool {
        self.parent_comment_id.is_some()
    }
}

/// A comment the local user is about to submit
#[derive(Debug, Clone, PartialEq)]
pub struct CommentDraft {
    pub author: String,
    pub content: String,
    pub position: Option<serde_json::Value>,
    pub parent_comment_id: Option<CommentId>,
}

impl CommentDraft {
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
            position: None,
            parent_comment_id: None,
        }
    }

    /// Anchor the comment at a position in the document
    pub fn at_position(mut self, position: serde_json::Value) -> Self {
        self.position = Some(position);
        self
    }

    /// Make the comment a reply to `parent`
    pub fn reply_to(mut self, parent: CommentId) -> Self {
        self.parent_comment_id = Some(parent);
        self
    }

    /// Trim the content and reject drafts that would post nothing
    pub fn validated(mut self) -> Result<Self, SharedError> {
        let trimmed = self.content.trim();
        if trimmed.is_empty() {
            return Err(SharedError::validation("content", "Comment cannot be empty"));
        }
        if self.author.trim().is_empty() {
            return Err(SharedError::validation("author", "Comment author is required"));
        }
        self.content = trimmed.to_string();
        Ok(self)
    }

    /// Turn the draft into a provisional comment
    pub fn into_provisional(self) -> Comment {
        Comment {
            position: self.position,
            parent_comment_id: self.parent_comment_id,
            ..Comment::provisional(self.author, self.content)
        }
    }
}

/// Accept RFC 3339 timestamps and naive ISO timestamps (taken as UTC)
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))
}
