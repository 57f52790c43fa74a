/**
 * Realtime Wire Frames
 *
 * This module defines the JSON text frames exchanged over a document's
 * transport connection. Every frame is an object with a `type`
 * discriminator followed by type-specific fields:
 *
 * ```text
 * {"type": "comment", "comment": {"id": 1, "user": "alice", ...}}
 * {"type": "comment", "user": "alice", "content": "looks good"}
 * ```
 *
 * Inbound types this crate does not know are decoded as
 * `InboundMessage::Unknown` so listeners can skip them; a known type with a
 * malformed payload is a decoding error.
 */
use crate::shared::comment::{Comment, CommentDraft, CommentId};
use crate::shared::error::SharedError;
use serde::{Deserialize, Serialize};

/// A suggested edit broadcast to everyone viewing the document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub user: String,
    pub content: String,
    #[serde(default)]
    pub position: Option<serde_json::Value>,
}

/// A frame received from the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// A persisted comment, echoed to every session on the document
    Comment { comment: Comment },
    /// Initial document snapshot sent right after connecting
    DocumentState { document: serde_json::Value },
    /// Document content replaced by another session
    DocumentUpdate { content: serde_json::Value },
    /// Suggested edit
    Suggestion { suggestion: Suggestion },
    /// Reply to a `share_document` request
    ShareSuccess { document_id: String },
    /// Server-side failure while handling one of our frames
    Error { message: String },
    /// Any `type` not listed above
    #[serde(other)]
    Unknown,
}

impl InboundMessage {
    /// Decode a text frame
    pub fn parse(frame: &str) -> Result<Self, SharedError> {
        Ok(serde_json::from_str(frame)?)
    }

    /// The wire `type` of this message
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Comment { .. } => "comment",
            Self::DocumentState { .. } => "document_state",
            Self::DocumentUpdate { .. } => "document_update",
            Self::Suggestion { .. } => "suggestion",
            Self::ShareSuccess { .. } => "share_success",
            Self::Error { .. } => "error",
            Self::Unknown => "unknown",
        }
    }

    /// The persisted comment carried by a comment frame
    pub fn as_comment(&self) -> Option<&Comment> {
        match self {
            Self::Comment { comment } => Some(comment),
            _ => None,
        }
    }
}

/// A frame sent to the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    Comment {
        user: String,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_comment_id: Option<CommentId>,
    },
    UpdateDocument {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        content: serde_json::Value,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        messages: Vec<serde_json::Value>,
    },
    Suggestion {
        user: String,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<serde_json::Value>,
    },
    ShareDocument {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        content: serde_json::Value,
    },
}

impl OutboundMessage {
    /// The wire `type` of this message
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Comment { .. } => "comment",
            Self::UpdateDocument { .. } => "update_document",
            Self::Suggestion { .. } => "suggestion",
            Self::ShareDocument { .. } => "share_document",
        }
    }

    /// Split into the `type` and the remaining fields
    pub fn into_parts(self) -> Result<(&'static str, serde_json::Value), SharedError> {
        let kind = self.kind();
        let mut value = serde_json::to_value(&self)?;
        if let Some(fields) = value.as_object_mut() {
            fields.remove("type");
        }
        Ok((kind, value))
    }
}

impl From<&CommentDraft> for OutboundMessage {
    fn from(draft: &CommentDraft) -> Self {
        Self::Comment {
            user: draft.author.clone(),
            content: draft.content.clone(),
            position: draft.position.clone(),
            parent_comment_id: draft.parent_comment_id.clone(),
        }
    }
}
