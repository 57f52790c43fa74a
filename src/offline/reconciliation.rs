//! # Comment Reconciliation
//!
//! Collapses a provisional comment into its server-confirmed counterpart.
//!
//! A persisted comment confirms the **first** provisional entry with the
//! same author and content. Only one entry is confirmed per persisted
//! comment, so two identical local submissions need two confirmations.
//! A persisted comment with no provisional match came from another session
//! and is simply added.

use crate::shared::{Comment, CommentId};

/// What `OptimisticStore::reconcile` did with a persisted comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// A provisional entry was removed and the persisted one appended
    Replaced { provisional: CommentId },
    /// No provisional entry matched; the persisted one was appended
    Appended,
}

impl ReconcileOutcome {
    pub fn replaced(&self) -> Option<&CommentId> {
        match self {
            Self::Replaced { provisional } => Some(provisional),
            Self::Appended => None,
        }
    }
}

/// Whether `persisted` confirms `candidate`
pub fn matches_provisional(candidate: &Comment, persisted: &Comment) -> bool {
    candidate.pending
        && candidate.author == persisted.author
        && candidate.content == persisted.content
}

/// Index of the first provisional entry confirmed by `persisted`
pub fn find_provisional(comments: &[Comment], persisted: &Comment) -> Option<usize> {
    comments
        .iter()
        .position(|candidate| matches_provisional(candidate, persisted))
}
