//! # Optimistic Comment Store
//!
//! Ordered comment collection for one document view. Local submissions show
//! up immediately as provisional entries; server confirmations replace them
//! through [`OptimisticStore::reconcile`].
//!
//! ## Ordering
//!
//! A confirmed comment is appended at the end of the collection, not put
//! back where its provisional entry was. The collection therefore reflects
//! the order in which confirmations arrived.
//!
//! ## Usage
//!
//! ```rust
//! use chrono::Utc;
//! use lexdraft::offline::OptimisticStore;
//! use lexdraft::shared::Comment;
//!
//! let mut store = OptimisticStore::new();
//! let tmp = store.submit_local("alice", "looks good");
//! assert!(tmp.is_provisional());
//!
//! store.reconcile(Comment::persisted("c1", "alice", "looks good", Utc::now()));
//! assert_eq!(store.len(), 1);
//! assert_eq!(store.pending_count(), 0);
//! ```

use crate::offline::reconciliation::{find_provisional, ReconcileOutcome};
use crate::shared::{Comment, CommentDraft, CommentId};

/// Ordered comments, provisional and persisted
#[derive(Debug, Clone, Default)]
pub struct OptimisticStore {
    comments: Vec<Comment>,
}

impl OptimisticStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provisional comment and return its synthetic id
    pub fn submit_local(&mut self, author: impl Into<String>, content: impl Into<String>) -> CommentId {
        self.push_provisional(Comment::provisional(author, content))
    }

    /// Append a provisional comment built from a draft (position, parent)
    pub fn submit_draft(&mut self, draft: CommentDraft) -> CommentId {
        self.push_provisional(draft.into_provisional())
    }

    fn push_provisional(&mut self, comment: Comment) -> CommentId {
        let id = comment.id.clone();
        tracing::debug!("[Store] Provisional comment {} by {}", id, comment.author);
        self.comments.push(comment);
        id
    }

    /// Confirm a persisted comment received from the server
    pub fn reconcile(&mut self, persisted: Comment) -> ReconcileOutcome {
        let persisted = Comment {
            pending: false,
            ..persisted
        };

        let outcome = match find_provisional(&self.comments, &persisted) {
            Some(index) => {
                let removed = self.comments.remove(index);
                tracing::debug!("[Store] Comment {} confirmed as {}", removed.id, persisted.id);
                ReconcileOutcome::Replaced {
                    provisional: removed.id,
                }
            }
            None => {
                tracing::debug!("[Store] Comment {} received from another session", persisted.id);
                ReconcileOutcome::Appended
            }
        };

        self.comments.push(persisted);
        outcome
    }

    /// Replace the whole collection with comments fetched from the server
    pub fn load(&mut self, initial: Vec<Comment>) {
        self.comments = initial
            .into_iter()
            .map(|comment| Comment {
                pending: false,
                ..comment
            })
            .collect();
        tracing::info!("[Store] Loaded {} comment(s)", self.comments.len());
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn iter(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter()
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Number of comments still awaiting confirmation
    pub fn pending_count(&self) -> usize {
        self.comments.iter().filter(|c| c.pending).count()
    }

    pub fn get(&self, id: &CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| &c.id == id)
    }

    /// Replies to `parent`, in collection order
    pub fn replies_to<'a>(&'a self, parent: &'a CommentId) -> impl Iterator<Item = &'a Comment> + 'a {
        self.comments
            .iter()
            .filter(move |c| c.parent_comment_id.as_ref() == Some(parent))
    }

    /// Comments that start a thread
    pub fn roots(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter().filter(|c| !c.is_reply())
    }
}
