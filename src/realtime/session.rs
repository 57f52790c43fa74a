/**
 * Document Session
 *
 * The view-scoped owner of a document's realtime state. A session is
 * created when a document view mounts and dropped when it unmounts; it owns
 * the transport connection and the message bus and keeps the comment store
 * in step with comments the server confirms.
 *
 * ```text
 * socket -> TransportConnection -> MessageBus -+-> OptimisticStore (comments)
 *                                              +-> StructuredDocumentModel (attached)
 *                                              +-> other subscribers
 * ```
 */
use crate::editor::model::StructuredDocumentModel;
use crate::editor::node::DocumentNode;
use crate::offline::OptimisticStore;
use crate::realtime::bus::{ListenerResult, MessageBus, Subscription};
use crate::realtime::connection::{
    ConnectionId, ConnectionState, Connector, TransportConnection, TransportEvent,
};
use crate::realtime::diagnostics::DiagnosticSink;
use crate::shared::{
    AppConfig, Comment, CommentDraft, CommentId, InboundMessage, OutboundMessage, SharedError,
};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// Realtime state of one open document view
pub struct DocumentSession {
    author: String,
    bus: MessageBus,
    connection: TransportConnection,
    store: Rc<RefCell<OptimisticStore>>,
    _comments: Subscription,
    document: Option<Subscription>,
}

impl DocumentSession {
    /// Create a session for `author`; no connection is opened yet
    pub fn new(
        config: AppConfig,
        connector: Box<dyn Connector>,
        sink: Rc<dyn DiagnosticSink>,
        author: impl Into<String>,
    ) -> Self {
        let bus = MessageBus::new();
        let store = Rc::new(RefCell::new(OptimisticStore::new()));
        let comments = bus.subscribe(reconcile_listener(store.clone()));
        let connection = TransportConnection::new(config, connector, bus.clone(), sink);

        Self {
            author: author.into(),
            bus,
            connection,
            store,
            _comments: comments,
            document: None,
        }
    }

    /// Follow a new document identifier
    ///
    /// The previous connection is always closed first. `None` and invalid
    /// identifiers leave the session disconnected.
    pub fn set_document_id(&mut self, document_id: Option<&str>) -> Option<ConnectionId> {
        match document_id {
            Some(raw) => {
                let id = self.connection.open(raw);
                if id.is_some() {
                    tracing::info!("[Session] Following document {}", raw.trim());
                }
                id
            }
            None => {
                self.connection.close();
                None
            }
        }
    }

    /// Forward socket activity to the connection
    pub fn handle_transport_event(&mut self, id: ConnectionId, event: TransportEvent) {
        self.connection.handle_event(id, event);
    }

    /// Post a top-level comment as the session's author
    pub fn submit_comment(&mut self, content: &str) -> Result<CommentId, SharedError> {
        self.submit_draft(CommentDraft::new(self.author.clone(), content))
    }

    /// Post a comment draft (reply, anchored comment)
    ///
    /// The provisional comment is added whether or not the frame could be
    /// sent; a failed send is only reported to the diagnostic sink.
    pub fn submit_draft(&mut self, draft: CommentDraft) -> Result<CommentId, SharedError> {
        let draft = draft.validated()?;
        let mut store = self
            .store
            .try_borrow_mut()
            .map_err(|_| SharedError::message("comment store is busy"))?;
        if !self.connection.send_message(OutboundMessage::from(&draft)) {
            tracing::debug!("[Session] Comment kept locally, send failed");
        }
        Ok(store.submit_draft(draft))
    }

    /// Broadcast a suggested edit
    pub fn suggest(&mut self, content: &str, position: Option<Value>) -> bool {
        self.connection.send_message(OutboundMessage::Suggestion {
            user: self.author.clone(),
            content: content.to_string(),
            position,
        })
    }

    /// Save the model's content, as HTML, and broadcast it to other sessions
    pub fn push_document(
        &mut self,
        model: &StructuredDocumentModel,
        title: Option<String>,
    ) -> bool {
        self.connection.send_message(OutboundMessage::UpdateDocument {
            title,
            content: Value::String(model.to_html()),
            messages: Vec::new(),
        })
    }

    /// Replace the comments with the list fetched from the server
    pub fn load_comments(&self, comments: Vec<Comment>) -> Result<(), SharedError> {
        self.store
            .try_borrow_mut()
            .map_err(|_| SharedError::message("comment store is busy"))?
            .load(comments);
        Ok(())
    }

    /// Snapshot of the comment collection
    pub fn comments(&self) -> Vec<Comment> {
        self.store.borrow().comments().to_vec()
    }

    pub fn store(&self) -> Rc<RefCell<OptimisticStore>> {
        self.store.clone()
    }

    /// Register another listener on the session's bus
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&InboundMessage) -> ListenerResult + 'static,
    {
        self.bus.subscribe(listener)
    }

    /// Keep `model` in step with document content other sessions publish
    ///
    /// Replaces any previously attached model.
    pub fn attach_document(&mut self, model: Rc<RefCell<StructuredDocumentModel>>) {
        self.document = Some(self.bus.subscribe(move |message| {
            let content = match message {
                InboundMessage::DocumentUpdate { content } => Some(content),
                InboundMessage::DocumentState { document } => latest_content(document),
                _ => return Ok(()),
            };
            let Some(root) = content.and_then(DocumentNode::from_value) else {
                tracing::debug!("[Session] '{}' carries no structured content", message.kind());
                return Ok(());
            };
            model
                .try_borrow_mut()
                .map_err(|_| SharedError::message("document model is busy"))?
                .replace_content(root);
            Ok(())
        }));
    }

    pub fn detach_document(&mut self) {
        self.document = None;
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn connection(&self) -> &TransportConnection {
        &self.connection
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn close(&mut self) {
        self.connection.close();
    }
}

impl Drop for DocumentSession {
    fn drop(&mut self) {
        tracing::debug!("[Session] Session for {} dropped", self.author);
        self.close();
    }
}

fn reconcile_listener(
    store: Rc<RefCell<OptimisticStore>>,
) -> impl FnMut(&InboundMessage) -> ListenerResult {
    move |message| {
        let Some(comment) = message.as_comment() else {
            return Ok(());
        };
        store
            .try_borrow_mut()
            .map_err(|_| SharedError::message("comment store is busy"))?
            .reconcile(comment.clone());
        Ok(())
    }
}

/// Content of the newest version in a `document_state` record
fn latest_content(document: &Value) -> Option<&Value> {
    document
        .get("document_versions")
        .and_then(Value::as_array)
        .and_then(|versions| versions.last())
        .and_then(|version| version.get("content"))
        .or_else(|| document.get("content"))
}
