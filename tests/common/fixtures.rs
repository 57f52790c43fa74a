//! Session and document fixtures

use lexdraft::editor::{DocumentNode, StructuredDocumentModel};
use lexdraft::realtime::{
    ChannelConnector, ChannelEndpoint, ConnectionId, DocumentSession, MemorySink, TransportEvent,
};
use lexdraft::shared::AppConfig;
use serde_json::json;
use std::rc::Rc;

/// A session wired to an in-process transport
pub struct TestSession {
    pub session: DocumentSession,
    pub connector: ChannelConnector,
    pub sink: MemorySink,
}

impl TestSession {
    pub fn new(author: &str) -> Self {
        let connector = ChannelConnector::new();
        let sink = MemorySink::new();
        let session = DocumentSession::new(
            AppConfig::default(),
            Box::new(connector.clone()),
            Rc::new(sink.clone()),
            author,
        );
        Self {
            session,
            connector,
            sink,
        }
    }

    /// Open `document_id` and report the socket as connected
    pub fn connect(&mut self, document_id: &str) -> (ConnectionId, ChannelEndpoint) {
        let id = self
            .session
            .set_document_id(Some(document_id))
            .expect("document id should be accepted");
        self.session
            .handle_transport_event(id, TransportEvent::Opened);
        let endpoint = self
            .connector
            .take_endpoint()
            .expect("connector should hand out an endpoint");
        (id, endpoint)
    }

    /// Deliver a raw frame on connection `id`
    pub fn receive(&mut self, id: ConnectionId, frame: impl Into<String>) {
        self.session
            .handle_transport_event(id, TransportEvent::Frame(frame.into()));
    }
}

/// The frame the server broadcasts after persisting a comment
pub fn comment_frame(id: &str, user: &str, content: &str) -> String {
    json!({
        "type": "comment",
        "comment": {
            "id": id,
            "user": user,
            "content": content,
            "position": null,
            "created_at": "2024-05-01T12:00:00.000000",
            "parent_comment_id": null
        }
    })
    .to_string()
}

/// A document of paragraphs with the given text and indent levels
pub fn paragraphs(blocks: &[(&str, u8)]) -> StructuredDocumentModel {
    StructuredDocumentModel::new(DocumentNode::doc(
        blocks
            .iter()
            .map(|(text, indent)| DocumentNode::paragraph(text).with_indent(*indent))
            .collect(),
    ))
}

/// Position of the first character inside top-level block `index`
pub fn block_start(model: &StructuredDocumentModel, index: usize) -> usize {
    model.root().children[..index]
        .iter()
        .map(DocumentNode::node_size)
        .sum::<usize>()
        + 1
}
