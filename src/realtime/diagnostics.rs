//! Transport diagnostics
//!
//! Transport failures are never raised to the caller. They are contained,
//! described as a `TransportIssue`, and handed to a `DiagnosticSink`. The
//! default sink writes them to the log; a view that wants to show the user a
//! notice can install a `MemorySink` and drain it.

use crate::realtime::connection::ConnectionState;
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

/// A contained transport-level failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportIssue {
    /// `send` was called while the connection was not open
    #[error("cannot send '{kind}': connection is {state}")]
    NotOpen { kind: String, state: ConnectionState },

    /// The payload handed to `send` was not a JSON object
    #[error("cannot send '{kind}': payload must be a JSON object")]
    InvalidPayload { kind: String },

    /// The transport refused the frame
    #[error("failed to send '{kind}': {message}")]
    SendFailed { kind: String, message: String },

    /// The connector could not start a connection
    #[error("failed to connect to {url}: {message}")]
    ConnectFailed { url: String, message: String },

    /// The connection failed after it was started
    #[error("connection error on document {document_id}: {message}")]
    ConnectionError {
        document_id: String,
        message: String,
    },

    /// An inbound frame could not be decoded
    #[error("dropped malformed frame: {message}")]
    MalformedFrame { message: String },

    /// The server reported an error frame
    #[error("server error: {message}")]
    ServerError { message: String },
}

/// Receiver for contained transport failures
pub trait DiagnosticSink {
    fn report(&self, issue: &TransportIssue);
}

/// Logs every issue through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, issue: &TransportIssue) {
        match issue {
            TransportIssue::MalformedFrame { .. } => tracing::warn!("[Transport] {}", issue),
            _ => tracing::error!("[Transport] {}", issue),
        }
    }
}

/// Keeps issues in memory so the owning view can surface them
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    issues: Rc<RefCell<Vec<TransportIssue>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every issue recorded so far
    pub fn drain(&self) -> Vec<TransportIssue> {
        std::mem::take(&mut *self.issues.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.issues.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.borrow().is_empty()
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, issue: &TransportIssue) {
        TracingSink.report(issue);
        self.issues.borrow_mut().push(issue.clone());
    }
}
