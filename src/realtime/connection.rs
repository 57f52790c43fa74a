/**
 * Document Transport Connection
 *
 * Owns the single bidirectional frame stream bound to a document. The
 * socket itself sits behind the `Connector`/`Transport` seam; the host's
 * event loop reports what the socket does through `handle_event`, and
 * decoded frames are published on the `MessageBus`.
 *
 * # State machine
 *
 * ```text
 * Closed -> Connecting -> Open -> Closed
 *              |           |
 *              +--> Error <+      (terminal for that connection)
 * ```
 *
 * Every `open` builds a new `Connection` with a fresh `ConnectionId` after
 * closing the previous one, so at most one connection is live. Events tagged
 * with a superseded id are ignored. There is no automatic reconnect.
 *
 * # Sending
 *
 * `send` writes only while the connection is open. Any other case is a
 * silent failure from the caller's point of view: it returns `false` and
 * reports a `TransportIssue` to the diagnostic sink. Nothing is retried.
 */
use crate::realtime::bus::MessageBus;
use crate::realtime::diagnostics::{DiagnosticSink, TransportIssue};
use crate::shared::{AppConfig, DocumentId, InboundMessage, OutboundMessage};
use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Lifecycle state of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Closed,
    Connecting,
    Open,
    Error,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Closed => "closed",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Error => "in error",
        };
        f.write_str(name)
    }
}

/// Identifies one `open` call's connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

/// What the underlying socket reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Frame(String),
    Error(String),
    Closed,
}

/// Errors raised by a transport implementation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport is closed")]
    Closed,
    #[error("transport I/O error: {0}")]
    Io(String),
    #[error("connection refused: {0}")]
    Refused(String),
}

/// A frame-oriented socket
pub trait Transport {
    fn send_text(&mut self, frame: String) -> Result<(), TransportError>;
    fn close(&mut self);
}

/// Starts transports for a URL
pub trait Connector {
    fn connect(&mut self, url: &str) -> Result<Box<dyn Transport>, TransportError>;
}

/// One live (or failed) connection to a document
pub struct Connection {
    id: ConnectionId,
    document_id: DocumentId,
    url: String,
    state: ConnectionState,
    transport: Option<Box<dyn Transport>>,
}

impl Connection {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    fn shutdown(&mut self, next_state: ConnectionState) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
        self.state = next_state;
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("document_id", &self.document_id)
            .field("url", &self.url)
            .field("state", &self.state)
            .finish()
    }
}

/// Manages the connection for one document view
pub struct TransportConnection {
    config: AppConfig,
    connector: Box<dyn Connector>,
    bus: MessageBus,
    sink: Rc<dyn DiagnosticSink>,
    current: Option<Connection>,
    next_id: u64,
}

impl TransportConnection {
    pub fn new(
        config: AppConfig,
        connector: Box<dyn Connector>,
        bus: MessageBus,
        sink: Rc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            config,
            connector,
            bus,
            sink,
            current: None,
            next_id: 0,
        }
    }

    /// Close any previous connection and connect to `document_id`
    ///
    /// Empty and sentinel identifiers leave the manager closed without
    /// attempting a connection and return `None`.
    pub fn open(&mut self, document_id: &str) -> Option<ConnectionId> {
        self.close();

        let Some(document_id) = DocumentId::parse(document_id) else {
            tracing::warn!("[Transport] No valid document id provided, skipping connection");
            return None;
        };

        let url = match self.config.websocket_url(&document_id) {
            Ok(url) => url,
            Err(e) => {
                self.sink.report(&TransportIssue::ConnectFailed {
                    url: self.config.api_base_url.clone(),
                    message: e.to_string(),
                });
                return None;
            }
        };

        let id = ConnectionId(self.next_id);
        self.next_id += 1;
        tracing::debug!("[Transport] Connecting to {}", url);

        let (state, transport) = match self.connector.connect(&url) {
            Ok(transport) => (ConnectionState::Connecting, Some(transport)),
            Err(e) => {
                self.sink.report(&TransportIssue::ConnectFailed {
                    url: url.clone(),
                    message: e.to_string(),
                });
                (ConnectionState::Error, None)
            }
        };

        self.current = Some(Connection {
            id,
            document_id,
            url,
            state,
            transport,
        });
        Some(id)
    }

    /// Close the current connection; safe to call at any time
    pub fn close(&mut self) {
        if let Some(mut connection) = self.current.take() {
            connection.shutdown(ConnectionState::Closed);
            tracing::info!(
                "[Transport] Disconnected from document {}",
                connection.document_id
            );
        }
    }

    /// Apply an event reported by the socket of connection `id`
    pub fn handle_event(&mut self, id: ConnectionId, event: TransportEvent) {
        let Some(connection) = self.current.as_mut().filter(|c| c.id == id) else {
            tracing::debug!("[Transport] Ignoring event for superseded connection {:?}", id);
            return;
        };

        match event {
            TransportEvent::Opened => {
                if connection.state == ConnectionState::Connecting {
                    connection.state = ConnectionState::Open;
                    tracing::info!("[Transport] Connected to {}", connection.url);
                }
            }
            TransportEvent::Frame(frame) => {
                if connection.state != ConnectionState::Open {
                    tracing::debug!(
                        "[Transport] Dropping frame received while {}",
                        connection.state
                    );
                    return;
                }
                self.deliver(&frame);
            }
            TransportEvent::Error(message) => {
                if matches!(
                    connection.state,
                    ConnectionState::Connecting | ConnectionState::Open
                ) {
                    connection.shutdown(ConnectionState::Error);
                    let issue = TransportIssue::ConnectionError {
                        document_id: connection.document_id.to_string(),
                        message,
                    };
                    self.sink.report(&issue);
                }
            }
            TransportEvent::Closed => {
                if connection.state != ConnectionState::Error {
                    connection.shutdown(ConnectionState::Closed);
                    tracing::info!("[Transport] Connection to {} closed", connection.url);
                }
            }
        }
    }

    fn deliver(&self, frame: &str) {
        match InboundMessage::parse(frame) {
            Ok(message) => {
                if let InboundMessage::Error { message: text } = &message {
                    self.sink.report(&TransportIssue::ServerError {
                        message: text.clone(),
                    });
                }
                tracing::debug!("[Transport] Received '{}'", message.kind());
                self.bus.publish(message);
            }
            Err(e) => {
                self.sink.report(&TransportIssue::MalformedFrame {
                    message: e.to_string(),
                });
            }
        }
    }

    /// Send `{type, ...payload}` if the connection is open
    ///
    /// Returns whether the frame was handed to the transport.
    pub fn send(&mut self, kind: &str, payload: Value) -> bool {
        let fields = match payload {
            Value::Object(fields) => fields,
            Value::Null => Map::new(),
            _ => {
                self.sink.report(&TransportIssue::InvalidPayload {
                    kind: kind.to_string(),
                });
                return false;
            }
        };

        let state = self.state();
        let transport = match self.current.as_mut() {
            Some(connection) if state == ConnectionState::Open => connection.transport.as_mut(),
            _ => None,
        };
        let Some(transport) = transport else {
            self.sink.report(&TransportIssue::NotOpen {
                kind: kind.to_string(),
                state,
            });
            return false;
        };

        let mut frame = Map::new();
        frame.insert("type".to_string(), Value::String(kind.to_string()));
        frame.extend(fields);
        let text = Value::Object(frame).to_string();

        match transport.send_text(text) {
            Ok(()) => {
                tracing::debug!("[Transport] Sent '{}'", kind);
                true
            }
            Err(e) => {
                self.sink.report(&TransportIssue::SendFailed {
                    kind: kind.to_string(),
                    message: e.to_string(),
                });
                false
            }
        }
    }

    /// Typed form of `send`
    pub fn send_message(&mut self, message: OutboundMessage) -> bool {
        let kind = message.kind();
        match message.into_parts() {
            Ok((kind, payload)) => self.send(kind, payload),
            Err(e) => {
                self.sink.report(&TransportIssue::SendFailed {
                    kind: kind.to_string(),
                    message: e.to_string(),
                });
                false
            }
        }
    }

    /// State of the current connection (`Closed` when there is none)
    pub fn state(&self) -> ConnectionState {
        self.current
            .as_ref()
            .map_or(ConnectionState::Closed, Connection::state)
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    pub fn connection(&self) -> Option<&Connection> {
        self.current.as_ref()
    }

    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }
}

impl Drop for TransportConnection {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for TransportConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportConnection")
            .field("current", &self.current)
            .field("bus", &self.bus)
            .finish()
    }
}

/// The far end of a `ChannelConnector` connection
///
/// Hosts bridge this to their socket: frames written by the connection come
/// out of `next_frame`, and socket activity goes back in through
/// `TransportConnection::handle_event`.
#[derive(Debug)]
pub struct ChannelEndpoint {
    url: String,
    frames: mpsc::UnboundedReceiver<String>,
    closed: Rc<Cell<bool>>,
}

impl ChannelEndpoint {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Next outbound frame, if one is waiting
    pub fn next_frame(&mut self) -> Option<String> {
        self.frames.try_recv().ok()
    }

    /// Every outbound frame waiting right now
    pub fn drain_frames(&mut self) -> Vec<String> {
        std::iter::from_fn(|| self.next_frame()).collect()
    }

    /// Whether the connection side closed the transport
    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

struct ChannelTransport {
    sender: Option<mpsc::UnboundedSender<String>>,
    closed: Rc<Cell<bool>>,
}

impl Transport for ChannelTransport {
    fn send_text(&mut self, frame: String) -> Result<(), TransportError> {
        let sender = self.sender.as_ref().ok_or(TransportError::Closed)?;
        sender.send(frame).map_err(|_| TransportError::Closed)
    }

    fn close(&mut self) {
        self.sender = None;
        self.closed.set(true);
    }
}

/// In-process connector backed by unbounded tokio channels
///
/// Clones share the same endpoint queue.
#[derive(Debug, Clone, Default)]
pub struct ChannelConnector {
    endpoints: Rc<RefCell<VecDeque<ChannelEndpoint>>>,
    refusal: Rc<RefCell<Option<String>>>,
}

impl ChannelConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Oldest endpoint not yet taken
    pub fn take_endpoint(&self) -> Option<ChannelEndpoint> {
        self.endpoints.borrow_mut().pop_front()
    }

    /// Make the next `connect` call fail with `reason`
    pub fn refuse_next(&self, reason: impl Into<String>) {
        *self.refusal.borrow_mut() = Some(reason.into());
    }
}

impl Connector for ChannelConnector {
    fn connect(&mut self, url: &str) -> Result<Box<dyn Transport>, TransportError> {
        if let Some(reason) = self.refusal.borrow_mut().take() {
            return Err(TransportError::Refused(reason));
        }

        let (sender, frames) = mpsc::unbounded_channel();
        let closed = Rc::new(Cell::new(false));
        self.endpoints.borrow_mut().push_back(ChannelEndpoint {
            url: url.to_string(),
            frames,
            closed: closed.clone(),
        });
        Ok(Box::new(ChannelTransport {
            sender: Some(sender),
            closed,
        }))
    }
}
