//! Realtime document synchronisation
//!
//! - `connection`: the per-document transport connection and its seams
//! - `bus`: publish/subscribe fan-out of inbound frames
//! - `diagnostics`: where contained transport failures are reported
//! - `session`: the view-scoped owner tying them to the comment store

pub mod bus;
pub mod connection;
pub mod diagnostics;
pub mod session;

pub use bus::{ListenerId, ListenerResult, MessageBus, Subscription};
pub use connection::{
    ChannelConnector, ChannelEndpoint, Connection, ConnectionId, ConnectionState, Connector,
    Transport, TransportConnection, TransportError, TransportEvent,
};
pub use diagnostics::{DiagnosticSink, MemorySink, TracingSink, TransportIssue};
pub use session::DocumentSession;
