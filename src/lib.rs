//! LexDraft - Realtime Document Co-authoring Core
//!
//! The engine behind co-authoring a legal document: a realtime layer that
//! keeps one transport connection per open document and fans its frames out
//! to independent listeners, an optimistic comment store reconciled against
//! server confirmations, and a structured document model with transactional
//! block-formatting commands.
//!
//! # Module Structure
//!
//! - **`shared`** - Wire frames, comments, document ids, configuration, errors
//! - **`realtime`** - Transport connection, message bus, document session
//!   - `TransportConnection` owns the socket seam and its state machine
//!   - `MessageBus` delivers every inbound frame to every listener, in order
//!   - `DocumentSession` ties a document view's connection to its comments
//! - **`offline`** - Optimistic comment store, reconciliation, retry policy
//! - **`editor`** - Document tree and its HTML form, positions, transactions,
//!   indent commands
//! - **`api`** - HTTP client for the document store
//! - **`logging`** - `tracing` subscriber setup
//!
//! # Data Flow
//!
//! ```text
//! socket -> TransportConnection -> MessageBus -> OptimisticStore::reconcile
//! toolbar / keys -> CommandEngine -> StructuredDocumentModel
//! ```
//!
//! # Usage
//!
//! ```rust
//! use lexdraft::editor::{CommandEngine, DocumentNode, Selection, StructuredDocumentModel};
//!
//! let mut model = StructuredDocumentModel::new(DocumentNode::doc(vec![
//!     DocumentNode::paragraph("Whereas the parties"),
//! ]));
//! let engine = CommandEngine::default();
//! engine.indent(&mut model, Selection::cursor(1)).unwrap();
//! assert_eq!(model.root().children[0].indent().get(), 1);
//! ```
//!
//! # Threading
//!
//! Everything here runs on one event-loop thread. Shared state uses
//! `Rc<RefCell<_>>`, and each event is handled to completion before the next
//! one is processed. Only the `api` client is `async`.

/// Shared types and data structures
pub mod shared;

/// Realtime synchronisation
pub mod realtime;

/// Local comment state and retry policy
pub mod offline;

/// Structured document editing
pub mod editor;

/// Document store HTTP client
pub mod api;

/// Logging setup
pub mod logging;
