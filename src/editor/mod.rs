//! Structured document editing
//!
//! - `node`: tree nodes, attributes and the indent level
//! - `html`: reading and writing the stored HTML form
//! - `model`: the versioned document tree, positions and transactions
//! - `commands`: indent, outdent, attribute commands and backspace handling

pub mod commands;
pub mod html;
pub mod model;
pub mod node;

pub use commands::{Command, CommandEngine, CommandOutcome, KeyOutcome, Selection};
pub use model::{
    EditorError, NodePath, NodeSpan, ResolvedPos, SetAttributes, StructuredDocumentModel,
    Transaction,
};
pub use node::{Attributes, DocumentNode, IndentLevel, NodeType, INDENT_ATTRIBUTE, MAX_INDENT};
