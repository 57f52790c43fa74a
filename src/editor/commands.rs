//! Editing commands
//!
//! `CommandEngine` turns a command and a selection into one transaction over
//! every indentable node the selection touches. A command either commits all
//! of its changes or none of them, and always tells the caller what happened
//! so toolbar buttons can be enabled or disabled.

use crate::editor::model::{EditorError, StructuredDocumentModel, Transaction};
use crate::editor::node::{Attributes, NodeType};
use crate::shared::AppConfig;
use serde_json::Value;

/// Anchor and head positions of the editor selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// A collapsed selection (caret) at `pos`
    pub fn cursor(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }
}

/// A block-attribute command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Indent,
    Outdent,
    /// Set (or, with `null`, remove) an arbitrary block attribute
    SetAttribute { name: String, value: Value },
}

impl Command {
    fn transform(&self, attrs: &Attributes) -> Attributes {
        match self {
            Self::Indent => attrs.clone().with_indent(attrs.indent.increment()),
            Self::Outdent => attrs.clone().with_indent(attrs.indent.decrement()),
            Self::SetAttribute { name, value } => {
                let mut next = attrs.clone();
                next.set(name, value.clone());
                next
            }
        }
    }
}

/// Result of running a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A transaction committed, producing `version`
    Committed { version: u64, changed: usize },
    /// Eligible nodes were covered but all of them were already in the
    /// target state
    Unchanged { eligible: usize },
    /// The selection covers no eligible node
    NoEligibleNodes,
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::NoEligibleNodes)
    }
}

/// Result of offering a key press to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The key was consumed by a command
    Handled(CommandOutcome),
    /// Default editing behaviour should run
    PassThrough,
}

/// Applies commands to a `StructuredDocumentModel`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEngine {
    indentable_types: Vec<NodeType>,
}

impl Default for CommandEngine {
    fn default() -> Self {
        Self::new([NodeType::Paragraph, NodeType::Heading])
    }
}

impl CommandEngine {
    pub fn new(indentable_types: impl IntoIterator<Item = NodeType>) -> Self {
        Self {
            indentable_types: indentable_types.into_iter().collect(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.indentable_types.iter().cloned())
    }

    pub fn is_indentable(&self, node_type: &NodeType) -> bool {
        self.indentable_types.contains(node_type)
    }

    fn plan(
        &self,
        model: &StructuredDocumentModel,
        command: &Command,
        selection: Selection,
    ) -> Result<(usize, Transaction), EditorError> {
        model.check_position(selection.to())?;

        let mut transaction = model.transaction();
        let mut eligible = 0;
        for span in model.nodes_between(selection.from(), selection.to()) {
            if !self.is_indentable(&span.node.node_type) {
                continue;
            }
            eligible += 1;
            let next = command.transform(&span.node.attrs);
            if next != span.node.attrs {
                transaction.set_attributes(span.path, next);
            }
        }
        Ok((eligible, transaction))
    }

    /// Whether `command` would cover at least one eligible node
    pub fn can_execute(
        &self,
        model: &StructuredDocumentModel,
        command: &Command,
        selection: Selection,
    ) -> bool {
        matches!(self.plan(model, command, selection), Ok((eligible, _)) if eligible > 0)
    }

    /// Run `command` over every eligible node in `selection`
    pub fn execute(
        &self,
        model: &mut StructuredDocumentModel,
        command: &Command,
        selection: Selection,
    ) -> Result<CommandOutcome, EditorError> {
        let (eligible, transaction) = self.plan(model, command, selection)?;
        if eligible == 0 {
            tracing::debug!("[Editor] {:?} covers no eligible node", command);
            return Ok(CommandOutcome::NoEligibleNodes);
        }
        if transaction.is_empty() {
            return Ok(CommandOutcome::Unchanged { eligible });
        }

        let changed = transaction.steps().len();
        let version = model.apply(transaction)?;
        tracing::debug!(
            "[Editor] {:?} changed {} of {} node(s), version {}",
            command,
            changed,
            eligible,
            version
        );
        Ok(CommandOutcome::Committed { version, changed })
    }

    pub fn indent(
        &self,
        model: &mut StructuredDocumentModel,
        selection: Selection,
    ) -> Result<CommandOutcome, EditorError> {
        self.execute(model, &Command::Indent, selection)
    }

    pub fn outdent(
        &self,
        model: &mut StructuredDocumentModel,
        selection: Selection,
    ) -> Result<CommandOutcome, EditorError> {
        self.execute(model, &Command::Outdent, selection)
    }

    /// Offer a backspace press to the engine
    ///
    /// With a caret at the very start of an indented, indentable block the
    /// press outdents that block by one level instead of deleting anything.
    /// Every other case passes through to default deletion.
    pub fn handle_backspace(
        &self,
        model: &mut StructuredDocumentModel,
        selection: Selection,
    ) -> Result<KeyOutcome, EditorError> {
        if !selection.is_empty() {
            return Ok(KeyOutcome::PassThrough);
        }

        let resolved = model.resolve(selection.head)?;
        if resolved.parent_offset != 0 {
            return Ok(KeyOutcome::PassThrough);
        }
        let Some(parent) = model.root().get(&resolved.parent_path) else {
            return Ok(KeyOutcome::PassThrough);
        };
        if !self.is_indentable(&parent.node_type) || parent.indent().is_zero() {
            return Ok(KeyOutcome::PassThrough);
        }

        let attrs = Command::Outdent.transform(&parent.attrs);
        let mut transaction = model.transaction();
        transaction.set_attributes(resolved.parent_path, attrs);
        let version = model.apply(transaction)?;
        tracing::debug!("[Editor] Backspace outdented block, version {}", version);

        Ok(KeyOutcome::Handled(CommandOutcome::Committed {
            version,
            changed: 1,
        }))
    }
}
