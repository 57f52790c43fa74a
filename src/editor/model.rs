/**
 * Structured Document Model
 *
 * Holds the current document tree and its version. The tree only changes
 * through a committed `Transaction` or a wholesale `replace_content`, and
 * every change bumps the version exactly once.
 *
 * # Positions
 *
 * Positions address the gaps between nodes and characters. Position 0 is
 * the start of the root's content. A node with content spans
 * `content_size + 2` positions (its opening and closing boundaries), a text
 * node one position per UTF-16 code unit and any other leaf one position.
 *
 * ```text
 *   0   1 2 3 4   5   6 7 8 9   10
 *   <p>  a b c  </p> <p> d e f </p>
 * ```
 */
use crate::editor::node::{Attributes, DocumentNode, NodeType};
use crate::shared::SharedError;
use thiserror::Error;

/// Child indices from the root down to a node
pub type NodePath = Vec<usize>;

/// Errors raised when applying changes to the model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("transaction was built against version {expected}, document is at {actual}")]
    StaleVersion { expected: u64, actual: u64 },
    #[error("no node at path {0:?}")]
    InvalidPath(NodePath),
    #[error("position {pos} is outside the document (size {size})")]
    InvalidPosition { pos: usize, size: usize },
}

/// A node found by `nodes_between`
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpan<'a> {
    pub node: &'a DocumentNode,
    pub path: NodePath,
    /// Position directly before the node
    pub pos: usize,
}

/// A position resolved against the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPos {
    pub pos: usize,
    /// Path of the innermost node whose content contains the position
    pub parent_path: NodePath,
    /// Offset of the position inside that node's content
    pub parent_offset: usize,
}

impl ResolvedPos {
    pub fn depth(&self) -> usize {
        self.parent_path.len()
    }
}

/// Replace the attributes of the node at `path`
#[derive(Debug, Clone, PartialEq)]
pub struct SetAttributes {
    pub path: NodePath,
    pub attrs: Attributes,
}

/// A batch of attribute changes committed as one unit
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    base_version: u64,
    steps: Vec<SetAttributes>,
}

impl Transaction {
    pub fn new(base_version: u64) -> Self {
        Self {
            base_version,
            steps: Vec::new(),
        }
    }

    pub fn set_attributes(&mut self, path: NodePath, attrs: Attributes) -> &mut Self {
        self.steps.push(SetAttributes { path, attrs });
        self
    }

    pub fn base_version(&self) -> u64 {
        self.base_version
    }

    pub fn steps(&self) -> &[SetAttributes] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// The document tree of one editor view
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredDocumentModel {
    root: DocumentNode,
    version: u64,
}

impl Default for StructuredDocumentModel {
    fn default() -> Self {
        Self::new(DocumentNode::doc(vec![DocumentNode::paragraph("")]))
    }
}

impl StructuredDocumentModel {
    pub fn new(root: DocumentNode) -> Self {
        Self { root, version: 0 }
    }

    /// Parse the external JSON form
    pub fn from_json(json: &str) -> Result<Self, SharedError> {
        Ok(Self::new(DocumentNode::from_json_str(json)?))
    }

    pub fn to_json(&self) -> Result<String, SharedError> {
        self.root.to_json_string()
    }

    pub fn to_value(&self) -> Result<serde_json::Value, SharedError> {
        Ok(serde_json::to_value(&self.root)?)
    }

    /// Parse the stored HTML form
    pub fn from_html(html: &str) -> Self {
        Self::new(DocumentNode::from_html(html))
    }

    pub fn to_html(&self) -> String {
        self.root.to_html()
    }

    pub fn root(&self) -> &DocumentNode {
        &self.root
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Size of the root's content, the largest valid position
    pub fn content_size(&self) -> usize {
        self.root.content_size()
    }

    /// Start a transaction against the current version
    pub fn transaction(&self) -> Transaction {
        Transaction::new(self.version)
    }

    /// Every node whose span overlaps `from..to`, in document order
    ///
    /// A collapsed range yields the nodes enclosing the position.
    pub fn nodes_between(&self, from: usize, to: usize) -> Vec<NodeSpan<'_>> {
        let mut found = Vec::new();
        let mut path = Vec::new();
        collect_between(&self.root, from, to, 0, &mut path, &mut found);
        found
    }

    /// Find the innermost node containing `pos` and the offset inside it
    pub fn resolve(&self, pos: usize) -> Result<ResolvedPos, EditorError> {
        self.check_position(pos)?;

        let mut node = &self.root;
        let mut parent_path = Vec::new();
        let mut offset = pos;
        while let Some((index, child, child_start)) = child_containing(node, offset) {
            if child.is_text() {
                break;
            }
            parent_path.push(index);
            node = child;
            offset -= child_start + 1;
        }

        Ok(ResolvedPos {
            pos,
            parent_path,
            parent_offset: offset,
        })
    }

    pub fn check_position(&self, pos: usize) -> Result<(), EditorError> {
        let size = self.content_size();
        if pos > size {
            return Err(EditorError::InvalidPosition { pos, size });
        }
        Ok(())
    }

    /// Commit a transaction; either every step applies or none does
    ///
    /// Returns the new version. An empty transaction leaves the version
    /// unchanged.
    pub fn apply(&mut self, transaction: Transaction) -> Result<u64, EditorError> {
        if transaction.base_version != self.version {
            return Err(EditorError::StaleVersion {
                expected: transaction.base_version,
                actual: self.version,
            });
        }
        if transaction.is_empty() {
            return Ok(self.version);
        }

        let mut next = self.root.clone();
        for step in transaction.steps {
            let node = next
                .get_mut(&step.path)
                .ok_or_else(|| EditorError::InvalidPath(step.path.clone()))?;
            node.attrs = step.attrs;
        }

        self.root = next;
        self.version += 1;
        Ok(self.version)
    }

    /// Replace the whole tree, as when another version of the document loads
    pub fn replace_content(&mut self, root: DocumentNode) -> u64 {
        if root.node_type != NodeType::Doc {
            tracing::warn!("[Editor] Replacing content with a '{}' root", root.node_type);
        }
        self.root = root;
        self.version += 1;
        tracing::info!("[Editor] Content replaced, now at version {}", self.version);
        self.version
    }
}

fn collect_between<'a>(
    node: &'a DocumentNode,
    from: usize,
    to: usize,
    content_start: usize,
    path: &mut NodePath,
    found: &mut Vec<NodeSpan<'a>>,
) {
    let mut pos = 0;
    for (index, child) in node.children.iter().enumerate() {
        if pos >= to {
            break;
        }
        let end = pos + child.node_size();
        if end > from {
            path.push(index);
            found.push(NodeSpan {
                node: child,
                path: path.clone(),
                pos: content_start + pos,
            });
            if !child.children.is_empty() {
                let inner = pos + 1;
                collect_between(
                    child,
                    from.saturating_sub(inner),
                    to.saturating_sub(inner).min(child.content_size()),
                    content_start + inner,
                    path,
                    found,
                );
            }
            path.pop();
        }
        pos = end;
    }
}

/// The child strictly containing `offset`, with its index and start offset
fn child_containing(node: &DocumentNode, offset: usize) -> Option<(usize, &DocumentNode, usize)> {
    let mut start = 0;
    for (index, child) in node.children.iter().enumerate() {
        if offset <= start {
            return None;
        }
        let end = start + child.node_size();
        if offset < end {
            return Some((index, child, start));
        }
        start = end;
    }
    None
}
