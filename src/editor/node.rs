//! Document tree nodes
//!
//! A document is a tree of typed nodes. Block nodes carry an attribute map
//! which always includes an indent level; text nodes carry their text and
//! optional marks.
//!
//! The external form is the JSON shape rich-text editors exchange:
//!
//! ```text
//! {"type": "paragraph", "attrs": {"data-indent": 2}, "content": [
//!     {"type": "text", "text": "Whereas"}
//! ]}
//! ```
//!
//! Stored versions carry the same tree as HTML (see [`crate::editor::html`]);
//! [`DocumentNode::from_value`] accepts either form.
//!
//! An indent of zero is the canonical "no indent" and is never written out;
//! a missing or unparsable `data-indent` reads back as zero. A `null` where
//! `attrs`, `content` or `marks` is expected reads as empty.

use crate::editor::html;
use crate::shared::SharedError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Deepest indent any node may carry
pub const MAX_INDENT: u8 = 4;

/// Attribute key used for the indent level in the external form
pub const INDENT_ATTRIBUTE: &str = "data-indent";

/// Indent level, always within `0..=MAX_INDENT`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndentLevel(u8);

impl IndentLevel {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(MAX_INDENT);

    /// Build a level, clamping into range
    pub fn new(level: i64) -> Self {
        Self(level.clamp(0, i64::from(MAX_INDENT)) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// One level deeper, stopping at `MAX_INDENT`
    pub fn increment(self) -> Self {
        Self(self.0.saturating_add(1).min(MAX_INDENT))
    }

    /// One level shallower, stopping at zero
    pub fn decrement(self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    /// Read an attribute value as written by editors: a number or a numeric string
    pub fn from_attribute(value: &Value) -> Self {
        match value {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|f| f.trunc() as i64))
                .map(Self::new)
                .unwrap_or_default(),
            Value::String(text) => text
                .trim()
                .parse::<i64>()
                .map(Self::new)
                .unwrap_or_default(),
            _ => Self::ZERO,
        }
    }

    /// Read an HTML attribute value: leading digits after an optional sign,
    /// anything unparsable is zero
    pub fn from_html_attribute(raw: &str) -> Self {
        let trimmed = raw.trim_start();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let magnitude = match rest[..end].parse::<i64>() {
            Ok(value) => value,
            Err(_) if end > 0 => i64::MAX,
            Err(_) => return Self::ZERO,
        };
        Self::new(if negative { -magnitude } else { magnitude })
    }
}

impl fmt::Display for IndentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Node type names
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    Doc,
    Paragraph,
    Heading,
    Blockquote,
    BulletList,
    OrderedList,
    ListItem,
    CodeBlock,
    HorizontalRule,
    HardBreak,
    Image,
    Text,
    Other(String),
}

impl NodeType {
    pub fn name(&self) -> &str {
        match self {
            Self::Doc => "doc",
            Self::Paragraph => "paragraph",
            Self::Heading => "heading",
            Self::Blockquote => "blockquote",
            Self::BulletList => "bulletList",
            Self::OrderedList => "orderedList",
            Self::ListItem => "listItem",
            Self::CodeBlock => "codeBlock",
            Self::HorizontalRule => "horizontalRule",
            Self::HardBreak => "hardBreak",
            Self::Image => "image",
            Self::Text => "text",
            Self::Other(name) => name,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "doc" => Self::Doc,
            "paragraph" => Self::Paragraph,
            "heading" => Self::Heading,
            "blockquote" => Self::Blockquote,
            "bulletList" | "bullet_list" => Self::BulletList,
            "orderedList" | "ordered_list" => Self::OrderedList,
            "listItem" | "list_item" => Self::ListItem,
            "codeBlock" | "code_block" => Self::CodeBlock,
            "horizontalRule" | "horizontal_rule" => Self::HorizontalRule,
            "hardBreak" | "hard_break" => Self::HardBreak,
            "image" => Self::Image,
            "text" => Self::Text,
            other => Self::Other(other.to_string()),
        }
    }

    /// Atom nodes occupy a single position and hold no content
    pub fn is_atom(&self) -> bool {
        matches!(self, Self::HorizontalRule | Self::HardBreak | Self::Image)
    }
}

impl From<String> for NodeType {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<NodeType> for String {
    fn from(node_type: NodeType) -> Self {
        node_type.name().to_string()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Block attributes: the indent level plus any other attribute carried through untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Value>", into = "BTreeMap<String, Value>")]
pub struct Attributes {
    pub indent: IndentLevel,
    pub extra: BTreeMap<String, Value>,
}

impl Attributes {
    /// True when nothing would be serialized
    pub fn is_empty(&self) -> bool {
        self.indent.is_zero() && self.extra.is_empty()
    }

    /// Look up an attribute by its external name
    pub fn get(&self, name: &str) -> Option<Value> {
        if name == INDENT_ATTRIBUTE {
            return Some(Value::from(self.indent.get()));
        }
        self.extra.get(name).cloned()
    }

    /// Set an attribute by its external name; `null` removes it
    pub fn set(&mut self, name: &str, value: Value) {
        if name == INDENT_ATTRIBUTE {
            self.indent = IndentLevel::from_attribute(&value);
        } else if value.is_null() {
            self.extra.remove(name);
        } else {
            self.extra.insert(name.to_string(), value);
        }
    }

    pub fn with_indent(mut self, indent: IndentLevel) -> Self {
        self.indent = indent;
        self
    }
}

impl From<BTreeMap<String, Value>> for Attributes {
    fn from(mut map: BTreeMap<String, Value>) -> Self {
        let indent = map
            .remove(INDENT_ATTRIBUTE)
            .map(|value| IndentLevel::from_attribute(&value))
            .unwrap_or_default();
        Self { indent, extra: map }
    }
}

impl From<Attributes> for BTreeMap<String, Value> {
    fn from(attrs: Attributes) -> Self {
        let mut map = attrs.extra;
        if !attrs.indent.is_zero() {
            map.insert(INDENT_ATTRIBUTE.to_string(), Value::from(attrs.indent.get()));
        }
        map
    }
}

/// A node of the document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentNode {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(
        default,
        rename = "attrs",
        deserialize_with = "null_as_default",
        skip_serializing_if = "Attributes::is_empty"
    )]
    pub attrs: Attributes,
    #[serde(
        default,
        rename = "content",
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<DocumentNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub marks: Vec<Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl DocumentNode {
    /// A node of any type with the given children
    pub fn new(node_type: NodeType, children: Vec<DocumentNode>) -> Self {
        Self {
            node_type,
            attrs: Attributes::default(),
            children,
            text: None,
            marks: Vec::new(),
        }
    }

    pub fn doc(children: Vec<DocumentNode>) -> Self {
        Self::new(NodeType::Doc, children)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(NodeType::Text, Vec::new())
        }
    }

    /// A paragraph holding a single text run (or nothing, for empty text)
    pub fn paragraph(text: &str) -> Self {
        Self::new(NodeType::Paragraph, text_children(text))
    }

    pub fn heading(level: u8, text: &str) -> Self {
        let mut node = Self::new(NodeType::Heading, text_children(text));
        node.attrs.set("level", Value::from(level));
        node
    }

    pub fn with_indent(mut self, level: u8) -> Self {
        self.attrs.indent = IndentLevel::new(i64::from(level));
        self
    }

    pub fn indent(&self) -> IndentLevel {
        self.attrs.indent
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Number of positions this node spans in its parent
    ///
    /// Text counts UTF-16 code units, the unit browser editors report
    /// selections in.
    pub fn node_size(&self) -> usize {
        if self.is_text() {
            self.text.as_deref().map_or(0, |t| t.encode_utf16().count())
        } else if self.node_type.is_atom() {
            1
        } else {
            self.content_size() + 2
        }
    }

    /// Number of positions inside this node
    pub fn content_size(&self) -> usize {
        self.children.iter().map(DocumentNode::node_size).sum()
    }

    /// Concatenated text of the node and its descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Descendant at a child-index path (empty path is `self`)
    pub fn get(&self, path: &[usize]) -> Option<&DocumentNode> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }

    pub fn get_mut(&mut self, path: &[usize]) -> Option<&mut DocumentNode> {
        let mut node = self;
        for &index in path {
            node = node.children.get_mut(index)?;
        }
        Some(node)
    }

    /// Parse the external JSON form
    pub fn from_json_str(json: &str) -> Result<Self, SharedError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Interpret an arbitrary JSON value as a document tree, if it is one
    ///
    /// Objects are read as the JSON form. Strings holding a JSON object are
    /// read the same way; any other string is read as HTML.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(_) => serde_json::from_value(value.clone()).ok(),
            Value::String(text) if text.trim_start().starts_with('{') => {
                Self::from_json_str(text).ok()
            }
            Value::String(text) => Some(html::parse_html(text)),
            _ => None,
        }
    }

    pub fn from_html(html: &str) -> Self {
        html::parse_html(html)
    }

    pub fn to_html(&self) -> String {
        html::to_html(self)
    }

    pub fn to_json_string(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }
}

fn text_children(text: &str) -> Vec<DocumentNode> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![DocumentNode::text(text)]
    }
}
