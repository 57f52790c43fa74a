//! HTML form of the document tree
//!
//! Stored versions and `document_update` broadcasts carry the editor's HTML.
//! Block elements map onto block nodes and inline formatting onto text marks.
//! The indent level travels as the `data-indent` attribute, read the way
//! `parseInt` reads it and written only when above zero:
//!
//! ```text
//! <p data-indent="2">Whereas</p><p>the parties</p>
//! ```
//!
//! Container elements without a node of their own (`div`, `section`, table
//! parts) are unwrapped. Loose inline content at block level is wrapped in a
//! paragraph.

use crate::editor::node::{DocumentNode, IndentLevel, NodeType, INDENT_ATTRIBUTE};
use scraper::{ElementRef, Html, Node};
use serde_json::{json, Value};

/// Elements whose children are read as if they sat in the parent
const TRANSPARENT_BLOCKS: &[&str] = &[
    "div", "section", "article", "header", "footer", "main", "aside", "nav", "figure", "table",
    "thead", "tbody", "tfoot", "tr", "td", "th", "body",
];

/// Parse an HTML fragment into a `doc` node
///
/// The result always holds at least one block; empty input yields a single
/// empty paragraph.
pub fn parse_html(html: &str) -> DocumentNode {
    let fragment = Html::parse_fragment(html);
    let mut blocks = read_blocks(fragment.root_element());
    if blocks.is_empty() {
        blocks.push(DocumentNode::paragraph(""));
    }
    DocumentNode::doc(blocks)
}

/// Render a node and its descendants as HTML
pub fn to_html(node: &DocumentNode) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn read_blocks(container: ElementRef<'_>) -> Vec<DocumentNode> {
    let mut blocks = Vec::new();
    let mut loose = Vec::new();
    for child in container.children() {
        match child.value() {
            Node::Text(text) => push_text(&mut loose, text, &[]),
            Node::Element(_) => {
                let Some(element) = ElementRef::wrap(child) else {
                    continue;
                };
                if let Some(block) = read_block(element) {
                    flush_loose(&mut blocks, &mut loose);
                    blocks.push(block);
                } else if TRANSPARENT_BLOCKS.contains(&element.value().name()) {
                    flush_loose(&mut blocks, &mut loose);
                    blocks.extend(read_blocks(element));
                } else {
                    read_inline(element, &[], &mut loose);
                }
            }
            _ => {}
        }
    }
    flush_loose(&mut blocks, &mut loose);
    blocks
}

fn flush_loose(blocks: &mut Vec<DocumentNode>, loose: &mut Vec<DocumentNode>) {
    let inline = finish_inline(std::mem::take(loose));
    if !inline.is_empty() {
        blocks.push(DocumentNode::new(NodeType::Paragraph, inline));
    }
}

fn read_block(element: ElementRef<'_>) -> Option<DocumentNode> {
    let name = element.value().name();
    let mut node = if let Some(level) = heading_level(name) {
        let mut heading = DocumentNode::new(NodeType::Heading, read_inline_content(element));
        heading.attrs.set("level", Value::from(level));
        heading
    } else {
        match name {
            "p" => DocumentNode::new(NodeType::Paragraph, read_inline_content(element)),
            "blockquote" => DocumentNode::new(NodeType::Blockquote, read_blocks(element)),
            "ul" => DocumentNode::new(NodeType::BulletList, read_blocks(element)),
            "ol" => DocumentNode::new(NodeType::OrderedList, read_blocks(element)),
            "li" => DocumentNode::new(NodeType::ListItem, read_blocks(element)),
            "pre" => {
                let code: String = element.text().collect();
                let children = if code.is_empty() {
                    Vec::new()
                } else {
                    vec![DocumentNode::text(code)]
                };
                DocumentNode::new(NodeType::CodeBlock, children)
            }
            "hr" => DocumentNode::new(NodeType::HorizontalRule, Vec::new()),
            _ => return None,
        }
    };

    if let Some(raw) = element.value().attr(INDENT_ATTRIBUTE) {
        node.attrs.indent = IndentLevel::from_html_attribute(raw);
    }
    if let Some(align) = element.value().attr("style").and_then(text_align) {
        node.attrs.set("textAlign", Value::from(align));
    }
    Some(node)
}

fn heading_level(name: &str) -> Option<u8> {
    name.strip_prefix('h')
        .and_then(|level| level.parse::<u8>().ok())
        .filter(|level| (1..=6).contains(level))
}

fn text_align(style: &str) -> Option<String> {
    style.split(';').find_map(|declaration| {
        let (property, value) = declaration.split_once(':')?;
        (property.trim().eq_ignore_ascii_case("text-align")).then(|| value.trim().to_string())
    })
}

fn read_inline_content(element: ElementRef<'_>) -> Vec<DocumentNode> {
    let mut inline = Vec::new();
    read_inline_children(element, &[], &mut inline);
    finish_inline(inline)
}

fn read_inline_children(element: ElementRef<'_>, marks: &[Value], out: &mut Vec<DocumentNode>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_text(out, text, marks),
            Node::Element(_) => {
                if let Some(inner) = ElementRef::wrap(child) {
                    read_inline(inner, marks, out);
                }
            }
            _ => {}
        }
    }
}

fn read_inline(element: ElementRef<'_>, marks: &[Value], out: &mut Vec<DocumentNode>) {
    match element.value().name() {
        "br" => out.push(DocumentNode::new(NodeType::HardBreak, Vec::new())),
        "img" => {
            let mut image = DocumentNode::new(NodeType::Image, Vec::new());
            for key in ["src", "alt", "title"] {
                if let Some(value) = element.value().attr(key) {
                    image.attrs.set(key, Value::from(value));
                }
            }
            out.push(image);
        }
        _ => match mark_for(element) {
            Some(mark) => {
                let mut nested = marks.to_vec();
                nested.push(mark);
                read_inline_children(element, &nested, out);
            }
            None => read_inline_children(element, marks, out),
        },
    }
}

fn mark_for(element: ElementRef<'_>) -> Option<Value> {
    let kind = match element.value().name() {
        "strong" | "b" => "bold",
        "em" | "i" => "italic",
        "u" => "underline",
        "s" | "strike" | "del" => "strike",
        "code" => "code",
        "a" => {
            let href = element.value().attr("href").unwrap_or_default();
            return Some(json!({"type": "link", "attrs": {"href": href}}));
        }
        _ => return None,
    };
    Some(json!({ "type": kind }))
}

/// Append collapsed text, merging with the previous run when the marks match
fn push_text(out: &mut Vec<DocumentNode>, raw: &str, marks: &[Value]) {
    let mut text = collapse_whitespace(raw);
    let follows_space = out
        .last()
        .and_then(|node| node.text.as_deref())
        .map_or(false, |prev| prev.ends_with(' '));
    if follows_space {
        text = text.trim_start_matches(' ').to_string();
    }
    if text.is_empty() {
        return;
    }

    if let Some(last) = out.last_mut() {
        if last.is_text() && last.marks == marks {
            if let Some(prev) = last.text.as_mut() {
                prev.push_str(&text);
                return;
            }
        }
    }
    let mut node = DocumentNode::text(text);
    node.marks = marks.to_vec();
    out.push(node);
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Trim the edges of a block's inline content and drop emptied runs
fn finish_inline(mut inline: Vec<DocumentNode>) -> Vec<DocumentNode> {
    if let Some(text) = inline.first_mut().and_then(|node| node.text.as_mut()) {
        *text = text.trim_start_matches(' ').to_string();
    }
    if let Some(text) = inline.last_mut().and_then(|node| node.text.as_mut()) {
        *text = text.trim_end_matches(' ').to_string();
    }
    inline.retain(|node| !node.is_text() || node.text.as_deref().map_or(false, |t| !t.is_empty()));
    inline
}

fn write_node(node: &DocumentNode, out: &mut String) {
    match &node.node_type {
        NodeType::Doc | NodeType::Other(_) => write_children(node, out),
        NodeType::Text => write_text(node, out),
        NodeType::Paragraph => write_block("p", node, out),
        NodeType::Heading => {
            let level = node
                .attrs
                .get("level")
                .and_then(|level| level.as_u64())
                .unwrap_or(1)
                .clamp(1, 6);
            write_block(&format!("h{}", level), node, out);
        }
        NodeType::Blockquote => write_block("blockquote", node, out),
        NodeType::BulletList => write_block("ul", node, out),
        NodeType::OrderedList => write_block("ol", node, out),
        NodeType::ListItem => write_block("li", node, out),
        NodeType::CodeBlock => {
            out.push_str("<pre");
            write_block_attrs(node, out);
            out.push_str("><code>");
            escape_into(&node.text_content(), out);
            out.push_str("</code></pre>");
        }
        NodeType::HorizontalRule => out.push_str("<hr>"),
        NodeType::HardBreak => out.push_str("<br>"),
        NodeType::Image => {
            out.push_str("<img");
            for key in ["src", "alt", "title"] {
                if let Some(Value::String(value)) = node.attrs.get(key) {
                    write_attr(key, &value, out);
                }
            }
            out.push('>');
        }
    }
}

fn write_children(node: &DocumentNode, out: &mut String) {
    for child in &node.children {
        write_node(child, out);
    }
}

fn write_block(tag: &str, node: &DocumentNode, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    write_block_attrs(node, out);
    out.push('>');
    write_children(node, out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn write_block_attrs(node: &DocumentNode, out: &mut String) {
    if !node.indent().is_zero() {
        write_attr(INDENT_ATTRIBUTE, &node.indent().to_string(), out);
    }
    if let Some(Value::String(align)) = node.attrs.get("textAlign") {
        write_attr("style", &format!("text-align: {}", align), out);
    }
}

fn write_attr(name: &str, value: &str, out: &mut String) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    escape_into(value, out);
    out.push('"');
}

fn write_text(node: &DocumentNode, out: &mut String) {
    let open: Vec<(&str, Option<&str>)> = node.marks.iter().filter_map(mark_tag).collect();
    for (tag, href) in &open {
        out.push('<');
        out.push_str(tag);
        if let Some(href) = href {
            write_attr("href", href, out);
        }
        out.push('>');
    }
    escape_into(node.text.as_deref().unwrap_or_default(), out);
    for (tag, _) in open.iter().rev() {
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
}

fn mark_tag(mark: &Value) -> Option<(&'static str, Option<&str>)> {
    let tag = match mark.get("type")?.as_str()? {
        "bold" => "strong",
        "italic" => "em",
        "underline" => "u",
        "strike" => "s",
        "code" => "code",
        "link" => {
            let href = mark.pointer("/attrs/href").and_then(Value::as_str);
            return Some(("a", href));
        }
        _ => return None,
    };
    Some((tag, None))
}

fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
