//! Indent commands on realistic documents

use crate::common::{block_start, paragraphs};
use crate::{assert_err, assert_indents, assert_ok};
use lexdraft::editor::{
    Command, CommandEngine, CommandOutcome, DocumentNode, EditorError, KeyOutcome, NodeType,
    Selection, StructuredDocumentModel,
};
use lexdraft::shared::AppConfig;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

#[test]
fn test_backspace_outdents_instead_of_merging() {
    let engine = CommandEngine::default();
    let mut model = paragraphs(&[("1. Definitions", 0), ("1.1 Confidential Information", 2)]);
    let caret = block_start(&model, 1);

    let outcome = assert_ok!(engine.handle_backspace(&mut model, Selection::cursor(caret)));
    assert!(matches!(outcome, KeyOutcome::Handled(_)));
    assert_indents!(model, [0, 1]);
    assert_eq!(model.root().children.len(), 2);
    assert_eq!(
        model.root().children[1].text_content(),
        "1.1 Confidential Information"
    );

    assert_ok!(engine.handle_backspace(&mut model, Selection::cursor(caret)));
    assert_indents!(model, [0, 0]);
    let outcome = assert_ok!(engine.handle_backspace(&mut model, Selection::cursor(caret)));
    assert_eq!(outcome, KeyOutcome::PassThrough);
}

#[test]
fn test_backspace_on_non_indentable_block_passes_through() {
    let engine = CommandEngine::default();
    let mut quote = DocumentNode::new(NodeType::Blockquote, vec![DocumentNode::text("quoted")]);
    quote.attrs.set("data-indent", json!(2));
    let mut model = StructuredDocumentModel::new(DocumentNode::doc(vec![quote]));

    let outcome = assert_ok!(engine.handle_backspace(&mut model, Selection::cursor(1)));
    assert_eq!(outcome, KeyOutcome::PassThrough);
}

#[test]
fn test_indent_whole_document_is_one_transaction() {
    let engine = CommandEngine::default();
    let mut model = paragraphs(&[("a", 0), ("b", 3), ("c", 4)]);
    let end = model.content_size();

    let outcome = assert_ok!(engine.indent(&mut model, Selection::new(0, end)));
    assert_eq!(
        outcome,
        CommandOutcome::Committed {
            version: 1,
            changed: 2
        }
    );
    assert_indents!(model, [1, 4, 4]);
}

#[test]
fn test_reversed_selection_behaves_the_same() {
    let engine = CommandEngine::default();
    let mut forward = paragraphs(&[("abc", 0), ("def", 0)]);
    let mut backward = forward.clone();
    engine.indent(&mut forward, Selection::new(2, 7)).unwrap();
    engine.indent(&mut backward, Selection::new(7, 2)).unwrap();
    assert_eq!(forward, backward);
}

#[test]
fn test_serialization_omits_zero_indent() {
    let engine = CommandEngine::default();
    let mut model = paragraphs(&[("abc", 1)]);
    engine.outdent(&mut model, Selection::cursor(1)).unwrap();

    let value: Value = serde_json::from_str(&model.to_json().unwrap()).unwrap();
    assert_eq!(
        value,
        json!({"type": "doc", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "abc"}]}]})
    );

    engine.indent(&mut model, Selection::cursor(1)).unwrap();
    let value = model.to_value().unwrap();
    assert_eq!(value["content"][0]["attrs"], json!({"data-indent": 1}));
}

#[test]
fn test_parse_tolerates_string_and_missing_indent() {
    let model = assert_ok!(StructuredDocumentModel::from_json(
        r#"{"type":"doc","content":[
            {"type":"paragraph","attrs":{"data-indent":"2"}},
            {"type":"heading","attrs":{"level":2}},
            {"type":"paragraph","attrs":{"data-indent":"wide"}}
        ]}"#
    ));
    assert_indents!(model, [2, 0, 0]);
}

#[test]
fn test_engine_from_config() {
    let config = AppConfig::builder()
        .indentable_types(vec![NodeType::Paragraph, NodeType::Blockquote])
        .build()
        .unwrap();
    let engine = CommandEngine::from_config(&config);
    assert!(engine.is_indentable(&NodeType::Blockquote));
    assert!(!engine.is_indentable(&NodeType::Heading));
}

#[test]
fn test_can_execute_reflects_selection() {
    let engine = CommandEngine::default();
    let model = StructuredDocumentModel::new(DocumentNode::doc(vec![
        DocumentNode::new(NodeType::HorizontalRule, Vec::new()),
        DocumentNode::paragraph("text"),
    ]));
    assert!(!engine.can_execute(&model, &Command::Indent, Selection::new(0, 1)));
    assert!(engine.can_execute(&model, &Command::Indent, Selection::cursor(3)));
}

#[test]
fn test_stale_positions_are_errors() {
    let engine = CommandEngine::default();
    let mut model = paragraphs(&[("abc", 0)]);
    assert_err!(
        engine.indent(&mut model, Selection::new(0, 99)),
        EditorError::InvalidPosition { .. }
    );
    assert_err!(
        engine.handle_backspace(&mut model, Selection::cursor(99)),
        EditorError::InvalidPosition { .. }
    );
}

#[test]
fn test_replace_content_resets_tree() {
    let engine = CommandEngine::default();
    let mut model = paragraphs(&[("old", 3)]);
    let version = model.replace_content(DocumentNode::doc(vec![DocumentNode::paragraph("new")]));
    assert_eq!(version, 1);
    assert_indents!(model, [0]);

    engine.indent(&mut model, Selection::cursor(1)).unwrap();
    assert_eq!(model.version(), 2);
}

#[test]
fn test_stored_html_indents_and_writes_back() {
    let engine = CommandEngine::default();
    let mut model = StructuredDocumentModel::from_html(
        r#"<h1>Agreement</h1><p data-indent="1">Whereas the parties</p><p>agree as follows</p>"#,
    );
    assert_indents!(model, [0, 1, 0]);

    let end = model.content_size();
    assert_ok!(engine.indent(&mut model, Selection::new(0, end)));
    assert_eq!(
        model.to_html(),
        r#"<h1 data-indent="1">Agreement</h1><p data-indent="2">Whereas the parties</p><p data-indent="1">agree as follows</p>"#
    );

    assert_ok!(engine.outdent(&mut model, Selection::new(0, end)));
    assert_ok!(engine.outdent(&mut model, Selection::new(0, end)));
    assert_eq!(
        model.to_html(),
        "<h1>Agreement</h1><p>Whereas the parties</p><p>agree as follows</p>"
    );
}

#[test]
fn test_positions_count_utf16_units() {
    let mut model = paragraphs(&[("\u{1F4DD} note", 1), ("next", 0)]);
    let caret = block_start(&model, 1);
    assert_eq!(caret, 10);
    assert_eq!(model.content_size(), 15);

    let engine = CommandEngine::default();
    let outcome = assert_ok!(engine.handle_backspace(&mut model, Selection::cursor(2)));
    assert_eq!(outcome, KeyOutcome::PassThrough);
    let outcome = assert_ok!(engine.handle_backspace(&mut model, Selection::cursor(1)));
    assert!(matches!(outcome, KeyOutcome::Handled(_)));
    assert_indents!(model, [0, 0]);
}
