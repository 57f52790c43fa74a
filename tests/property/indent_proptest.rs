//! Property-based tests for indent clamping

use crate::common::paragraphs;
use lexdraft::editor::{CommandEngine, IndentLevel, Selection, MAX_INDENT};
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_indent_is_min_level_plus_one(level in 0u8..=MAX_INDENT) {
        let engine = CommandEngine::default();
        let mut model = paragraphs(&[("clause", level)]);
        let outcome = engine.indent(&mut model, Selection::cursor(1)).unwrap();
        prop_assert!(outcome.is_success());
        prop_assert_eq!(model.root().children[0].indent().get(), (level + 1).min(MAX_INDENT));
    }

    #[test]
    fn test_outdent_is_max_level_minus_one(level in 0u8..=MAX_INDENT) {
        let engine = CommandEngine::default();
        let mut model = paragraphs(&[("clause", level)]);
        engine.outdent(&mut model, Selection::cursor(1)).unwrap();
        prop_assert_eq!(model.root().children[0].indent().get(), level.saturating_sub(1));
    }

    #[test]
    fn test_repeated_commands_stay_in_range(steps in proptest::collection::vec(any::<bool>(), 0..60)) {
        let engine = CommandEngine::default();
        let mut model = paragraphs(&[("a", 0), ("b", 2)]);
        let end = model.content_size();
        for indent in steps {
            let selection = Selection::new(0, end);
            if indent {
                engine.indent(&mut model, selection).unwrap();
            } else {
                engine.outdent(&mut model, selection).unwrap();
            }
            for node in &model.root().children {
                prop_assert!(node.indent().get() <= MAX_INDENT);
            }
        }
    }

    #[test]
    fn test_parsed_indent_is_clamped(raw in any::<i64>()) {
        let level = IndentLevel::from_attribute(&serde_json::json!(raw));
        prop_assert!(level.get() <= MAX_INDENT);
        prop_assert_eq!(level.is_zero(), raw <= 0);
    }
}

#[test]
fn test_twenty_indents_never_exceed_max() {
    let engine = CommandEngine::default();
    let mut model = paragraphs(&[("clause", 0)]);
    for _ in 0..25 {
        engine.indent(&mut model, Selection::cursor(1)).unwrap();
        assert!(model.root().children[0].indent().get() <= MAX_INDENT);
    }
    assert_eq!(model.root().children[0].indent(), IndentLevel::MAX);
}
