//! WASM browser tests for rich-bridge-browser.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use std::sync::Arc;

use rich_bridge_browser::{
    Delta, DocumentState, EditorChange, SelectionRange, Source, clear_toolbar_node, js_error,
    parse_editor_change,
};

fn json(s: &str) -> JsValue {
    js_sys::JSON::parse(s).unwrap()
}

fn state_after() -> DocumentState {
    DocumentState {
        contents: Arc::new(Delta::new().insert("abx\n")),
        html: "<p>abx</p>".into(),
        selection: Some(SelectionRange::caret(3)),
    }
}

fn unreachable_state() -> DocumentState {
    panic!("document state is only read for text changes")
}

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

fn element(tag: &str, class: &str) -> web_sys::Element {
    let el = document().create_element(tag).unwrap();
    if !class.is_empty() {
        el.set_class_name(class);
    }
    el
}

// === editor-change conversion ===

#[wasm_bindgen_test]
fn test_parse_text_change() {
    let change = parse_editor_change(
        &JsValue::from_str("text-change"),
        &json(r#"{"ops":[{"retain":2},{"insert":"x","attributes":{"bold":true}}]}"#),
        &json(r#"{"ops":[{"insert":"ab\n"}]}"#),
        &JsValue::from_str("user"),
        state_after,
    )
    .unwrap();

    match change {
        EditorChange::TextChange {
            delta,
            old_contents,
            after,
            source,
        } => {
            assert_eq!(delta.ops.len(), 2);
            assert_eq!(*old_contents, Delta::new().insert("ab\n"));
            assert_eq!(after, state_after());
            assert_eq!(source, Source::User);
        }
        other => panic!("Expected TextChange, got {other:?}"),
    }
}

#[wasm_bindgen_test]
fn test_parse_selection_change_to_null() {
    let change = parse_editor_change(
        &JsValue::from_str("selection-change"),
        &JsValue::NULL,
        &json(r#"{"index":3,"length":1}"#),
        &JsValue::from_str("api"),
        unreachable_state,
    )
    .unwrap();

    assert_eq!(
        change,
        EditorChange::SelectionChange {
            range: None,
            old_range: Some(SelectionRange::new(3, 1)),
            source: Source::Api,
        }
    );
}

#[wasm_bindgen_test]
fn test_parse_unknown_event() {
    let change = parse_editor_change(
        &JsValue::from_str("scroll-optimize"),
        &JsValue::NULL,
        &JsValue::NULL,
        &JsValue::from_str("user"),
        unreachable_state,
    );
    assert!(change.is_none());
}

#[wasm_bindgen_test]
fn test_js_error_message() {
    let err = js_sys::Error::new("boom");
    assert_eq!(js_error(err.into()).0, "boom");
    assert_eq!(js_error(JsValue::from_str("plain")).0, "plain");
}

// === Chrome cleanup ===

#[wasm_bindgen_test]
fn test_clear_toolbar_and_tooltip() {
    let parent = element("div", "");
    let toolbar = element("div", "ql-toolbar ql-snow");
    let container = element("div", "ql-container");
    let tooltip = element("div", "ql-tooltip ql-hidden");
    parent.append_child(&toolbar).unwrap();
    parent.append_child(&container).unwrap();
    container.append_child(&tooltip).unwrap();

    assert_eq!(clear_toolbar_node(&container), 2);
    assert_eq!(parent.child_element_count(), 1);
    assert_eq!(container.child_element_count(), 0);
}

#[wasm_bindgen_test]
fn test_clear_leaves_unrelated_siblings() {
    let parent = element("div", "");
    let heading = element("h2", "title");
    let container = element("div", "ql-container");
    parent.append_child(&heading).unwrap();
    parent.append_child(&container).unwrap();

    assert_eq!(clear_toolbar_node(&container), 0);
    assert_eq!(parent.child_element_count(), 2);
}
