//! WASM browser tests for rich-bridge-js.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;
use web_sys::HtmlElement;

wasm_bindgen_test_configure!(run_in_browser);

use rich_bridge_js::JsRichEditor;

fn props(json: &str) -> Object {
    js_sys::JSON::parse(json).unwrap().into()
}

fn render(editor: &JsRichEditor, props: Object) -> JsValue {
    editor
        .render(props.into())
        .unwrap_or_else(|_| panic!("render failed"))
}

fn get(value: &JsValue, key: &str) -> JsValue {
    Reflect::get(value, &JsValue::from_str(key)).unwrap()
}

#[wasm_bindgen_test]
fn test_render_without_host_describes_surface() {
    let editor = JsRichEditor::new();
    let surface = render(
        &editor,
        props(r#"{"value": "<p>hi</p>", "className": "notes"}"#),
    );

    assert_eq!(get(&surface, "role").as_string().unwrap(), "textbox");
    assert_eq!(get(&surface, "testId").as_string().unwrap(), "rich-editor-core");
    assert_eq!(get(&surface, "areaTag").as_string().unwrap(), "div");
    assert_eq!(get(&surface, "version").as_f64().unwrap(), 0.0);
    let attributes = get(&surface, "attributes");
    assert_eq!(get(&attributes, "className").as_string().unwrap(), "notes");
    assert!(editor.editor().is_null());
}

#[wasm_bindgen_test]
fn test_callback_props_are_not_configuration() {
    let editor = JsRichEditor::new();
    let with_callbacks = props(r#"{"theme": "snow"}"#);
    let noop = Function::new_no_args("");
    Reflect::set(&with_callbacks, &"onChange".into(), &noop).unwrap();
    Reflect::set(&with_callbacks, &"onBlur".into(), &noop).unwrap();

    let surface = render(&editor, with_callbacks);
    let attributes = get(&surface, "attributes");
    assert!(get(&attributes, "onChange").is_undefined());
}

#[wasm_bindgen_test]
fn test_configuration_change_bumps_version() {
    let editor = JsRichEditor::new();
    render(&editor, props(r#"{"theme": "snow"}"#));
    render(&editor, props(r#"{"theme": "snow", "placeholder": "x"}"#));
    assert_eq!(editor.version(), 0.0);

    let surface = render(
        &editor,
        props(r#"{"theme": "bubble", "preserveWhitespace": true}"#),
    );
    assert_eq!(get(&surface, "version").as_f64().unwrap(), 1.0);
    assert_eq!(get(&surface, "areaTag").as_string().unwrap(), "pre");
}

#[wasm_bindgen_test]
fn test_invalid_props_are_rejected() {
    let editor = JsRichEditor::new();
    assert!(editor.render(props(r#"{"readOnly": "yes"}"#).into()).is_err());
}

// === Mounted on a stand-in Quill ===

/// A minimal global `Quill` with plain-text documents and a `type` helper
/// that behaves like user input.
const FAKE_QUILL: &str = r#"
globalThis.Quill = class {
  constructor(container) {
    this.root = document.createElement('div');
    container.appendChild(this.root);
    this.ops = [{ insert: '\n' }];
    this.range = null;
    this.handlers = [];
    this.clipboard = {
      convert: (html) => ({ ops: [{ insert: html.replace(/<[^>]*>/g, '') }] }),
    };
    this.render();
  }
  text() { return this.ops.map((op) => op.insert).join(''); }
  render() { this.root.innerHTML = '<p>' + this.text().slice(0, -1) + '</p>'; }
  emit(...args) { for (const handler of this.handlers) handler(...args); }
  getLength() { return this.text().length; }
  getText() { return this.text(); }
  getContents() { return { ops: this.ops.map((op) => ({ ...op })) }; }
  setContents(delta, source) {
    const old = this.getContents();
    let text = delta.ops.map((op) => op.insert).join('');
    if (!text.endsWith('\n')) text += '\n';
    this.ops = [{ insert: text }];
    this.render();
    if (source !== 'silent') this.emit('text-change', delta, old, source);
    return delta;
  }
  type(index, text) {
    const old = this.getContents();
    const current = this.text();
    this.ops = [{ insert: current.slice(0, index) + text + current.slice(index) }];
    this.render();
    this.emit('text-change', { ops: [{ retain: index }, { insert: text }] }, old, 'user');
  }
  getSelection() { return this.range; }
  setSelection(range) { this.range = range; }
  hasFocus() { return this.range !== null; }
  focus() {}
  blur() { this.range = null; }
  enable() {}
  on(name, handler) { this.handlers.push(handler); }
  off() { this.handlers = []; }
};
"#;

fn install_fake_quill() {
    Function::new_no_args(FAKE_QUILL)
        .call0(&JsValue::NULL)
        .unwrap();
}

fn host() -> HtmlElement {
    Function::new_no_args("return document.createElement('div')")
        .call0(&JsValue::NULL)
        .unwrap()
        .unchecked_into()
}

/// A JS function that pushes its arguments onto `calls`.
fn recorder(calls: &Array) -> Function {
    Function::new_with_args("calls", "return (...args) => { calls.push(args); }")
        .call1(&JsValue::NULL, calls)
        .unwrap()
        .unchecked_into()
}

fn mounted(props_object: &Object) -> JsRichEditor {
    install_fake_quill();
    let editor = JsRichEditor::new();
    render(&editor, props_object.clone());
    editor.set_host(Some(host())).unwrap_or_else(|_| panic!("set_host failed"));
    render(&editor, props_object.clone());
    editor
}

fn type_text(editor: &JsRichEditor, index: u32, text: &str) {
    let quill = editor.editor();
    let type_fn: Function = get(&quill, "type").unchecked_into();
    type_fn
        .call2(&quill, &JsValue::from(index), &JsValue::from_str(text))
        .unwrap();
}

#[wasm_bindgen_test]
fn test_editor_ref_object_follows_instance() {
    let editor_ref = props(r#"{"current": "untouched"}"#);
    let base = props(r#"{"value": "<p>hi</p>"}"#);
    Reflect::set(&base, &"editorRef".into(), &editor_ref).unwrap();

    install_fake_quill();
    let editor = JsRichEditor::new();
    render(&editor, base.clone());
    assert_eq!(get(&editor_ref, "current").as_string().unwrap(), "untouched");

    editor.set_host(Some(host())).unwrap_or_else(|_| panic!("set_host failed"));
    render(&editor, base.clone());
    let first = get(&editor_ref, "current");
    assert!(Object::is(&first, &editor.editor()));

    let bubble = Object::assign(&Object::new(), &base);
    Reflect::set(&bubble, &"theme".into(), &"bubble".into()).unwrap();
    render(&editor, bubble);
    let second = get(&editor_ref, "current");
    assert!(Object::is(&second, &editor.editor()));
    assert!(!Object::is(&first, &second));

    editor.unmount().unwrap_or_else(|_| panic!("unmount failed"));
    assert!(get(&editor_ref, "current").is_null());
}

#[wasm_bindgen_test]
fn test_editor_ref_callback_sees_null_between_instances() {
    let calls = Array::new();
    let base = props(r#"{"theme": "snow"}"#);
    Reflect::set(&base, &"editorRef".into(), &recorder(&calls)).unwrap();
    let editor = mounted(&base);

    let bubble = Object::assign(&Object::new(), &base);
    Reflect::set(&bubble, &"theme".into(), &"bubble".into()).unwrap();
    render(&editor, bubble);
    editor.unmount().unwrap_or_else(|_| panic!("unmount failed"));

    let received: Vec<bool> = calls
        .iter()
        .map(|args| Array::from(&args).get(0).is_null())
        .collect();
    assert_eq!(received, vec![false, true, false, true]);
}

#[wasm_bindgen_test]
fn test_unchanged_delta_value_survives_many_edits() {
    let changes = Array::new();
    let value = props(r#"{"ops": [{"insert": "ab\n"}]}"#);
    let base = Object::new();
    Reflect::set(&base, &"value".into(), &value).unwrap();
    Reflect::set(&base, &"onChange".into(), &recorder(&changes)).unwrap();
    let editor = mounted(&base);

    for (index, text) in [(0, "x"), (1, "y"), (2, "z")] {
        type_text(&editor, index, text);
    }
    assert_eq!(changes.length(), 3);

    // the host re-renders with the very object it passed at first
    render(&editor, base.clone());
    let view = editor.get_editor().unwrap();
    assert_eq!(view.get_text(None, None), "xyzab\n");
    assert_eq!(changes.length(), 3);
}

#[wasm_bindgen_test]
fn test_each_typed_change_reports_its_own_document() {
    let changes = Array::new();
    let base = props(r#"{"value": "<p>ab</p>"}"#);
    Reflect::set(&base, &"onChange".into(), &recorder(&changes)).unwrap();
    let editor = mounted(&base);

    type_text(&editor, 0, "x");
    type_text(&editor, 1, "y");

    let values: Vec<String> = changes
        .iter()
        .map(|args| Array::from(&args).get(0).as_string().unwrap())
        .collect();
    assert_eq!(values, vec!["<p>xab</p>", "<p>xyab</p>"]);
}
