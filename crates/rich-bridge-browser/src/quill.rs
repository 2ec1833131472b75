//! Raw bindings to the global `Quill` class.
//!
//! Only the calls the bridge needs. Structured arguments and results
//! (deltas, ranges, bounds, formats) cross as plain `JsValue`s and are
//! converted in `engine`.

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// A Quill editor instance.
    #[derive(Clone)]
    pub type Quill;

    #[wasm_bindgen(constructor, catch)]
    pub fn new(container: &web_sys::HtmlElement, options: &JsValue) -> Result<Quill, JsValue>;

    /// The contenteditable element Quill renders into.
    #[wasm_bindgen(method, getter)]
    pub fn root(this: &Quill) -> web_sys::HtmlElement;

    #[wasm_bindgen(method, getter)]
    pub fn clipboard(this: &Quill) -> QuillClipboard;

    #[wasm_bindgen(method, js_name = getLength)]
    pub fn get_length(this: &Quill) -> u32;

    #[wasm_bindgen(method, js_name = getText)]
    pub fn get_text(this: &Quill, index: u32, length: Option<u32>) -> String;

    #[wasm_bindgen(method, js_name = getContents)]
    pub fn get_contents(this: &Quill) -> JsValue;

    #[wasm_bindgen(method, catch, js_name = setContents)]
    pub fn set_contents(this: &Quill, delta: &JsValue, source: &str) -> Result<JsValue, JsValue>;

    /// `null` when the editor does not have focus.
    #[wasm_bindgen(method, js_name = getSelection)]
    pub fn get_selection(this: &Quill) -> JsValue;

    #[wasm_bindgen(method, js_name = setSelection)]
    pub fn set_selection(this: &Quill, range: &JsValue, source: &str);

    #[wasm_bindgen(method, js_name = getBounds)]
    pub fn get_bounds(this: &Quill, index: u32, length: u32) -> JsValue;

    #[wasm_bindgen(method, js_name = getFormat)]
    pub fn get_format(this: &Quill, index: u32, length: u32) -> JsValue;

    /// Formats of the current selection.
    #[wasm_bindgen(method, js_name = getFormat)]
    pub fn get_selection_format(this: &Quill) -> JsValue;

    #[wasm_bindgen(method, js_name = getIndex)]
    pub fn get_index(this: &Quill, blot: &JsValue) -> u32;

    /// `[leaf, offset]`, with a `null` leaf past the end.
    #[wasm_bindgen(method, js_name = getLeaf)]
    pub fn get_leaf(this: &Quill, index: u32) -> js_sys::Array;

    #[wasm_bindgen(method, js_name = hasFocus)]
    pub fn has_focus(this: &Quill) -> bool;

    #[wasm_bindgen(method)]
    pub fn focus(this: &Quill);

    #[wasm_bindgen(method)]
    pub fn blur(this: &Quill);

    #[wasm_bindgen(method)]
    pub fn enable(this: &Quill, enabled: bool);

    #[wasm_bindgen(method)]
    pub fn on(this: &Quill, event: &str, handler: &js_sys::Function);

    /// Removes every handler registered for `event`.
    #[wasm_bindgen(method)]
    pub fn off(this: &Quill, event: &str);

    /// The clipboard module, used for HTML conversion.
    pub type QuillClipboard;

    #[wasm_bindgen(method, catch)]
    pub fn convert(this: &QuillClipboard, html: &str) -> Result<JsValue, JsValue>;
}
