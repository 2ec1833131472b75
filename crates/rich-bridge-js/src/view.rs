//! Read-only editor proxy handed to JavaScript callbacks.

use rich_bridge_browser::{Quill, QuillEngine, ReadOnlyEditor};
use wasm_bindgen::prelude::*;

/// Accessor-only view of the live editor.
///
/// Passed as the last argument of every callback. It has no way to change
/// the document or selection, so a callback cannot re-enter the editor
/// while an event is being dispatched.
#[wasm_bindgen]
pub struct JsReadOnlyEditor {
    quill: Quill,
}

impl JsReadOnlyEditor {
    pub(crate) fn new(quill: Quill) -> Self {
        Self { quill }
    }

    pub(crate) fn from_view(editor: &ReadOnlyEditor<'_, QuillEngine>) -> Self {
        Self::new(editor.engine().quill().clone())
    }
}

#[wasm_bindgen]
impl JsReadOnlyEditor {
    #[wasm_bindgen(js_name = getLength)]
    pub fn get_length(&self) -> u32 {
        self.quill.get_length()
    }

    /// Text from `index` (default 0), `length` characters or to the end.
    #[wasm_bindgen(js_name = getText)]
    pub fn get_text(&self, index: Option<u32>, length: Option<u32>) -> String {
        self.quill.get_text(index.unwrap_or(0), length)
    }

    #[wasm_bindgen(js_name = getHTML)]
    pub fn get_html(&self) -> String {
        self.quill.root().inner_html()
    }

    /// The document as a Quill delta.
    #[wasm_bindgen(js_name = getContents)]
    pub fn get_contents(&self) -> JsValue {
        self.quill.get_contents()
    }

    /// `{ index, length }`, or `null` without focus.
    #[wasm_bindgen(js_name = getSelection)]
    pub fn get_selection(&self) -> JsValue {
        self.quill.get_selection()
    }

    #[wasm_bindgen(js_name = getBounds)]
    pub fn get_bounds(&self, index: u32, length: Option<u32>) -> JsValue {
        self.quill.get_bounds(index, length.unwrap_or(0))
    }

    /// Formats of a range, or of the current selection without arguments.
    #[wasm_bindgen(js_name = getFormat)]
    pub fn get_format(&self, index: Option<u32>, length: Option<u32>) -> JsValue {
        match index {
            Some(index) => self.quill.get_format(index, length.unwrap_or(0)),
            None => self.quill.get_selection_format(),
        }
    }

    #[wasm_bindgen(js_name = getIndex)]
    pub fn get_index(&self, blot: &JsValue) -> u32 {
        self.quill.get_index(blot)
    }

    #[wasm_bindgen(js_name = getLeaf)]
    pub fn get_leaf(&self, index: u32) -> js_sys::Array {
        self.quill.get_leaf(index)
    }
}
