//! Types exposed to JavaScript via wasm-bindgen.

use rich_bridge_core::{Bounds, RenderedSurface, SelectionRange};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

/// Serialize to a plain JS value: objects, not `Map`s.
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsError::new(&format!("Failed to serialize: {}", e)))
}

/// Like [`to_js`] for callback arguments, where there is no caller to
/// report an error to.
pub(crate) fn to_js_or_null<T: Serialize + ?Sized>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or_else(|err| {
            tracing::warn!(%err, "dropping unserializable callback argument");
            JsValue::NULL
        })
}

/// What to render around the editing area on this pass.
#[derive(Debug, Clone, Serialize, Tsify)]
#[tsify(into_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsRenderedSurface {
    /// Always `"textbox"`.
    pub role: String,
    /// `data-testid` of the container.
    pub test_id: String,
    /// `data-version` of the container. Changes exactly when the editor
    /// instance is recreated.
    pub version: f64,
    /// `"div"`, or `"pre"` when whitespace is preserved.
    pub area_tag: String,
    /// `data-testid` of the editing area.
    pub area_test_id: String,
    /// Props the component does not consume, to spread on the container.
    #[tsify(type = "Record<string, unknown>")]
    pub attributes: Map<String, Value>,
}

impl From<RenderedSurface> for JsRenderedSurface {
    fn from(surface: RenderedSurface) -> Self {
        Self {
            role: surface.role.to_string(),
            test_id: surface.test_id.to_string(),
            version: surface.version as f64,
            area_tag: surface.area_tag.as_str().to_string(),
            area_test_id: surface.area_test_id.to_string(),
            attributes: surface.attributes,
        }
    }
}

/// A selection: `length` 0 is a caret.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct JsRange {
    pub index: u32,
    pub length: u32,
}

impl From<SelectionRange> for JsRange {
    fn from(range: SelectionRange) -> Self {
        Self {
            index: range.index as u32,
            length: range.length as u32,
        }
    }
}

/// Pixel bounds of a range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct JsBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl From<Bounds> for JsBounds {
    fn from(bounds: Bounds) -> Self {
        Self {
            left: bounds.left,
            top: bounds.top,
            width: bounds.width,
            height: bounds.height,
        }
    }
}
