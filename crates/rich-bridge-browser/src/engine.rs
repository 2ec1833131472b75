//! `EditorEngine` over a live Quill instance.

use std::rc::Rc;
use std::sync::Arc;

use gloo_utils::format::JsValueSerdeExt;
use rich_bridge_core::{
    Bounds, ChangeListener, Delta, DocumentState, EditorChange, EditorEngine, EngineError,
    EngineFactory, EngineOptions, Formats, SelectionRange, Source,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use crate::chrome::clear_toolbar_node;
use crate::quill::Quill;

const EDITOR_CHANGE: &str = "editor-change";

/// Called after each event Quill delivers, so the owner can dispatch it.
///
/// Events that fire while the owner is busy (inside a render pass) are
/// picked up by that pass instead.
pub type EventPump = Rc<dyn Fn()>;

type EditorChangeHandler = Closure<dyn FnMut(JsValue, JsValue, JsValue, JsValue)>;

/// Convert a JS exception into an [`EngineError`].
pub fn js_error(err: JsValue) -> EngineError {
    let message = err
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"));
    EngineError(message)
}

/// Read the document state Quill holds right now.
pub fn document_state(quill: &Quill) -> DocumentState {
    let contents: Delta = quill.get_contents().into_serde().unwrap_or_else(|err| {
        tracing::warn!(%err, "unreadable document contents");
        Delta::new()
    });
    DocumentState {
        contents: Arc::new(contents),
        html: quill.root().inner_html(),
        selection: read_range(&quill.get_selection()),
    }
}

/// Convert the arguments of Quill's `editor-change` handler.
///
/// `after` is asked for the document state only for text changes, while
/// the handler still runs inside Quill's emit.
///
/// Returns `None` for event names the bridge does not know and for
/// payloads that fail to deserialize.
pub fn parse_editor_change(
    name: &JsValue,
    payload: &JsValue,
    old: &JsValue,
    source: &JsValue,
    after: impl FnOnce() -> DocumentState,
) -> Option<EditorChange> {
    let source = source.as_string().map(|s| Source::parse(&s)).unwrap_or_default();
    match name.as_string().as_deref() {
        Some("text-change") => {
            let delta: Delta = payload
                .into_serde()
                .map_err(|err| tracing::warn!(%err, "unreadable text-change delta"))
                .ok()?;
            let old_contents: Delta = old.into_serde().unwrap_or_default();
            Some(EditorChange::TextChange {
                delta: Arc::new(delta),
                old_contents: Arc::new(old_contents),
                after: after(),
                source,
            })
        }
        Some("selection-change") => Some(EditorChange::SelectionChange {
            range: read_range(payload),
            old_range: read_range(old),
            source,
        }),
        other => {
            tracing::trace!(event = ?other, "ignoring editor event");
            None
        }
    }
}

fn read_range(value: &JsValue) -> Option<SelectionRange> {
    if value.is_null() || value.is_undefined() {
        return None;
    }
    value.into_serde().ok()
}

/// A Quill instance mounted on a host element.
pub struct QuillEngine {
    quill: Quill,
    container: HtmlElement,
    handlers: Vec<EditorChangeHandler>,
    pump: Option<EventPump>,
}

impl QuillEngine {
    /// The element Quill was constructed on.
    pub fn container(&self) -> &HtmlElement {
        &self.container
    }

    /// The underlying Quill object, for calls the bridge does not wrap.
    pub fn quill(&self) -> &Quill {
        &self.quill
    }
}

impl Drop for QuillEngine {
    fn drop(&mut self) {
        // Quill must not keep calling into closures that are about to go away
        if !self.handlers.is_empty() {
            self.quill.off(EDITOR_CHANGE);
        }
    }
}

impl EditorEngine for QuillEngine {
    type Blot = JsValue;

    fn get_length(&self) -> usize {
        self.quill.get_length() as usize
    }

    fn get_text(&self, index: usize, length: Option<usize>) -> String {
        self.quill
            .get_text(index as u32, length.map(|len| len as u32))
    }

    fn get_contents(&self) -> Delta {
        self.quill
            .get_contents()
            .into_serde()
            .unwrap_or_else(|err| {
                tracing::warn!(%err, "unreadable document contents");
                Delta::new()
            })
    }

    fn get_html(&self) -> String {
        self.quill.root().inner_html()
    }

    fn get_selection(&self) -> Option<SelectionRange> {
        read_range(&self.quill.get_selection())
    }

    fn get_bounds(&self, index: usize, length: usize) -> Option<Bounds> {
        let bounds = self.quill.get_bounds(index as u32, length as u32);
        if bounds.is_null() || bounds.is_undefined() {
            return None;
        }
        bounds.into_serde().ok()
    }

    fn get_format(&self, range: Option<SelectionRange>) -> Formats {
        let formats = match range {
            Some(range) => self
                .quill
                .get_format(range.index as u32, range.length as u32),
            None => self.quill.get_selection_format(),
        };
        formats.into_serde().unwrap_or_default()
    }

    fn get_index(&self, blot: &JsValue) -> usize {
        self.quill.get_index(blot) as usize
    }

    fn get_leaf(&self, index: usize) -> Option<(JsValue, usize)> {
        let pair = self.quill.get_leaf(index as u32);
        let leaf = pair.get(0);
        if leaf.is_null() || leaf.is_undefined() {
            return None;
        }
        let offset = pair.get(1).as_f64().unwrap_or_default() as usize;
        Some((leaf, offset))
    }

    fn has_focus(&self) -> bool {
        self.quill.has_focus()
    }

    fn set_contents(&mut self, delta: &Delta, source: Source) -> Result<(), EngineError> {
        let delta = JsValue::from_serde(delta).map_err(|err| EngineError(err.to_string()))?;
        self.quill
            .set_contents(&delta, source.as_str())
            .map_err(js_error)?;
        Ok(())
    }

    fn set_selection(&mut self, range: Option<SelectionRange>, source: Source) {
        let range = match range {
            Some(range) => JsValue::from_serde(&range).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        };
        self.quill.set_selection(&range, source.as_str());
    }

    fn focus(&mut self) {
        self.quill.focus();
    }

    fn blur(&mut self) {
        self.quill.blur();
    }

    fn enable(&mut self, enabled: bool) {
        self.quill.enable(enabled);
    }

    fn set_placeholder(&mut self, placeholder: &str) {
        if let Err(err) = self
            .quill
            .root()
            .set_attribute("data-placeholder", placeholder)
        {
            tracing::warn!(err = %js_error(err), "could not set placeholder");
        }
    }

    fn convert_html(&self, html: &str) -> Result<Delta, EngineError> {
        let delta = self.quill.clipboard().convert(html).map_err(js_error)?;
        delta
            .into_serde()
            .map_err(|err| EngineError(err.to_string()))
    }

    fn on_editor_change(&mut self, mut listener: ChangeListener) {
        let pump = self.pump.clone();
        let quill = self.quill.clone();
        let handler = EditorChangeHandler::new(
            move |name: JsValue, payload: JsValue, old: JsValue, source: JsValue| {
                let after = || document_state(&quill);
                let Some(change) = parse_editor_change(&name, &payload, &old, &source, after)
                else {
                    return;
                };
                listener(change);
                if let Some(pump) = &pump {
                    pump();
                }
            },
        );
        self.quill
            .on(EDITOR_CHANGE, handler.as_ref().unchecked_ref());
        self.handlers.push(handler);
    }

    fn off_editor_change(&mut self) {
        self.quill.off(EDITOR_CHANGE);
        self.handlers.clear();
    }

    fn clear_chrome(&mut self) {
        clear_toolbar_node(&self.container);
    }
}

/// Constructs [`QuillEngine`]s on host elements.
#[derive(Default)]
pub struct QuillFactory {
    pump: Option<EventPump>,
}

impl QuillFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engines built by this factory call `pump` after every event.
    pub fn with_event_pump(pump: EventPump) -> Self {
        Self { pump: Some(pump) }
    }

    pub fn set_event_pump(&mut self, pump: Option<EventPump>) {
        self.pump = pump;
    }
}

impl EngineFactory for QuillFactory {
    type Engine = QuillEngine;
    type Host = HtmlElement;

    fn create(
        &mut self,
        host: &HtmlElement,
        options: &EngineOptions,
    ) -> Result<QuillEngine, EngineError> {
        let js_options =
            JsValue::from_serde(options).map_err(|err| EngineError(err.to_string()))?;
        let quill = Quill::new(host, &js_options).map_err(js_error)?;
        tracing::debug!(theme = ?options.theme, read_only = options.read_only, "created quill instance");
        Ok(QuillEngine {
            quill,
            container: host.clone(),
            handlers: Vec::new(),
            pump: self.pump.clone(),
        })
    }
}
