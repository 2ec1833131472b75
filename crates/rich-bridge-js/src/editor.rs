//! JsRichEditor - the component wrapper for JavaScript hosts.

use std::cell::{RefCell, RefMut};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use rich_bridge_browser::{
    Delta, EditorListener, EditorProps, EditorValue, EventPump, QuillEngine, QuillFactory,
    ReadOnlyEditor, RichEditor, SelectionRange, Source,
};

use crate::types::{JsRange, JsRenderedSurface, to_js, to_js_or_null};
use crate::view::JsReadOnlyEditor;

/// Props the component consumes without deserializing.
const SKIPPED_PROPS: [&str; 1] = ["children"];

const EDITOR_REF: &str = "editorRef";

/// How many JS delta objects keep their identity across the boundary.
const INTERNED_DELTAS: usize = 4;

/// Host callbacks, replaced on every render that passes them.
#[derive(Default)]
struct JsCallbacks {
    on_change: Option<Function>,
    on_selection_change: Option<Function>,
    on_focus: Option<Function>,
    on_blur: Option<Function>,
}

impl JsCallbacks {
    fn slot(&mut self, name: &str) -> Option<&mut Option<Function>> {
        match name {
            "onChange" => Some(&mut self.on_change),
            "onSelectionChange" => Some(&mut self.on_selection_change),
            "onFocus" => Some(&mut self.on_focus),
            "onBlur" => Some(&mut self.on_blur),
            _ => None,
        }
    }
}

/// Maps JS delta objects to the `Arc<Delta>` they were read into.
///
/// Deserializing a JS object always builds a fresh `Delta`. Looking the
/// object up here first keeps identity intact, so an unchanged `value` prop
/// is recognized as unchanged and the delta handed to `onChange` is
/// recognized when it comes back as `value`.
#[derive(Default)]
struct DeltaInterner {
    entries: VecDeque<(JsValue, Arc<Delta>)>,
}

impl DeltaInterner {
    fn remember(&mut self, js: JsValue, delta: Arc<Delta>) {
        if self.entries.len() == INTERNED_DELTAS {
            self.entries.pop_front();
        }
        self.entries.push_back((js, delta));
    }

    fn lookup(&self, js: &JsValue) -> Option<Arc<Delta>> {
        self.entries
            .iter()
            .rev()
            .find(|(known, _)| Object::is(known, js))
            .map(|(_, delta)| delta.clone())
    }

    fn intern(&mut self, js: &JsValue, parsed: Arc<Delta>) -> Arc<Delta> {
        if let Some(known) = self.lookup(js) {
            return known;
        }
        self.remember(js.clone(), parsed.clone());
        parsed
    }
}

/// The delta object one prop currently holds.
///
/// Kept for as long as the host keeps passing the same object, however many
/// deltas the interner has seen since.
#[derive(Default)]
struct HeldDelta(Option<(JsValue, Arc<Delta>)>);

impl HeldDelta {
    fn resolve(
        &mut self,
        js: &JsValue,
        value: Option<EditorValue>,
        interner: &mut DeltaInterner,
    ) -> Option<EditorValue> {
        match value {
            Some(EditorValue::Delta(parsed)) => {
                let delta = match &self.0 {
                    Some((held, delta)) if Object::is(held, js) => delta.clone(),
                    _ => interner.intern(js, parsed),
                };
                self.0 = Some((js.clone(), delta.clone()));
                Some(EditorValue::Delta(delta))
            }
            other => {
                self.0 = None;
                other
            }
        }
    }
}

/// Where the host wants the live Quill instance: a callback ref or a
/// `{ current }` object.
struct EditorRef {
    target: JsValue,
    published: JsValue,
}

impl Default for EditorRef {
    fn default() -> Self {
        Self {
            target: JsValue::UNDEFINED,
            published: JsValue::NULL,
        }
    }
}

impl EditorRef {
    fn set_target(&mut self, target: JsValue) {
        self.target = target;
    }

    /// Hand `instance` to the ref if it is not what the ref last received.
    /// A replaced instance is cleared to `null` first.
    fn publish(&mut self, instance: JsValue) {
        if Object::is(&self.published, &instance) {
            return;
        }
        if !self.published.is_null() && !instance.is_null() {
            self.assign(&JsValue::NULL);
        }
        self.assign(&instance);
        self.published = instance;
    }

    fn assign(&self, instance: &JsValue) {
        let result = if let Some(callback) = self.target.dyn_ref::<Function>() {
            callback.call1(&JsValue::NULL, instance).map(drop)
        } else if self.target.is_object() {
            Reflect::set(&self.target, &JsValue::from_str("current"), instance).map(drop)
        } else {
            Ok(())
        };
        if let Err(err) = result {
            tracing::warn!(?err, "could not update editorRef");
        }
    }
}

/// Adapts [`JsCallbacks`] to the bridge's listener interface.
struct JsListener<'a> {
    callbacks: &'a JsCallbacks,
    interner: &'a mut DeltaInterner,
}

impl JsListener<'_> {
    fn call(callback: &Option<Function>, name: &str, args: [JsValue; 4]) {
        let Some(callback) = callback else {
            return;
        };
        let args: Array = args.into_iter().collect();
        if let Err(err) = callback.apply(&JsValue::NULL, &args) {
            tracing::warn!(callback = name, ?err, "callback threw");
        }
    }

    fn range(range: Option<SelectionRange>) -> JsValue {
        match range {
            Some(range) => to_js_or_null(&JsRange::from(range)),
            None => JsValue::NULL,
        }
    }
}

impl EditorListener<QuillEngine> for JsListener<'_> {
    fn on_change(
        &mut self,
        value: &EditorValue,
        delta: &Arc<Delta>,
        source: Source,
        editor: &ReadOnlyEditor<'_, QuillEngine>,
    ) {
        let js_delta = to_js_or_null(delta.as_ref());
        self.interner.remember(js_delta.clone(), delta.clone());
        let js_value = match value {
            EditorValue::Html(html) => JsValue::from_str(html),
            EditorValue::Delta(contents) => {
                let js = to_js_or_null(contents.as_ref());
                self.interner.remember(js.clone(), contents.clone());
                js
            }
        };
        Self::call(
            &self.callbacks.on_change,
            "onChange",
            [
                js_value,
                js_delta,
                JsValue::from_str(source.as_str()),
                JsReadOnlyEditor::from_view(editor).into(),
            ],
        );
    }

    fn on_selection_change(
        &mut self,
        range: Option<SelectionRange>,
        source: Source,
        editor: &ReadOnlyEditor<'_, QuillEngine>,
    ) {
        Self::call(
            &self.callbacks.on_selection_change,
            "onSelectionChange",
            [
                Self::range(range),
                JsValue::from_str(source.as_str()),
                JsReadOnlyEditor::from_view(editor).into(),
                JsValue::UNDEFINED,
            ],
        );
    }

    fn on_focus(
        &mut self,
        range: SelectionRange,
        source: Source,
        editor: &ReadOnlyEditor<'_, QuillEngine>,
    ) {
        Self::call(
            &self.callbacks.on_focus,
            "onFocus",
            [
                Self::range(Some(range)),
                JsValue::from_str(source.as_str()),
                JsReadOnlyEditor::from_view(editor).into(),
                JsValue::UNDEFINED,
            ],
        );
    }

    fn on_blur(
        &mut self,
        previous: SelectionRange,
        source: Source,
        editor: &ReadOnlyEditor<'_, QuillEngine>,
    ) {
        Self::call(
            &self.callbacks.on_blur,
            "onBlur",
            [
                Self::range(Some(previous)),
                JsValue::from_str(source.as_str()),
                JsReadOnlyEditor::from_view(editor).into(),
                JsValue::UNDEFINED,
            ],
        );
    }
}

struct Inner {
    editor: RichEditor<QuillFactory>,
    callbacks: JsCallbacks,
    interner: DeltaInterner,
    value: HeldDelta,
    default_value: HeldDelta,
    editor_ref: EditorRef,
}

impl Inner {
    fn new(pump: EventPump) -> Self {
        Self {
            editor: RichEditor::new(QuillFactory::with_event_pump(pump)),
            callbacks: JsCallbacks::default(),
            interner: DeltaInterner::default(),
            value: HeldDelta::default(),
            default_value: HeldDelta::default(),
            editor_ref: EditorRef::default(),
        }
    }

    fn quill(&self) -> JsValue {
        self.editor
            .editor()
            .map(|engine| JsValue::from(engine.quill().clone()))
            .unwrap_or(JsValue::NULL)
    }

    fn publish_editor(&mut self) {
        let quill = self.quill();
        self.editor_ref.publish(quill);
    }

    fn process_events(&mut self) {
        let Inner {
            editor,
            callbacks,
            interner,
            ..
        } = self;
        editor.process_events(&mut JsListener {
            callbacks,
            interner,
        });
    }

    /// Split raw props into callbacks and deserializable configuration.
    fn read_props(&mut self, props: &JsValue) -> Result<EditorProps, JsError> {
        let config = Object::new();
        if let Some(object) = props.dyn_ref::<Object>() {
            for entry in Object::entries(object).iter() {
                let entry: Array = entry.unchecked_into();
                let key = entry.get(0).as_string().unwrap_or_default();
                let value = entry.get(1);

                if let Some(slot) = self.callbacks.slot(&key) {
                    *slot = value.dyn_into::<Function>().ok();
                    continue;
                }
                if key == EDITOR_REF {
                    self.editor_ref.set_target(value);
                    continue;
                }
                if SKIPPED_PROPS.contains(&key.as_str()) || value.is_function() {
                    continue;
                }
                Reflect::set(&config, &JsValue::from_str(&key), &value)
                    .map_err(|e| JsError::new(&format!("Failed to copy prop {key}: {:?}", e)))?;
            }
        }

        let mut parsed: EditorProps = serde_wasm_bindgen::from_value(config.clone().into())
            .map_err(|e| JsError::new(&format!("Invalid props: {}", e)))?;

        let raw_value = Reflect::get(&config, &JsValue::from_str("value")).unwrap_or_default();
        parsed.value = self
            .value
            .resolve(&raw_value, parsed.value.take(), &mut self.interner);
        let raw_default =
            Reflect::get(&config, &JsValue::from_str("defaultValue")).unwrap_or_default();
        parsed.default_value = self.default_value.resolve(
            &raw_default,
            parsed.default_value.take(),
            &mut self.interner,
        );
        Ok(parsed)
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.editor.unmount();
        self.publish_editor();
    }
}

/// The editor component exposed to JavaScript.
///
/// Call `render(props)` from the host's render cycle and mount the editing
/// area it describes, then pass that element to `setHost` and render again.
/// Props may carry `onChange`, `onSelectionChange`, `onFocus` and `onBlur`;
/// the latest functions passed are the ones called. `editorRef`, a function
/// or a `{ current }` object, receives each Quill instance as it is created
/// and `null` once it is destroyed.
#[wasm_bindgen]
pub struct JsRichEditor {
    inner: Rc<RefCell<Inner>>,
}

impl Default for JsRichEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl JsRichEditor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<RefCell<Inner>>| {
            let weak = weak.clone();
            let pump: EventPump = Rc::new(move || {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                // busy means a render pass is running; it dispatches on exit
                if let Ok(mut inner) = inner.try_borrow_mut() {
                    inner.process_events();
                }
            });
            RefCell::new(Inner::new(pump))
        });
        Self { inner }
    }

    /// Run a render pass with the host's current props.
    ///
    /// Throws if `value` is the `delta` argument of an earlier `onChange`.
    #[wasm_bindgen]
    pub fn render(&self, props: JsValue) -> Result<JsValue, JsError> {
        let mut inner = self.borrow()?;
        let props = inner.read_props(&props)?;

        let Inner {
            editor,
            callbacks,
            interner,
            ..
        } = &mut *inner;
        let rendered = editor.render(
            &props,
            &mut JsListener {
                callbacks,
                interner,
            },
        );
        inner.publish_editor();
        let surface = rendered.map_err(|e| JsError::new(&e.to_string()))?;
        to_js(&JsRenderedSurface::from(surface))
    }

    /// Hand over the editing area element, or `null` when it unmounted.
    #[wasm_bindgen(js_name = setHost)]
    pub fn set_host(&self, host: Option<HtmlElement>) -> Result<(), JsError> {
        self.borrow()?.editor.set_host(host);
        Ok(())
    }

    /// Dispatch events the editor emitted outside a render pass.
    #[wasm_bindgen(js_name = processEvents)]
    pub fn process_events(&self) -> Result<(), JsError> {
        self.borrow()?.process_events();
        Ok(())
    }

    /// Current configuration version.
    #[wasm_bindgen(getter)]
    pub fn version(&self) -> f64 {
        // callbacks run under the mutable borrow; a shared one still works
        // from the host's render code
        self.inner
            .try_borrow()
            .map(|inner| inner.editor.version() as f64)
            .unwrap_or(f64::NAN)
    }

    /// The live Quill instance, or `null` (the `editorRef`).
    #[wasm_bindgen(getter)]
    pub fn editor(&self) -> JsValue {
        self.inner
            .try_borrow()
            .map(|inner| inner.quill())
            .unwrap_or(JsValue::NULL)
    }

    /// An accessor-only view of the live editor, if mounted.
    #[wasm_bindgen(js_name = getEditor)]
    pub fn get_editor(&self) -> Option<JsReadOnlyEditor> {
        let inner = self.inner.try_borrow().ok()?;
        inner
            .editor
            .editor()
            .map(|engine| JsReadOnlyEditor::from_view(&ReadOnlyEditor::new(engine)))
    }

    /// Destroy the Quill instance. A later render mounts a new one.
    #[wasm_bindgen]
    pub fn unmount(&self) -> Result<(), JsError> {
        let mut inner = self.borrow()?;
        inner.editor.unmount();
        inner.publish_editor();
        Ok(())
    }
}

impl JsRichEditor {
    fn borrow(&self) -> Result<RefMut<'_, Inner>, JsError> {
        self.inner
            .try_borrow_mut()
            .map_err(|_| JsError::new("Editor is busy dispatching an event"))
    }
}
