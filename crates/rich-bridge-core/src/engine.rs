//! Capability interface to the rich-text engine.
//!
//! The bridge never extends or inspects the engine. It composes whatever
//! implements [`EditorEngine`]: a Quill instance in the browser, or the
//! in-memory engine for native hosts and tests.

use serde::Serialize;
use smol_str::SmolStr;

use crate::delta::Delta;
use crate::error::EngineError;
use crate::props::EditorProps;
use crate::types::{Bounds, EditorChange, Formats, Modules, SelectionRange, Source};

/// Receives every event from the engine's `editor-change` stream.
pub type ChangeListener = Box<dyn FnMut(EditorChange)>;

/// A live instance of the rich-text engine bound to one host element.
///
/// Accessors take `&self` and must not change editor state. Mutators take
/// `&mut self`; those that the engine can reject return [`EngineError`].
pub trait EditorEngine {
    /// Opaque handle to a leaf node of the engine's document tree.
    type Blot;

    // === Read-only accessors ===

    /// Document length, including the trailing newline.
    fn get_length(&self) -> usize;

    /// Plain text of `length` characters starting at `index`, or to the end
    /// of the document when `length` is `None`.
    fn get_text(&self, index: usize, length: Option<usize>) -> String;

    /// The whole document as a structured delta.
    fn get_contents(&self) -> Delta;

    /// The editing surface's inner HTML.
    fn get_html(&self) -> String;

    /// Current selection, `None` when the editor does not have focus.
    fn get_selection(&self) -> Option<SelectionRange>;

    /// Pixel bounds of a range, if it is rendered.
    fn get_bounds(&self, index: usize, length: usize) -> Option<Bounds>;

    /// Formats common to the given range, or to the current selection.
    fn get_format(&self, range: Option<SelectionRange>) -> Formats;

    /// Document index of a leaf.
    fn get_index(&self, blot: &Self::Blot) -> usize;

    /// The leaf at `index` and the offset into it.
    fn get_leaf(&self, index: usize) -> Option<(Self::Blot, usize)>;

    fn has_focus(&self) -> bool;

    // === Mutators ===

    /// Replace the whole document.
    fn set_contents(&mut self, delta: &Delta, source: Source) -> Result<(), EngineError>;

    /// Set or clear the selection. Setting a selection focuses the editor.
    fn set_selection(&mut self, range: Option<SelectionRange>, source: Source);

    fn focus(&mut self);

    fn blur(&mut self);

    /// Allow or block user edits.
    fn enable(&mut self, enabled: bool);

    /// Mirror the placeholder text onto the editing surface.
    fn set_placeholder(&mut self, placeholder: &str);

    /// Convert HTML into a delta using the engine's clipboard rules.
    fn convert_html(&self, html: &str) -> Result<Delta, EngineError>;

    // === Events ===

    /// Subscribe to the `editor-change` stream.
    fn on_editor_change(&mut self, listener: ChangeListener);

    /// Drop every `editor-change` subscription. Safe to call repeatedly.
    fn off_editor_change(&mut self);

    /// Remove chrome the engine attached around its host element, such as a
    /// toolbar or tooltip. Best effort: missing chrome is not an error.
    fn clear_chrome(&mut self) {}
}

/// Constructs engine instances on host elements.
pub trait EngineFactory {
    type Engine: EditorEngine;
    /// The element an engine is mounted into.
    type Host;

    fn create(
        &mut self,
        host: &Self::Host,
        options: &EngineOptions,
    ) -> Result<Self::Engine, EngineError>;
}

/// Construction options handed to the engine.
///
/// Serializes to the engine's options object.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineOptions {
    pub read_only: bool,
    #[serde(skip_serializing_if = "Modules::is_empty")]
    pub modules: Modules,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<SmolStr>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scrolling_container: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl From<&EditorProps> for EngineOptions {
    fn from(props: &EditorProps) -> Self {
        Self {
            read_only: props.read_only,
            modules: props.modules.clone(),
            formats: props.formats.clone(),
            bounds: props.bounds.clone(),
            theme: props.theme.clone(),
            scrolling_container: props.scrolling_container.clone(),
            placeholder: props.placeholder.clone(),
        }
    }
}

/// Read-only view of an engine handed to callbacks.
///
/// Exposes accessors only, so a callback cannot mutate the editor while an
/// event is being dispatched.
pub struct ReadOnlyEditor<'a, E: EditorEngine> {
    engine: &'a E,
}

impl<'a, E: EditorEngine> ReadOnlyEditor<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self { engine }
    }

    /// Shared access to the engine, for bindings that rebuild this view on
    /// the other side of an FFI boundary. [`EditorEngine`] mutators need
    /// `&mut`, so they stay out of reach.
    pub fn engine(&self) -> &'a E {
        self.engine
    }

    pub fn get_length(&self) -> usize {
        self.engine.get_length()
    }

    pub fn get_text(&self, index: usize, length: Option<usize>) -> String {
        self.engine.get_text(index, length)
    }

    pub fn get_html(&self) -> String {
        self.engine.get_html()
    }

    pub fn get_contents(&self) -> Delta {
        self.engine.get_contents()
    }

    pub fn get_selection(&self) -> Option<SelectionRange> {
        self.engine.get_selection()
    }

    pub fn get_bounds(&self, index: usize, length: usize) -> Option<Bounds> {
        self.engine.get_bounds(index, length)
    }

    pub fn get_format(&self, range: Option<SelectionRange>) -> Formats {
        self.engine.get_format(range)
    }

    pub fn get_index(&self, blot: &E::Blot) -> usize {
        self.engine.get_index(blot)
    }

    pub fn get_leaf(&self, index: usize) -> Option<(E::Blot, usize)> {
        self.engine.get_leaf(index)
    }
}
