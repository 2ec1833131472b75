//! Shared editor types: selection ranges, change sources, bounds and the
//! multiplexed change event.
//!
//! These mirror the engine's JSON shapes so they can cross a JS boundary
//! unchanged.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::delta::Delta;

/// Format name to format value, as reported by the engine.
pub type Formats = serde_json::Map<String, serde_json::Value>;

/// Engine configuration for modules (toolbar, keyboard, history, ...).
///
/// Opaque to the bridge; only compared for equality.
pub type Modules = serde_json::Map<String, serde_json::Value>;

/// A selection within the document, in characters.
///
/// `length == 0` is a collapsed cursor. The absence of a selection (editor
/// not focused) is `Option::<SelectionRange>::None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionRange {
    pub index: usize,
    pub length: usize,
}

impl SelectionRange {
    pub fn new(index: usize, length: usize) -> Self {
        Self { index, length }
    }

    /// A collapsed cursor at `index`.
    pub fn caret(index: usize) -> Self {
        Self { index, length: 0 }
    }

    pub fn end(&self) -> usize {
        self.index + self.length
    }
}

/// Provenance of a change.
///
/// Passed through to callbacks verbatim.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Programmatic change through the engine API.
    #[default]
    Api,
    /// Change caused by user input.
    User,
    /// Programmatic change that does not notify listeners.
    Silent,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Api => "api",
            Source::User => "user",
            Source::Silent => "silent",
        }
    }

    /// Parse the engine's source tag. Unknown tags are treated as `api`.
    pub fn parse(s: &str) -> Self {
        match s {
            "user" => Source::User,
            "silent" => Source::Silent,
            _ => Source::Api,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel bounds of a document range relative to the editor container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// The document as it stood right after one text change.
///
/// Events are dispatched after the engine call that produced them returns,
/// possibly after further edits, so each text change carries its own copy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DocumentState {
    pub contents: Arc<Delta>,
    pub html: String,
    pub selection: Option<SelectionRange>,
}

/// One event from the engine's unified `editor-change` stream.
#[derive(Clone, Debug, PartialEq)]
pub enum EditorChange {
    TextChange {
        /// The change that was applied.
        delta: Arc<Delta>,
        /// Document contents before the change.
        old_contents: Arc<Delta>,
        after: DocumentState,
        source: Source,
    },
    SelectionChange {
        range: Option<SelectionRange>,
        old_range: Option<SelectionRange>,
        source: Source,
    },
}

impl EditorChange {
    pub fn source(&self) -> Source {
        match self {
            EditorChange::TextChange { source, .. } => *source,
            EditorChange::SelectionChange { source, .. } => *source,
        }
    }

    /// The event name the engine uses for this change.
    pub fn event_name(&self) -> &'static str {
        match self {
            EditorChange::TextChange { .. } => "text-change",
            EditorChange::SelectionChange { .. } => "selection-change",
        }
    }
}
