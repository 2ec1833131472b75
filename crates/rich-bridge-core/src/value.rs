//! Document values as the host supplies them, and the equality rules the
//! bridge uses to compare them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::delta::Delta;

/// Document content in one of the two representations a host may use.
///
/// Structured values are reference counted so the bridge can tell the delta
/// object it emitted apart from an equal-looking one the host built itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EditorValue {
    /// An HTML string.
    Html(String),
    /// A structured document.
    Delta(Arc<Delta>),
}

impl EditorValue {
    pub fn html(html: impl Into<String>) -> Self {
        EditorValue::Html(html.into())
    }

    pub fn delta(delta: Delta) -> Self {
        EditorValue::Delta(Arc::new(delta))
    }

    pub fn is_delta(&self) -> bool {
        matches!(self, EditorValue::Delta(_))
    }

    pub fn as_delta(&self) -> Option<&Arc<Delta>> {
        match self {
            EditorValue::Delta(delta) => Some(delta),
            EditorValue::Html(_) => None,
        }
    }

    pub fn as_html(&self) -> Option<&str> {
        match self {
            EditorValue::Html(html) => Some(html),
            EditorValue::Delta(_) => None,
        }
    }

    /// Identity comparison: the same delta allocation, or equal strings.
    ///
    /// This is how a host framework decides whether a prop "changed" between
    /// passes, which is weaker than [`is_editor_value_equal`].
    pub fn same(&self, other: &EditorValue) -> bool {
        match (self, other) {
            (EditorValue::Delta(a), EditorValue::Delta(b)) => Arc::ptr_eq(a, b),
            (EditorValue::Html(a), EditorValue::Html(b)) => a == b,
            _ => false,
        }
    }

    /// Whether this value is exactly the given delta allocation.
    pub fn is_exactly(&self, delta: &Arc<Delta>) -> bool {
        self.as_delta().is_some_and(|own| Arc::ptr_eq(own, delta))
    }
}

impl From<Delta> for EditorValue {
    fn from(delta: Delta) -> Self {
        EditorValue::delta(delta)
    }
}

impl From<Arc<Delta>> for EditorValue {
    fn from(delta: Arc<Delta>) -> Self {
        EditorValue::Delta(delta)
    }
}

impl From<String> for EditorValue {
    fn from(html: String) -> Self {
        EditorValue::Html(html)
    }
}

impl From<&str> for EditorValue {
    fn from(html: &str) -> Self {
        EditorValue::Html(html.to_string())
    }
}

/// Compare two deltas by their op lists.
pub fn is_delta_equal(prev: &Delta, next: &Delta) -> bool {
    prev.ops == next.ops
}

/// Compare two values the way change detection needs.
///
/// Structured values compare by content. Strings compare by value. A string
/// and a structured value are never equal, even when they describe the same
/// document.
pub fn is_editor_value_equal(prev: &EditorValue, next: &EditorValue) -> bool {
    match (prev, next) {
        (EditorValue::Delta(a), EditorValue::Delta(b)) => is_delta_equal(a, b),
        (EditorValue::Html(a), EditorValue::Html(b)) => a == b,
        _ => false,
    }
}

/// [`is_editor_value_equal`] lifted over optional values. Two absent values
/// are equal.
pub fn is_optional_value_equal(prev: Option<&EditorValue>, next: Option<&EditorValue>) -> bool {
    match (prev, next) {
        (Some(a), Some(b)) => is_editor_value_equal(a, b),
        (None, None) => true,
        _ => false,
    }
}
