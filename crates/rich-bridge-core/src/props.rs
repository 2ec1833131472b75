//! Declarative configuration the host supplies on every render pass.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::types::Modules;
use crate::value::EditorValue;

/// Props of the editor component.
///
/// Deserializes from a camelCase object, so a JS host can pass its props
/// through as-is. Keys the component does not know are kept in
/// `attributes` and passed through to the rendered container.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorProps {
    /// Controlled document content.
    pub value: Option<EditorValue>,
    /// Initial content, used when `value` is absent.
    pub default_value: Option<EditorValue>,
    /// Disable user edits. Changing it recreates the engine.
    pub read_only: bool,
    /// Enable or disable without recreating. Ignored while `read_only`.
    pub enabled: Option<bool>,
    pub modules: Modules,
    /// Allowed formats. Compared by content, not identity.
    pub formats: Option<Vec<SmolStr>>,
    /// Selector of the element tooltips are confined to.
    pub bounds: Option<String>,
    pub theme: Option<String>,
    /// Selector of the scrolling parent.
    pub scrolling_container: Option<String>,
    /// Render the editing surface as `<pre>` instead of `<div>`.
    pub preserve_whitespace: bool,
    pub placeholder: Option<String>,
    pub auto_focus: bool,
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl EditorProps {
    /// `value`, falling back to `default_value`.
    pub fn current_value(&self) -> Option<&EditorValue> {
        self.value.as_ref().or(self.default_value.as_ref())
    }

    pub fn with_value(mut self, value: impl Into<EditorValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_default_value(mut self, value: impl Into<EditorValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn auto_focus(mut self, auto_focus: bool) -> Self {
        self.auto_focus = auto_focus;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    pub fn formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.formats = Some(formats.into_iter().map(Into::into).collect());
        self
    }

    pub fn preserve_whitespace(mut self, preserve: bool) -> Self {
        self.preserve_whitespace = preserve;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_falls_back_to_default() {
        let props = EditorProps::default().with_default_value("<p>a</p>");
        assert_eq!(props.current_value(), Some(&EditorValue::html("<p>a</p>")));

        let props = props.with_value("<p>b</p>");
        assert_eq!(props.current_value(), Some(&EditorValue::html("<p>b</p>")));
    }

    #[test]
    fn deserializes_camel_case_with_passthrough_attributes() {
        let props: EditorProps = serde_json::from_str(
            r##"{
                "value": "<p>hi</p>",
                "readOnly": true,
                "scrollingContainer": "#scroll",
                "formats": ["bold", "italic"],
                "autoFocus": true,
                "className": "my-editor"
            }"##,
        )
        .unwrap();

        assert!(props.read_only);
        assert!(props.auto_focus);
        assert_eq!(props.scrolling_container.as_deref(), Some("#scroll"));
        assert_eq!(
            props.formats,
            Some(vec![SmolStr::new("bold"), SmolStr::new("italic")])
        );
        assert_eq!(props.enabled, None);
        assert_eq!(
            props.attributes.get("className"),
            Some(&serde_json::json!("my-editor"))
        );
    }
}
