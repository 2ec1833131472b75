//! Cleanup of DOM nodes Quill creates outside its editing root.
//!
//! Quill inserts the toolbar as the previous sibling of the container and
//! the tooltip inside it. Neither has an API handle, so they are found by
//! position and class. Missing nodes are skipped silently.

use web_sys::Element;

const TOOLBAR_CLASS: &str = "ql-toolbar";
const TOOLTIP_CLASS: &str = "ql-tooltip";

/// Remove the toolbar and tooltip attached around `container`.
///
/// Returns how many nodes were removed.
pub fn clear_toolbar_node(container: &Element) -> usize {
    let mut removed = 0;

    if let Some(toolbar) = container.previous_element_sibling() {
        if toolbar.class_list().contains(TOOLBAR_CLASS) {
            toolbar.remove();
            removed += 1;
        }
    }

    if let Some(tooltip) = container.get_elements_by_class_name(TOOLTIP_CLASS).item(0) {
        tooltip.remove();
        removed += 1;
    }

    tracing::trace!(removed, "cleared editor chrome");
    removed
}
