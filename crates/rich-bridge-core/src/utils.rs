//! Engine helpers shared by the lifecycle manager and the sync controller.

use crate::engine::EditorEngine;
use crate::error::EngineError;
use crate::types::{SelectionRange, Source};
use crate::value::EditorValue;

/// Clamp a requested range into a document of `doc_length` units.
///
/// The index lands in `[0, doc_length - 1]` and the length never reaches
/// past the trailing newline. Out-of-range input is clamped, never rejected.
pub fn clamp_range(index: i64, length: i64, doc_length: usize) -> SelectionRange {
    let last = doc_length as i64 - 1;
    let index = index.min(last).max(0);
    let length = length.min(last - index).max(0);
    SelectionRange::new(index as usize, length as usize)
}

/// Set the selection after clamping it to the current document.
pub fn set_editor_selection<E: EditorEngine>(
    engine: &mut E,
    range: Option<SelectionRange>,
    source: Source,
) {
    let range = range.map(|r| clamp_range(r.index as i64, r.length as i64, engine.get_length()));
    engine.set_selection(range, source);
}

/// Put a collapsed cursor at the end of the content.
pub fn set_editor_cursor_end<E: EditorEngine>(engine: &mut E, source: Source) {
    let end = engine.get_length() as i64 - 1;
    let range = clamp_range(end, 0, engine.get_length());
    engine.set_selection(Some(range), source);
}

/// Replace the document, keeping the cursor where it was if the editor has
/// focus. The cursor is put back with source `api`, whatever `source` the
/// content was written with.
///
/// HTML goes through the engine's clipboard conversion first.
pub fn set_editor_contents<E: EditorEngine>(
    engine: &mut E,
    value: &EditorValue,
    source: Source,
) -> Result<(), EngineError> {
    let selection = engine.get_selection();

    match value {
        EditorValue::Html(html) => {
            let delta = engine.convert_html(html)?;
            engine.set_contents(&delta, source)?;
        }
        EditorValue::Delta(delta) => engine.set_contents(delta, source)?,
    }

    if selection.is_some() && engine.has_focus() {
        set_editor_selection(engine, selection, Source::Api);
    }
    Ok(())
}
