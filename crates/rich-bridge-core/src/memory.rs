//! Headless in-memory engine.
//!
//! Implements [`EditorEngine`] over a flat list of document cells so the
//! bridge can run without a browser: in native hosts, in server-side
//! rendering and in this crate's tests. It follows the browser engine's
//! observable rules: the document always ends in a newline, a selection
//! exists only while focused, and silent changes emit no events.

use std::cell::Cell as StdCell;
use std::rc::Rc;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::delta::{Attributes, Delta, Insert, Op};
use crate::engine::{ChangeListener, EditorEngine, EngineFactory, EngineOptions};
use crate::error::EngineError;
use crate::types::{Bounds, DocumentState, EditorChange, Formats, SelectionRange, Source};

const CHAR_WIDTH: f64 = 8.0;
const LINE_HEIGHT: f64 = 18.0;

#[derive(Clone, Debug, PartialEq)]
enum Content {
    Char(char),
    Embed(Map<String, Value>),
}

#[derive(Clone, Debug, PartialEq)]
struct Cell {
    content: Content,
    attributes: Attributes,
}

impl Cell {
    fn newline() -> Self {
        Cell {
            content: Content::Char('\n'),
            attributes: Attributes::new(),
        }
    }

    fn is_newline(&self) -> bool {
        self.content == Content::Char('\n')
    }
}

/// Counters shared between a [`MemoryFactory`] and the engines it made.
#[derive(Debug, Default)]
pub struct MemoryStats {
    created: StdCell<u64>,
    live: StdCell<u64>,
    chrome_cleared: StdCell<u64>,
}

impl MemoryStats {
    /// Engines constructed so far.
    pub fn created(&self) -> u64 {
        self.created.get()
    }

    /// Engines constructed and not yet dropped.
    pub fn live(&self) -> u64 {
        self.live.get()
    }

    /// Calls to `clear_chrome`.
    pub fn chrome_cleared(&self) -> u64 {
        self.chrome_cleared.get()
    }
}

/// A leaf of the in-memory document: one run of equally formatted content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryLeaf {
    pub index: usize,
    pub length: usize,
}

/// In-memory rich-text engine.
pub struct MemoryEngine {
    id: u64,
    cells: Vec<Cell>,
    selection: Option<SelectionRange>,
    saved_range: SelectionRange,
    enabled: bool,
    placeholder: String,
    options: EngineOptions,
    listeners: Vec<ChangeListener>,
    stats: Rc<MemoryStats>,
}

impl MemoryEngine {
    /// An empty document (a single newline).
    pub fn new() -> Self {
        Self::configured(0, &EngineOptions::default(), Rc::default())
    }

    /// A document holding `text`. A trailing newline is added if missing.
    pub fn with_text(text: &str) -> Self {
        let mut engine = Self::new();
        engine.cells = cells_from_delta(&Delta::new().insert(text));
        engine
    }

    fn configured(id: u64, options: &EngineOptions, stats: Rc<MemoryStats>) -> Self {
        stats.created.set(stats.created.get() + 1);
        stats.live.set(stats.live.get() + 1);
        Self {
            id,
            cells: vec![Cell::newline()],
            selection: None,
            saved_range: SelectionRange::default(),
            enabled: !options.read_only,
            placeholder: options.placeholder.clone().unwrap_or_default(),
            options: options.clone(),
            listeners: Vec::new(),
            stats,
        }
    }

    /// Identity of this instance, unique per factory.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// The options this instance was constructed with.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Insert unformatted text, returning the applied change.
    pub fn insert_text(&mut self, index: usize, text: &str, source: Source) -> Arc<Delta> {
        let index = index.min(self.cells.len().saturating_sub(1));
        let inserted: Vec<Cell> = text
            .chars()
            .map(|c| Cell {
                content: Content::Char(c),
                attributes: Attributes::new(),
            })
            .collect();
        let count = inserted.len();
        let old = self.get_contents();
        self.cells.splice(index..index, inserted);

        self.selection = self.selection.map(|r| shift_for_insert(r, index, count));
        let change = Arc::new(Delta::new().retain(index).insert(text));
        self.emit_text_change(change.clone(), old, source);
        change
    }

    /// Delete `length` units starting at `index`. The trailing newline is
    /// never removed.
    pub fn delete_text(&mut self, index: usize, length: usize, source: Source) -> Arc<Delta> {
        let last = self.cells.len().saturating_sub(1);
        let index = index.min(last);
        let length = length.min(last - index);
        let old = self.get_contents();
        self.cells.drain(index..index + length);

        self.selection = self.selection.map(|r| shift_for_delete(r, index, length));
        let change = Arc::new(Delta::new().retain(index).delete(length));
        self.emit_text_change(change.clone(), old, source);
        change
    }

    /// Apply formats to a range. A `null` value removes that format.
    pub fn format_text(
        &mut self,
        index: usize,
        length: usize,
        formats: Attributes,
        source: Source,
    ) -> Arc<Delta> {
        let end = index.saturating_add(length).min(self.cells.len());
        let index = index.min(end);
        let old = self.get_contents();
        for cell in &mut self.cells[index..end] {
            for (name, value) in &formats {
                if value.is_null() {
                    cell.attributes.remove(name);
                } else {
                    cell.attributes.insert(name.clone(), value.clone());
                }
            }
        }

        let change = Arc::new(Delta::new().retain(index).retain_with(end - index, formats));
        self.emit_text_change(change.clone(), old, source);
        change
    }

    fn emit(&mut self, change: EditorChange) {
        if change.source() == Source::Silent {
            return;
        }
        tracing::trace!(engine = self.id, event = change.event_name(), "memory engine emit");
        for listener in &mut self.listeners {
            listener(change.clone());
        }
    }

    fn emit_text_change(&mut self, delta: Arc<Delta>, old_contents: Delta, source: Source) {
        if source == Source::Silent || self.listeners.is_empty() {
            return;
        }
        let after = DocumentState {
            contents: Arc::new(self.get_contents()),
            html: self.get_html(),
            selection: self.selection,
        };
        self.emit(EditorChange::TextChange {
            delta,
            old_contents: Arc::new(old_contents),
            after,
            source,
        });
    }

    fn update_selection(&mut self, next: Option<SelectionRange>, source: Source) {
        let old_range = self.selection;
        if let Some(range) = next {
            self.saved_range = range;
        }
        if old_range == next {
            return;
        }
        self.selection = next;
        self.emit(EditorChange::SelectionChange {
            range: next,
            old_range,
            source,
        });
    }

    fn clamp(&self, range: SelectionRange) -> SelectionRange {
        crate::utils::clamp_range(range.index as i64, range.length as i64, self.cells.len())
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MemoryEngine {
    fn drop(&mut self) {
        self.stats.live.set(self.stats.live.get().saturating_sub(1));
    }
}

impl std::fmt::Debug for MemoryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEngine")
            .field("id", &self.id)
            .field("contents", &self.get_contents())
            .field("selection", &self.selection)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl EditorEngine for MemoryEngine {
    type Blot = MemoryLeaf;

    fn get_length(&self) -> usize {
        self.cells.len()
    }

    fn get_text(&self, index: usize, length: Option<usize>) -> String {
        let start = index.min(self.cells.len());
        let end = length.map_or(self.cells.len(), |len| (start + len).min(self.cells.len()));
        self.cells[start..end]
            .iter()
            .filter_map(|cell| match cell.content {
                Content::Char(c) => Some(c),
                Content::Embed(_) => None,
            })
            .collect()
    }

    fn get_contents(&self) -> Delta {
        let mut delta = Delta::new();
        for cell in &self.cells {
            let insert = match &cell.content {
                Content::Char(c) => Insert::Text(c.to_string()),
                Content::Embed(embed) => Insert::Embed(embed.clone()),
            };
            delta.push(Op::Insert {
                insert,
                attributes: cell.attributes.clone(),
            });
        }
        delta
    }

    fn get_html(&self) -> String {
        cells_to_html(&self.cells)
    }

    fn get_selection(&self) -> Option<SelectionRange> {
        self.selection
    }

    fn get_bounds(&self, index: usize, length: usize) -> Option<Bounds> {
        if index >= self.cells.len() {
            return None;
        }
        let line = self.cells[..index].iter().filter(|c| c.is_newline()).count();
        let column = self.cells[..index]
            .iter()
            .rev()
            .take_while(|c| !c.is_newline())
            .count();
        Some(Bounds {
            left: column as f64 * CHAR_WIDTH,
            top: line as f64 * LINE_HEIGHT,
            width: length as f64 * CHAR_WIDTH,
            height: LINE_HEIGHT,
        })
    }

    fn get_format(&self, range: Option<SelectionRange>) -> Formats {
        let Some(range) = range.or(self.selection) else {
            return Formats::new();
        };
        let range = self.clamp(range);
        let end = (range.index + range.length.max(1)).min(self.cells.len());
        let mut cells = self.cells[range.index..end].iter();
        let Some(first) = cells.next() else {
            return Formats::new();
        };
        let mut common = first.attributes.clone();
        for cell in cells {
            common.retain(|name, value| cell.attributes.get(name) == Some(value));
        }
        common
    }

    fn get_index(&self, blot: &MemoryLeaf) -> usize {
        blot.index
    }

    fn get_leaf(&self, index: usize) -> Option<(MemoryLeaf, usize)> {
        let mut start = 0;
        for op in self.get_contents().ops() {
            let length = op.len();
            if index < start + length {
                return Some((MemoryLeaf { index: start, length }, index - start));
            }
            start += length;
        }
        None
    }

    fn has_focus(&self) -> bool {
        self.selection.is_some()
    }

    fn set_contents(&mut self, delta: &Delta, source: Source) -> Result<(), EngineError> {
        if !delta.is_document() {
            return Err(EngineError::from(
                "set_contents expects a document made of inserts only",
            ));
        }
        let old = self.get_contents();
        let old_length = old.length();
        self.cells = cells_from_delta(delta);

        // the replacement carries any position past the start along to the
        // end of the new text, without a selection event
        let last = self.cells.len().saturating_sub(1);
        let moved = |pos: usize| if pos == 0 { 0 } else { last };
        self.selection = self.selection.map(|r| {
            let start = moved(r.index);
            SelectionRange::new(start, moved(r.end()) - start)
        });

        let change = Arc::new(Delta::from_ops(self.get_contents().ops).delete(old_length));
        self.emit_text_change(change, old, source);
        Ok(())
    }

    fn set_selection(&mut self, range: Option<SelectionRange>, source: Source) {
        let range = range.map(|r| self.clamp(r));
        self.update_selection(range, source);
    }

    fn focus(&mut self) {
        if self.selection.is_some() {
            return;
        }
        let range = self.clamp(self.saved_range);
        self.update_selection(Some(range), Source::Api);
    }

    fn blur(&mut self) {
        self.update_selection(None, Source::Api);
    }

    fn enable(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn set_placeholder(&mut self, placeholder: &str) {
        self.placeholder = placeholder.to_string();
    }

    fn convert_html(&self, html: &str) -> Result<Delta, EngineError> {
        Ok(html_to_delta(html))
    }

    fn on_editor_change(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }

    fn off_editor_change(&mut self) {
        self.listeners.clear();
    }

    fn clear_chrome(&mut self) {
        self.stats
            .chrome_cleared
            .set(self.stats.chrome_cleared.get() + 1);
    }
}

/// Builds [`MemoryEngine`]s. The host is a unit: there is no element to
/// mount into.
#[derive(Debug, Default)]
pub struct MemoryFactory {
    stats: Rc<MemoryStats>,
    next_id: u64,
}

impl MemoryFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters shared with every engine this factory creates.
    pub fn stats(&self) -> Rc<MemoryStats> {
        self.stats.clone()
    }
}

impl EngineFactory for MemoryFactory {
    type Engine = MemoryEngine;
    type Host = ();

    fn create(&mut self, _host: &(), options: &EngineOptions) -> Result<MemoryEngine, EngineError> {
        let id = self.next_id;
        self.next_id += 1;
        tracing::debug!(engine = id, read_only = options.read_only, "creating memory engine");
        Ok(MemoryEngine::configured(id, options, self.stats.clone()))
    }
}

fn shift_for_insert(range: SelectionRange, at: usize, count: usize) -> SelectionRange {
    if range.index >= at {
        SelectionRange::new(range.index + count, range.length)
    } else if range.end() > at {
        SelectionRange::new(range.index, range.length + count)
    } else {
        range
    }
}

fn shift_for_delete(range: SelectionRange, at: usize, count: usize) -> SelectionRange {
    let map = |pos: usize| {
        if pos <= at {
            pos
        } else {
            pos.saturating_sub(count).max(at)
        }
    };
    let start = map(range.index);
    let end = map(range.end());
    SelectionRange::new(start, end - start)
}

fn cells_from_delta(delta: &Delta) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(delta.length() + 1);
    for op in delta.ops() {
        let Op::Insert { insert, attributes } = op else {
            continue;
        };
        match insert {
            Insert::Text(text) => cells.extend(text.chars().map(|c| Cell {
                content: Content::Char(c),
                attributes: attributes.clone(),
            })),
            Insert::Embed(embed) => cells.push(Cell {
                content: Content::Embed(embed.clone()),
                attributes: attributes.clone(),
            }),
        }
    }
    if !cells.last().is_some_and(Cell::is_newline) {
        cells.push(Cell::newline());
    }
    cells
}

fn is_set(attributes: &Attributes, name: &str) -> bool {
    attributes
        .get(name)
        .is_some_and(|v| !v.is_null() && *v != Value::Bool(false))
}

fn cells_to_html(cells: &[Cell]) -> String {
    let mut html = String::new();
    let mut line: Vec<&Cell> = Vec::new();
    for cell in cells {
        if !cell.is_newline() {
            line.push(cell);
            continue;
        }
        html.push_str("<p>");
        if line.is_empty() {
            html.push_str("<br>");
        }
        for run in line.chunk_by(|a, b| a.attributes == b.attributes) {
            write_run(&mut html, run);
        }
        html.push_str("</p>");
        line.clear();
    }
    html
}

fn write_run(html: &mut String, run: &[&Cell]) {
    let Some(first) = run.first() else {
        return;
    };
    let tags: Vec<&str> = [("bold", "strong"), ("italic", "em"), ("underline", "u")]
        .into_iter()
        .filter(|(format, _)| is_set(&first.attributes, format))
        .map(|(_, tag)| tag)
        .collect();

    for tag in &tags {
        html.push('<');
        html.push_str(tag);
        html.push('>');
    }
    for cell in run {
        match &cell.content {
            Content::Char(c) => escape_into(html, *c),
            Content::Embed(embed) => {
                if let Some(src) = embed.get("image").and_then(Value::as_str) {
                    html.push_str("<img src=\"");
                    src.chars().for_each(|c| escape_into(html, c));
                    html.push_str("\">");
                }
            }
        }
    }
    for tag in tags.iter().rev() {
        html.push_str("</");
        html.push_str(tag);
        html.push('>');
    }
}

fn escape_into(html: &mut String, c: char) {
    match c {
        '&' => html.push_str("&amp;"),
        '<' => html.push_str("&lt;"),
        '>' => html.push_str("&gt;"),
        '"' => html.push_str("&quot;"),
        c => html.push(c),
    }
}

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "blockquote", "pre",
];

/// Minimal HTML to delta conversion: block elements end lines, `<br>`
/// breaks them, and `b`/`strong`, `i`/`em` and `u` become inline formats.
/// Other tags are ignored and their text is kept.
fn html_to_delta(html: &str) -> Delta {
    let mut delta = Delta::new();
    let (mut bold, mut italic, mut underline) = (0usize, 0usize, 0usize);
    let mut pending_break = false;
    let mut line_open = false;
    let mut rest = html;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('<') {
            let Some(close) = after.find('>') else {
                break;
            };
            let tag = &after[..close];
            rest = &after[close + 1..];

            let closing = tag.starts_with('/');
            let name = tag
                .trim_start_matches('/')
                .split(|c: char| c.is_whitespace() || c == '/')
                .next()
                .unwrap_or_default()
                .to_ascii_lowercase();

            match name.as_str() {
                "b" | "strong" => adjust(&mut bold, closing),
                "i" | "em" => adjust(&mut italic, closing),
                "u" => adjust(&mut underline, closing),
                "br" => {
                    if pending_break {
                        delta = delta.insert("\n");
                    }
                    pending_break = true;
                    line_open = false;
                }
                block if BLOCK_TAGS.contains(&block) => {
                    if closing {
                        delta = delta.insert("\n");
                        pending_break = false;
                        line_open = false;
                    } else if line_open || pending_break {
                        delta = delta.insert("\n");
                        pending_break = false;
                        line_open = false;
                    }
                }
                _ => {}
            }
        } else {
            let end = rest.find('<').unwrap_or(rest.len());
            let text: String = decode_entities(&rest[..end])
                .chars()
                .filter(|c| *c != '\n' && *c != '\r')
                .collect();
            rest = &rest[end..];
            if text.is_empty() {
                continue;
            }
            if pending_break {
                delta = delta.insert("\n");
                pending_break = false;
            }
            let mut attrs = Attributes::new();
            if bold > 0 {
                attrs.insert("bold".into(), Value::Bool(true));
            }
            if italic > 0 {
                attrs.insert("italic".into(), Value::Bool(true));
            }
            if underline > 0 {
                attrs.insert("underline".into(), Value::Bool(true));
            }
            delta = delta.insert_with(text, attrs);
            line_open = true;
        }
    }
    if pending_break {
        delta = delta.insert("\n");
    }
    delta
}

fn adjust(depth: &mut usize, closing: bool) {
    if closing {
        *depth = depth.saturating_sub(1);
    } else {
        *depth += 1;
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
