//! Event bridge: turns the engine's multiplexed `editor-change` stream into
//! de-duplicated change, selection, focus and blur callbacks.
//!
//! The engine pushes raw events into an [`EventQueue`] from inside its own
//! mutating calls. The bridge drains the queue afterwards, when it can read
//! the engine again. Each text change carries the document state it
//! produced, so queued events are judged one by one against that state and
//! never against whatever the engine holds by the time they are drained.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use crate::delta::Delta;
use crate::engine::{ChangeListener, EditorEngine, ReadOnlyEditor};
use crate::types::{DocumentState, EditorChange, SelectionRange, Source};
use crate::value::{EditorValue, is_editor_value_equal};

/// Host callbacks for normalized editor events.
///
/// Every method defaults to doing nothing, so hosts implement only what they
/// need. `()` is the listener that ignores everything.
pub trait EditorListener<E: EditorEngine> {
    /// Document content changed. `value` uses the host's representation.
    fn on_change(
        &mut self,
        _value: &EditorValue,
        _delta: &Arc<Delta>,
        _source: Source,
        _editor: &ReadOnlyEditor<'_, E>,
    ) {
    }

    fn on_selection_change(
        &mut self,
        _range: Option<SelectionRange>,
        _source: Source,
        _editor: &ReadOnlyEditor<'_, E>,
    ) {
    }

    /// Selection went from none to some.
    fn on_focus(&mut self, _range: SelectionRange, _source: Source, _editor: &ReadOnlyEditor<'_, E>) {}

    /// Selection went from some to none. Receives the range that was lost.
    fn on_blur(
        &mut self,
        _previous: SelectionRange,
        _source: Source,
        _editor: &ReadOnlyEditor<'_, E>,
    ) {
    }
}

impl<E: EditorEngine> EditorListener<E> for () {}

type ChangeFn<E> = Box<dyn FnMut(&EditorValue, &Arc<Delta>, Source, &ReadOnlyEditor<'_, E>)>;
type SelectionFn<E> = Box<dyn FnMut(Option<SelectionRange>, Source, &ReadOnlyEditor<'_, E>)>;
type RangeFn<E> = Box<dyn FnMut(SelectionRange, Source, &ReadOnlyEditor<'_, E>)>;

/// An [`EditorListener`] assembled from optional closures.
pub struct Callbacks<E: EditorEngine> {
    on_change: Option<ChangeFn<E>>,
    on_selection_change: Option<SelectionFn<E>>,
    on_focus: Option<RangeFn<E>>,
    on_blur: Option<RangeFn<E>>,
}

impl<E: EditorEngine> Default for Callbacks<E> {
    fn default() -> Self {
        Self {
            on_change: None,
            on_selection_change: None,
            on_focus: None,
            on_blur: None,
        }
    }
}

impl<E: EditorEngine> Callbacks<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_change(
        mut self,
        f: impl FnMut(&EditorValue, &Arc<Delta>, Source, &ReadOnlyEditor<'_, E>) + 'static,
    ) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    pub fn on_selection_change(
        mut self,
        f: impl FnMut(Option<SelectionRange>, Source, &ReadOnlyEditor<'_, E>) + 'static,
    ) -> Self {
        self.on_selection_change = Some(Box::new(f));
        self
    }

    pub fn on_focus(
        mut self,
        f: impl FnMut(SelectionRange, Source, &ReadOnlyEditor<'_, E>) + 'static,
    ) -> Self {
        self.on_focus = Some(Box::new(f));
        self
    }

    pub fn on_blur(
        mut self,
        f: impl FnMut(SelectionRange, Source, &ReadOnlyEditor<'_, E>) + 'static,
    ) -> Self {
        self.on_blur = Some(Box::new(f));
        self
    }
}

impl<E: EditorEngine> EditorListener<E> for Callbacks<E> {
    fn on_change(
        &mut self,
        value: &EditorValue,
        delta: &Arc<Delta>,
        source: Source,
        editor: &ReadOnlyEditor<'_, E>,
    ) {
        if let Some(f) = &mut self.on_change {
            f(value, delta, source, editor);
        }
    }

    fn on_selection_change(
        &mut self,
        range: Option<SelectionRange>,
        source: Source,
        editor: &ReadOnlyEditor<'_, E>,
    ) {
        if let Some(f) = &mut self.on_selection_change {
            f(range, source, editor);
        }
    }

    fn on_focus(&mut self, range: SelectionRange, source: Source, editor: &ReadOnlyEditor<'_, E>) {
        if let Some(f) = &mut self.on_focus {
            f(range, source, editor);
        }
    }

    fn on_blur(
        &mut self,
        previous: SelectionRange,
        source: Source,
        editor: &ReadOnlyEditor<'_, E>,
    ) {
        if let Some(f) = &mut self.on_blur {
            f(previous, source, editor);
        }
    }
}

/// Queue the engine's subscription writes into and the bridge drains.
#[derive(Clone, Default)]
pub struct EventQueue(Rc<RefCell<VecDeque<EditorChange>>>);

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A listener that appends every event to this queue.
    pub fn listener(&self) -> ChangeListener {
        let queue = self.clone();
        Box::new(move |change| queue.0.borrow_mut().push_back(change))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    fn pop(&self) -> Option<EditorChange> {
        self.0.borrow_mut().pop_front()
    }
}

/// Per-instance event state: the last value, delta and selection the host
/// was told about.
#[derive(Default)]
pub struct EventBridge {
    queue: EventQueue,
    last_value: Option<EditorValue>,
    last_delta: Option<Arc<Delta>>,
    last_selection: Option<SelectionRange>,
}

impl EventBridge {
    /// Start from the host's initial value, which fixes the representation
    /// used for outbound values.
    pub fn new(initial_value: Option<EditorValue>) -> Self {
        Self {
            last_value: initial_value,
            ..Self::default()
        }
    }

    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    /// The canonical value: what the host last supplied or was last told.
    pub fn last_value(&self) -> Option<&EditorValue> {
        self.last_value.as_ref()
    }

    /// The delta most recently passed to `on_change`.
    pub fn last_delta(&self) -> Option<&Arc<Delta>> {
        self.last_delta.as_ref()
    }

    pub fn last_selection(&self) -> Option<SelectionRange> {
        self.last_selection
    }

    /// Whether `value` is the very delta object this bridge last emitted.
    pub fn is_tainted(&self, value: &EditorValue) -> bool {
        self.last_delta
            .as_ref()
            .is_some_and(|delta| value.is_exactly(delta))
    }

    /// Subscribe to a freshly created engine.
    pub fn attach<E: EditorEngine>(&self, engine: &mut E) {
        engine.on_editor_change(self.queue.listener());
    }

    /// Unsubscribe from an engine about to be destroyed.
    pub fn detach<E: EditorEngine>(&self, engine: &mut E) {
        engine.off_editor_change();
    }

    /// Dispatch every queued event against `engine`.
    pub fn dispatch<E, L>(&mut self, engine: &E, listener: &mut L)
    where
        E: EditorEngine,
        L: EditorListener<E> + ?Sized,
    {
        let editor = ReadOnlyEditor::new(engine);
        while let Some(change) = self.queue.pop() {
            tracing::trace!(event = change.event_name(), source = %change.source(), "dispatching editor change");
            match change {
                EditorChange::SelectionChange { range, source, .. } => {
                    self.change_selection(range, source, &editor, listener);
                }
                EditorChange::TextChange {
                    delta,
                    after,
                    source,
                    ..
                } => {
                    let selection = after.selection;
                    self.change_text(delta, after, source, &editor, listener);
                    // a text change can move the cursor without a separate
                    // selection event
                    self.change_selection(selection, source, &editor, listener);
                }
            }
        }
    }

    fn change_text<E, L>(
        &mut self,
        delta: Arc<Delta>,
        after: DocumentState,
        source: Source,
        editor: &ReadOnlyEditor<'_, E>,
        listener: &mut L,
    ) where
        E: EditorEngine,
        L: EditorListener<E> + ?Sized,
    {
        let value = match &self.last_value {
            Some(last) if last.is_delta() => EditorValue::Delta(after.contents),
            _ => EditorValue::Html(after.html),
        };

        let unchanged = self
            .last_value
            .as_ref()
            .is_some_and(|last| is_editor_value_equal(&value, last));
        if unchanged {
            tracing::trace!("text change produced an equal document, suppressed");
            return;
        }

        self.last_delta = Some(delta.clone());
        self.last_value = Some(value.clone());
        listener.on_change(&value, &delta, source, editor);
    }

    fn change_selection<E, L>(
        &mut self,
        range: Option<SelectionRange>,
        source: Source,
        editor: &ReadOnlyEditor<'_, E>,
        listener: &mut L,
    ) where
        E: EditorEngine,
        L: EditorListener<E> + ?Sized,
    {
        let previous = self.last_selection;
        if range == previous {
            return;
        }
        self.last_selection = range;

        listener.on_selection_change(range, source, editor);
        match (previous, range) {
            (None, Some(range)) => listener.on_focus(range, source, editor),
            (Some(previous), None) => listener.on_blur(previous, source, editor),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryEngine;

    /// Records every callback as a line of text.
    #[derive(Default)]
    struct Recorder {
        log: Vec<String>,
        deltas: Vec<Arc<Delta>>,
    }

    impl EditorListener<MemoryEngine> for Recorder {
        fn on_change(
            &mut self,
            value: &EditorValue,
            delta: &Arc<Delta>,
            source: Source,
            _editor: &ReadOnlyEditor<'_, MemoryEngine>,
        ) {
            let shown = match value {
                EditorValue::Html(html) => html.clone(),
                EditorValue::Delta(d) => format!("delta:{:?}", d.document_text()),
            };
            self.log.push(format!("change {shown} {source}"));
            self.deltas.push(delta.clone());
        }

        fn on_selection_change(
            &mut self,
            range: Option<SelectionRange>,
            source: Source,
            _editor: &ReadOnlyEditor<'_, MemoryEngine>,
        ) {
            self.log.push(format!("select {range:?} {source}"));
        }

        fn on_focus(
            &mut self,
            range: SelectionRange,
            _source: Source,
            _editor: &ReadOnlyEditor<'_, MemoryEngine>,
        ) {
            self.log.push(format!("focus {}", range.index));
        }

        fn on_blur(
            &mut self,
            previous: SelectionRange,
            _source: Source,
            _editor: &ReadOnlyEditor<'_, MemoryEngine>,
        ) {
            self.log.push(format!("blur {}", previous.index));
        }
    }

    fn attached(text: &str, initial: Option<EditorValue>) -> (MemoryEngine, EventBridge) {
        let mut engine = MemoryEngine::with_text(text);
        let bridge = EventBridge::new(initial);
        bridge.attach(&mut engine);
        (engine, bridge)
    }

    #[test]
    fn text_change_emits_html_when_host_uses_html() {
        let (mut engine, mut bridge) = attached("ab\n", Some(EditorValue::html("<p>ab</p>")));
        let mut rec = Recorder::default();

        engine.insert_text(2, "c", Source::User);
        bridge.dispatch(&engine, &mut rec);

        assert_eq!(rec.log, vec!["change <p>abc</p> user"]);
        assert_eq!(bridge.last_value(), Some(&EditorValue::html("<p>abc</p>")));
        assert!(Arc::ptr_eq(bridge.last_delta().unwrap(), &rec.deltas[0]));
    }

    #[test]
    fn text_change_emits_delta_when_host_uses_delta() {
        let initial = EditorValue::delta(Delta::new().insert("ab\n"));
        let (mut engine, mut bridge) = attached("ab\n", Some(initial));
        let mut rec = Recorder::default();

        engine.insert_text(0, "x", Source::User);
        bridge.dispatch(&engine, &mut rec);

        assert_eq!(rec.log, vec!["change delta:\"xab\\n\" user"]);
        assert!(bridge.last_value().unwrap().is_delta());
    }

    #[test]
    fn insert_then_delete_reports_both_changes() {
        let (mut engine, mut bridge) = attached("ab\n", Some(EditorValue::html("<p>ab</p>")));
        let mut rec = Recorder::default();

        let inserted = engine.insert_text(0, "z", Source::User);
        let deleted = engine.delete_text(0, 1, Source::User);
        bridge.dispatch(&engine, &mut rec);

        assert_eq!(rec.log, vec!["change <p>zab</p> user", "change <p>ab</p> user"]);
        assert_eq!(rec.deltas, vec![inserted, deleted]);
    }

    #[test]
    fn queued_changes_pair_each_value_with_its_delta() {
        let initial = EditorValue::delta(Delta::new().insert("ab\n"));
        let (mut engine, mut bridge) = attached("ab\n", Some(initial));
        let mut rec = Recorder::default();

        let first = engine.insert_text(0, "x", Source::User);
        let second = engine.insert_text(1, "y", Source::User);
        bridge.dispatch(&engine, &mut rec);

        assert_eq!(
            rec.log,
            vec![
                "change delta:\"xab\\n\" user",
                "change delta:\"xyab\\n\" user",
            ]
        );
        assert!(Arc::ptr_eq(&rec.deltas[0], &first));
        assert!(Arc::ptr_eq(&rec.deltas[1], &second));
        assert!(Arc::ptr_eq(bridge.last_delta().unwrap(), &second));
    }

    #[test]
    fn no_op_change_is_suppressed() {
        let (mut engine, mut bridge) = attached("ab\n", Some(EditorValue::html("<p>ab</p>")));
        let mut rec = Recorder::default();

        let same = engine.get_contents();
        engine.set_contents(&same, Source::Api).unwrap();
        bridge.dispatch(&engine, &mut rec);
        assert!(rec.log.is_empty());
    }

    #[test]
    fn focus_and_blur_follow_null_transitions() {
        let (mut engine, mut bridge) = attached("hello\n", None);
        let mut rec = Recorder::default();

        engine.set_selection(Some(SelectionRange::caret(1)), Source::User);
        engine.set_selection(Some(SelectionRange::caret(3)), Source::User);
        engine.blur();
        bridge.dispatch(&engine, &mut rec);

        assert_eq!(
            rec.log,
            vec![
                "select Some(SelectionRange { index: 1, length: 0 }) user",
                "focus 1",
                "select Some(SelectionRange { index: 3, length: 0 }) user",
                "select None api",
                "blur 3",
            ]
        );
    }

    #[test]
    fn text_change_recomputes_selection_after_change() {
        let (mut engine, mut bridge) = attached("ab\n", Some(EditorValue::html("<p>ab</p>")));
        let mut rec = Recorder::default();
        engine.set_selection(Some(SelectionRange::caret(2)), Source::User);
        bridge.dispatch(&engine, &mut rec);
        rec.log.clear();

        // typing shifts the caret without its own selection event
        engine.insert_text(2, "c", Source::User);
        bridge.dispatch(&engine, &mut rec);

        assert_eq!(
            rec.log,
            vec![
                "change <p>abc</p> user",
                "select Some(SelectionRange { index: 3, length: 0 }) user",
            ]
        );
    }

    #[test]
    fn detached_engine_no_longer_queues() {
        let (mut engine, bridge) = attached("ab\n", None);
        bridge.detach(&mut engine);
        engine.insert_text(0, "x", Source::User);
        assert!(bridge.queue().is_empty());
    }

    #[test]
    fn tainted_delta_is_recognized_by_identity() {
        let (mut engine, mut bridge) = attached("ab\n", Some(EditorValue::html("<p>ab</p>")));
        engine.insert_text(0, "x", Source::User);
        bridge.dispatch(&engine, &mut ());

        let emitted = bridge.last_delta().unwrap().clone();
        assert!(bridge.is_tainted(&EditorValue::Delta(emitted.clone())));
        assert!(!bridge.is_tainted(&EditorValue::delta((*emitted).clone())));
    }

    #[test]
    fn callbacks_adapter_forwards() {
        use std::cell::Cell;

        let (mut engine, mut bridge) = attached("ab\n", Some(EditorValue::html("")));
        let changes = Rc::new(Cell::new(0));
        let focused = Rc::new(Cell::new(false));
        let (c, f) = (changes.clone(), focused.clone());
        let mut callbacks = Callbacks::<MemoryEngine>::new()
            .on_change(move |_, _, _, editor| {
                assert_eq!(editor.get_text(0, None), "xab\n");
                c.set(c.get() + 1);
            })
            .on_focus(move |_, _, _| f.set(true));

        engine.insert_text(0, "x", Source::User);
        engine.focus();
        bridge.dispatch(&engine, &mut callbacks);

        assert_eq!(changes.get(), 1);
        assert!(focused.get());
    }
}
