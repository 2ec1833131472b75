//! Instance lifecycle: owns the live engine and replaces it whenever the
//! configuration version moves, carrying content and selection across.

use crate::bridge::EventBridge;
use crate::delta::Delta;
use crate::engine::{EditorEngine, EngineFactory, EngineOptions};
use crate::error::EngineError;
use crate::props::EditorProps;
use crate::types::{SelectionRange, Source};
use crate::utils::{set_editor_contents, set_editor_cursor_end, set_editor_selection};
use crate::value::EditorValue;

/// State captured from an engine right before it is destroyed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PersistedSnapshot {
    pub content: Option<Delta>,
    pub selection: Option<SelectionRange>,
}

/// Owner of the live engine handle.
///
/// The handle is only ever published fully initialized: content applied,
/// selection restored and the event bridge attached.
pub struct Lifecycle<E: EditorEngine> {
    handle: Option<E>,
    snapshot: PersistedSnapshot,
    mounted_version: Option<u64>,
    generation: u64,
}

impl<E: EditorEngine> Default for Lifecycle<E> {
    fn default() -> Self {
        Self {
            handle: None,
            snapshot: PersistedSnapshot::default(),
            mounted_version: None,
            generation: 0,
        }
    }
}

impl<E: EditorEngine> Lifecycle<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn editor(&self) -> Option<&E> {
        self.handle.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut E> {
        self.handle.as_mut()
    }

    pub fn is_mounted(&self) -> bool {
        self.handle.is_some()
    }

    /// Configuration version the live handle was created for.
    pub fn mounted_version(&self) -> Option<u64> {
        self.mounted_version
    }

    /// Bumped every time a new handle is published. Lets downstream
    /// reconcilers tell that the handle identity changed.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The state captured at the last teardown.
    pub fn snapshot(&self) -> &PersistedSnapshot {
        &self.snapshot
    }

    pub fn needs_mount(&self, version: u64) -> bool {
        self.mounted_version != Some(version)
    }

    /// Destroy the live handle, if any, capturing its content and selection.
    ///
    /// Unsubscribes before reading state so nothing is dispatched from a
    /// dying engine. Safe to call without a handle.
    pub fn teardown(&mut self, bridge: &EventBridge) {
        let Some(mut engine) = self.handle.take() else {
            return;
        };
        bridge.detach(&mut engine);
        self.snapshot = PersistedSnapshot {
            content: Some(engine.get_contents()),
            selection: engine.get_selection(),
        };
        engine.clear_chrome();
        self.mounted_version = None;
        tracing::debug!(
            generation = self.generation,
            has_selection = self.snapshot.selection.is_some(),
            "editor instance torn down"
        );
    }

    /// Replace the live handle with a new engine built for `version`.
    ///
    /// On error the previous handle is already gone and nothing is
    /// published; the caller retries on its next pass.
    pub fn mount<F>(
        &mut self,
        factory: &mut F,
        host: &F::Host,
        props: &EditorProps,
        version: u64,
        bridge: &EventBridge,
    ) -> Result<(), EngineError>
    where
        F: EngineFactory<Engine = E>,
    {
        self.teardown(bridge);

        let mut engine = factory.create(host, &EngineOptions::from(props))?;
        if let Err(err) = self.initialize(&mut engine, props) {
            engine.clear_chrome();
            return Err(err);
        }
        bridge.attach(&mut engine);

        self.handle = Some(engine);
        self.mounted_version = Some(version);
        self.generation += 1;
        tracing::debug!(version, generation = self.generation, "editor instance mounted");
        Ok(())
    }

    fn initialize(&self, engine: &mut E, props: &EditorProps) -> Result<(), EngineError> {
        // a snapshot means this is a recreation, not a first load
        let content = match &self.snapshot.content {
            Some(delta) => Some(EditorValue::delta(delta.clone())),
            None => props.current_value().cloned(),
        };
        if let Some(content) = content {
            set_editor_contents(engine, &content, Source::Api)?;
        }

        if let Some(selection) = self.snapshot.selection {
            set_editor_selection(engine, Some(selection), Source::Api);
            engine.focus();
        } else if props.auto_focus {
            set_editor_cursor_end(engine, Source::Silent);
            engine.focus();
        } else {
            engine.blur();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryEngine, MemoryFactory};

    /// Fails every creation while `fail` is set.
    struct FlakyFactory {
        inner: MemoryFactory,
        fail: bool,
    }

    impl EngineFactory for FlakyFactory {
        type Engine = MemoryEngine;
        type Host = ();

        fn create(&mut self, host: &(), options: &EngineOptions) -> Result<MemoryEngine, EngineError> {
            if self.fail {
                return Err(EngineError::from("host element detached"));
            }
            self.inner.create(host, options)
        }
    }

    fn mounted(props: &EditorProps) -> (Lifecycle<MemoryEngine>, MemoryFactory, EventBridge) {
        let mut factory = MemoryFactory::new();
        let bridge = EventBridge::new(props.current_value().cloned());
        let mut lifecycle = Lifecycle::new();
        lifecycle.mount(&mut factory, &(), props, 0, &bridge).unwrap();
        (lifecycle, factory, bridge)
    }

    #[test]
    fn first_mount_applies_value_and_blurs() {
        let props = EditorProps::default().with_value("<p>hello</p>");
        let (lifecycle, _factory, bridge) = mounted(&props);

        let engine = lifecycle.editor().unwrap();
        assert_eq!(engine.get_text(0, None), "hello\n");
        assert_eq!(engine.get_selection(), None);
        assert_eq!(engine.listener_count(), 1);
        assert_eq!(lifecycle.mounted_version(), Some(0));
        assert_eq!(lifecycle.generation(), 1);
        // initialization happens before the bridge subscribes
        assert!(bridge.queue().is_empty());
    }

    #[test]
    fn default_value_is_used_without_value() {
        let props = EditorProps::default().with_default_value("<p>draft</p>");
        let (lifecycle, _factory, _bridge) = mounted(&props);
        assert_eq!(lifecycle.editor().unwrap().get_text(0, None), "draft\n");
    }

    #[test]
    fn autofocus_puts_cursor_at_end() {
        let props = EditorProps::default().with_value("<p>abc</p>").auto_focus(true);
        let (lifecycle, _factory, _bridge) = mounted(&props);
        let engine = lifecycle.editor().unwrap();
        assert_eq!(engine.get_selection(), Some(SelectionRange::caret(3)));
        assert!(engine.has_focus());
    }

    #[test]
    fn recreation_carries_content_and_selection() {
        let props = EditorProps::default().with_value("<p>hello</p>");
        let (mut lifecycle, mut factory, bridge) = mounted(&props);
        let stats = factory.stats();

        let engine = lifecycle.editor_mut().unwrap();
        engine.insert_text(5, " world", Source::User);
        engine.set_selection(Some(SelectionRange::new(2, 4)), Source::User);
        let before = (engine.get_contents(), engine.get_selection());
        let first_id = engine.id();

        lifecycle.mount(&mut factory, &(), &props, 1, &bridge).unwrap();

        let engine = lifecycle.editor().unwrap();
        assert_ne!(engine.id(), first_id);
        assert_eq!((engine.get_contents(), engine.get_selection()), before);
        assert_eq!(stats.live(), 1);
        assert_eq!(stats.chrome_cleared(), 1);
        assert_eq!(lifecycle.generation(), 2);
    }

    #[test]
    fn teardown_is_idempotent() {
        let props = EditorProps::default().with_value("<p>x</p>");
        let (mut lifecycle, factory, bridge) = mounted(&props);

        lifecycle.teardown(&bridge);
        lifecycle.teardown(&bridge);

        assert!(!lifecycle.is_mounted());
        assert_eq!(lifecycle.mounted_version(), None);
        assert_eq!(factory.stats().chrome_cleared(), 1);
        assert_eq!(
            lifecycle.snapshot().content,
            Some(Delta::new().insert("x\n"))
        );
    }

    #[test]
    fn failed_creation_keeps_snapshot_for_retry() {
        let props = EditorProps::default().with_value("<p>keep</p>");
        let mut factory = FlakyFactory {
            inner: MemoryFactory::new(),
            fail: false,
        };
        let bridge = EventBridge::new(props.current_value().cloned());
        let mut lifecycle = Lifecycle::new();
        lifecycle.mount(&mut factory, &(), &props, 0, &bridge).unwrap();
        lifecycle
            .editor_mut()
            .unwrap()
            .insert_text(0, "still ", Source::User);

        factory.fail = true;
        let err = lifecycle
            .mount(&mut factory, &(), &props, 1, &bridge)
            .unwrap_err();
        assert!(err.to_string().contains("detached"));
        assert!(!lifecycle.is_mounted());
        assert!(lifecycle.needs_mount(1));

        factory.fail = false;
        lifecycle.mount(&mut factory, &(), &props, 1, &bridge).unwrap();
        assert_eq!(
            lifecycle.editor().unwrap().get_text(0, None),
            "still keep\n"
        );
    }
}
