//! The declarative editor component.
//!
//! [`RichEditor`] is driven by render passes: the host calls
//! [`RichEditor::render`] with its current props whenever they may have
//! changed, and [`RichEditor::process_events`] after the user interacted
//! with the editor. Everything the engine emits is reported through an
//! [`EditorListener`].

use serde::Serialize;
use serde_json::{Map, Value};

use crate::bridge::{EditorListener, EventBridge};
use crate::engine::EngineFactory;
use crate::error::BridgeError;
use crate::lifecycle::Lifecycle;
use crate::props::EditorProps;
use crate::sync::InboundSync;
use crate::version::VersionTracker;

pub const CONTAINER_ROLE: &str = "textbox";
pub const CONTAINER_TEST_ID: &str = "rich-editor-core";
pub const AREA_TEST_ID: &str = "editing-area";

/// Tag of the element the engine is mounted into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaTag {
    #[default]
    Div,
    /// Used when whitespace is preserved.
    Pre,
}

impl AreaTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            AreaTag::Div => "div",
            AreaTag::Pre => "pre",
        }
    }
}

/// What the host renders around the engine for one pass.
///
/// A container carrying the role, test id and configuration version, with
/// the editing area inside it. The host mounts the editing area and hands
/// it back through [`RichEditor::set_host`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedSurface {
    pub role: &'static str,
    pub test_id: &'static str,
    pub version: u64,
    pub area_tag: AreaTag,
    pub area_test_id: &'static str,
    /// Unrecognized props, passed through to the container.
    pub attributes: Map<String, Value>,
}

impl RenderedSurface {
    fn new(props: &EditorProps, version: u64) -> Self {
        Self {
            role: CONTAINER_ROLE,
            test_id: CONTAINER_TEST_ID,
            version,
            area_tag: if props.preserve_whitespace {
                AreaTag::Pre
            } else {
                AreaTag::Div
            },
            area_test_id: AREA_TEST_ID,
            attributes: props.attributes.clone(),
        }
    }

    /// Static markup of the surface, for server rendering.
    pub fn to_html(&self) -> String {
        let mut html = format!(
            "<div role=\"{}\" data-testid=\"{}\" data-version=\"{}\"",
            self.role, self.test_id, self.version
        );
        for (name, value) in &self.attributes {
            let name = if name == "className" { "class" } else { name };
            match value {
                Value::String(s) => {
                    html.push_str(&format!(" {name}=\"{}\"", escape_attribute(s)));
                }
                Value::Number(n) => html.push_str(&format!(" {name}=\"{n}\"")),
                Value::Bool(true) => html.push_str(&format!(" {name}")),
                // objects, arrays and functions do not render as attributes
                _ => {}
            }
        }
        let tag = self.area_tag.as_str();
        html.push_str(&format!(
            "><{tag} data-testid=\"{}\"></{tag}></div>",
            self.area_test_id
        ));
        html
    }
}

fn escape_attribute(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

/// A rich-text editor bound to an engine created by `F`.
///
/// Owns at most one live engine. The engine is created on the first pass
/// that has a host element, and recreated each time the configuration
/// version changes.
pub struct RichEditor<F: EngineFactory> {
    factory: F,
    host: Option<F::Host>,
    versions: VersionTracker,
    lifecycle: Lifecycle<F::Engine>,
    bridge: Option<EventBridge>,
    sync: InboundSync,
}

impl<F: EngineFactory> RichEditor<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            host: None,
            versions: VersionTracker::new(),
            lifecycle: Lifecycle::new(),
            bridge: None,
            sync: InboundSync::new(),
        }
    }

    /// Like [`RichEditor::new`] with a host element already available.
    pub fn with_host(factory: F, host: F::Host) -> Self {
        let mut editor = Self::new(factory);
        editor.host = Some(host);
        editor
    }

    /// Attach or detach the host element. Takes effect on the next mount.
    pub fn set_host(&mut self, host: Option<F::Host>) {
        self.host = host;
    }

    pub fn host(&self) -> Option<&F::Host> {
        self.host.as_ref()
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// The live engine, if one is mounted.
    pub fn editor(&self) -> Option<&F::Engine> {
        self.lifecycle.editor()
    }

    pub fn editor_mut(&mut self) -> Option<&mut F::Engine> {
        self.lifecycle.editor_mut()
    }

    /// Current configuration version.
    pub fn version(&self) -> u64 {
        self.versions.version()
    }

    pub fn lifecycle(&self) -> &Lifecycle<F::Engine> {
        &self.lifecycle
    }

    /// Run one render pass with the host's current props.
    ///
    /// Dispatches events left over from earlier interaction, recreates the
    /// engine if the configuration changed, reconciles value, `enabled` and
    /// placeholder, then dispatches the events those steps produced.
    pub fn render<L>(
        &mut self,
        props: &EditorProps,
        listener: &mut L,
    ) -> Result<RenderedSurface, BridgeError>
    where
        L: EditorListener<F::Engine> + ?Sized,
    {
        let bridge = self
            .bridge
            .get_or_insert_with(|| EventBridge::new(props.current_value().cloned()));
        if let Some(engine) = self.lifecycle.editor() {
            bridge.dispatch(engine, listener);
        }

        let version = self.versions.observe(props);
        if self.lifecycle.needs_mount(version) {
            match &self.host {
                Some(host) => self
                    .lifecycle
                    .mount(&mut self.factory, host, props, version, bridge)?,
                None => tracing::debug!(version, "no host element yet, deferring mount"),
            }
        }

        let generation = self.lifecycle.generation();
        if let Some(engine) = self.lifecycle.editor_mut() {
            self.sync
                .sync_value(engine, generation, props.current_value(), bridge)?;
            self.sync.sync_enabled(engine, generation, props);
            self.sync
                .sync_placeholder(engine, generation, props.placeholder.as_deref());
            bridge.dispatch(engine, listener);
        }

        Ok(RenderedSurface::new(props, version))
    }

    /// Dispatch events the engine emitted since the last pass.
    pub fn process_events<L>(&mut self, listener: &mut L)
    where
        L: EditorListener<F::Engine> + ?Sized,
    {
        if let (Some(bridge), Some(engine)) = (&mut self.bridge, self.lifecycle.editor()) {
            bridge.dispatch(engine, listener);
        }
    }

    /// Destroy the live engine. Undispatched events are dropped. Safe to
    /// call repeatedly; a later render mounts again.
    pub fn unmount(&mut self) {
        if let Some(bridge) = &self.bridge {
            self.lifecycle.teardown(bridge);
            bridge.queue().clear();
        }
    }
}

impl<F: EngineFactory> Drop for RichEditor<F> {
    fn drop(&mut self) {
        self.unmount();
    }
}
