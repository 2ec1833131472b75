//! Inbound sync: writes prop changes into the live engine.
//!
//! Each reconciler remembers the inputs it last acted on, together with the
//! generation of the handle it acted on, and only runs again when one of
//! them moved. A prop the host keeps passing unchanged therefore never
//! overwrites what the user typed since.

use crate::bridge::EventBridge;
use crate::engine::EditorEngine;
use crate::error::BridgeError;
use crate::props::EditorProps;
use crate::types::Source;
use crate::utils::{set_editor_contents, set_editor_cursor_end};
use crate::value::{EditorValue, is_editor_value_equal};

#[derive(Clone, Debug, PartialEq)]
struct EnabledInputs {
    generation: u64,
    read_only: bool,
    enabled: Option<bool>,
    auto_focus: bool,
}

/// Per-instance state of the inbound reconcilers.
#[derive(Debug, Default)]
pub struct InboundSync {
    value_seen: Option<(u64, Option<EditorValue>)>,
    enabled_seen: Option<EnabledInputs>,
    placeholder_seen: Option<(u64, String)>,
}

impl InboundSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the supplied value into the engine if it differs from the
    /// canonical one.
    ///
    /// Rejects the delta object the bridge last emitted before touching the
    /// engine. A rejected value is not recorded, so the error repeats until
    /// the host stops passing it.
    pub fn sync_value<E: EditorEngine>(
        &mut self,
        engine: &mut E,
        generation: u64,
        value: Option<&EditorValue>,
        bridge: &EventBridge,
    ) -> Result<(), BridgeError> {
        let unchanged = self.value_seen.as_ref().is_some_and(|(seen_gen, seen)| {
            *seen_gen == generation
                && match (seen, value) {
                    (Some(a), Some(b)) => a.same(b),
                    (None, None) => true,
                    _ => false,
                }
        });
        if unchanged {
            return Ok(());
        }

        if let Some(value) = value {
            if bridge.is_tainted(value) {
                return Err(BridgeError::DeltaFedBackAsValue);
            }
            let current = bridge
                .last_value()
                .is_some_and(|last| is_editor_value_equal(value, last));
            if !current {
                tracing::debug!(generation, delta = value.is_delta(), "applying supplied value");
                set_editor_contents(engine, value, Source::Api)?;
            }
        }

        self.value_seen = Some((generation, value.cloned()));
        Ok(())
    }

    /// Apply `enabled` unless the editor is read-only. Enabling with
    /// autofocus moves the cursor to the end and focuses.
    pub fn sync_enabled<E: EditorEngine>(
        &mut self,
        engine: &mut E,
        generation: u64,
        props: &EditorProps,
    ) {
        let inputs = EnabledInputs {
            generation,
            read_only: props.read_only,
            enabled: props.enabled,
            auto_focus: props.auto_focus,
        };
        if self.enabled_seen.as_ref() == Some(&inputs) {
            return;
        }
        self.enabled_seen = Some(inputs);

        if props.read_only {
            return;
        }
        if let Some(enabled) = props.enabled {
            engine.enable(enabled);
            if enabled && props.auto_focus {
                set_editor_cursor_end(engine, Source::Api);
                engine.focus();
            }
        }
    }

    /// Mirror the placeholder, empty when none is given.
    pub fn sync_placeholder<E: EditorEngine>(
        &mut self,
        engine: &mut E,
        generation: u64,
        placeholder: Option<&str>,
    ) {
        let placeholder = placeholder.unwrap_or_default();
        let unchanged = self
            .placeholder_seen
            .as_ref()
            .is_some_and(|(seen_gen, seen)| *seen_gen == generation && seen == placeholder);
        if unchanged {
            return;
        }
        engine.set_placeholder(placeholder);
        self.placeholder_seen = Some((generation, placeholder.to_string()));
    }
}
