//! Browser layer for rich-bridge: the Quill engine.
//!
//! Binds the global `Quill` constructor through wasm-bindgen and adapts it
//! to [`EditorEngine`]. It assumes a `wasm32-unknown-unknown` target with
//! Quill loaded on the page.
//!
//! # Architecture
//!
//! - `quill`: raw bindings to the Quill API
//! - `engine`: `QuillEngine` / `QuillFactory` and event conversion
//! - `chrome`: removal of toolbar and tooltip nodes Quill leaves behind
//!
//! # Re-exports
//!
//! This crate re-exports `rich-bridge-core` for convenience, so consumers
//! only need to depend on `rich-bridge-browser`.

// Re-export core crate
pub use rich_bridge_core;
pub use rich_bridge_core::*;

pub mod chrome;
pub mod engine;
pub mod quill;

pub use chrome::clear_toolbar_node;
pub use engine::{
    EventPump, QuillEngine, QuillFactory, document_state, js_error, parse_editor_change,
};
pub use quill::Quill;
