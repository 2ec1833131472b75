//! WASM bindings for the rich-bridge editor component.
//!
//! Lets a JavaScript host (React or anything with a render cycle) drive a
//! Quill editor through `JsRichEditor`: pass props on every render, get
//! normalized `onChange` / `onSelectionChange` / `onFocus` / `onBlur`
//! callbacks back.

mod editor;
mod types;
mod view;

pub use editor::*;
pub use types::*;
pub use view::*;

use wasm_bindgen::prelude::*;

/// Install the panic hook and route `tracing` output to the console.
#[wasm_bindgen(start)]
pub fn init() {
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    console_error_panic_hook::set_once();

    let level = if cfg!(debug_assertions) {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(level)
            .build(),
    );
    let _ = set_global_default(Registry::default().with(wasm_layer));
}
