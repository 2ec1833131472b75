//! rich-bridge-core: Framework-free binding between a declarative host and
//! an imperative rich-text engine.
//!
//! This crate provides:
//! - `EditorEngine` / `EngineFactory` traits the engine is reached through
//! - `Lifecycle` - creates and recreates the engine per configuration version
//! - `EventBridge` - de-duplicated change, selection, focus and blur callbacks
//! - `InboundSync` - writes value, enabled and placeholder props into the engine
//! - `RichEditor` - the component shell tying them together per render pass
//! - `MemoryEngine` - headless engine for native hosts and tests

pub mod bridge;
pub mod component;
pub mod delta;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod memory;
pub mod props;
pub mod sync;
pub mod types;
pub mod utils;
pub mod value;
pub mod version;

pub use bridge::{Callbacks, EditorListener, EventBridge, EventQueue};
pub use component::{AreaTag, RenderedSurface, RichEditor};
pub use delta::{Attributes, Delta, Insert, Op};
pub use engine::{ChangeListener, EditorEngine, EngineFactory, EngineOptions, ReadOnlyEditor};
pub use error::{BridgeError, EngineError};
pub use lifecycle::{Lifecycle, PersistedSnapshot};
pub use memory::{MemoryEngine, MemoryFactory, MemoryLeaf, MemoryStats};
pub use props::EditorProps;
pub use smol_str::SmolStr;
pub use sync::InboundSync;
pub use types::{Bounds, DocumentState, EditorChange, Formats, Modules, SelectionRange, Source};
pub use utils::{clamp_range, set_editor_contents, set_editor_cursor_end, set_editor_selection};
pub use value::{EditorValue, is_delta_equal, is_editor_value_equal, is_optional_value_equal};
pub use version::VersionTracker;
