//! Configuration version: the counter that decides when the engine must be
//! recreated.

use smol_str::SmolStr;

use crate::props::EditorProps;
use crate::types::Modules;

/// The props whose change requires a new engine instance.
#[derive(Clone, Debug, PartialEq)]
struct TrackedConfig {
    read_only: bool,
    modules: Modules,
    formats: Option<Vec<SmolStr>>,
    bounds: Option<String>,
    theme: Option<String>,
    scrolling_container: Option<String>,
    preserve_whitespace: bool,
}

impl From<&EditorProps> for TrackedConfig {
    fn from(props: &EditorProps) -> Self {
        Self {
            read_only: props.read_only,
            modules: props.modules.clone(),
            formats: props.formats.clone(),
            bounds: props.bounds.clone(),
            theme: props.theme.clone(),
            scrolling_container: props.scrolling_container.clone(),
            preserve_whitespace: props.preserve_whitespace,
        }
    }
}

/// Tracks the configuration version of one component instance.
///
/// The first observation records the configuration at the initial version.
/// Every later observation whose tracked config differs bumps the version
/// by exactly one, however many inputs changed together. Value, placeholder,
/// `enabled` and callbacks are not tracked.
#[derive(Debug, Default)]
pub struct VersionTracker {
    version: u64,
    last: Option<TrackedConfig>,
}

impl VersionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting from `initial` instead of zero.
    pub fn starting_at(initial: u64) -> Self {
        Self {
            version: initial,
            last: None,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Observe this pass's props and return the resulting version.
    pub fn observe(&mut self, props: &EditorProps) -> u64 {
        let next = TrackedConfig::from(props);
        match &self.last {
            None => {}
            Some(prev) if *prev == next => return self.version,
            Some(_) => {
                self.version += 1;
                tracing::debug!(version = self.version, "editor configuration changed");
            }
        }
        self.last = Some(next);
        self.version
    }
}
