//! Error types for the bridge and its engine collaborator.

use miette::Diagnostic;
use thiserror::Error;

/// Error reported by an editor engine.
///
/// Engines are opaque; they describe their failures as text.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("editor engine error: {0}")]
#[diagnostic(code(rich_bridge::engine))]
pub struct EngineError(pub String);

impl From<&str> for EngineError {
    fn from(s: &str) -> Self {
        EngineError(s.to_string())
    }
}

impl From<String> for EngineError {
    fn from(s: String) -> Self {
        EngineError(s)
    }
}

/// Errors surfaced to the host from a render pass.
#[derive(Debug, Error, Diagnostic)]
#[non_exhaustive]
pub enum BridgeError {
    /// The host passed the `delta` argument of its change callback back in
    /// as the `value` prop. Applying it would feed the change back into the
    /// editor and loop.
    #[error(
        "You are passing the `delta` object from the `on_change` event back as `value`. \
         You most probably want `editor.get_contents()` instead"
    )]
    #[diagnostic(
        code(rich_bridge::delta_fed_back),
        help("store the `value` argument of `on_change`, not `delta`")
    )]
    DeltaFedBackAsValue,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Engine(#[from] EngineError),
}
