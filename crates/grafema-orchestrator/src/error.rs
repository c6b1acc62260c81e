//! Error taxonomy this crate owns (§7): `CycleError` is fatal to the
//! phase it occurs in; `PluginError` lets the phase continue with the
//! remaining plugins.

use thiserror::Error;

/// An unbreakable dependency cycle discovered while toposorting one
/// phase's plugins (§4.5, §8 Toposort correctness).
#[derive(Debug, Clone, Error)]
#[error("dependency cycle in phase {phase}: {}", cycle.join(" -> "))]
pub struct CycleError {
    pub phase: String,
    pub cycle: Vec<String>,
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Cycle(#[from] CycleError),

    #[error("plugin {plugin} failed: {message}")]
    Plugin { plugin: String, message: String },
}
