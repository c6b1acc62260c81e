//! Plugin system and orchestrator (§4.5) plus the resolution-heuristics
//! glue built-in plugins that turn `grafema-analysis` output into a
//! fully enriched, validated graph.

pub mod dag;
pub mod error;
pub mod metadata;
pub mod orchestrator;
pub mod plugin;
pub mod plugins;

pub use error::{CycleError, OrchestratorError};
pub use metadata::{Phase, PluginMetadata};
pub use orchestrator::Orchestrator;
pub use plugin::{Plugin, PluginContext, PluginOutcome, Service, ServiceMetadata};

impl Orchestrator {
    /// Registers the reference pipeline: one plugin per phase this
    /// workspace ships, in the shape described in SPEC_FULL.md's
    /// orchestrator section. A config-driven deployment is free to
    /// build an `Orchestrator` directly and register a different set.
    pub fn with_default_plugins(project_path: impl Into<std::path::PathBuf>) -> Self {
        let mut orch = Orchestrator::new(project_path);
        orch.register(Box::new(plugins::WorkspaceDiscoveryPlugin));
        orch.register(Box::new(plugins::ModuleIndexingPlugin));
        orch.register(Box::new(plugins::WalkerAnalysisPlugin));
        orch.register(Box::new(plugins::SecurityCategoryEnrichmentPlugin));
        orch.register(Box::new(plugins::UnresolvedCallValidationPlugin));
        orch.register(Box::new(plugins::DisconnectedNodeValidationPlugin));
        orch
    }
}
