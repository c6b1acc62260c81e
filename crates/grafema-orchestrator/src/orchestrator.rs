//! The five-phase orchestrator (§4.5): DISCOVERY → INDEXING → ANALYSIS →
//! ENRICHMENT → VALIDATION, built on a real metadata-driven registry
//! and dependency-ordered execution rather than a fixed call sequence.

use crate::dag::toposort;
use crate::error::OrchestratorError;
use crate::metadata::Phase;
use crate::plugin::{Plugin, PluginContext, Service};
use grafema_core::{DiagnosticCollector, Graph, SymbolTable};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Registry of plugins plus the fixed project path they all run
/// against. Plugins are free to be registered in any order; dependency
/// order within a phase is always recomputed from `produces`/`consumes`
/// plus explicit `dependencies` (§4.5).
pub struct Orchestrator {
    plugins: Vec<Box<dyn Plugin>>,
    project_path: PathBuf,
}

impl Orchestrator {
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        Orchestrator { plugins: Vec::new(), project_path: project_path.into() }
    }

    pub fn register(&mut self, plugin: Box<dyn Plugin>) -> &mut Self {
        self.plugins.push(plugin);
        self
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }

    fn plugins_in_phase(&self, phase: Phase) -> Vec<&dyn Plugin> {
        self.plugins.iter().map(|p| p.as_ref()).filter(|p| p.metadata().phase == phase).collect()
    }

    /// Runs all five phases in registration-independent, dependency-
    /// ordered sequence. `files` is the set of source paths this run
    /// covers, supplied by the caller (the CLI collaborator owns
    /// filesystem crawling, §1/§6) — INDEXING and ANALYSIS plugins
    /// iterate it directly rather than walking the tree themselves.
    ///
    /// Cross-phase happens-before (§5) is structural: a phase's plugins
    /// are all awaited to completion before the next phase's dependency
    /// graph is even built, so no ANALYSIS plugin can observe
    /// ENRICHMENT output.
    pub async fn run(&self, files: &[PathBuf]) -> Result<(Graph, DiagnosticCollector), OrchestratorError> {
        let graph = Mutex::new(Graph::new());
        let symbols = SymbolTable::new();
        let diagnostics = Mutex::new(DiagnosticCollector::new());
        let mut services: Vec<Service> = Vec::new();

        for phase in Phase::all() {
            let phase_plugins = self.plugins_in_phase(phase);
            let metadata: Vec<_> = phase_plugins.iter().map(|p| p.metadata()).collect();
            let order = toposort(phase.as_str(), &metadata)?;

            for name in order {
                let plugin = phase_plugins
                    .iter()
                    .find(|p| p.metadata().name == name)
                    .expect("toposort only ever returns names from the plugins it was given");

                let ctx = PluginContext {
                    project_path: self.project_path.clone(),
                    files,
                    graph: &graph,
                    symbols: &symbols,
                    services: &services,
                    diagnostics: &diagnostics,
                    defer_indexing: false,
                };

                match plugin.execute(&ctx).await {
                    Ok(outcome) => {
                        if phase == Phase::Discovery {
                            services.extend(outcome.services);
                        }
                        if !outcome.success {
                            tracing::warn!(plugin = %name, phase = %phase, errors = ?outcome.errors, "plugin reported failure");
                        }
                    }
                    Err(err) => {
                        // PluginError (§7): the phase continues with
                        // the remaining plugins unless marked required;
                        // this workspace has no required-plugin concept
                        // yet (§9 Open Questions), so every failure is
                        // non-fatal to the phase.
                        tracing::error!(plugin = %name, phase = %phase, error = %err, "plugin errored");
                    }
                }
            }
        }

        let graph = graph.into_inner().expect("no panics while holding the graph lock");
        let diagnostics = diagnostics.into_inner().expect("no panics while holding the diagnostics lock");
        Ok((graph, diagnostics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::PluginMetadata;
    use crate::plugin::PluginOutcome;
    use async_trait::async_trait;
    use grafema_core::NodeId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingPlugin {
        name: &'static str,
        phase: Phase,
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Plugin for CountingPlugin {
        fn metadata(&self) -> PluginMetadata {
            PluginMetadata::new(self.name, self.phase)
        }

        async fn execute(&self, _ctx: &PluginContext<'_>) -> anyhow::Result<PluginOutcome> {
            self.order.lock().unwrap().push(self.name);
            Ok(PluginOutcome::ok())
        }
    }

    #[tokio::test]
    async fn phases_run_in_fixed_order_regardless_of_registration() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut orch = Orchestrator::new("/tmp/project");
        orch.register(Box::new(CountingPlugin { name: "validate", phase: Phase::Validation, order: order.clone() }));
        orch.register(Box::new(CountingPlugin { name: "discover", phase: Phase::Discovery, order: order.clone() }));
        orch.register(Box::new(CountingPlugin { name: "index", phase: Phase::Indexing, order: order.clone() }));

        orch.run(&[]).await.unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["discover", "index", "validate"]);
    }

    struct NodeCreatingPlugin;

    #[async_trait]
    impl Plugin for NodeCreatingPlugin {
        fn metadata(&self) -> PluginMetadata {
            PluginMetadata::new("node-creator", Phase::Indexing)
        }

        async fn execute(&self, ctx: &PluginContext<'_>) -> anyhow::Result<PluginOutcome> {
            ctx.graph.lock().unwrap().add_node(grafema_core::GraphNode::new(
                NodeId::new("MODULE|a.ts"),
                grafema_core::NodeType::module(),
                "a.ts",
                "a.ts",
            ));
            Ok(PluginOutcome::ok())
        }
    }

    #[tokio::test]
    async fn plugin_output_is_visible_in_the_returned_graph() {
        let mut orch = Orchestrator::new("/tmp/project");
        orch.register(Box::new(NodeCreatingPlugin));
        let (graph, diagnostics) = orch.run(&[]).await.unwrap();
        assert!(graph.get_node(&NodeId::new("MODULE|a.ts")).is_some());
        assert!(diagnostics.is_empty());
    }

    struct FailingPlugin(AtomicUsize);

    #[async_trait]
    impl Plugin for FailingPlugin {
        fn metadata(&self) -> PluginMetadata {
            PluginMetadata::new("always-fails", Phase::Validation)
        }

        async fn execute(&self, _ctx: &PluginContext<'_>) -> anyhow::Result<PluginOutcome> {
            self.0.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("boom")
        }
    }

    #[tokio::test]
    async fn a_failing_plugin_does_not_fail_the_whole_run() {
        let mut orch = Orchestrator::new("/tmp/project");
        orch.register(Box::new(FailingPlugin(AtomicUsize::new(0))));
        let result = orch.run(&[]).await;
        assert!(result.is_ok());
    }
}
