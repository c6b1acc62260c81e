//! DISCOVERY plugins: produce the service manifest seeding later
//! phases (§4.5, §6 Service manifest / workspace detection).

use crate::metadata::{Phase, PluginMetadata};
use crate::plugin::{Plugin, PluginContext, PluginOutcome, Service, ServiceMetadata};
use async_trait::async_trait;
use grafema_core::detect_workspace;

/// Treats the project root as a single service when no workspace
/// manifest splits it into packages; real multi-package expansion
/// (pnpm/npm/yarn/lerna patterns → concrete package paths) is the CLI
/// collaborator's job per §6 — this plugin only records which tooling
/// it detected.
pub struct WorkspaceDiscoveryPlugin;

#[async_trait]
impl Plugin for WorkspaceDiscoveryPlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("workspace-discovery", Phase::Discovery).priority(100)
    }

    async fn execute(&self, ctx: &PluginContext<'_>) -> anyhow::Result<PluginOutcome> {
        let workspace_type = detect_workspace(&ctx.project_path);
        let name = ctx.project_path.file_name().and_then(|n| n.to_str()).unwrap_or("root").to_string();

        let service = Service {
            id: "root".to_string(),
            name,
            path: ctx.project_path.to_string_lossy().to_string(),
            kind: "package".to_string(),
            metadata: ServiceMetadata { workspace_type: workspace_type.map(|w| format!("{w:?}")), ..Default::default() },
        };

        Ok(PluginOutcome { success: true, services: vec![service], ..Default::default() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grafema_core::{DiagnosticCollector, Graph, SymbolTable};
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[tokio::test]
    async fn discovers_the_project_root_as_a_service() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();
        let graph = Mutex::new(Graph::new());
        let symbols = SymbolTable::new();
        let diagnostics = Mutex::new(DiagnosticCollector::new());
        let ctx = PluginContext {
            project_path: dir.path().to_path_buf(),
            files: &[],
            graph: &graph,
            symbols: &symbols,
            services: &[],
            diagnostics: &diagnostics,
            defer_indexing: false,
        };

        let outcome = WorkspaceDiscoveryPlugin.execute(&ctx).await.unwrap();
        assert_eq!(outcome.services.len(), 1);
        assert_eq!(outcome.services[0].metadata.workspace_type.as_deref(), Some("Npm"));
    }
}
