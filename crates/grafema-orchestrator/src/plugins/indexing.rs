//! INDEXING plugins: create `MODULE`/`RUST_MODULE` records for every
//! file in the run, including files ANALYSIS never walks (§4.5, §8
//! boundary: "file with no analyzable constructs → zero records but
//! one MODULE node created in INDEXING").

use crate::metadata::{Phase, PluginMetadata};
use crate::plugin::{Plugin, PluginContext, PluginOutcome};
use async_trait::async_trait;
use grafema_core::file_class::Language;
use grafema_core::{GraphNode, NodeId, NodeType};
use std::collections::HashMap;

pub struct ModuleIndexingPlugin;

#[async_trait]
impl Plugin for ModuleIndexingPlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("module-indexing", Phase::Indexing).produces(["MODULE", "RUST_MODULE"])
    }

    async fn execute(&self, ctx: &PluginContext<'_>) -> anyhow::Result<PluginOutcome> {
        let mut graph = ctx.graph.lock().unwrap();
        let mut created = 0usize;
        for file in ctx.files {
            let language = Language::from_path(file);
            let node_type = if language.is_semantically_walked() { NodeType::module() } else { NodeType::rust_module() };
            let file_str = file.to_string_lossy().to_string();
            graph.add_node(GraphNode::new(NodeId::new(format!("MODULE|{file_str}")), node_type, &file_str, &file_str));
            created += 1;
        }

        let mut counts = HashMap::new();
        counts.insert("modules".to_string(), created);
        Ok(PluginOutcome { success: true, counts, ..Default::default() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grafema_core::{DiagnosticCollector, Graph, SymbolTable};
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[tokio::test]
    async fn a_file_with_no_analyzable_constructs_still_gets_one_module_node() {
        let graph = Mutex::new(Graph::new());
        let symbols = SymbolTable::new();
        let diagnostics = Mutex::new(DiagnosticCollector::new());
        let files = vec![PathBuf::from("README.md")];
        let ctx = PluginContext {
            project_path: PathBuf::from("/tmp/project"),
            files: &files,
            graph: &graph,
            symbols: &symbols,
            services: &[],
            diagnostics: &diagnostics,
            defer_indexing: false,
        };

        ModuleIndexingPlugin.execute(&ctx).await.unwrap();
        assert_eq!(graph.lock().unwrap().node_count(), 1);
    }
}
