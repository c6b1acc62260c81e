//! ANALYSIS plugins: for each JS/TS file, parse → walk → build → commit
//! (§4.3, §4.4), wiring `grafema-analysis`'s parser pool, walker, and
//! builder into one orchestrator phase.

use crate::metadata::{Phase, PluginMetadata};
use crate::plugin::{Plugin, PluginContext, PluginOutcome};
use async_trait::async_trait;
use grafema_analysis::builder::GraphBuilder;
use grafema_analysis::parser_pool::{create_parser_pool, FileType, ParseRequest};
use grafema_analysis::walker::walk_file;
use grafema_core::file_class::Language;
use std::collections::HashMap;

pub struct WalkerAnalysisPlugin;

#[async_trait]
impl Plugin for WalkerAnalysisPlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("walker-analysis", Phase::Analysis).consumes(["MODULE"]).produces([
            "FUNCTION",
            "METHOD",
            "SCOPE",
            "VARIABLE",
            "CALL_SITE",
            "METHOD_CALL",
            "LITERAL",
            "OBJECT_LITERAL",
            "ARRAY_LITERAL",
            "CLASS",
            "IMPORT",
            "EXPORT",
            "CALLS",
            "PASSES_ARGUMENT",
            "CONTAINS",
            "HAS_SCOPE",
            "HAS_PROPERTY",
            "HAS_ELEMENT",
            "MODIFIES",
            "READS_FROM",
            "FLOWS_INTO",
            "IMPORTS",
            "EXPORTS",
        ])
    }

    async fn execute(&self, ctx: &PluginContext<'_>) -> anyhow::Result<PluginOutcome> {
        let pool = create_parser_pool();
        let builder = GraphBuilder::new(ctx.symbols);
        let mut analyzed = 0usize;
        let mut failed = 0usize;

        for path in ctx.files {
            let Some(file_type) = FileType::from_path(path) else { continue };
            let language = match file_type {
                FileType::JavaScript => Language::JavaScript,
                FileType::TypeScript => Language::TypeScript,
            };
            let file_str = path.to_string_lossy().to_string();

            let content = match tokio::fs::read_to_string(path).await {
                Ok(c) => c,
                Err(err) => {
                    tracing::warn!(file = %file_str, error = %err, "failed to read file, skipping");
                    failed += 1;
                    continue;
                }
            };

            let parsed = pool.parse(ParseRequest { file_type, content: content.clone(), path: path.clone() }).await;
            let tree = match parsed {
                Ok(result) => result.tree,
                Err(err) => {
                    tracing::warn!(file = %file_str, error = %err, "parse failed, skipping");
                    failed += 1;
                    continue;
                }
            };

            let collections = match walk_file(&file_str, &content, &tree) {
                Ok(c) => c,
                Err(err) => {
                    // AnalysisError (§7): recorded, other files continue.
                    tracing::warn!(file = %file_str, error = %err.message, "walk failed, skipping");
                    failed += 1;
                    continue;
                }
            };

            let batch = builder.build_file(&file_str, language, &collections);
            let dropped = {
                let mut graph = ctx.graph.lock().unwrap();
                batch.commit(&mut graph)
            };
            if dropped > 0 {
                tracing::debug!(file = %file_str, dropped, "dangling edges dropped on commit");
            }
            analyzed += 1;
        }

        let mut counts = HashMap::new();
        counts.insert("analyzed".to_string(), analyzed);
        counts.insert("failed".to_string(), failed);
        Ok(PluginOutcome { success: true, counts, ..Default::default() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grafema_core::{DiagnosticCollector, Graph, NodeId, SymbolTable};
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[tokio::test]
    async fn walks_a_single_js_file_into_the_graph() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.js");
        std::fs::write(&file, "function greet() { console.log(\"hi\"); }").unwrap();

        let graph = Mutex::new(Graph::new());
        let symbols = SymbolTable::new();
        let diagnostics = Mutex::new(DiagnosticCollector::new());
        let files = vec![file.clone()];
        let ctx = PluginContext {
            project_path: dir.path().to_path_buf(),
            files: &files,
            graph: &graph,
            symbols: &symbols,
            services: &[],
            diagnostics: &diagnostics,
            defer_indexing: false,
        };

        let outcome = WalkerAnalysisPlugin.execute(&ctx).await.unwrap();
        assert_eq!(outcome.counts.get("analyzed"), Some(&1));
        let graph = graph.into_inner().unwrap();
        let file_str = file.to_string_lossy().to_string();
        assert!(graph.get_node(&NodeId::new(format!("MODULE|{file_str}"))).is_some());
        assert!(graph.all_nodes().any(|n| n.node_type == grafema_core::NodeType::function()));
    }
}
