//! VALIDATION plugins: diagnostics-only passes over the committed
//! graph (§4.5, §4.7). Never fatal to the pipeline (§7).

use crate::metadata::{Phase, PluginMetadata};
use crate::plugin::{Plugin, PluginContext, PluginOutcome};
use async_trait::async_trait;
use grafema_core::{EdgeType, NodeType, Severity};
use std::collections::HashMap;
use std::path::Path;

/// Flags every `CALL_SITE`/`METHOD_CALL` node with no outgoing `CALLS`
/// edge (§8 scenario 5: `unknownGlobal()` resolves to nothing — not a
/// globals-list builtin, not a local symbol — so the builder never
/// wires a `CALLS` edge for it).
pub struct UnresolvedCallValidationPlugin;

#[async_trait]
impl Plugin for UnresolvedCallValidationPlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("unresolved-call-validation", Phase::Validation).consumes(["CALLS", "CALL_SITE", "METHOD_CALL"])
    }

    async fn execute(&self, ctx: &PluginContext<'_>) -> anyhow::Result<PluginOutcome> {
        let calls: Vec<_> = {
            let graph = ctx.graph.lock().unwrap();
            graph
                .all_nodes()
                .filter(|n| n.node_type == NodeType::call_site() || n.node_type == NodeType::method_call())
                .map(|n| (n.id.clone(), n.name.clone(), n.file.clone(), n.line))
                .collect()
        };

        let mut flagged = 0usize;
        for (id, name, file, line) in calls {
            let has_calls_edge = {
                let graph = ctx.graph.lock().unwrap();
                !graph.get_outgoing_edges(&id, Some(&[EdgeType::calls()])).is_empty()
            };
            if !has_calls_edge {
                flagged += 1;
                ctx.report_issue(
                    "unresolved-call-validation",
                    Phase::Validation.as_str(),
                    "WARN_UNRESOLVED_CALL",
                    Severity::Warning,
                    format!("call to `{name}` did not resolve"),
                    Some(Path::new(&file)),
                    line,
                );
            }
        }

        let mut counts = HashMap::new();
        counts.insert("flagged".to_string(), flagged);
        Ok(PluginOutcome { success: true, counts, ..Default::default() })
    }
}

/// Flags every non-MODULE node with neither incoming nor outgoing
/// edges (§4.7 `ERR_DISCONNECTED_NODE`). A `MODULE` for a
/// non-analyzable file is expected to be disconnected (§8 boundary
/// behavior), so module nodes are excluded.
pub struct DisconnectedNodeValidationPlugin;

#[async_trait]
impl Plugin for DisconnectedNodeValidationPlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("disconnected-node-validation", Phase::Validation)
    }

    async fn execute(&self, ctx: &PluginContext<'_>) -> anyhow::Result<PluginOutcome> {
        let nodes: Vec<_> = {
            let graph = ctx.graph.lock().unwrap();
            graph
                .all_nodes()
                .filter(|n| n.node_type != NodeType::module() && n.node_type != NodeType::rust_module())
                .map(|n| (n.id.clone(), n.name.clone(), n.file.clone(), n.line))
                .collect()
        };

        let mut flagged = 0usize;
        for (id, name, file, line) in nodes {
            let disconnected = {
                let graph = ctx.graph.lock().unwrap();
                graph.get_outgoing_edges(&id, None).is_empty() && graph.get_incoming_edges(&id, None).is_empty()
            };
            if disconnected {
                flagged += 1;
                ctx.report_issue(
                    "disconnected-node-validation",
                    Phase::Validation.as_str(),
                    "ERR_DISCONNECTED_NODE",
                    Severity::Error,
                    format!("node `{name}` has no edges"),
                    Some(Path::new(&file)),
                    line,
                );
            }
        }

        let mut counts = HashMap::new();
        counts.insert("flagged".to_string(), flagged);
        Ok(PluginOutcome { success: true, counts, ..Default::default() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grafema_core::{DiagnosticCollector, Graph, GraphNode, NodeId, SymbolTable};
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[tokio::test]
    async fn unresolved_call_gets_a_warning() {
        let graph = Mutex::new(Graph::new());
        graph
            .lock()
            .unwrap()
            .add_node(GraphNode::new(NodeId::new("CALL_SITE|a.js|unknownGlobal|1:1"), NodeType::call_site(), "unknownGlobal", "a.js").at(1, 1));
        let symbols = SymbolTable::new();
        let diagnostics = Mutex::new(DiagnosticCollector::new());
        let ctx = PluginContext {
            project_path: PathBuf::from("/tmp/project"),
            files: &[],
            graph: &graph,
            symbols: &symbols,
            services: &[],
            diagnostics: &diagnostics,
            defer_indexing: false,
        };

        UnresolvedCallValidationPlugin.execute(&ctx).await.unwrap();
        let diagnostics = diagnostics.into_inner().unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.all()[0].code, "WARN_UNRESOLVED_CALL");
    }

    #[tokio::test]
    async fn a_call_with_a_calls_edge_is_not_flagged() {
        let graph = Mutex::new(Graph::new());
        {
            let mut g = graph.lock().unwrap();
            g.add_node(GraphNode::new(NodeId::new("CALL_SITE|a.js|greet|1:1"), NodeType::call_site(), "greet", "a.js"));
            g.add_node(GraphNode::new(NodeId::new("FUNCTION|a.js|greet"), NodeType::function(), "greet", "a.js"));
            g.add_edge(grafema_core::GraphEdge::new(NodeId::new("CALL_SITE|a.js|greet|1:1"), NodeId::new("FUNCTION|a.js|greet"), EdgeType::calls()));
        }
        let symbols = SymbolTable::new();
        let diagnostics = Mutex::new(DiagnosticCollector::new());
        let ctx = PluginContext {
            project_path: PathBuf::from("/tmp/project"),
            files: &[],
            graph: &graph,
            symbols: &symbols,
            services: &[],
            diagnostics: &diagnostics,
            defer_indexing: false,
        };

        UnresolvedCallValidationPlugin.execute(&ctx).await.unwrap();
        assert!(diagnostics.into_inner().unwrap().is_empty());
    }

    #[tokio::test]
    async fn disconnected_non_module_node_is_flagged() {
        let graph = Mutex::new(Graph::new());
        graph.lock().unwrap().add_node(GraphNode::new(NodeId::new("LITERAL|a.js|x|1:1"), NodeType::literal(), "x", "a.js"));
        let symbols = SymbolTable::new();
        let diagnostics = Mutex::new(DiagnosticCollector::new());
        let ctx = PluginContext {
            project_path: PathBuf::from("/tmp/project"),
            files: &[],
            graph: &graph,
            symbols: &symbols,
            services: &[],
            diagnostics: &diagnostics,
            defer_indexing: false,
        };

        DisconnectedNodeValidationPlugin.execute(&ctx).await.unwrap();
        assert_eq!(diagnostics.into_inner().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn disconnected_module_node_is_not_flagged() {
        let graph = Mutex::new(Graph::new());
        graph.lock().unwrap().add_node(GraphNode::new(NodeId::new("MODULE|README.md"), NodeType::module(), "README.md", "README.md"));
        let symbols = SymbolTable::new();
        let diagnostics = Mutex::new(DiagnosticCollector::new());
        let ctx = PluginContext {
            project_path: PathBuf::from("/tmp/project"),
            files: &[],
            graph: &graph,
            symbols: &symbols,
            services: &[],
            diagnostics: &diagnostics,
            defer_indexing: false,
        };

        DisconnectedNodeValidationPlugin.execute(&ctx).await.unwrap();
        assert!(diagnostics.into_inner().unwrap().is_empty());
    }
}
