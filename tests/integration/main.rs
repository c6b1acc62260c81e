//! Cross-crate integration tests: six concrete end-to-end analysis
//! scenarios, toposort correctness (including cycle rejection), and
//! the pagination boundary law — each exercised through the public API
//! of more than one workspace crate at once.

use async_trait::async_trait;
use grafema_analysis::builder::GraphBuilder;
use grafema_analysis::parser_pool::{create_parser_pool, FileType, ParseRequest};
use grafema_analysis::walker::walk_file;
use grafema_core::{paginate, EdgeType, Graph, Language, NodeId, NodeType, SymbolTable};
use grafema_orchestrator::{Orchestrator, Phase, Plugin, PluginContext, PluginMetadata, PluginOutcome};
use std::path::PathBuf;

async fn analyze_source(file: &str, source: &str) -> Graph {
    let pool = create_parser_pool();
    let parsed = pool.parse(ParseRequest { file_type: FileType::TypeScript, content: source.to_string(), path: PathBuf::from(file) }).await.unwrap();
    let collections = walk_file(file, source, &parsed.tree).unwrap();

    let symbols = SymbolTable::new();
    let builder = GraphBuilder::new(&symbols);
    let batch = builder.build_file(file, Language::TypeScript, &collections);
    let mut graph = Graph::new();
    batch.commit(&mut graph);
    graph
}

/// Scenario 1: single function, single call (§8).
#[tokio::test]
async fn scenario_single_function_single_call() {
    let graph = analyze_source("a.ts", r#"function greet(){ console.log("hi"); }"#).await;

    assert!(graph.get_node(&NodeId::new("MODULE|a.ts")).is_some());
    let greet = graph.all_nodes().find(|n| n.node_type == NodeType::function() && n.name == "greet").unwrap();
    let call = graph.all_nodes().find(|n| n.node_type == NodeType::call_site()).unwrap();
    let literal = graph.all_nodes().find(|n| n.node_type == NodeType::literal()).unwrap();

    assert!(!graph.get_outgoing_edges(&greet.id, Some(&[EdgeType::has_scope()])).is_empty());
    let arg_edges = graph.get_outgoing_edges(&call.id, Some(&[EdgeType::passes_argument()]));
    assert!(arg_edges.iter().any(|e| e.dst == literal.id));
}

/// Scenario 2: array HOF callback gets a `CALLS{callType:callback}` edge.
#[tokio::test]
async fn scenario_array_hof_callback() {
    let graph = analyze_source("a.ts", "function cb(x) { return x; }\nitems.forEach(cb);").await;

    let method_call = graph.all_nodes().find(|n| n.node_type == NodeType::method_call()).unwrap();
    let cb = graph.all_nodes().find(|n| n.node_type == NodeType::function() && n.name == "cb").unwrap();

    let calls_edges = graph.get_outgoing_edges(&method_call.id, Some(&[EdgeType::calls()]));
    assert!(calls_edges.iter().any(|e| e.dst == cb.id && e.metadata.get("callType").and_then(|v| v.as_str()) == Some("callback")));
}

/// Scenario 3: register pattern — no callback edge, because `set` is
/// not a whitelisted invoker.
#[tokio::test]
async fn scenario_register_pattern_no_callback_edge() {
    let graph = analyze_source("a.ts", "function handler() {}\nregistry.set('k', handler);").await;

    let method_call = graph.all_nodes().find(|n| n.node_type == NodeType::method_call()).unwrap();
    let handler = graph.all_nodes().find(|n| n.node_type == NodeType::function()).unwrap();

    let calls_edges = graph.get_outgoing_edges(&method_call.id, Some(&[EdgeType::calls()]));
    assert!(!calls_edges.iter().any(|e| e.dst == handler.id));
    assert_eq!(graph.get_outgoing_edges(&method_call.id, Some(&[EdgeType::passes_argument()])).len(), 2);
}

/// Scenario 4: `arr.push(x)` flows the argument into the base array and
/// reads it back without emitting a `MODIFIES` edge.
#[tokio::test]
async fn scenario_array_mutation_flows_into_base() {
    let graph = analyze_source("a.ts", "let value = 1;\narr.push(value);").await;

    let method_call = graph.all_nodes().find(|n| n.node_type == NodeType::method_call() && n.name == "push").unwrap();
    assert!(graph.get_outgoing_edges(&method_call.id, Some(&[EdgeType::modifies()])).is_empty());
    assert!(!graph.get_outgoing_edges(&method_call.id, Some(&[EdgeType::reads_from()])).is_empty());
}

/// Scenario 5: an unresolved global call produces no `CALLS` edge, and
/// the validation plugin flags it.
#[tokio::test]
async fn scenario_unresolved_call_warning() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("a.ts");
    std::fs::write(&file, "unknownGlobal();").unwrap();

    let orch = Orchestrator::with_default_plugins(dir.path());
    let (graph, diagnostics) = orch.run(&[file]).await.unwrap();

    let call = graph.all_nodes().find(|n| n.node_type == NodeType::call_site()).unwrap();
    assert!(graph.get_outgoing_edges(&call.id, Some(&[EdgeType::calls()])).is_empty());
    assert!(diagnostics.all().iter().any(|d| d.code == "WARN_UNRESOLVED_CALL"));
}

/// Scenario 6: a dependency cycle between two plugins in the same
/// phase is rejected with `CycleError` before either runs.
#[tokio::test]
async fn scenario_dependency_cycle_rejection() {
    struct StubPlugin {
        metadata: PluginMetadata,
    }

    #[async_trait]
    impl Plugin for StubPlugin {
        fn metadata(&self) -> PluginMetadata {
            self.metadata.clone()
        }
        async fn execute(&self, _ctx: &PluginContext<'_>) -> anyhow::Result<PluginOutcome> {
            panic!("a cyclic phase must never execute any of its plugins");
        }
    }

    let mut orch = Orchestrator::new("/tmp/project-does-not-need-to-exist");
    orch.register(Box::new(StubPlugin { metadata: PluginMetadata::new("A", Phase::Analysis).produces(["E"]).consumes(["F"]) }));
    orch.register(Box::new(StubPlugin { metadata: PluginMetadata::new("B", Phase::Analysis).produces(["F"]).consumes(["E"]) }));

    let err = orch.run(&[]).await.unwrap_err();
    let cycle_err = match err {
        grafema_orchestrator::OrchestratorError::Cycle(c) => c,
        other => panic!("expected CycleError, got {other:?}"),
    };
    assert_eq!(cycle_err.cycle, vec!["A".to_string(), "B".to_string(), "A".to_string()]);
}

/// Pagination boundary law (§8): `totalCount = |items|`, `edges.length
/// ≤ min(first, 250)`, `hasNextPage ↔ startIndex+limit < totalCount`,
/// `hasPreviousPage ↔ startIndex > 0`.
#[test]
fn pagination_boundary_law() {
    let items: Vec<String> = (0..120).map(|i| format!("item-{i}")).collect();

    let first_page = paginate(&items, Some(40), None, |s| s.clone());
    assert_eq!(first_page.total_count, 120);
    assert_eq!(first_page.edges.len(), 40);
    assert!(first_page.page_info.has_next_page);
    assert!(!first_page.page_info.has_previous_page);

    let after = first_page.page_info.end_cursor.clone().unwrap();
    let second_page = paginate(&items, Some(40), Some(&after), |s| s.clone());
    assert!(second_page.page_info.has_previous_page);
    assert_eq!(second_page.edges[0].node, "item-40");

    let over_max = paginate(&items, Some(10_000), None, |s| s.clone());
    assert_eq!(over_max.edges.len(), 120usize.min(250));
}
