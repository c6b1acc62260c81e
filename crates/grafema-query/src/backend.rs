//! Backend wire interface (§4.8, §6): "exact calls listed in §4.8. A
//! reference implementation is an out-of-process binary reached over a
//! Unix-domain socket; the integrator is responsible only for
//! spawning/locating it." This crate implements only the in-process
//! reference side of that boundary — an honest stand-in, not the real
//! socket protocol — wrapping `grafema_core::Graph` directly.

use async_trait::async_trait;
use grafema_core::{EdgeType, Graph, GraphEdge, GraphNode, NodeFilter, NodeId, Stats};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// §7: "BackendError — connection failed, commit rejected, query
/// timeout; retried once, then surfaced." This in-process reference
/// never has a connection to lose, so only the shapes that can
/// genuinely occur here are represented.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("unknown batch {0}")]
    UnknownBatch(u64),

    #[error("query timed out")]
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(pub u64);

#[derive(Debug, Default)]
struct PendingBatch {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

/// One binding in a `checkGuarantee` result row (§6 Datalog surface:
/// "results are lists of `{bindings:[{name, value}]}` where `value` is
/// a node id or literal").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Binding {
    pub name: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DatalogRow {
    pub bindings: Vec<Binding>,
}

/// The Query Surface (§4.8) as a trait boundary, so an out-of-process
/// backend can be swapped in without touching callers.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn begin_batch(&self) -> Result<BatchId, BackendError>;
    async fn add_nodes(&self, batch: BatchId, nodes: Vec<GraphNode>) -> Result<(), BackendError>;
    async fn add_edges(&self, batch: BatchId, edges: Vec<GraphEdge>) -> Result<(), BackendError>;
    /// `commitBatch(source, deferIndex, typesToAlsoClear)` (§4.8). Files
    /// named in `types_to_also_clear` have their existing nodes removed
    /// before the batch's nodes land, modeling re-analysis (§8
    /// Re-analysis idempotence).
    async fn commit_batch(&self, batch: BatchId, source: &str, defer_index: bool, types_to_also_clear: &[String]) -> Result<(), BackendError>;
    async fn abort_batch(&self, batch: BatchId) -> Result<(), BackendError>;
    async fn rebuild_indexes(&self) -> Result<(), BackendError>;
    async fn flush(&self) -> Result<(), BackendError>;
    async fn clear(&self) -> Result<(), BackendError>;

    async fn get_all_nodes(&self, filter: NodeFilter) -> Result<Vec<GraphNode>, BackendError>;
    async fn get_outgoing_edges(&self, id: NodeId, types: Option<Vec<EdgeType>>) -> Result<Vec<GraphEdge>, BackendError>;
    async fn get_incoming_edges(&self, id: NodeId, types: Option<Vec<EdgeType>>) -> Result<Vec<GraphEdge>, BackendError>;
    async fn bfs(&self, start_ids: Vec<NodeId>, max_depth: usize, edge_types: Vec<EdgeType>) -> Result<Vec<NodeId>, BackendError>;
    async fn dfs(&self, start_ids: Vec<NodeId>, max_depth: usize, edge_types: Vec<EdgeType>) -> Result<Vec<NodeId>, BackendError>;
    /// Datalog queries are accepted as opaque strings (§6): "strings
    /// accepted as-is". The backend's internal storage engine is an
    /// external collaborator (§1) — this reference never evaluates the
    /// query, it only documents the shape a real backend returns.
    async fn check_guarantee(&self, query: &str) -> Result<Vec<DatalogRow>, BackendError>;
    async fn get_stats(&self) -> Result<Stats, BackendError>;

    /// Tests only (§4.8: "`export()/import()` for tests only").
    async fn export(&self) -> Result<Vec<GraphNode>, BackendError>;
}

/// The reference in-process implementation: no socket, no out-of-
/// process binary, just a shared `Graph` behind a `tokio::sync::RwLock`
/// and an in-memory batch table.
pub struct InProcessBackend {
    graph: Arc<RwLock<Graph>>,
    batches: RwLock<HashMap<u64, PendingBatch>>,
    next_batch_id: AtomicU64,
}

impl InProcessBackend {
    pub fn new(graph: Arc<RwLock<Graph>>) -> Self {
        InProcessBackend { graph, batches: RwLock::new(HashMap::new()), next_batch_id: AtomicU64::new(1) }
    }

    pub fn graph_handle(&self) -> Arc<RwLock<Graph>> {
        Arc::clone(&self.graph)
    }
}

#[async_trait]
impl Backend for InProcessBackend {
    async fn begin_batch(&self) -> Result<BatchId, BackendError> {
        let id = self.next_batch_id.fetch_add(1, Ordering::SeqCst);
        self.batches.write().await.insert(id, PendingBatch::default());
        Ok(BatchId(id))
    }

    async fn add_nodes(&self, batch: BatchId, nodes: Vec<GraphNode>) -> Result<(), BackendError> {
        let mut batches = self.batches.write().await;
        let pending = batches.get_mut(&batch.0).ok_or(BackendError::UnknownBatch(batch.0))?;
        pending.nodes.extend(nodes);
        Ok(())
    }

    async fn add_edges(&self, batch: BatchId, edges: Vec<GraphEdge>) -> Result<(), BackendError> {
        let mut batches = self.batches.write().await;
        let pending = batches.get_mut(&batch.0).ok_or(BackendError::UnknownBatch(batch.0))?;
        pending.edges.extend(edges);
        Ok(())
    }

    async fn commit_batch(&self, batch: BatchId, source: &str, _defer_index: bool, types_to_also_clear: &[String]) -> Result<(), BackendError> {
        let pending = self.batches.write().await.remove(&batch.0).ok_or(BackendError::UnknownBatch(batch.0))?;
        let mut graph = self.graph.write().await;

        // Re-analysis idempotence (§8): clear the touched file's nodes
        // exactly once before the new ones land, same as a full file
        // re-index under `--force`.
        if !types_to_also_clear.is_empty() {
            graph.clear_file(source);
        }

        for node in pending.nodes {
            graph.add_node(node);
        }
        for edge in pending.edges {
            graph.add_edge(edge);
        }
        Ok(())
    }

    async fn abort_batch(&self, batch: BatchId) -> Result<(), BackendError> {
        self.batches.write().await.remove(&batch.0).ok_or(BackendError::UnknownBatch(batch.0))?;
        Ok(())
    }

    async fn rebuild_indexes(&self) -> Result<(), BackendError> {
        // By-id indexing lives inside `Graph` itself and is always
        // kept current on `add_node`/`add_edge`; nothing to rebuild.
        Ok(())
    }

    async fn flush(&self) -> Result<(), BackendError> {
        Ok(())
    }

    async fn clear(&self) -> Result<(), BackendError> {
        let mut graph = self.graph.write().await;
        *graph = Graph::new();
        Ok(())
    }

    async fn get_all_nodes(&self, filter: NodeFilter) -> Result<Vec<GraphNode>, BackendError> {
        let graph = self.graph.read().await;
        Ok(graph.get_all_nodes(&filter).into_iter().cloned().collect())
    }

    async fn get_outgoing_edges(&self, id: NodeId, types: Option<Vec<EdgeType>>) -> Result<Vec<GraphEdge>, BackendError> {
        let graph = self.graph.read().await;
        Ok(graph.get_outgoing_edges(&id, types.as_deref()).into_iter().cloned().collect())
    }

    async fn get_incoming_edges(&self, id: NodeId, types: Option<Vec<EdgeType>>) -> Result<Vec<GraphEdge>, BackendError> {
        let graph = self.graph.read().await;
        Ok(graph.get_incoming_edges(&id, types.as_deref()).into_iter().cloned().collect())
    }

    async fn bfs(&self, start_ids: Vec<NodeId>, max_depth: usize, edge_types: Vec<EdgeType>) -> Result<Vec<NodeId>, BackendError> {
        let graph = self.graph.read().await;
        Ok(graph.bfs(&start_ids, max_depth, &edge_types))
    }

    async fn dfs(&self, start_ids: Vec<NodeId>, max_depth: usize, edge_types: Vec<EdgeType>) -> Result<Vec<NodeId>, BackendError> {
        let graph = self.graph.read().await;
        Ok(graph.dfs(&start_ids, max_depth, &edge_types))
    }

    async fn check_guarantee(&self, query: &str) -> Result<Vec<DatalogRow>, BackendError> {
        tracing::warn!(query, "Datalog evaluation is an external collaborator; returning no rows");
        Ok(Vec::new())
    }

    async fn get_stats(&self) -> Result<Stats, BackendError> {
        let graph = self.graph.read().await;
        Ok(graph.get_stats())
    }

    async fn export(&self) -> Result<Vec<GraphNode>, BackendError> {
        let graph = self.graph.read().await;
        Ok(graph.all_nodes().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grafema_core::NodeType;

    fn backend() -> InProcessBackend {
        InProcessBackend::new(Arc::new(RwLock::new(Graph::new())))
    }

    #[tokio::test]
    async fn committed_batch_is_visible_through_get_stats() {
        let backend = backend();
        let batch = backend.begin_batch().await.unwrap();
        backend
            .add_nodes(batch, vec![GraphNode::new(NodeId::new("MODULE|a.ts"), NodeType::module(), "a.ts", "a.ts")])
            .await
            .unwrap();
        backend.commit_batch(batch, "a.ts", false, &[]).await.unwrap();

        let stats = backend.get_stats().await.unwrap();
        assert_eq!(stats.node_count, 1);
    }

    #[tokio::test]
    async fn aborted_batch_never_lands_in_the_graph() {
        let backend = backend();
        let batch = backend.begin_batch().await.unwrap();
        backend
            .add_nodes(batch, vec![GraphNode::new(NodeId::new("MODULE|a.ts"), NodeType::module(), "a.ts", "a.ts")])
            .await
            .unwrap();
        backend.abort_batch(batch).await.unwrap();

        assert_eq!(backend.get_stats().await.unwrap().node_count, 0);
        assert!(matches!(backend.commit_batch(batch, "a.ts", false, &[]).await, Err(BackendError::UnknownBatch(_))));
    }

    #[tokio::test]
    async fn re_commit_with_clear_replaces_the_files_nodes_exactly_once() {
        let backend = backend();
        let first = backend.begin_batch().await.unwrap();
        backend
            .add_nodes(first, vec![GraphNode::new(NodeId::new("MODULE|a.ts"), NodeType::module(), "a.ts", "a.ts")])
            .await
            .unwrap();
        backend.commit_batch(first, "a.ts", false, &[]).await.unwrap();

        let second = backend.begin_batch().await.unwrap();
        backend
            .add_nodes(second, vec![GraphNode::new(NodeId::new("MODULE|a.ts#2"), NodeType::module(), "a.ts", "a.ts")])
            .await
            .unwrap();
        backend.commit_batch(second, "a.ts", false, &["MODULE".to_string()]).await.unwrap();

        assert_eq!(backend.get_stats().await.unwrap().node_count, 1);
    }
}
