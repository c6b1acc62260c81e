//! Graph wrapper using `petgraph::StableDiGraph`, keyed by string
//! [`NodeId`]s (§3 Graph, §4.8 Query Surface).

use crate::model::{EdgeType, GraphEdge, GraphNode, NodeId, NodeType};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet, VecDeque};

/// Filter used by `queryNodes`/`getAllNodes` (§4.8).
#[derive(Debug, Clone, Default)]
pub struct NodeFilter {
    pub node_type: Option<NodeType>,
    pub name: Option<String>,
    pub file: Option<String>,
    pub exported: Option<bool>,
}

impl NodeFilter {
    pub fn matches(&self, node: &GraphNode) -> bool {
        self.node_type.as_ref().is_none_or(|t| &node.node_type == t)
            && self.name.as_deref().is_none_or(|n| node.name == n)
            && self.file.as_deref().is_none_or(|f| node.file == f)
            && self.exported.is_none_or(|e| node.exported == e)
    }
}

/// The code graph — a directed property multigraph with stable indices,
/// indexed by string id for O(1) [`Graph::get_node`].
pub struct Graph {
    inner: StableDiGraph<GraphNode, GraphEdge>,
    index: HashMap<NodeId, NodeIndex>,
    /// Secondary index: file -> node ids, for `FileNodeManager`-style
    /// clearing on re-analysis (§3 Lifecycle).
    by_file: HashMap<String, HashSet<NodeId>>,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

/// Aggregate counts returned by `getStats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Stats {
    pub node_count: usize,
    pub edge_count: usize,
}

impl Graph {
    pub fn new() -> Self {
        Graph {
            inner: StableDiGraph::new(),
            index: HashMap::new(),
            by_file: HashMap::new(),
        }
    }

    /// Insert or UPSERT-update a node by id (§3 Singletons/Lifecycle:
    /// nodes are immutable after insertion except for UPSERT updates by
    /// identical id).
    pub fn add_node(&mut self, node: GraphNode) -> NodeId {
        let id = node.id.clone();
        self.by_file.entry(node.file.clone()).or_default().insert(id.clone());
        if let Some(&idx) = self.index.get(&id) {
            self.inner[idx] = node;
        } else {
            let idx = self.inner.add_node(node);
            self.index.insert(id.clone(), idx);
        }
        id
    }

    /// Add an edge. Both endpoints must already exist; returns `None`
    /// (and the caller should emit a dangling-edge diagnostic) if not
    /// (§4.4 Buffering).
    pub fn add_edge(&mut self, edge: GraphEdge) -> Option<()> {
        let src = *self.index.get(&edge.src)?;
        let dst = *self.index.get(&edge.dst)?;
        self.inner.add_edge(src, dst, edge);
        Some(())
    }

    pub fn get_node(&self, id: &NodeId) -> Option<&GraphNode> {
        self.index.get(id).and_then(|&idx| self.inner.node_weight(idx))
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn get_stats(&self) -> Stats {
        Stats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
        }
    }

    pub fn all_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.inner.node_indices().filter_map(move |idx| self.inner.node_weight(idx))
    }

    pub fn all_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.inner.edge_indices().filter_map(move |idx| self.inner.edge_weight(idx))
    }

    /// Materialized, filtered node list — documented O(n) (`getAllNodes`).
    pub fn get_all_nodes(&self, filter: &NodeFilter) -> Vec<&GraphNode> {
        self.all_nodes().filter(|n| filter.matches(n)).collect()
    }

    pub fn get_outgoing_edges(&self, id: &NodeId, types: Option<&[EdgeType]>) -> Vec<&GraphEdge> {
        let Some(&idx) = self.index.get(id) else { return Vec::new() };
        self.inner
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| e.weight())
            .filter(|e| types.is_none_or(|ts| ts.contains(&e.edge_type)))
            .collect()
    }

    pub fn get_incoming_edges(&self, id: &NodeId, types: Option<&[EdgeType]>) -> Vec<&GraphEdge> {
        let Some(&idx) = self.index.get(id) else { return Vec::new() };
        self.inner
            .edges_directed(idx, Direction::Incoming)
            .map(|e| e.weight())
            .filter(|e| types.is_none_or(|ts| ts.contains(&e.edge_type)))
            .collect()
    }

    /// Breadth-first search from `start_ids`, bounded to `max_depth`,
    /// following only the given edge types.
    pub fn bfs(&self, start_ids: &[NodeId], max_depth: usize, edge_types: &[EdgeType]) -> Vec<NodeId> {
        let mut visited: HashSet<NodeId> = start_ids.iter().cloned().collect();
        let mut frontier: VecDeque<(NodeId, usize)> = start_ids.iter().cloned().map(|id| (id, 0)).collect();
        let mut order = Vec::new();

        while let Some((id, depth)) = frontier.pop_front() {
            order.push(id.clone());
            if depth >= max_depth {
                continue;
            }
            for edge in self.get_outgoing_edges(&id, Some(edge_types)) {
                if visited.insert(edge.dst.clone()) {
                    frontier.push_back((edge.dst.clone(), depth + 1));
                }
            }
        }
        order
    }

    /// Depth-first search, same semantics as [`Graph::bfs`] but with a
    /// stack instead of a queue.
    pub fn dfs(&self, start_ids: &[NodeId], max_depth: usize, edge_types: &[EdgeType]) -> Vec<NodeId> {
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut stack: Vec<(NodeId, usize)> = start_ids.iter().rev().cloned().map(|id| (id, 0)).collect();
        let mut order = Vec::new();

        while let Some((id, depth)) = stack.pop() {
            if !visited.insert(id.clone()) {
                continue;
            }
            order.push(id.clone());
            if depth >= max_depth {
                continue;
            }
            for edge in self.get_outgoing_edges(&id, Some(edge_types)) {
                if !visited.contains(&edge.dst) {
                    stack.push((edge.dst.clone(), depth + 1));
                }
            }
        }
        order
    }

    /// Remove a node and all its incident edges (used by re-analysis
    /// node clearing, §3 Lifecycle).
    pub fn remove_node(&mut self, id: &NodeId) -> Option<GraphNode> {
        let idx = self.index.remove(id)?;
        let removed = self.inner.remove_node(idx);
        if let Some(node) = &removed {
            if let Some(set) = self.by_file.get_mut(&node.file) {
                set.remove(id);
            }
        }
        removed
    }

    /// All node ids whose `file` equals `file` exactly — used by
    /// `FileNodeManager` to clear nodes for reanalysis (§3 Lifecycle,
    /// §8 Re-analysis idempotence). Deletion is best-effort: removing an
    /// id that is no longer present is a no-op.
    pub fn node_ids_for_file(&self, file: &str) -> Vec<NodeId> {
        self.by_file.get(file).map(|s| s.iter().cloned().collect()).unwrap_or_default()
    }

    pub fn clear_file(&mut self, file: &str) {
        for id in self.node_ids_for_file(file) {
            self.remove_node(&id);
        }
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
