//! Dependency-DAG construction and toposort for one phase's plugins
//! (§4.5), generalized from a closed stage enum to metadata-driven
//! plugin names (dependency pairs + `toposort`). A cycle raises
//! `CycleError` rather than falling back to registration order — the
//! orchestrator's phase is fatal on a cycle (§7).

use crate::error::CycleError;
use crate::metadata::PluginMetadata;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, HashSet, VecDeque};

/// For each plugin `B` and each edge type it consumes, every other
/// plugin in the same phase that produces that type becomes a
/// dependency of `B` (self-references excluded intentionally — an
/// enricher may rewire edges of a type it also reads). Explicit
/// `dependencies` merge in.
fn dependencies_of(plugin: &PluginMetadata, phase_plugins: &[PluginMetadata]) -> HashSet<String> {
    let mut deps = HashSet::new();
    for consumed in &plugin.consumes {
        for other in phase_plugins {
            if other.name != plugin.name && other.produces.contains(consumed) {
                deps.insert(other.name.clone());
            }
        }
    }
    deps.extend(plugin.dependencies.iter().cloned());
    deps
}

/// Kahn's algorithm over a `petgraph` dependency DAG, with a
/// tie-break (§8 Toposort correctness) applied whenever more than one
/// plugin becomes eligible at once. Within DISCOVERY, `priority` is
/// consulted first — higher runs first (§4.5: "priority, used only
/// within DISCOVERY to break ties"); every other phase, and equal
/// priorities within DISCOVERY, fall back to registration order, so
/// ties never depend on hash-map iteration order.
pub fn toposort(phase: &str, plugins: &[PluginMetadata]) -> Result<Vec<String>, CycleError> {
    let order_index: HashMap<&str, usize> = plugins.iter().enumerate().map(|(i, p)| (p.name.as_str(), i)).collect();
    let priority_of: HashMap<&str, i32> = plugins.iter().map(|p| (p.name.as_str(), p.priority)).collect();
    let use_priority = phase == "DISCOVERY";
    let rank = |name: &str| -> (i32, usize) {
        let priority_rank = if use_priority { -priority_of[name] } else { 0 };
        (priority_rank, order_index[name])
    };

    let mut graph: DiGraph<String, ()> = DiGraph::new();
    let mut node_of: HashMap<String, NodeIndex> = HashMap::new();
    for plugin in plugins {
        node_of.insert(plugin.name.clone(), graph.add_node(plugin.name.clone()));
    }
    let mut deps: HashMap<String, HashSet<String>> = HashMap::new();
    for plugin in plugins {
        let plugin_deps = dependencies_of(plugin, plugins);
        for dep in &plugin_deps {
            if let (Some(&dep_idx), Some(&plugin_idx)) = (node_of.get(dep), node_of.get(&plugin.name)) {
                graph.add_edge(dep_idx, plugin_idx, ());
            }
        }
        deps.insert(plugin.name.clone(), plugin_deps);
    }

    let mut in_degree: HashMap<NodeIndex, usize> =
        node_of.values().map(|&idx| (idx, graph.neighbors_directed(idx, Direction::Incoming).count())).collect();
    let mut ready: Vec<NodeIndex> = in_degree.iter().filter(|(_, &d)| d == 0).map(|(&idx, _)| idx).collect();
    ready.sort_by_key(|&idx| rank(&graph[idx]));
    let mut queue: VecDeque<NodeIndex> = VecDeque::from(ready);

    let mut order = Vec::with_capacity(plugins.len());
    while let Some(idx) = queue.pop_front() {
        order.push(graph[idx].clone());
        let mut newly_ready = Vec::new();
        for child in graph.neighbors_directed(idx, Direction::Outgoing).collect::<Vec<_>>() {
            let degree = in_degree.get_mut(&child).unwrap();
            *degree -= 1;
            if *degree == 0 {
                newly_ready.push(child);
            }
        }
        for n in newly_ready {
            let pos = queue.iter().position(|&q| rank(&graph[q]) > rank(&graph[n])).unwrap_or(queue.len());
            queue.insert(pos, n);
        }
    }

    if order.len() != plugins.len() {
        let remaining: Vec<String> = plugins.iter().map(|p| p.name.clone()).filter(|n| !order.contains(n)).collect();
        return Err(CycleError { phase: phase.to_string(), cycle: find_cycle(&remaining, &deps) });
    }

    Ok(order)
}

/// Walks forward through unresolved dependency edges from an arbitrary
/// unresolved node until a repeat is found, producing a minimal
/// witness cycle (e.g. `["A", "B", "A"]`) for the error message.
fn find_cycle(remaining: &[String], deps: &HashMap<String, HashSet<String>>) -> Vec<String> {
    let Some(start) = remaining.first() else { return Vec::new() };
    let mut path = vec![start.clone()];
    let mut current = start.clone();
    loop {
        let Some(next) = deps.get(&current).and_then(|ds| ds.iter().find(|d| remaining.contains(*d))) else {
            break;
        };
        if let Some(pos) = path.iter().position(|n| n == next) {
            path.push(next.clone());
            return path[pos..].to_vec();
        }
        path.push(next.clone());
        current = next.clone();
    }
    path
}
