//! On-disk marker for the last completed analysis run (§6 External
//! Interfaces). A full graph snapshot is the backend's concern
//! (`grafema-query`); this crate only tracks whether a cache directory
//! is present and what it last saw, so the CLI can report staleness.

use crate::graph::Graph;
use std::path::{Path, PathBuf};

pub const CACHE_DIR: &str = ".grafema";
pub const GRAPH_CACHE: &str = "cache.json";

pub fn cache_dir(root: &Path) -> PathBuf {
    root.join(CACHE_DIR)
}

pub fn graph_cache_path(root: &Path) -> PathBuf {
    cache_dir(root).join(GRAPH_CACHE)
}

pub fn ensure_cache_dir(root: &Path) -> std::io::Result<()> {
    let cache = cache_dir(root);
    if !cache.exists() {
        std::fs::create_dir_all(&cache)?;
    }
    Ok(())
}

/// Write a marker recording graph size and timestamp. Full node/edge
/// persistence belongs to the backend's storage engine (out of scope,
/// §6); this is only enough for the CLI to report "last analyzed N
/// nodes/M edges at T".
pub fn save_graph(graph: &Graph, root: &Path) -> anyhow::Result<()> {
    ensure_cache_dir(root)?;
    let path = graph_cache_path(root);

    let marker = serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "node_count": graph.node_count(),
        "edge_count": graph.edge_count(),
        "cached_at": chrono::Utc::now().to_rfc3339(),
    });

    std::fs::write(&path, serde_json::to_string_pretty(&marker)?)?;
    tracing::debug!(path = %path.display(), "cache marker written");
    Ok(())
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct CacheMarker {
    pub version: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub cached_at: String,
}

/// Read the marker left by the previous run, if any.
pub fn read_marker(root: &Path) -> anyhow::Result<Option<CacheMarker>> {
    let path = graph_cache_path(root);
    if !path.exists() {
        return Ok(None);
    }
    let json_str = std::fs::read_to_string(&path)?;
    Ok(Some(serde_json::from_str(&json_str)?))
}

pub fn clear_cache(root: &Path) -> std::io::Result<()> {
    let cache = cache_dir(root);
    if cache.exists() {
        std::fs::remove_dir_all(&cache)?;
    }
    Ok(())
}

/// Invalidate the cache because `_file` changed. Granular per-file
/// invalidation would require persisting per-file node ids; until the
/// backend's storage engine does that, any change invalidates the
/// whole marker.
pub fn invalidate_file_cache(root: &Path, _file: &Path) -> anyhow::Result<()> {
    clear_cache(root)?;
    Ok(())
}
