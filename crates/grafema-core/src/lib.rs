//! Graph data model, identity scheme, scope tracking, diagnostics, and
//! query surface shared across the workspace.

pub mod cache;
pub mod diagnostics;
pub mod file_class;
pub mod graph;
pub mod identity;
pub mod model;
pub mod namespace;
pub mod pagination;
pub mod scope;
pub mod symbols;
pub mod workspace;

pub use cache::{cache_dir, clear_cache, graph_cache_path, read_marker, save_graph, CacheMarker, CACHE_DIR, GRAPH_CACHE};
pub use diagnostics::{Category, Diagnostic, DiagnosticCollector, Severity};
pub use file_class::Language;
pub use graph::{Graph, NodeFilter, Stats};
pub use identity::{compute_id, compute_numeric_id, compute_semantic_id, parse_id, singletons, BadIdFormat, ParsedId};
pub use model::{EdgeType, GraphEdge, GraphNode, NodeId, NodeType, CALL_TYPE_CALLBACK};
pub use pagination::{decode_cursor, encode_cursor, paginate, Connection, Edge, PageInfo};
pub use scope::{ScopeContext, ScopeKind, ScopeMismatch, ScopeTracker};
pub use symbols::SymbolTable;
pub use workspace::{detect_workspace, WorkspaceType};
