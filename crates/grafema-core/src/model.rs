//! Core data structures for the code graph (§3).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique, globally-unique node identifier. Computed by
/// [`crate::identity::compute_id`] or [`crate::identity::compute_semantic_id`]
/// — never generated ad hoc.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A namespaced node type tag (`FUNCTION`, `http:route`, `issue:security`,
/// …). A type containing `:` is namespaced (§3 Namespaces).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeType(pub String);

impl NodeType {
    pub fn new(s: impl Into<String>) -> Self {
        NodeType(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace prefix (the part before `:`), if any.
    pub fn namespace(&self) -> Option<&str> {
        self.0.split_once(':').map(|(ns, _)| ns)
    }

    pub fn is_namespaced(&self) -> bool {
        self.0.contains(':')
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! node_types {
    ($($name:ident => $value:expr),+ $(,)?) => {
        impl NodeType {
            $(pub fn $name() -> NodeType { NodeType::new($value) })+
        }
    };
}

node_types! {
    module => "MODULE",
    rust_module => "RUST_MODULE",
    function => "FUNCTION",
    method => "METHOD",
    scope => "SCOPE",
    variable => "VARIABLE",
    call_site => "CALL_SITE",
    method_call => "METHOD_CALL",
    call_argument => "CALL_ARGUMENT",
    literal => "LITERAL",
    object_literal => "OBJECT_LITERAL",
    array_literal => "ARRAY_LITERAL",
    class_decl => "CLASS",
    import => "IMPORT",
    export => "EXPORT",
    update_expression => "UPDATE_EXPRESSION",
    external_module => "EXTERNAL_MODULE",
    external_function => "EXTERNAL_FUNCTION",
}

/// A record in the code graph. Immutable after insertion except for
/// UPSERT updates by identical `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphNode {
    pub id: NodeId,
    pub node_type: NodeType,
    pub name: String,
    pub file: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub exported: bool,
    /// Type-specific attributes, open-ended JSON values (route method,
    /// literal value, callback invoker name, …).
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
}

impl GraphNode {
    pub fn new(id: NodeId, node_type: NodeType, name: impl Into<String>, file: impl Into<String>) -> Self {
        GraphNode {
            id,
            node_type,
            name: name.into(),
            file: file.into(),
            line: None,
            column: None,
            exported: false,
            attributes: HashMap::new(),
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn exported(mut self, exported: bool) -> Self {
        self.exported = exported;
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Edge type from the fixed vocabulary (§3), represented as a newtype
/// over a namespaced string rather than a closed enum: §4.6/REDESIGN
/// FLAGS imply plugin-declared edge types may appear that this workspace
/// doesn't enumerate, and validators must not reject unknown types (§9
/// Open Questions).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeType(pub String);

impl EdgeType {
    pub fn new(s: impl Into<String>) -> Self {
        EdgeType(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! edge_types {
    ($($name:ident => $value:expr),+ $(,)?) => {
        impl EdgeType {
            $(pub fn $name() -> EdgeType { EdgeType::new($value) })+
        }
    };
}

edge_types! {
    contains => "CONTAINS",
    calls => "CALLS",
    passes_argument => "PASSES_ARGUMENT",
    reads_from => "READS_FROM",
    writes_to => "WRITES_TO",
    modifies => "MODIFIES",
    assigned_from => "ASSIGNED_FROM",
    flows_into => "FLOWS_INTO",
    has_scope => "HAS_SCOPE",
    captures => "CAPTURES",
    imports => "IMPORTS",
    exports => "EXPORTS",
    routes_to => "ROUTES_TO",
    handled_by => "HANDLED_BY",
    affects => "AFFECTS",
    interacts_with => "INTERACTS_WITH",
    has_property => "HAS_PROPERTY",
    has_element => "HAS_ELEMENT",
}

/// How a `CALLS` edge's callee was invoked; the only callType the
/// builder distinguishes is `callback` (§4.4, §8 Callback restriction).
pub const CALL_TYPE_CALLBACK: &str = "callback";

/// A directed edge `(src, dst, type, metadata?)`. Edges have no own id;
/// `(src, dst, type)` is the primary key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphEdge {
    pub src: NodeId,
    pub dst: NodeId,
    pub edge_type: EdgeType,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl GraphEdge {
    pub fn new(src: NodeId, dst: NodeId, edge_type: EdgeType) -> Self {
        GraphEdge {
            src,
            dst,
            edge_type,
            metadata: HashMap::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The edge's primary key, `(src, dst, type)`.
    pub fn key(&self) -> (NodeId, NodeId, EdgeType) {
        (self.src.clone(), self.dst.clone(), self.edge_type.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_detects_colon_prefix() {
        assert_eq!(NodeType::new("http:route").namespace(), Some("http"));
        assert_eq!(NodeType::new("FUNCTION").namespace(), None);
        assert!(NodeType::new("issue:security").is_namespaced());
        assert!(!NodeType::new("FUNCTION").is_namespaced());
    }
}
