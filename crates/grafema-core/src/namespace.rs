//! Helpers classifying endpoints, side-effects, and guarantee types by
//! namespace prefix (§3 Namespaces).

use crate::model::NodeType;

/// Known namespace prefixes.
pub const ISSUE: &str = "issue";
pub const GUARANTEE: &str = "guarantee";
pub const HTTP: &str = "http";
pub const EXPRESS: &str = "express";
pub const DB: &str = "db";
pub const REDIS: &str = "redis";
pub const SOCKETIO: &str = "socketio";
pub const FS: &str = "fs";
pub const NET: &str = "net";
pub const GRAFEMA: &str = "grafema";

pub fn is_issue(node_type: &NodeType) -> bool {
    node_type.namespace() == Some(ISSUE)
}

pub fn is_guarantee(node_type: &NodeType) -> bool {
    node_type.namespace() == Some(GUARANTEE)
}

pub fn is_http_endpoint(node_type: &NodeType) -> bool {
    matches!(node_type.namespace(), Some(HTTP) | Some(EXPRESS))
}

/// Side-effecting namespaces: anything that talks to the outside world.
pub fn is_side_effect(node_type: &NodeType) -> bool {
    matches!(
        node_type.namespace(),
        Some(DB) | Some(REDIS) | Some(SOCKETIO) | Some(FS) | Some(NET) | Some(HTTP)
    )
}

/// The guarantee kind (`queue | api | permission`) embedded after
/// `guarantee:` and before `#name`.
pub fn guarantee_kind(id: &str) -> Option<&str> {
    id.strip_prefix("guarantee:")?.split('#').next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_issue_and_guarantee() {
        assert!(is_issue(&NodeType::new("issue:security")));
        assert!(is_guarantee(&NodeType::new("guarantee:queue")));
        assert!(!is_issue(&NodeType::new("FUNCTION")));
    }

    #[test]
    fn side_effect_namespaces() {
        assert!(is_side_effect(&NodeType::new("db:query")));
        assert!(is_side_effect(&NodeType::new("net:request")));
        assert!(!is_side_effect(&NodeType::new("FUNCTION")));
    }

    #[test]
    fn extracts_guarantee_kind() {
        assert_eq!(guarantee_kind("guarantee:queue#myQueue"), Some("queue"));
        assert_eq!(guarantee_kind("FUNCTION|..."), None);
    }
}
