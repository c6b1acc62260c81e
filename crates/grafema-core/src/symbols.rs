//! Symbol table for cross-file resolution (§4.4 import fallback edges,
//! §4.5 scope-chain property resolution).

use crate::model::NodeId;
use dashmap::DashMap;

/// Maps qualified names to [`NodeId`]s. Thread-safe for concurrent
/// per-file emission during INDEXING.
pub struct SymbolTable {
    symbols: DashMap<String, NodeId>,
    /// file path -> qualified names declared in that file, for
    /// `remove_file` during re-analysis.
    file_symbols: DashMap<String, Vec<String>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            symbols: DashMap::new(),
            file_symbols: DashMap::new(),
        }
    }

    pub fn insert(&self, qualified_name: String, node_id: NodeId, file_path: String) {
        self.symbols.insert(qualified_name.clone(), node_id);
        self.file_symbols.entry(file_path).or_default().push(qualified_name);
    }

    pub fn lookup(&self, qualified_name: &str) -> Option<NodeId> {
        self.symbols.get(qualified_name).map(|r| r.value().clone())
    }

    pub fn symbols_in_file(&self, file_path: &str) -> Vec<NodeId> {
        self.file_symbols
            .get(file_path)
            .map(|r| r.value().iter().filter_map(|name| self.lookup(name)).collect())
            .unwrap_or_default()
    }

    /// Remove all symbols declared in `file_path` (re-analysis, §3
    /// Lifecycle).
    pub fn remove_file(&self, file_path: &str) {
        if let Some((_, symbols)) = self.file_symbols.remove(file_path) {
            for name in symbols {
                self.symbols.remove(&name);
            }
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup() {
        let table = SymbolTable::new();
        table.insert("mod.greet".into(), NodeId::new("FUNCTION|..."), "mod.ts".into());
        assert_eq!(table.lookup("mod.greet"), Some(NodeId::new("FUNCTION|...")));
        assert_eq!(table.lookup("mod.missing"), None);
    }

    #[test]
    fn remove_file_drops_its_symbols_only() {
        let table = SymbolTable::new();
        table.insert("a.x".into(), NodeId::new("1"), "a.ts".into());
        table.insert("b.y".into(), NodeId::new("2"), "b.ts".into());
        table.remove_file("a.ts");
        assert_eq!(table.lookup("a.x"), None);
        assert_eq!(table.lookup("b.y"), Some(NodeId::new("2")));
    }
}
