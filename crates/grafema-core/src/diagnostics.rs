//! Typed error/warning records with a category taxonomy (§4.7).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// One of `connectivity | calls | dataflow | imports` — the single
/// source of truth mapping each stable code to a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Connectivity,
    Calls,
    Dataflow,
    Imports,
}

/// Stable diagnostic code → category. Single source of truth (§4.7).
pub fn category_for_code(code: &str) -> Option<Category> {
    match code {
        "ERR_DISCONNECTED_NODE" => Some(Category::Connectivity),
        "ERR_UNRESOLVED_CALL" | "WARN_UNRESOLVED_CALL" => Some(Category::Calls),
        "ERR_DANGLING_EDGE" => Some(Category::Connectivity),
        "WARN_UNRESOLVED_MUTATION_TARGET" => Some(Category::Dataflow),
        "WARN_UNRESOLVED_IMPORT" => Some(Category::Imports),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: Severity,
    pub code: String,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub plugin: String,
    pub phase: String,
    #[serde(default)]
    pub context: serde_json::Value,
}

impl Diagnostic {
    pub fn category(&self) -> Option<Category> {
        category_for_code(&self.code)
    }

    fn dedup_key(&self) -> (String, Option<String>, Option<u32>, String) {
        (self.code.clone(), self.file.clone(), self.line, self.message.clone())
    }
}

/// Deduplicates by `(code, file, line, message)` (§4.7).
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    seen: HashSet<(String, Option<String>, Option<u32>, String)>,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        if self.seen.insert(diagnostic.dedup_key()) {
            self.diagnostics.push(diagnostic);
        }
    }

    pub fn all(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| matches!(d.kind, Severity::Error))
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Render as text, one line per diagnostic.
    pub fn to_text(&self) -> String {
        self.diagnostics
            .iter()
            .map(|d| {
                let loc = match (&d.file, d.line) {
                    (Some(f), Some(l)) => format!(" {f}:{l}"),
                    (Some(f), None) => format!(" {f}"),
                    _ => String::new(),
                };
                format!("[{:?}] {}{}: {}", d.kind, d.code, loc, d.message)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.diagnostics).unwrap_or(serde_json::Value::Null)
    }

    /// CSV with header `kind,code,file,line,plugin,phase,message`.
    pub fn to_csv(&self) -> String {
        let mut out = String::from("kind,code,file,line,plugin,phase,message\n");
        for d in &self.diagnostics {
            out.push_str(&format!(
                "{:?},{},{},{},{},{},\"{}\"\n",
                d.kind,
                d.code,
                d.file.as_deref().unwrap_or(""),
                d.line.map(|l| l.to_string()).unwrap_or_default(),
                d.plugin,
                d.phase,
                d.message.replace('"', "\"\"")
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(code: &str, file: &str, line: u32, message: &str) -> Diagnostic {
        Diagnostic {
            kind: Severity::Warning,
            code: code.to_string(),
            message: message.to_string(),
            file: Some(file.to_string()),
            line: Some(line),
            plugin: "test-plugin".to_string(),
            phase: "VALIDATION".to_string(),
            context: serde_json::Value::Null,
        }
    }

    #[test]
    fn dedups_by_code_file_line_message() {
        let mut collector = DiagnosticCollector::new();
        collector.report(diag("WARN_UNRESOLVED_CALL", "a.ts", 3, "unresolved foo"));
        collector.report(diag("WARN_UNRESOLVED_CALL", "a.ts", 3, "unresolved foo"));
        assert_eq!(collector.len(), 1);
        collector.report(diag("WARN_UNRESOLVED_CALL", "a.ts", 4, "unresolved foo"));
        assert_eq!(collector.len(), 2);
    }

    #[test]
    fn category_lookup() {
        assert_eq!(category_for_code("WARN_UNRESOLVED_CALL"), Some(Category::Calls));
        assert_eq!(category_for_code("unknown"), None);
    }
}
