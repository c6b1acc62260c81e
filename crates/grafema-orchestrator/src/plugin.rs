//! The `Plugin` trait and the per-execution context handed to
//! `execute` (§4.5 item 3).

use crate::metadata::PluginMetadata;
use async_trait::async_trait;
use grafema_core::{Diagnostic, DiagnosticCollector, Graph, Severity, SymbolTable};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Type-specific metadata for one discovered service (§6 Service
/// manifest: `metadata:{entrypoint?, packageJson?, relativePath?,
/// workspaceType?}`).
#[derive(Debug, Clone, Default)]
pub struct ServiceMetadata {
    pub entrypoint: Option<String>,
    pub package_json: Option<String>,
    pub relative_path: Option<String>,
    pub workspace_type: Option<String>,
}

/// One entry of the DISCOVERY phase's service manifest
/// (`result.metadata.services`, §4.5, §6).
#[derive(Debug, Clone)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub path: String,
    pub kind: String,
    pub metadata: ServiceMetadata,
}

/// Shared, phase-scoped state a plugin sees during `execute` (§4.5
/// item 3): project path, the shared graph/symbol table, the service
/// manifest produced by DISCOVERY, a diagnostics sink, and the files
/// this run covers (crawled by the CLI collaborator, not by this
/// workspace — filesystem crawling is out of scope per §1/§6).
pub struct PluginContext<'a> {
    pub project_path: PathBuf,
    pub files: &'a [PathBuf],
    pub graph: &'a Mutex<Graph>,
    pub symbols: &'a SymbolTable,
    pub services: &'a [Service],
    pub diagnostics: &'a Mutex<DiagnosticCollector>,
    pub defer_indexing: bool,
}

impl<'a> PluginContext<'a> {
    /// `reportIssue(category, severity, message, file, line, column,
    /// targetNodeId?, context?)` (§4.5, §4.7) — `category` is derived
    /// from `code` via `grafema_core::diagnostics::category_for_code`
    /// rather than passed separately, keeping the code-to-category
    /// table the single source of truth.
    pub fn report_issue(
        &self,
        plugin: &str,
        phase: &str,
        code: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        file: Option<&Path>,
        line: Option<u32>,
    ) {
        self.diagnostics.lock().unwrap().report(Diagnostic {
            kind: severity,
            code: code.into(),
            message: message.into(),
            file: file.map(|f| f.to_string_lossy().to_string()),
            line,
            plugin: plugin.to_string(),
            phase: phase.to_string(),
            context: serde_json::Value::Null,
        });
    }
}

/// `{success, counts?, metadata?, errors}` (§4.5 item 4). DISCOVERY
/// plugins populate `services`; the orchestrator folds that into the
/// manifest seeding later phases.
#[derive(Debug, Default, Clone)]
pub struct PluginOutcome {
    pub success: bool,
    pub counts: HashMap<String, usize>,
    pub services: Vec<Service>,
    pub errors: Vec<String>,
}

impl PluginOutcome {
    pub fn ok() -> Self {
        PluginOutcome { success: true, ..Default::default() }
    }
}

#[async_trait]
pub trait Plugin: Send + Sync {
    fn metadata(&self) -> PluginMetadata;
    async fn execute(&self, ctx: &PluginContext<'_>) -> anyhow::Result<PluginOutcome>;
}
