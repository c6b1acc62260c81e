//! Workspace/monorepo detection (§6 External Interfaces: workspace
//! detection), used by DISCOVERY to scope which package manifests a
//! file belongs to.

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceType {
    Cargo,
    Npm,
    Pnpm,
    Yarn,
    Lerna,
    GoModules,
}

/// Detect the workspace tooling rooted at `root`, preferring the most
/// specific marker (pnpm/yarn/lerna over a bare `package.json`).
pub fn detect_workspace(root: &Path) -> Option<WorkspaceType> {
    if root.join("pnpm-workspace.yaml").exists() {
        Some(WorkspaceType::Pnpm)
    } else if root.join("lerna.json").exists() {
        Some(WorkspaceType::Lerna)
    } else if root.join("yarn.lock").exists() {
        Some(WorkspaceType::Yarn)
    } else if root.join("Cargo.toml").exists() {
        Some(WorkspaceType::Cargo)
    } else if root.join("package.json").exists() {
        Some(WorkspaceType::Npm)
    } else if root.join("go.mod").exists() {
        Some(WorkspaceType::GoModules)
    } else {
        None
    }
}
