//! Reference implementations of the external collaborators named out
//! of scope in §1/§6: the config loader, the service manifest
//! type, the Backend trait boundary plus an in-process implementation,
//! a minimal HTTP exposure of the Query Surface, the Datalog surface
//! shape, and the GitHub issue reporter. None of these are the real
//! front-ends (GraphQL schema, MCP handshake, out-of-process backend
//! binary, GitHub API client) — those remain external collaborators.

pub mod backend;
pub mod config;
pub mod datalog;
pub mod http;
pub mod issue_reporter;
pub mod manifest;

pub use backend::{Backend, BackendError, BatchId, InProcessBackend};
pub use config::{Config, ConfigError, PluginsConfig, ServiceConfig};
pub use http::{create_router, AppState};
pub use issue_reporter::{GithubIssueReporter, IssueReport, IssueReporter, IssueReporterError};
pub use manifest::{ServiceManifest, ServiceManifestEntry};
