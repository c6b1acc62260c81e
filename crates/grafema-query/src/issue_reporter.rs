//! GitHub issue reporter (§6 Environment: `GITHUB_TOKEN`). The GitHub
//! API client itself is an external collaborator (§1) — this crate
//! documents the trait boundary and the token lookup only, the way
//! `grafema-orchestrator::plugin::PluginContext::report_issue` documents
//! the diagnostics-sink boundary rather than owning a logging backend.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IssueReporterError {
    #[error("GITHUB_TOKEN is not set")]
    MissingToken,

    #[error("reporting issues to GitHub is an external collaborator; no network client is implemented here")]
    NotImplemented,
}

#[derive(Debug, Clone)]
pub struct IssueReport {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

#[async_trait]
pub trait IssueReporter: Send + Sync {
    async fn report(&self, issue: IssueReport) -> Result<String, IssueReporterError>;
}

/// Reads `GITHUB_TOKEN` from the environment and fails fast if it is
/// absent; never issues an actual HTTP request (§1: the GitHub API
/// client is out of this workspace's scope).
pub struct GithubIssueReporter {
    token: Option<String>,
}

impl GithubIssueReporter {
    pub fn from_env() -> Self {
        GithubIssueReporter { token: std::env::var("GITHUB_TOKEN").ok() }
    }

    pub fn is_configured(&self) -> bool {
        self.token.is_some()
    }
}

#[async_trait]
impl IssueReporter for GithubIssueReporter {
    async fn report(&self, issue: IssueReport) -> Result<String, IssueReporterError> {
        if self.token.is_none() {
            return Err(IssueReporterError::MissingToken);
        }
        tracing::info!(title = %issue.title, labels = ?issue.labels, "would report issue to GitHub");
        Err(IssueReporterError::NotImplemented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reporting_without_a_token_fails_with_missing_token() {
        let reporter = GithubIssueReporter { token: None };
        let err = reporter.report(IssueReport { title: "t".into(), body: "b".into(), labels: vec![] }).await.unwrap_err();
        assert!(matches!(err, IssueReporterError::MissingToken));
    }

    #[tokio::test]
    async fn reporting_with_a_token_reaches_the_not_implemented_boundary() {
        let reporter = GithubIssueReporter { token: Some("ghp_test".to_string()) };
        let err = reporter.report(IssueReport { title: "t".into(), body: "b".into(), labels: vec![] }).await.unwrap_err();
        assert!(matches!(err, IssueReporterError::NotImplemented));
    }
}
