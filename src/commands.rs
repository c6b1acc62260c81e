//! CLI command implementations (§6 CLI surface: `analyze`, `check
//! <category>`, `init`, `migrate`, `report-issue`).

use grafema_core::diagnostics::Category;
use grafema_core::{cache_dir, clear_cache, read_marker, save_graph};
use grafema_orchestrator::Orchestrator;
use grafema_query::config::load_config;
use grafema_query::{GithubIssueReporter, IssueReport, IssueReporter};
use std::path::PathBuf;

use crate::files::collect_files;

pub struct AnalyzeOptions {
    pub project: PathBuf,
    pub force: bool,
    pub engine: String,
    pub index_only: bool,
    pub service: Option<String>,
}

/// `analyze` (§6): builds the default five-phase pipeline (or, under
/// `--index-only`, just DISCOVERY+INDEXING), runs it over the files the
/// CLI itself crawled, and writes a cache marker + diagnostics log.
/// Exit code reflects whether any `Severity::Error` diagnostic was
/// produced (§7: "User-visible output: ... and exit code").
pub async fn analyze(opts: AnalyzeOptions) -> anyhow::Result<bool> {
    if opts.engine != "v2" {
        anyhow::bail!("unsupported --engine {:?}; only \"v2\" (the single-pass walker) is implemented", opts.engine);
    }
    if opts.force {
        tracing::info!("--force: clearing cache before re-analysis");
        clear_cache(&opts.project)?;
    }

    let config = load_config(&opts.project);
    let files = collect_files(&opts.project, &config);
    tracing::info!(files = files.len(), "collected files");

    let mut orch = Orchestrator::new(&opts.project);
    orch.register(Box::new(grafema_orchestrator::plugins::WorkspaceDiscoveryPlugin));
    orch.register(Box::new(grafema_orchestrator::plugins::ModuleIndexingPlugin));
    if !opts.index_only {
        orch.register(Box::new(grafema_orchestrator::plugins::WalkerAnalysisPlugin));
        orch.register(Box::new(grafema_orchestrator::plugins::SecurityCategoryEnrichmentPlugin));
        orch.register(Box::new(grafema_orchestrator::plugins::UnresolvedCallValidationPlugin));
        orch.register(Box::new(grafema_orchestrator::plugins::DisconnectedNodeValidationPlugin));
    }

    if let Some(service) = &opts.service {
        tracing::info!(service, "--service narrowing is approximate: this workspace's DISCOVERY plugin treats the whole project as one service, so the filter only logs a warning when it doesn't match");
        if service != "root" {
            tracing::warn!(service, "no service by that name was discovered; analyzing the whole project");
        }
    }

    let (graph, diagnostics) = orch.run(&files).await.map_err(|err| anyhow::anyhow!(err))?;
    tracing::info!(nodes = graph.node_count(), edges = graph.edge_count(), "analysis complete");
    save_graph(&graph, &opts.project)?;

    let log_path = cache_dir(&opts.project).join("diagnostics.log");
    std::fs::write(&log_path, diagnostics.to_text())?;
    tracing::info!(path = %log_path.display(), diagnostics = diagnostics.len(), "diagnostics written");

    Ok(diagnostics.errors().next().is_none())
}

/// `check <category>` (§6): re-runs `analyze` and reports only the
/// diagnostics in one of the four categories (§4.7: connectivity,
/// calls, dataflow, imports). Exit code reflects that category alone,
/// not the whole run.
pub async fn check(category: &str, opts: AnalyzeOptions) -> anyhow::Result<bool> {
    let target = parse_category(category).ok_or_else(|| anyhow::anyhow!("unknown category {category:?}; expected one of connectivity, calls, dataflow, imports"))?;

    let config = load_config(&opts.project);
    let files = collect_files(&opts.project, &config);
    let orch = Orchestrator::with_default_plugins(&opts.project);
    let (_graph, diagnostics) = orch.run(&files).await.map_err(|err| anyhow::anyhow!(err))?;

    let matching: Vec<_> = diagnostics.all().iter().filter(|d| d.category() == Some(target)).collect();
    for diag in &matching {
        println!("{:?} {}: {}", diag.kind, diag.code, diag.message);
    }

    Ok(!matching.iter().any(|d| matches!(d.kind, grafema_core::diagnostics::Severity::Error)))
}

fn parse_category(name: &str) -> Option<Category> {
    match name {
        "connectivity" => Some(Category::Connectivity),
        "calls" => Some(Category::Calls),
        "dataflow" => Some(Category::Dataflow),
        "imports" => Some(Category::Imports),
        _ => None,
    }
}

/// `init` (§6): writes a default `.grafema/config.yaml` if one doesn't
/// already exist.
pub fn init(project: &PathBuf) -> anyhow::Result<()> {
    let dir = project.join(".grafema");
    std::fs::create_dir_all(&dir)?;
    let config_path = dir.join("config.yaml");
    if config_path.exists() {
        tracing::info!(path = %config_path.display(), "config already exists, leaving it untouched");
        return Ok(());
    }

    let default_config = grafema_query::Config::default();
    std::fs::write(&config_path, serde_yaml::to_string(&default_config)?)?;
    tracing::info!(path = %config_path.display(), "wrote default config");
    Ok(())
}

/// `migrate` (§6): moves a legacy `config.json` to `.grafema/config.yaml`.
pub fn migrate(project: &PathBuf) -> anyhow::Result<()> {
    let legacy = project.join("config.json");
    if !legacy.is_file() {
        tracing::info!("no legacy config.json found, nothing to migrate");
        return Ok(());
    }

    let config = load_config(project);
    let dir = project.join(".grafema");
    std::fs::create_dir_all(&dir)?;
    std::fs::write(dir.join("config.yaml"), serde_yaml::to_string(&config)?)?;
    std::fs::remove_file(&legacy)?;
    tracing::info!("migrated config.json to .grafema/config.yaml");
    Ok(())
}

/// `report-issue` (§6, Environment: `GITHUB_TOKEN`).
pub async fn report_issue(title: String, body: String) -> anyhow::Result<()> {
    let reporter = GithubIssueReporter::from_env();
    match reporter.report(IssueReport { title, body, labels: vec!["grafema".to_string()] }).await {
        Ok(url) => {
            println!("reported: {url}");
            Ok(())
        }
        Err(err) => {
            tracing::warn!(error = %err, "issue was not filed");
            Err(anyhow::anyhow!(err))
        }
    }
}

pub fn print_cache_status(project: &PathBuf) -> anyhow::Result<()> {
    match read_marker(project)? {
        Some(marker) => println!("last analyzed {} nodes, {} edges at {} (v{})", marker.node_count, marker.edge_count, marker.cached_at, marker.version),
        None => println!("no cached analysis found"),
    }
    Ok(())
}
