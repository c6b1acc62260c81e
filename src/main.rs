//! Grafema CLI entry point (§6 CLI surface). The reference entrypoint
//! for the `analyze`/`check`/`init`/`migrate`/`report-issue` commands;
//! everything it calls into (orchestrator, config loader, backend) is
//! a library crate, so this binary is a thin wiring layer.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod files;

#[derive(Parser)]
#[command(name = "grafema")]
#[command(about = "Code graph analysis orchestrator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Project root path
    #[arg(long, default_value = ".")]
    project: PathBuf,

    /// Analysis engine to use; only "v2" (the single-pass walker) exists today
    #[arg(long, default_value = "v2")]
    engine: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full orchestrator pipeline over the project
    Analyze {
        /// Clear the cache and re-analyze from scratch
        #[arg(long)]
        force: bool,

        /// Run only DISCOVERY and INDEXING, skipping ANALYSIS/ENRICHMENT/VALIDATION
        #[arg(long)]
        index_only: bool,

        /// Restrict analysis to one discovered service
        #[arg(long)]
        service: Option<String>,
    },
    /// Run analysis and report diagnostics in one category
    Check {
        /// One of connectivity, calls, dataflow, imports
        category: String,
    },
    /// Write a default .grafema/config.yaml
    Init,
    /// Migrate a legacy config.json to .grafema/config.yaml
    Migrate,
    /// File a GitHub issue (requires GITHUB_TOKEN)
    ReportIssue {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
    },
    /// Show the last cached analysis summary
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("grafema={log_level}")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("grafema v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(project = %cli.project.display(), "project root");

    let success = match cli.command {
        Commands::Analyze { force, index_only, service } => {
            let opts = commands::AnalyzeOptions { project: cli.project, force, engine: cli.engine, index_only, service };
            commands::analyze(opts).await?
        }
        Commands::Check { category } => {
            let opts = commands::AnalyzeOptions { project: cli.project, force: false, engine: cli.engine, index_only: false, service: None };
            commands::check(&category, opts).await?
        }
        Commands::Init => {
            commands::init(&cli.project)?;
            true
        }
        Commands::Migrate => {
            commands::migrate(&cli.project)?;
            true
        }
        Commands::ReportIssue { title, body } => {
            commands::report_issue(title, body).await?;
            true
        }
        Commands::Status => {
            commands::print_cache_status(&cli.project)?;
            true
        }
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}
