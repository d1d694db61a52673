//! Command-line entry point
//!
//! Exit status is zero after a successful write (including a run that found
//! the release already recorded) and non-zero, with a message naming the
//! failed stage, otherwise.

use altstore_sync::store::render_catalog;
use altstore_sync::{CatalogSync, Config, ReleaseChannel, Stage, StageError};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(
    name = "altstore-sync",
    about = "Update an AltStore source manifest from a repository's latest GitHub release",
    version
)]
struct Cli {
    /// JSON configuration file; CLI flags override its values
    #[clap(long, short)]
    config: Option<PathBuf>,

    /// Catalog document to update
    #[clap(long)]
    catalog: Option<PathBuf>,

    /// Repository to follow, as owner/name
    #[clap(long)]
    repo: Option<String>,

    /// Follow the nightly channel (also selected when the configured
    /// nightly environment variable is present)
    #[clap(long)]
    nightly: bool,

    /// Request timeout in seconds
    #[clap(long)]
    timeout: Option<u64>,

    /// API token passed through to the hosting API
    #[clap(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Reconcile without writing; print the resulting catalog to stdout
    #[clap(long)]
    dry_run: bool,

    /// Log level (overridden by RUST_LOG)
    #[clap(long, default_value = "info")]
    log_level: String,
}

/// Logs go to stderr so `--dry-run` output on stdout stays clean
fn initialize_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> altstore_sync::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(catalog) = &cli.catalog {
        config.catalog.path = catalog.clone();
    }
    if let Some(repo) = &cli.repo {
        config.source.repository = repo.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.http.timeout = Duration::from_secs(timeout);
    }
    if cli.token.is_some() {
        config.http.token = cli.token.clone();
    }
    if cli.nightly || ReleaseChannel::detect(&config.source.nightly_env_var) == ReleaseChannel::Nightly
    {
        config.source.channel = ReleaseChannel::Nightly;
    }

    Ok(config)
}

async fn run(cli: Cli) -> Result<(), StageError> {
    let config = build_config(&cli)?;
    let sync = CatalogSync::new(config)?.with_dry_run(cli.dry_run);
    let report = sync.run().await?;

    if cli.dry_run {
        let rendered =
            render_catalog(&report.catalog).map_err(|e| StageError::new(Stage::Save, e))?;
        println!("{rendered}");
    } else if report.outcome.changed {
        tracing::info!(version = %report.version, tag = %report.tag, "Published release to catalog");
    } else {
        tracing::info!(version = %report.version, "Release already recorded, catalog unchanged");
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_tracing(&cli.log_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(stage = %e.stage, code = e.source.error_code(), "{}", e.source);
            eprintln!("error[{}]: {}", e.stage, e.source);
            ExitCode::from(u8::try_from(e.source.exit_code()).unwrap_or(1))
        }
    }
}
