//! jira-beads-sync - Migrate a linked Jira issue graph into a beads store
//!
//! Main entry point for the CLI.

use clap::Parser;
use jira_beads_sync::config::{JiraConfig, SyncConfig};
use jira_beads_sync::converter::DanglingEpicPolicy;
use jira_beads_sync::jira::JiraClient;
use jira_beads_sync::pipeline::{Pipeline, PipelineOptions, SyncReport};
use jira_beads_sync::{Result, SyncError};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Migrate a Jira issue and everything reachable from it into a beads store
#[derive(Parser, Debug)]
#[command(name = "jira-beads-sync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Root issue key to start resolution from (e.g. PROJ-100)
    root_key: String,

    /// Path to a YAML config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Jira instance URL
    #[arg(long, env = "JIRA_URL")]
    jira_url: Option<String>,

    /// Account email for basic auth
    #[arg(long, env = "JIRA_EMAIL")]
    email: Option<String>,

    /// Jira API token
    #[arg(long, env = "JIRA_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Beads store root (the directory that holds issues/ and epics/)
    /// [default: .beads]
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Maximum concurrent issue fetches [default: 4]
    #[arg(long)]
    concurrency: Option<usize>,

    /// Abort the run after this many seconds (0 = no timeout)
    #[arg(long, default_value_t = 0)]
    timeout: u64,

    /// Policy for epic references that were never fetched: keep, warn, or
    /// drop [default: warn]
    #[arg(long)]
    dangling_epics: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    if let Err(e) = jira_beads_sync::logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    match run(cli).await {
        Ok(report) => {
            print_report(&report);
            if !report.is_clean() {
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<SyncReport> {
    let config = build_config(&cli)?;

    let mut client = JiraClient::new(&config.jira)?;
    if let Some(token) = cli.token {
        client = client.with_token(token);
    }

    let options = PipelineOptions {
        concurrency: config.concurrency,
        dangling_epics: config.dangling_epics,
    };
    let pipeline = Pipeline::new(Arc::new(client), options);

    let cancel = CancellationToken::new();
    spawn_cancel_handlers(cancel.clone(), cli.timeout);

    pipeline.run(&cli.root_key, &config.store, cancel).await
}

/// Merge the config file (if any) with CLI flag overrides
fn build_config(cli: &Cli) -> Result<SyncConfig> {
    let mut config = match &cli.config {
        Some(path) => SyncConfig::load(path)?,
        None => {
            let url = cli.jira_url.clone().ok_or_else(|| {
                SyncError::Config("--jira-url (or JIRA_URL) is required without --config".into())
            })?;
            let email = cli.email.clone().ok_or_else(|| {
                SyncError::Config("--email (or JIRA_EMAIL) is required without --config".into())
            })?;
            SyncConfig::new(JiraConfig::new(url, email))
        }
    };

    if let Some(url) = &cli.jira_url {
        config.jira.url = url.clone();
    }
    if let Some(email) = &cli.email {
        config.jira.email = email.clone();
    }
    if let Some(store) = &cli.store {
        config.store = store.clone();
    }
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(policy) = &cli.dangling_epics {
        config.dangling_epics = policy
            .parse::<DanglingEpicPolicy>()
            .map_err(SyncError::Config)?;
    }

    Ok(config)
}

/// Trip the cancellation token on Ctrl-C or after the optional timeout
fn spawn_cancel_handlers(cancel: CancellationToken, timeout_secs: u64) {
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl-C, cancelling sync");
            ctrl_c_cancel.cancel();
        }
    });

    if timeout_secs > 0 {
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(timeout_secs)).await;
            tracing::warn!(timeout_secs, "Sync timed out, cancelling");
            cancel.cancel();
        });
    }
}

fn print_report(report: &SyncReport) {
    if report.cancelled {
        eprintln!("Sync cancelled; nothing was written.");
        eprintln!("  resolved before cancellation: {}", report.resolved);
        return;
    }

    println!(
        "Synced {} item(s): {} issue(s), {} epic(s)",
        report.resolved, report.issues_written, report.epics_written
    );

    if !report.unresolved.is_empty() {
        eprintln!("Unresolved references:");
        for unresolved in &report.unresolved {
            eprintln!("  {}: {}", unresolved.key, unresolved.reason);
        }
    }
    if !report.schema_errors.is_empty() {
        eprintln!("Skipped items:");
        for error in &report.schema_errors {
            eprintln!("  {}: {}", error.key, error.reason);
        }
    }
    if !report.warnings.is_empty() {
        eprintln!("Warnings:");
        for warning in &report.warnings {
            eprintln!("  {}", warning);
        }
    }
    if !report.write_failures.is_empty() {
        eprintln!("Failed writes:");
        for failure in &report.write_failures {
            eprintln!("  {}: {}", failure.path.display(), failure.reason);
        }
    }
}
