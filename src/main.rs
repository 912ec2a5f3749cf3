//! ccsessions - Browse Claude Code sessions from local JSONL logs

use ccsessions::{
    cli::{Cli, Command, FilterArgs},
    error::Result,
    live_monitor::LiveMonitor,
    output::{DisplayContext, get_formatter},
    store::SessionStore,
    timezone::TimezoneConfig,
};
use ccsessions_provider_claude::DataLoader;
use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Wait for the initial scan, with a spinner on interactive terminals
async fn load(store: &mut SessionStore, show_progress: bool) {
    if !show_progress {
        store.wait_until_loaded().await;
        return;
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Scanning session logs...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    while store.is_loading() {
        store.next_completion().await;
    }

    spinner.finish_and_clear();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging. --verbose overrides RUST_LOG.
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("ccsessions=info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let tz = TimezoneConfig::from_cli(cli.timezone.as_deref(), cli.utc)?;
    info!("Using timezone: {}", tz.display_name());

    let loader = DataLoader::discover(cli.root.clone())?;
    info!("Reading sessions from {}", loader.root().display());
    let home = loader.parser().resolver().home().to_string();

    let mut store = SessionStore::new(loader, tz.clone(), cli.window());
    let formatter = get_formatter(cli.json);
    let show_progress = !cli.json && is_terminal::is_terminal(std::io::stdout());

    store.request_scan();
    load(&mut store, show_progress).await;

    let now = Utc::now();
    let ctx = DisplayContext::new(tz, home.clone(), now);
    let command = cli.command.unwrap_or(Command::List(FilterArgs::default()));
    let filter = command
        .filter_args()
        .map(FilterArgs::to_filter)
        .unwrap_or_default();

    match command {
        Command::List(_) => {
            let sessions = store.filtered(&filter, now);
            print!("{}", formatter.format_sessions(&sessions, &ctx)?);
        }
        Command::Days(_) => {
            let days = store.grouped_by_day(&filter, now);
            print!("{}", formatter.format_days(&days, &ctx)?);
        }
        Command::Projects => {
            let projects: Vec<(&str, usize)> = store
                .projects()
                .into_iter()
                .map(|project| (project, store.session_count(project)))
                .collect();
            print!("{}", formatter.format_projects(&projects)?);
        }
        Command::Stats(_) => {
            let stats = store.stats(&filter, now);
            print!("{}", formatter.format_stats(&stats)?);
        }
        Command::Show { id } => {
            let session = store.get(&id)?;
            print!("{}", formatter.format_session(session, &ctx)?);
        }
        Command::Watch { interval, .. } => {
            info!("Starting live monitoring mode every {}s", interval);
            let mut monitor = LiveMonitor::new(store, filter, formatter, home, interval);
            monitor.run().await?;
        }
    }

    Ok(())
}
