//! Kanvax task service
//!
//! A local single-user task service: in-memory kanban store persisted as a
//! JSON snapshot, served over an HTTP API, with thin proxy routes to a
//! generative-language service for task extraction and coaching.

use anyhow::Result;
use clap::Parser;
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use kanvax::ai::GeminiClient;
use kanvax::cli::{Cli, Command, ListArgs};
use kanvax::cli::{export::ExportArgs, import::ImportArgs};
use kanvax::config::Config;
use kanvax::format::{format_stats_markdown, format_tasks_markdown};
use kanvax::server::{AppState, start_server};
use kanvax::snapshot::{self, Snapshot};
use kanvax::store::views::{filtered_tasks, task_stats};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(data_file) = cli.data_file {
        config.data_file = data_file;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::List(args) => list(&config, &args),
        Command::Stats => stats(&config),
        Command::Export(args) => export(&config, &args),
        Command::Import(args) => import(&config, &args),
    }
}

async fn serve(config: Config) -> Result<()> {
    let store = snapshot::load_or_seed(&config.data_file);
    info!(
        tasks = store.tasks().len(),
        tags = store.tags().len(),
        "store ready"
    );

    let ai = match GeminiClient::from_config(&config.ai) {
        Some(client) => Some(Arc::new(client) as Arc<dyn kanvax::ai::GenerateClient>),
        None => {
            warn!("no API key configured, AI routes will answer 503");
            None
        }
    };

    let state = AppState::new(store, ai, config.data_file.clone());
    let (shutdown_tx, _addr) = start_server(state.clone(), config.port).await?;

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    state.persist();
    let _ = shutdown_tx.send(());
    Ok(())
}

fn list(config: &Config, args: &ListArgs) -> Result<()> {
    let store = snapshot::load_or_seed(&config.data_file);
    let filters = args.to_filters();
    let filtered = filtered_tasks(store.tasks(), &filters);
    println!("{}", format_tasks_markdown(&filtered));
    Ok(())
}

fn stats(config: &Config) -> Result<()> {
    let store = snapshot::load_or_seed(&config.data_file);
    println!("{}", format_stats_markdown(&task_stats(store.tasks())));
    Ok(())
}

fn export(config: &Config, args: &ExportArgs) -> Result<()> {
    let store = snapshot::load_or_seed(&config.data_file);
    let snapshot = Snapshot::from_store(&store);

    match &args.output {
        Some(path) => {
            snapshot.write_to_file(path, args.should_compress())?;
            info!(path = %path.display(), tasks = snapshot.tasks.len(), "snapshot exported");
        }
        None => {
            println!("{}", snapshot.to_json_pretty()?);
        }
    }
    Ok(())
}

fn import(config: &Config, args: &ImportArgs) -> Result<()> {
    let snapshot = Snapshot::from_file(&args.input)?;
    if !snapshot.is_schema_compatible() {
        warn!(
            found = snapshot.schema_version,
            "importing snapshot from a different schema version"
        );
    }
    println!(
        "{} tasks, {} tags from {}",
        snapshot.tasks.len(),
        snapshot.tags.len(),
        args.input.display()
    );
    if args.dry_run {
        println!("dry run, nothing written");
        return Ok(());
    }

    let store = snapshot.into_store();
    snapshot::save(&store, &config.data_file)?;
    println!("imported into {}", config.data_file.display());
    Ok(())
}
