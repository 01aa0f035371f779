//! Catalog Miner main entry point
//!
//! This is the command-line interface for the Catalog Miner product harvester.

use anyhow::{bail, Context};
use catalog_miner::config::{load_config_with_hash, Config, SourceConfig};
use catalog_miner::output::{generate_markdown_summary, print_summary, RunSummary};
use catalog_miner::sink::HttpIngestEndpoint;
use catalog_miner::source::{build_http_client, build_source};
use catalog_miner::{Coordinator, RunState};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Catalog Miner: a polite product catalog harvester
///
/// Catalog Miner walks every category of the configured storefronts,
/// deduplicates the products it finds, and delivers them to an ingestion
/// API in bounded batches.
#[derive(Parser, Debug)]
#[command(name = "catalog-miner")]
#[command(version)]
#[command(about = "A polite product catalog harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without harvesting
    #[arg(long)]
    dry_run: bool,

    /// Only run the named source (repeatable)
    #[arg(long = "source", value_name = "ORIGIN")]
    sources: Vec<String>,

    /// Write a markdown report of all runs to this path
    #[arg(long, value_name = "PATH", conflicts_with = "dry_run")]
    summary: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let selected = select_sources(&config, &cli.sources)?;

    if cli.dry_run {
        handle_dry_run(&config, &selected);
        return Ok(());
    }

    let summaries = handle_harvest(&config, &selected).await?;

    if let Some(path) = &cli.summary {
        generate_markdown_summary(&summaries, &config_hash, path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        tracing::info!("Report written to {}", path.display());
    }

    let aborted: Vec<&str> = summaries
        .iter()
        .filter(|s| s.state == RunState::Aborted)
        .map(|s| s.origin.as_str())
        .collect();
    if !aborted.is_empty() {
        bail!(
            "{} of {} runs aborted: {}",
            aborted.len(),
            summaries.len(),
            aborted.join(", ")
        );
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_miner=info,warn"),
            1 => EnvFilter::new("catalog_miner=debug,info"),
            2 => EnvFilter::new("catalog_miner=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Resolves `--source` filters against the configured sources
///
/// With no filter every source is selected, in configuration order.
fn select_sources<'a>(config: &'a Config, names: &[String]) -> anyhow::Result<Vec<&'a SourceConfig>> {
    if names.is_empty() {
        return Ok(config.sources.iter().collect());
    }

    names
        .iter()
        .map(|name| {
            config.source(name).with_context(|| {
                let known: Vec<&str> = config.sources.iter().map(|s| s.origin.as_str()).collect();
                format!("Unknown source '{}' (configured: {})", name, known.join(", "))
            })
        })
        .collect()
}

/// Handles the --dry-run mode: validates config and shows what would be harvested
fn handle_dry_run(config: &Config, sources: &[&SourceConfig]) {
    println!("=== Catalog Miner Dry Run ===\n");

    println!("Harvest Configuration:");
    println!("  Default concurrency: {}", config.harvest.concurrency);
    println!(
        "  Request timeout: {}s",
        config.harvest.request_timeout_secs
    );
    println!("  Max jitter: {}ms", config.harvest.max_jitter_ms);
    println!("  Page delay: {}ms", config.harvest.page_delay_ms);
    match config.harvest.max_pages {
        Some(cap) => println!("  Max pages per category: {}", cap),
        None => println!("  Max pages per category: unlimited"),
    }

    println!("\nSink:");
    println!("  Endpoint: {}", config.sink.endpoint);
    println!("  Batch size: {}", config.sink.batch_size);
    println!("  Timeout: {}s", config.sink.timeout_secs);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nSources ({}):", sources.len());
    for source in sources {
        println!(
            "  - {} ({} workers{})",
            source.origin,
            source.effective_concurrency(&config.harvest),
            if source.dedup_by_name {
                ", name dedup"
            } else {
                ""
            }
        );
        let api_discovery = source.api.as_ref().and_then(|api| api.discovery.as_ref());
        match (&source.discovery, api_discovery) {
            (Some(discovery), _) => println!(
                "    * categories discovered from {} ({})",
                discovery.url, discovery.link_selector
            ),
            (None, Some(discovery)) => {
                println!("    * categories listed by {}", discovery.url)
            }
            (None, None) => {
                for category in &source.categories {
                    let category = category.clone().with_page_size(source.page_size);
                    println!("    * {} -> {}", category.name, category.page_url(1));
                }
            }
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would harvest {} sources", sources.len());
}

/// Runs every selected source one after another
///
/// A source whose discovery fails is recorded as an aborted run; the
/// remaining sources still run.
async fn handle_harvest(
    config: &Config,
    sources: &[&SourceConfig],
) -> anyhow::Result<Vec<RunSummary>> {
    let client = build_http_client(
        &config.user_agent,
        Duration::from_secs(config.harvest.request_timeout_secs),
    )
    .context("Failed to build HTTP client")?;
    let endpoint = Arc::new(
        HttpIngestEndpoint::from_config(&config.sink, &config.user_agent)
            .context("Failed to build ingestion client")?,
    );

    let mut summaries = Vec::with_capacity(sources.len());
    for source_config in sources {
        let source = build_source(source_config, client.clone())
            .with_context(|| format!("Invalid source '{}'", source_config.origin))?;

        let coordinator =
            Coordinator::from_config(config, source_config, source, endpoint.clone());
        let summary = match coordinator.run().await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!("Run for {} aborted: {}", source_config.origin, e);
                let mut summary = RunSummary::new(source_config.origin.as_str());
                summary.finish(RunState::Aborted);
                summary
            }
        };

        print_summary(&summary);
        println!();
        summaries.push(summary);
    }

    Ok(summaries)
}
