//! Linkwalker main entry point
//!
//! This is the command-line interface for the Linkwalker discovery crawler.

use anyhow::Context;
use clap::Parser;
use linkwalker::config::{
    load_config_with_hash, parse_config, validate, validate_output_config, Config,
};
use linkwalker::events::{CrawlEvent, EventBus};
use linkwalker::output::{load_statistics, print_report, print_statistics};
use linkwalker::storage::{JsonStorage, Storage};
use linkwalker::CrawlEngine;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

/// Linkwalker: a robots-aware web discovery crawler
///
/// Linkwalker follows links outward from seed URLs while respecting
/// robots.txt, recording each page's title, description and favicon along
/// with every image it references.
#[derive(Parser, Debug)]
#[command(name = "linkwalker")]
#[command(version)]
#[command(about = "A robots-aware web discovery crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seed URL to start from (repeatable, replaces configured seeds)
    #[arg(long = "seed", value_name = "URL")]
    seeds: Vec<String>,

    /// Number of concurrent workers
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Start new collections, ignoring previously recorded sites and images
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the recorded collections and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Print every crawl event to stdout as a JSON line
    #[arg(long)]
    emit_events: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_effective_config(&cli)?;

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config, cli.fresh, cli.emit_events).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout stays free for the JSON event stream.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkwalker=info,warn"),
            1 => EnvFilter::new("linkwalker=debug,info"),
            2 => EnvFilter::new("linkwalker=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file (if any) and applies command-line overrides
fn load_effective_config(cli: &Cli) -> anyhow::Result<Config> {
    if cli.stats {
        return load_stats_config(cli);
    }

    let overridden = !cli.seeds.is_empty() || cli.workers.is_some();

    let mut config = match &cli.config {
        Some(path) if !overridden => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            return Ok(config);
        }
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            parse_config(path).with_context(|| format!("failed to load {}", path.display()))?
        }
        None => Config::default(),
    };

    if !cli.seeds.is_empty() {
        config.crawler.seed_urls = cli.seeds.clone();
    }
    if let Some(workers) = cli.workers {
        config.crawler.max_workers = workers;
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Loads only what --stats needs: a crawl-less run has no use for seeds
fn load_stats_config(cli: &Cli) -> anyhow::Result<Config> {
    let config = match &cli.config {
        Some(path) => {
            parse_config(path).with_context(|| format!("failed to load {}", path.display()))?
        }
        None => Config::default(),
    };
    validate_output_config(&config.output).context("invalid output configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Linkwalker Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Workers: {}", config.crawler.max_workers);
    println!("  Fetch timeout: {}ms", config.crawler.fetch_timeout_ms);
    println!("  Robots timeout: {}ms", config.crawler.robots_timeout_ms);
    println!("  Traversal order: {:?}", config.crawler.traversal_order);
    match config.crawler.max_pages {
        Some(max) => println!("  Max pages: {}", max),
        None => println!("  Max pages: unlimited"),
    }
    println!(
        "  Accept invalid certificates: {}",
        config.crawler.accept_invalid_certs
    );

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Sites: {}", config.output.sites_path);
    println!("  Images: {}", config.output.images_path);

    println!("\nSeeds ({}):", config.crawler.seed_urls.len());
    for seed in &config.crawler.seed_urls {
        println!("  * {}", seed);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the recorded collections
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Sites: {}", config.output.sites_path);
    println!("Images: {}\n", config.output.images_path);

    let storage = JsonStorage::open(&config.output.sites_path, &config.output.images_path)?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, fresh: bool, emit_events: bool) -> anyhow::Result<()> {
    let storage = if fresh {
        tracing::info!("Starting fresh crawl (ignoring previously recorded sites)");
        JsonStorage::fresh(&config.output.sites_path, &config.output.images_path)
    } else {
        JsonStorage::open(&config.output.sites_path, &config.output.images_path)?
    };
    let storage: Arc<dyn Storage> = Arc::new(storage);

    tracing::info!("Total seed URLs: {}", config.crawler.seed_urls.len());

    let events = EventBus::new(config.events.capacity);
    let sink = tokio::spawn(run_event_sink(events.subscribe(), emit_events));

    let mut engine = CrawlEngine::new(&config, storage, events)?;

    let token = engine.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight pages");
            token.cancel();
        }
    });

    let result = engine.run().await;

    // Dropping the engine closes the channel so the sink drains and exits
    drop(engine);
    if let Err(e) = sink.await {
        tracing::warn!("Event sink stopped abnormally: {}", e);
    }

    match result {
        Ok(report) => {
            tracing::info!("Crawl completed successfully");
            if !emit_events {
                print_report(&report);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Consumes crawl events until the channel closes
async fn run_event_sink(
    mut rx: tokio::sync::broadcast::Receiver<CrawlEvent>,
    as_json: bool,
) {
    loop {
        match rx.recv().await {
            Ok(event) if as_json => match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::warn!("Failed to serialize event: {}", e),
            },
            Ok(CrawlEvent::Log { message }) => tracing::debug!("{}", message),
            Ok(CrawlEvent::SiteDiscovered { site }) => {
                tracing::info!("Discovered: {} ({})", site.url, site.title)
            }
            Ok(CrawlEvent::Error { url, message }) => tracing::debug!("{}: {}", url, message),
            Err(RecvError::Lagged(dropped)) => {
                tracing::warn!("Event sink lagged, {} events dropped", dropped)
            }
            Err(RecvError::Closed) => break,
        }
    }
}
