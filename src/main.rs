//! Comic-Walker main entry point
//!
//! This is the command-line interface for the Comic-Walker comic scraper.

use anyhow::{bail, Context};
use clap::Parser;
use comic_walker::config::{load_config_with_hash, Config};
use comic_walker::crawler::{run_scrape, user_agent_string};
use comic_walker::output::{load_statistics, print_report, print_statistics};
use comic_walker::site::{site_by_name, SITE_NAMES};
use comic_walker::storage::{open_cache, PersistentCache};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Comic-Walker: a resumable web comic scraper
///
/// Comic-Walker follows a web comic's "next" links page by page, remembers
/// every page it has seen and downloads each page's image into a numbered
/// file. Interrupted or partial runs pick up where they stopped.
#[derive(Parser, Debug)]
#[command(name = "comic-walker")]
#[command(version)]
#[command(about = "A resumable web comic scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Comic to scrape (xkcd, pbf)
    #[arg(long)]
    site: String,

    /// First page to scrape
    #[arg(long, default_value_t = 1)]
    start: u32,

    /// Last page to scrape; without it the walk runs to the comic's last page
    #[arg(long)]
    stop: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Forget every stored page of the comic and exit
    #[arg(long, conflicts_with_all = ["stats", "dry_run"])]
    reset: bool,

    /// Show stored statistics for the comic and exit
    #[arg(long, conflicts_with_all = ["reset", "dry_run"])]
    stats: bool,

    /// Validate config and show what would be scraped without scraping
    #[arg(long, conflicts_with_all = ["reset", "stats"])]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if let Some(stop) = cli.stop {
        if stop < cli.start {
            bail!("--stop ({}) must not be below --start ({})", stop, cli.start);
        }
    }

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config, &cli)?;
    } else if cli.reset {
        handle_reset(&config, &cli.site)?;
    } else if cli.stats {
        handle_stats(&config, &cli.site)?;
    } else {
        handle_scrape(&config, &config_hash, &cli).await?;
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
            0 => EnvFilter::new("comic_walker=info,warn"),
            1 => EnvFilter::new("comic_walker=debug,info"),
            2 => EnvFilter::new("comic_walker=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be scraped
fn handle_dry_run(config: &Config, cli: &Cli) -> anyhow::Result<()> {
    let adapter = site_by_name(&cli.site)?;

    println!("=== Comic-Walker Dry Run ===\n");

    println!("Comic:");
    println!("  Site: {} ({})", cli.site, adapter.base_identity());
    match cli.stop {
        Some(stop) => println!("  Pages: {} to {}", cli.start, stop),
        None => println!("  Pages: {} to the last page", cli.start),
    }

    println!("\nScraper Configuration:");
    println!("  Download workers: {}", config.scraper.concurrency);
    println!("  Request timeout: {}s", config.scraper.request_timeout);
    println!("  Connect timeout: {}s", config.scraper.connect_timeout);

    println!("\nUser Agent:");
    println!("  {}", user_agent_string(&config.user_agent));

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!(
        "  Images: {}",
        Path::new(&config.output.directory)
            .join(adapter.base_identity())
            .display()
    );

    println!("\n✓ Configuration is valid");
    println!("✓ Available sites: {}", SITE_NAMES.join(", "));

    Ok(())
}

/// Handles the --reset mode: clears the comic's stored pages
fn handle_reset(config: &Config, site: &str) -> anyhow::Result<()> {
    let adapter = site_by_name(site)?;
    let mut cache = open_cache(Path::new(&config.output.database_path))?;

    cache.reset(adapter.base_identity())?;

    println!("✓ Cleared stored pages for {}", adapter.base_identity());
    Ok(())
}

/// Handles the --stats mode: shows stored statistics for the comic
fn handle_stats(config: &Config, site: &str) -> anyhow::Result<()> {
    let adapter = site_by_name(site)?;

    println!("Database: {}\n", config.output.database_path);

    let cache = open_cache(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&cache, adapter.base_identity())?;

    print_statistics(&stats);

    Ok(())
}

/// Handles the main scrape operation
async fn handle_scrape(config: &Config, config_hash: &str, cli: &Cli) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping after the current page");
            on_interrupt.cancel();
        }
    });

    match run_scrape(config, config_hash, &cli.site, cli.start, cli.stop, cancel).await {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            Err(e.into())
        }
    }
}
