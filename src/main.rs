//! Silkworm main entry point
//!
//! Command-line interface for the crawl-to-index pipeline and the index
//! cleanup scanner.

use anyhow::Context;
use clap::{Parser, Subcommand};
use silkworm::cleanup::{default_rules, Scanner, ScanOutcome};
use silkworm::config::{load_config_with_hash, require_enabled_sources, Config};
use silkworm::crawler::run_crawl;
use silkworm::embedder::HttpEmbedder;
use silkworm::index::{RestIndex, VectorIndex};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Silkworm: crawl a website into a vector index
#[derive(Parser, Debug)]
#[command(name = "silkworm")]
#[command(version)]
#[command(about = "Crawl a website, embed its content, and index the vectors", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Discover pages, embed their content, and upsert into the index
    Crawl {
        /// Path to TOML configuration file
        #[arg(value_name = "CONFIG")]
        config: PathBuf,
    },

    /// Scan the index for defective vectors and delete them
    Cleanup {
        /// Path to TOML configuration file
        #[arg(value_name = "CONFIG")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Crawl { config } => handle_crawl(&config).await,
        Command::Cleanup { config } => handle_cleanup(&config).await,
    }
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("silkworm=info,warn"),
            1 => EnvFilter::new("silkworm=debug,info"),
            2 => EnvFilter::new("silkworm=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load(path: &std::path::Path) -> anyhow::Result<Config> {
    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    tracing::info!("Configuration loaded (hash: {})", hash);
    Ok(config)
}

/// Reads the API key named by the config, failing when it is unset.
fn api_key(env_var: &str) -> anyhow::Result<String> {
    std::env::var(env_var)
        .map_err(|_| silkworm::ConfigError::MissingApiKey(env_var.to_string()).into())
}

/// Handles the crawl subcommand
async fn handle_crawl(config_path: &std::path::Path) -> anyhow::Result<()> {
    let config = load(config_path)?;
    require_enabled_sources(&config.sources)?;

    let timeout = Duration::from_secs(config.crawler.request_timeout_secs);
    let embedder = HttpEmbedder::new(
        &config.embedding,
        &api_key(&config.embedding.api_key_env)?,
        timeout,
    )?;
    let index = RestIndex::new(&config.index, &api_key(&config.index.api_key_env)?, timeout)?;

    let report = run_crawl(&config, &embedder, &index).await?;

    println!("Crawl finished");
    println!("  Seeds:           {}", report.seed_count);
    println!("  Pages fetched:   {}", report.pages_fetched);
    println!("  Pages failed:    {}", report.pages_failed);
    println!("  Pages skipped:   {}", report.pages_skipped);
    println!("  URLs visited:    {}", report.urls_visited);
    println!(
        "  Chunks indexed:  {} ({} skipped on embedding failure)",
        report.chunks_indexed, report.chunks_skipped
    );
    println!(
        "  Records upserted: {} in {} batches ({} batches failed)",
        report.batches.records_upserted,
        report.batches.batches_flushed,
        report.batches.batches_failed
    );

    Ok(())
}

/// Handles the cleanup subcommand
async fn handle_cleanup(config_path: &std::path::Path) -> anyhow::Result<()> {
    let config = load(config_path)?;

    let timeout = Duration::from_secs(config.crawler.request_timeout_secs);
    let index = RestIndex::new(&config.index, &api_key(&config.index.api_key_env)?, timeout)?;

    let dimension = index
        .dimension()
        .await
        .context("failed to read index dimensionality")?;
    tracing::info!("Index dimensionality: {}", dimension);

    let rules = default_rules(
        dimension,
        config.cleanup.near_zero_epsilon,
        config.processing.min_text_length,
    );
    let scanner = Scanner::new(&index, rules, &config.cleanup);

    let report = scanner.run().await?;

    println!("Cleanup finished");
    println!("  Entries examined: {}", report.examined);
    println!("  Defective found:  {}", report.defective);
    println!("  Entries deleted:  {}", report.deleted);
    println!("  Scan iterations:  {}", report.iterations);
    match report.outcome {
        ScanOutcome::Completed => println!("  Outcome: completed"),
        ScanOutcome::Incomplete => {
            println!("  Outcome: incomplete (iteration cap reached, re-run to continue)")
        }
    }

    Ok(())
}
