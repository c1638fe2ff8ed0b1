//! Gridharvest main entry point
//!
//! Operator tool over the shared crawl-state database. Site adapters link
//! the library and drive `CrawlEngine` themselves; this binary validates
//! configuration and inspects or adjusts persisted crawl state.

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use gridharvest::config::{load_config_with_hash, Config};
use gridharvest::output::{print_run_history, print_run_report, print_watermarks};
use gridharvest::storage::{open_storage, watermark_key, StateStore};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Gridharvest: incremental crawl state for document scrapers
///
/// Inspects and maintains the watermark store and run history shared by a
/// fleet of site scrapers. Without a mode flag, shows current state.
#[derive(Parser, Debug)]
#[command(name = "gridharvest")]
#[command(version = "0.3.0")]
#[command(about = "Incremental crawl state for document scrapers", long_about = None)]
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

    /// Validate config and show what each scraper would use, without
    /// touching the database
    #[arg(long, conflicts_with_all = ["set_watermark", "clear_watermark"])]
    dry_run: bool,

    /// Set a scraper's watermark, e.g. --set-watermark aemo=2025-03-01
    #[arg(long, value_name = "NAME=DATE")]
    set_watermark: Option<String>,

    /// Clear a scraper's watermark (forces a full re-crawl next run)
    #[arg(long, value_name = "NAME", conflicts_with = "set_watermark")]
    clear_watermark: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if let Some(spec) = &cli.set_watermark {
        handle_set_watermark(&config, spec)?;
    } else if let Some(name) = &cli.clear_watermark {
        handle_clear_watermark(&config, name)?;
    } else {
        handle_stats(&config)?;
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
            0 => EnvFilter::new("gridharvest=info,warn"),
            1 => EnvFilter::new("gridharvest=debug,info"),
            2 => EnvFilter::new("gridharvest=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what each
/// scraper would use
fn handle_dry_run(config: &Config) {
    println!("=== Gridharvest Dry Run ===\n");

    println!("Pagination Guard:");
    println!("  Max empty pages: {}", config.guard.max_empty_pages);
    println!("  Max duplicate pages: {}", config.guard.max_duplicate_pages);
    println!(
        "  Max no-new-items pages: {}",
        config.guard.max_no_new_items_pages
    );

    println!("\nExclusion Filter:");
    println!("  Required tags: {:?}", config.filter.required_tags);
    println!("  Excluded tags: {:?}", config.filter.excluded_tags);
    println!("  Excluded keywords: {:?}", config.filter.excluded_keywords);

    println!("\nCrawl:");
    println!("  Max pages per run: {}", config.crawl.max_pages);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nScrapers ({}):", config.scrapers.len());
    for entry in &config.scrapers {
        println!("  - {} ({})", entry.name, entry.base_url);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the default mode: shows watermarks and recent run history
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))?;

    let watermarks = storage.list_watermarks()?;
    print_watermarks(&watermarks);
    println!();

    let runs = storage.recent_runs(20)?;
    print_run_history(&runs);

    if let Some(latest) = runs.first() {
        println!();
        print_run_report(&latest.scraper, &latest.to_result());
    }

    Ok(())
}

/// Handles --set-watermark NAME=DATE
fn handle_set_watermark(config: &Config, spec: &str) -> anyhow::Result<()> {
    let (name, date) = spec
        .split_once('=')
        .context("expected NAME=YYYY-MM-DD")?;

    ensure_known_scraper(config, name)?;

    // Reject anything that is not a real calendar date
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{}' (expected YYYY-MM-DD)", date))?;

    let mut storage = open_storage(Path::new(&config.output.database_path))?;
    storage.set(&watermark_key(name), date)?;
    storage.flush()?;

    println!("✓ Watermark for '{}' set to {}", name, date);
    Ok(())
}

/// Handles --clear-watermark NAME
fn handle_clear_watermark(config: &Config, name: &str) -> anyhow::Result<()> {
    ensure_known_scraper(config, name)?;

    let mut storage = open_storage(Path::new(&config.output.database_path))?;
    storage.delete(&watermark_key(name))?;
    storage.flush()?;

    println!(
        "✓ Watermark for '{}' cleared; the next run will crawl everything",
        name
    );
    Ok(())
}

/// Rejects scraper names that are not in the configuration, so a typo
/// cannot create an orphaned watermark entry
fn ensure_known_scraper(config: &Config, name: &str) -> anyhow::Result<()> {
    if config.scrapers.iter().any(|s| s.name == name) {
        Ok(())
    } else {
        anyhow::bail!(
            "unknown scraper '{}' (configured: {})",
            name,
            config
                .scrapers
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
