//! Branch-Sweep main entry point
//!
//! This is the command-line interface for the Branch-Sweep crawler.

use anyhow::Context;
use branch_sweep::config::{load_config_with_hash, Config};
use branch_sweep::crawler::{BranchId, Coordinator};
use branch_sweep::output::print_summary;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Branch-Sweep: a paginated branch crawler
///
/// Branch-Sweep lists the branches of a financial finder site, pages through
/// the search results of every branch and writes the instrument codes it
/// finds as one batch file per fetched page.
#[derive(Parser, Debug)]
#[command(name = "branch-sweep")]
#[command(version)]
#[command(about = "A paginated branch crawler", long_about = None)]
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

    /// Crawl only these branches (overrides the configured subset)
    #[arg(short, long = "branch", value_name = "ID", value_delimiter = ',')]
    branches: Vec<BranchId>,

    /// Fetch and print the branch listing, then exit
    #[arg(long, conflicts_with = "dry_run")]
    list_branches: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "list_branches")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let selection = (!cli.branches.is_empty()).then_some(cli.branches.as_slice());

    if cli.dry_run {
        handle_dry_run(&config, selection);
        return Ok(());
    }

    let coordinator = Coordinator::new(config).context("failed to set up crawler")?;

    if cli.list_branches {
        handle_list_branches(&coordinator).await
    } else {
        handle_crawl(&coordinator, selection).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("branch_sweep=info,warn"),
            1 => EnvFilter::new("branch_sweep=debug,info"),
            2 => EnvFilter::new("branch_sweep=trace,debug"),
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

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, selection: Option<&[BranchId]>) {
    println!("=== Branch-Sweep Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  API path: {}", config.site.api_path);
    println!("  Year: {}", config.site.year);

    println!("\nCrawler Configuration:");
    println!("  Page size: {}", config.crawler.page_size);
    println!(
        "  Max concurrent requests: {}",
        config.crawler.max_concurrent_requests
    );
    println!("  Request timeout: {}ms", config.crawler.request_timeout_ms);
    println!(
        "  Pagination policy: {:?} (max length {})",
        config.crawler.pagination_policy, config.crawler.pagination_url_max_length
    );
    println!("  Failure policy: {:?}", config.crawler.failure_policy);

    println!("\nOutput:");
    println!("  Drop location: {}", config.output.drop_location);

    let branches = selection.map(<[BranchId]>::to_vec).or_else(|| config.branches.clone());
    match branches {
        Some(branches) => {
            let ids: Vec<String> = branches.iter().map(ToString::to_string).collect();
            println!("\nBranches ({}): {}", ids.len(), ids.join(", "));
        }
        None => println!("\nBranches: all branches from the site listing"),
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --list-branches mode
async fn handle_list_branches(coordinator: &Coordinator) -> anyhow::Result<()> {
    let branches = coordinator
        .list_branches()
        .await
        .context("failed to fetch branch listing")?;

    for branch in &branches {
        println!("{}", branch);
    }
    tracing::info!("{} branches listed", branches.len());

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    coordinator: &Coordinator,
    selection: Option<&[BranchId]>,
) -> anyhow::Result<()> {
    let branches = coordinator
        .resolve_branches(selection)
        .await
        .context("failed to resolve branches")?;

    match coordinator.run_branches(&branches).await {
        Ok(summary) => {
            tracing::info!("Crawl completed successfully");
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e).context("crawl aborted")
        }
    }
}
