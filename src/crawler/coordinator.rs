//! Crawler coordinator - run orchestration
//!
//! This module wires the pieces of a run together:
//! - Building the HTTP client and URL builder from configuration
//! - Resolving which branches to crawl
//! - Opening a run-scoped output sink
//! - Handing the branches to the scheduler

use crate::config::Config;
use crate::crawler::branches::list_branches;
use crate::crawler::scheduler::Scheduler;
use crate::crawler::{build_http_client, BranchId};
use crate::output::{BatchSink, FileSink, IdGenerator, RunSummary, UuidIds};
use crate::url::UrlBuilder;
use crate::SweepError;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    client: Client,
    builder: UrlBuilder,
    ids: Arc<dyn IdGenerator>,
}

impl Coordinator {
    /// Creates a new coordinator with random run and batch ids
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(SweepError)` - The HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, SweepError> {
        Self::with_id_generator(config, Arc::new(UuidIds))
    }

    /// Creates a new coordinator drawing run and batch ids from `ids`
    pub fn with_id_generator(
        config: Config,
        ids: Arc<dyn IdGenerator>,
    ) -> Result<Self, SweepError> {
        let timeout = Duration::from_millis(config.crawler.request_timeout_ms);
        let client = build_http_client(&config.user_agent, timeout)?;
        let builder = UrlBuilder::from_config(&config.site);

        Ok(Self {
            config: Arc::new(config),
            client,
            builder,
            ids,
        })
    }

    /// Fetches the full branch listing from the site
    pub async fn list_branches(&self) -> Result<Vec<BranchId>, SweepError> {
        list_branches(&self.client, &self.builder).await
    }

    /// Decides which branches a run covers
    ///
    /// An explicit selection wins over the configured `branches` subset; with
    /// neither, the site's listing is fetched.
    pub async fn resolve_branches(
        &self,
        selection: Option<&[BranchId]>,
    ) -> Result<Vec<BranchId>, SweepError> {
        if let Some(selected) = selection {
            tracing::info!("Crawling {} branches selected on the command line", selected.len());
            return Ok(selected.to_vec());
        }

        if let Some(configured) = &self.config.branches {
            tracing::info!("Crawling {} branches from configuration", configured.len());
            return Ok(configured.clone());
        }

        self.list_branches().await
    }

    /// Runs a crawl over the configured or listed branches
    pub async fn run(&self) -> Result<RunSummary, SweepError> {
        let branches = self.resolve_branches(None).await?;
        self.run_branches(&branches).await
    }

    /// Runs a crawl over exactly `branches`
    ///
    /// Each call is a new run with its own output directory.
    pub async fn run_branches(&self, branches: &[BranchId]) -> Result<RunSummary, SweepError> {
        let sink = Arc::new(FileSink::new(
            &self.config.output.drop_location,
            Arc::clone(&self.ids),
        ));
        tracing::info!(
            "Run {} over {} branches writes to {}",
            sink.run_id(),
            branches.len(),
            sink.run_dir().display()
        );

        let scheduler = Scheduler::new(
            &self.config.crawler,
            self.client.clone(),
            self.builder.clone(),
            sink,
        );

        scheduler.run(branches).await
    }

    /// The URL builder derived from the `[site]` section
    pub fn url_builder(&self) -> &UrlBuilder {
        &self.builder
    }
}

/// Runs the main crawl operation
///
/// # Example
///
/// ```no_run
/// use branch_sweep::config::load_config;
/// use branch_sweep::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("sweep.toml"))?;
/// let summary = run_crawl(config).await?;
/// println!("{} batches written", summary.batches_written);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<RunSummary, SweepError> {
    let coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
