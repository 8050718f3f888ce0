//! Scheduler for driving a crawl run over a self-expanding job queue
//!
//! This module handles:
//! - Seeding the queue with one first-page job per branch
//! - Global concurrency limiting via a semaphore
//! - Emitting a batch as soon as each job completes
//! - Enqueuing follow-up pages discovered by completions
//! - Deciding when the run is finished
//!
//! The queue is owned by the run loop alone. Fetch tasks never touch it:
//! they return their follow-up jobs, and the loop commits them before it
//! checks for termination again. A job therefore counts as in flight until
//! its own follow-ups are visible in the queue, so the run cannot end while
//! discovered work is still outstanding.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::fetch_url;
use crate::crawler::parser::parse_result_page;
use crate::crawler::planner::{plan, policy_from_config, PaginationPolicy};
use crate::crawler::{BranchId, CrawlJob, FailurePolicy};
use crate::output::{BatchSink, OutputBatch, RunSummary};
use crate::url::UrlBuilder;
use crate::SweepError;
use reqwest::Client;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Pending jobs plus the number of jobs currently in flight
///
/// There is no deduplication: a URL pushed twice is fetched twice.
#[derive(Debug, Default)]
pub struct CrawlQueue {
    pending: VecDeque<CrawlJob>,
    in_flight: usize,
}

impl CrawlQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a job to the back of the queue
    pub fn push(&mut self, job: CrawlJob) {
        self.pending.push_back(job);
    }

    /// Takes the next pending job and counts it as in flight
    pub fn next_for_dispatch(&mut self) -> Option<CrawlJob> {
        let job = self.pending.pop_front()?;
        self.in_flight += 1;
        Some(job)
    }

    /// Marks one in-flight job as finished after committing its follow-ups
    pub fn complete(&mut self, follow_ups: Vec<CrawlJob>) {
        self.pending.extend(follow_ups);
        debug_assert!(self.in_flight > 0, "completed a job that was never dispatched");
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Returns true if nothing is pending and nothing is in flight
    pub fn is_drained(&self) -> bool {
        self.pending.is_empty() && self.in_flight == 0
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight
    }
}

/// What a single completed job produced
#[derive(Debug)]
pub struct JobOutcome {
    /// Number of item codes extracted
    pub items: usize,

    /// Where the batch was written, if the page held any items
    pub batch_path: Option<PathBuf>,

    /// Follow-up jobs planned from this page
    pub follow_ups: Vec<CrawlJob>,
}

/// Shared, read-only state handed to every fetch task
struct JobContext {
    client: Client,
    pagination: Arc<dyn PaginationPolicy>,
    sink: Arc<dyn BatchSink>,
}

/// Scheduler drives one crawl run to completion
///
/// The scheduler coordinates:
/// - Global concurrency limits (max concurrent requests)
/// - Batch emission per completed job
/// - Queue growth from pagination
/// - The failure policy for jobs that error
pub struct Scheduler {
    context: Arc<JobContext>,
    builder: UrlBuilder,
    page_size: u32,
    max_concurrent: usize,
    failure_policy: FailurePolicy,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration (page size, concurrency, policies)
    /// * `client` - HTTP client used for every fetch
    /// * `builder` - Builds the seed job URLs
    /// * `sink` - Receives every non-empty batch
    pub fn new(
        config: &CrawlerConfig,
        client: Client,
        builder: UrlBuilder,
        sink: Arc<dyn BatchSink>,
    ) -> Self {
        Self {
            context: Arc::new(JobContext {
                client,
                pagination: policy_from_config(config),
                sink,
            }),
            builder,
            page_size: config.page_size,
            max_concurrent: config.max_concurrent_requests.max(1) as usize,
            failure_policy: config.failure_policy,
        }
    }

    /// Replaces the pagination pre-check selected by configuration
    pub fn with_pagination_policy(mut self, pagination: Arc<dyn PaginationPolicy>) -> Self {
        self.context = Arc::new(JobContext {
            client: self.context.client.clone(),
            pagination,
            sink: Arc::clone(&self.context.sink),
        });
        self
    }

    /// Runs the crawl for `branches` until the queue has drained
    ///
    /// An empty branch list performs no I/O and returns at once.
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - The queue drained
    /// * `Err(SweepError)` - A job failed under [`FailurePolicy::Abort`]
    pub async fn run(&self, branches: &[BranchId]) -> Result<RunSummary, SweepError> {
        let mut summary = RunSummary::new(self.context.sink.run_id(), branches.len());

        if branches.is_empty() {
            tracing::info!("No branches to crawl, run {} is empty", summary.run_id);
            summary.finish();
            return Ok(summary);
        }

        let mut queue = CrawlQueue::new();
        for branch in branches {
            queue.push(CrawlJob::seed(&self.builder, *branch, self.page_size));
        }

        tracing::info!(
            "Starting run {} with {} seed jobs, {} concurrent requests",
            summary.run_id,
            queue.pending_len(),
            self.max_concurrent
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks: JoinSet<(CrawlJob, Result<JobOutcome, SweepError>)> = JoinSet::new();
        let start_time = Instant::now();

        loop {
            // Fill every free fetch slot
            while queue.has_pending() {
                let Ok(permit) = Arc::clone(&semaphore).try_acquire_owned() else {
                    break;
                };
                let Some(job) = queue.next_for_dispatch() else {
                    break;
                };

                tracing::debug!("Dispatching {}", job.url());
                summary.jobs_dispatched += 1;

                let context = Arc::clone(&self.context);
                tasks.spawn(async move {
                    let _permit = permit;
                    let outcome = process_job(&context, &job).await;
                    (job, outcome)
                });
            }

            if queue.is_drained() {
                break;
            }

            let Some(joined) = tasks.join_next().await else {
                tracing::error!(
                    "No fetch task left while {} jobs are counted in flight",
                    queue.in_flight_len()
                );
                break;
            };

            match joined {
                Ok((_, Ok(outcome))) => {
                    summary.record_outcome(&outcome);
                    queue.complete(outcome.follow_ups);
                }
                Ok((job, Err(e))) => {
                    queue.complete(Vec::new());
                    tracing::error!("Job {} failed: {}", job.url(), e);
                    self.handle_failure(&mut tasks, &mut summary, e).await?;
                }
                Err(join_error) => {
                    queue.complete(Vec::new());
                    tracing::error!("Fetch task ended abnormally: {}", join_error);
                    self.handle_failure(&mut tasks, &mut summary, SweepError::Task(join_error))
                        .await?;
                }
            }

            let finished = summary.jobs_completed + summary.jobs_failed;
            if finished % 10 == 0 {
                let rate = finished as f64 / start_time.elapsed().as_secs_f64().max(f64::EPSILON);
                tracing::info!(
                    "Progress: {} jobs finished, {} pending, {} in flight, {:.2} jobs/sec",
                    finished,
                    queue.pending_len(),
                    queue.in_flight_len(),
                    rate
                );
            }
        }

        summary.finish();
        tracing::info!(
            "Run {} complete: {} jobs, {} batches, {} codes in {:?}",
            summary.run_id,
            summary.jobs_completed,
            summary.batches_written,
            summary.items_written,
            start_time.elapsed()
        );

        Ok(summary)
    }

    /// Applies the failure policy to a failed job
    async fn handle_failure(
        &self,
        tasks: &mut JoinSet<(CrawlJob, Result<JobOutcome, SweepError>)>,
        summary: &mut RunSummary,
        error: SweepError,
    ) -> Result<(), SweepError> {
        match self.failure_policy {
            FailurePolicy::Abort => {
                tracing::warn!(
                    "Aborting run {} with {} jobs in flight",
                    summary.run_id,
                    tasks.len()
                );
                tasks.shutdown().await;
                Err(error)
            }
            FailurePolicy::Skip => {
                summary.record_failure();
                Ok(())
            }
        }
    }
}

/// Fetches one job, writes its batch and plans its follow-ups
async fn process_job(context: &JobContext, job: &CrawlJob) -> Result<JobOutcome, SweepError> {
    let url = job.url();
    let fetched = fetch_url(&context.client, url).await.into_page(url)?;
    if fetched.final_url != url {
        tracing::debug!("{} was redirected to {}", url, fetched.final_url);
    }

    let page = parse_result_page(&fetched.body, url);

    let codes = page.item_codes();
    let items = codes.len();
    let batch_path = if codes.is_empty() {
        None
    } else {
        Some(context.sink.write(&OutputBatch::new(url, codes))?)
    };

    let follow_ups = if context.pagination.should_consider_pagination(url) {
        plan(&page, url)
    } else {
        Vec::new()
    };

    tracing::debug!(
        "Completed {}: {} codes, {} follow-up pages",
        url,
        items,
        follow_ups.len()
    );

    Ok(JobOutcome {
        items,
        batch_path,
        follow_ups,
    })
}
