//! Run statistics
//!
//! A [`RunSummary`] is filled in by the scheduler while a run progresses and
//! returned once the queue has drained.

use crate::crawler::JobOutcome;
use chrono::{DateTime, Utc};

/// Counters describing one crawl run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Identifier of the run (also the name of its output directory)
    pub run_id: String,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Number of branches the run was seeded with
    pub branches: usize,

    /// Jobs handed to a fetch task
    pub jobs_dispatched: u64,

    /// Jobs that finished without error
    pub jobs_completed: u64,

    /// Jobs that failed and were skipped
    pub jobs_failed: u64,

    /// Batch files written
    pub batches_written: u64,

    /// Item codes written across all batches
    pub items_written: u64,

    /// Follow-up jobs added to the queue by completions
    pub follow_ups_enqueued: u64,
}

impl RunSummary {
    /// Starts a summary for `run_id`, stamped with the current time
    pub fn new(run_id: impl Into<String>, branches: usize) -> Self {
        Self {
            run_id: run_id.into(),
            started_at: Utc::now(),
            finished_at: None,
            branches,
            jobs_dispatched: 0,
            jobs_completed: 0,
            jobs_failed: 0,
            batches_written: 0,
            items_written: 0,
            follow_ups_enqueued: 0,
        }
    }

    /// Accounts for one successfully completed job
    pub fn record_outcome(&mut self, outcome: &JobOutcome) {
        self.jobs_completed += 1;
        self.items_written += outcome.items as u64;
        self.follow_ups_enqueued += outcome.follow_ups.len() as u64;
        if outcome.batch_path.is_some() {
            self.batches_written += 1;
        }
    }

    /// Accounts for one failed job
    pub fn record_failure(&mut self) {
        self.jobs_failed += 1;
    }

    /// Stamps the finish time
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration of the run, if it has finished
    pub fn duration_seconds(&self) -> Option<f64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_milliseconds() as f64 / 1000.0)
    }
}

/// Prints a run summary to stdout in a formatted manner
pub fn print_summary(summary: &RunSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Run: {}", summary.run_id);
    println!("  Started: {}", summary.started_at.to_rfc3339());
    if let Some(finished) = summary.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(duration) = summary.duration_seconds() {
        println!("  Duration: {:.2}s", duration);
    }
    println!();

    println!("Jobs:");
    println!("  Branches seeded: {}", summary.branches);
    println!("  Dispatched: {}", summary.jobs_dispatched);
    println!("  Completed: {}", summary.jobs_completed);
    println!("  Failed: {}", summary.jobs_failed);
    println!("  Follow-ups enqueued: {}", summary.follow_ups_enqueued);
    println!();

    println!("Output:");
    println!("  Batches written: {}", summary.batches_written);
    println!("  Item codes written: {}", summary.items_written);
}
