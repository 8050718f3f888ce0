//! Crawler module for branch listing, paginated search and batch emission
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and error classification
//! - Parsing listing and search result documents
//! - Planning follow-up pages from pagination counters
//! - Scheduling fetches over a self-expanding job queue
//! - Overall run coordination

mod branches;
mod coordinator;
mod fetcher;
mod parser;
mod planner;
mod scheduler;

pub use branches::list_branches;
pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, fetch_url, FetchResult, FetchedPage};
pub use parser::{item_code, parse_branch_listing, parse_result_page, ResultPage, ITEM_CODE_LEN};
pub use planner::{
    plan, policy_from_config, LengthThreshold, OffsetParameter, PaginationPolicy,
    DEFAULT_PAGINATION_URL_MAX_LENGTH,
};
pub use scheduler::{CrawlQueue, JobOutcome, Scheduler};

use crate::url::UrlBuilder;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Identifier of a branch (category) on the finder site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct BranchId(pub u32);

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BranchId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(BranchId)
    }
}

/// A single page request owned by the scheduler
///
/// Jobs are identified by their absolute URL and never change once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CrawlJob {
    url: String,
}

impl CrawlJob {
    /// Creates the first-page job for a branch
    pub fn seed(builder: &UrlBuilder, branch: BranchId, page_size: u32) -> Self {
        Self {
            url: builder.search_url(branch, page_size, 1),
        }
    }

    /// Creates a follow-up job for `origin_url` at the given page offset
    pub fn follow_up(origin_url: &str, page_offset: u32) -> Self {
        Self {
            url: UrlBuilder::with_page_offset(origin_url, page_offset),
        }
    }

    /// Creates a job for an arbitrary absolute URL
    pub fn from_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// The absolute request URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// What a failed job does to the rest of the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// The first failed job aborts the whole run
    #[default]
    Abort,
    /// Failed jobs are logged and counted; the run continues
    Skip,
}
