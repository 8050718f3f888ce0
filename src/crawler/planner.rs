//! Pagination planning
//!
//! A first-page response reports how many items it holds (`amount`) and how
//! many exist in total (`amount_total`). From those two counters the planner
//! derives the follow-up pages for the same search.
//!
//! Whether a completed job is a first-page request at all is decided by a
//! [`PaginationPolicy`]. The default [`LengthThreshold`] policy classifies by
//! URL length: a URL carrying `&pageoffset=<n>` is longer than the seed URL
//! it was derived from. The threshold is tied to the width of the host, path,
//! year and branch id, so it breaks silently if any of those change;
//! [`OffsetParameter`] inspects the query instead.

use crate::config::{CrawlerConfig, PaginationPolicyKind};
use crate::crawler::parser::ResultPage;
use crate::crawler::CrawlJob;
use crate::url::has_page_offset;
use std::fmt::Debug;
use std::sync::Arc;

/// URL length up to which a request counts as a first page in the reference deployment
pub const DEFAULT_PAGINATION_URL_MAX_LENGTH: usize = 149;

/// Decides whether a completed request may trigger pagination
pub trait PaginationPolicy: Debug + Send + Sync {
    /// Returns true if the planner should run for a response to `request_url`
    fn should_consider_pagination(&self, request_url: &str) -> bool;
}

/// Treats every URL of at most `max_len` bytes as a first-page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthThreshold {
    pub max_len: usize,
}

impl Default for LengthThreshold {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_PAGINATION_URL_MAX_LENGTH,
        }
    }
}

impl PaginationPolicy for LengthThreshold {
    fn should_consider_pagination(&self, request_url: &str) -> bool {
        request_url.len() <= self.max_len
    }
}

/// Treats every URL without a `pageoffset` parameter as a first-page request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OffsetParameter;

impl PaginationPolicy for OffsetParameter {
    fn should_consider_pagination(&self, request_url: &str) -> bool {
        !has_page_offset(request_url)
    }
}

/// Builds the policy selected by the `[crawler]` configuration
pub fn policy_from_config(config: &CrawlerConfig) -> Arc<dyn PaginationPolicy> {
    match config.pagination_policy {
        PaginationPolicyKind::UrlLength => Arc::new(LengthThreshold {
            max_len: config.pagination_url_max_length,
        }),
        PaginationPolicyKind::OffsetParameter => Arc::new(OffsetParameter),
    }
}

/// Plans the follow-up jobs for a first-page response
///
/// Returns one job per offset in `1..=amount_total / amount`. Returns no jobs
/// when either counter is missing, when `amount` is 0, or when the page
/// already holds everything (`amount >= amount_total`).
pub fn plan(page: &ResultPage, origin_url: &str) -> Vec<CrawlJob> {
    let (Some(amount), Some(amount_total)) = (page.amount, page.amount_total) else {
        tracing::debug!("No pagination counters on {}", origin_url);
        return Vec::new();
    };

    if amount == 0 || amount >= amount_total {
        return Vec::new();
    }

    let page_count = amount_total / amount;
    tracing::debug!(
        "Planning {} follow-up pages for {} (amount={}, amount_total={})",
        page_count,
        origin_url,
        amount,
        amount_total
    );

    (1..=page_count)
        .map(|offset| CrawlJob::follow_up(origin_url, offset))
        .collect()
}
