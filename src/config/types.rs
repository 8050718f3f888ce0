use crate::crawler::{BranchId, FailurePolicy};
use serde::Deserialize;

/// Main configuration structure for Branch-Sweep
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    /// Explicit subset of branches to crawl; all listed branches when absent
    #[serde(default)]
    pub branches: Option<Vec<BranchId>>,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Scheme and host, e.g. "https://www.example.com"
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the finder API endpoint, e.g. "/api/finder.php"
    #[serde(rename = "api-path")]
    pub api_path: String,

    /// Evaluation year passed as YEAR0 on search requests
    pub year: u16,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Items requested per search page (blocksize)
    #[serde(rename = "page-size")]
    pub page_size: u32,

    /// Maximum number of fetches in flight at once
    #[serde(rename = "max-concurrent-requests")]
    pub max_concurrent_requests: u32,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "request-timeout-ms", default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// URLs at or below this length are treated as first-page requests
    #[serde(
        rename = "pagination-url-max-length",
        default = "default_pagination_url_max_length"
    )]
    pub pagination_url_max_length: usize,

    /// How first-page requests are recognised
    #[serde(rename = "pagination-policy", default)]
    pub pagination_policy: PaginationPolicyKind,

    /// What a failed job does to the rest of the run
    #[serde(rename = "failure-policy", default)]
    pub failure_policy: FailurePolicy,
}

/// Selects the pagination pre-check used by the scheduler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaginationPolicyKind {
    /// Compare the request URL length against `pagination-url-max-length`
    #[default]
    UrlLength,
    /// Look for a `pageoffset` query parameter
    OffsetParameter,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory under which each run gets its own sub-directory
    #[serde(rename = "drop-location")]
    pub drop_location: String,
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_pagination_url_max_length() -> usize {
    crate::crawler::DEFAULT_PAGINATION_URL_MAX_LENGTH
}
