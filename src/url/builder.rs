//! Request URL construction for the finder API
//!
//! Both endpoints live on the same API path and are told apart by their
//! query parameters:
//!
//! - listing: `page=OptionsBranch&version=2`
//! - search: `page=StocksFinder&version=2&FIGURE0=PER.EVALUATION&YEAR0=<year>&branch=<id>&blocksize=<size>[&pageoffset=<n>]`

use crate::config::SiteConfig;
use crate::crawler::BranchId;

/// Fixed query of the branch listing endpoint
pub const LISTING_QUERY: &str = "page=OptionsBranch&version=2";

/// Fixed prefix of the branch search query
pub const SEARCH_QUERY: &str = "page=StocksFinder&version=2&FIGURE0=PER.EVALUATION";

/// Name of the query parameter selecting a follow-up page
pub const PAGE_OFFSET_PARAM: &str = "pageoffset";

/// Builds absolute request URLs from the configured site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBuilder {
    /// Scheme and host, without a trailing slash
    origin: String,
    api_path: String,
    year: u16,
}

impl UrlBuilder {
    /// Creates a builder for the given origin, API path and evaluation year
    pub fn new(origin: impl Into<String>, api_path: impl Into<String>, year: u16) -> Self {
        let origin = origin.into().trim_end_matches('/').to_string();
        Self {
            origin,
            api_path: api_path.into(),
            year,
        }
    }

    /// Creates a builder from the `[site]` configuration section
    pub fn from_config(site: &SiteConfig) -> Self {
        Self::new(&site.base_url, &site.api_path, site.year)
    }

    /// Returns the absolute URL of the branch listing endpoint
    pub fn listing_url(&self) -> String {
        self.absolutize(&format!("{}?{}", self.api_path, LISTING_QUERY))
    }

    /// Returns the absolute URL of one page of a branch search
    ///
    /// `page_offset` values of 0 and 1 both mean the first page and leave
    /// the offset parameter out entirely.
    pub fn search_url(&self, branch: BranchId, page_size: u32, page_offset: u32) -> String {
        let url = self.absolutize(&format!(
            "{}?{}&YEAR0={}&branch={}&blocksize={}",
            self.api_path, SEARCH_QUERY, self.year, branch, page_size
        ));

        if page_offset > 1 {
            Self::with_page_offset(&url, page_offset)
        } else {
            url
        }
    }

    /// Appends an explicit page offset to an already built search URL
    pub fn with_page_offset(origin_url: &str, page_offset: u32) -> String {
        format!("{}&{}={}", origin_url, PAGE_OFFSET_PARAM, page_offset)
    }

    /// Prefixes the configured origin unless `url` already carries an HTTP scheme
    pub fn absolutize(&self, url: &str) -> String {
        if url.starts_with("http") {
            return url.to_string();
        }

        if url.starts_with('/') {
            format!("{}{}", self.origin, url)
        } else {
            format!("{}/{}", self.origin, url)
        }
    }
}
