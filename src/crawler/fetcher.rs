//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings and timeouts
//! - GET requests to fetch listing and search documents
//! - Error classification (timeouts are told apart from other failures)

use crate::config::UserAgentConfig;
use crate::url::parse_http_url;
use crate::SweepError;
use reqwest::Client;
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the document
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Response body
        body: String,
    },

    /// The server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// The request or the body read exceeded the client timeout
    Timeout,

    /// Any other transport failure (connection refused, TLS, invalid URL, ...)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// A successfully fetched document
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,
    /// Response body
    pub body: String,
}

impl FetchResult {
    /// Converts the fetch outcome into a page or a crate error for `url`
    pub fn into_page(self, url: &str) -> Result<FetchedPage, SweepError> {
        match self {
            FetchResult::Success {
                final_url, body, ..
            } => Ok(FetchedPage { final_url, body }),
            FetchResult::HttpError { status_code } => Err(SweepError::Status {
                url: url.to_string(),
                status: status_code,
            }),
            FetchResult::Timeout => Err(SweepError::Timeout {
                url: url.to_string(),
            }),
            FetchResult::NetworkError { error } => Err(SweepError::Network {
                url: url.to_string(),
                message: error,
            }),
        }
    }

    /// Returns true if this outcome is a transport timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchResult::Timeout)
    }
}

/// Builds an HTTP client with proper configuration
///
/// The user agent is formatted as `CrawlerName/Version (+ContactURL; ContactEmail)`.
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Total per-request timeout, including the body read
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | Success |
/// | other status | HttpError |
/// | request or body timeout | Timeout |
/// | anything else | NetworkError |
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    if let Err(e) = parse_http_url(url) {
        return FetchResult::NetworkError {
            error: e.to_string(),
        };
    }

    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(e),
    };

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            body,
        },
        Err(e) => classify_error(e),
    }
}

fn classify_error(e: reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::Timeout
    } else if e.is_connect() {
        FetchResult::NetworkError {
            error: format!("Connection failed: {}", e),
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
        }
    }
}
