//! Branch-Sweep: a paginated branch crawler for a financial listings site
//!
//! This crate enumerates the site's branch (category) identifiers, issues a
//! paginated search per branch, extracts the instrument codes from every
//! result page and writes them out as one batch file per fetched page.

pub mod config;
pub mod crawler;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Branch-Sweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Crawl task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl SweepError {
    /// Returns true if this error is a transport timeout
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Reqwest(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Branch-Sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{BranchId, CrawlJob, FailurePolicy};
pub use url::UrlBuilder;
