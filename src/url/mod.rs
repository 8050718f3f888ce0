//! URL handling module for Branch-Sweep
//!
//! This module builds the request URLs for the finder API and provides the
//! small amount of query inspection the crawler needs.

mod builder;

pub use builder::{UrlBuilder, LISTING_QUERY, PAGE_OFFSET_PARAM, SEARCH_QUERY};

use crate::{UrlError, UrlResult};
use url::Url;

/// Returns true if the URL's query carries an explicit page offset
///
/// Unparseable URLs fall back to a substring check on the raw text.
pub fn has_page_offset(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed.query_pairs().any(|(key, _)| key == PAGE_OFFSET_PARAM),
        Err(_) => url.contains(&format!("{}=", PAGE_OFFSET_PARAM)),
    }
}

/// Parses an absolute HTTP(S) URL, rejecting other schemes
pub fn parse_http_url(url: &str) -> UrlResult<Url> {
    let parsed = Url::parse(url).map_err(|e| UrlError::Parse(format!("{}: {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(UrlError::InvalidScheme(other.to_string())),
    }

    if parsed.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(parsed)
}
