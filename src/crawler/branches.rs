//! Branch listing
//!
//! Fetches the listing endpoint and turns it into the ordered set of branch
//! ids that seeds a crawl run.

use crate::crawler::fetcher::fetch_url;
use crate::crawler::parser::parse_branch_listing;
use crate::crawler::BranchId;
use crate::url::UrlBuilder;
use crate::SweepError;
use reqwest::Client;

/// Fetches the branch listing and returns the branch ids in document order
///
/// A transport timeout is not an error here: it is logged and an empty list
/// is returned, so the run that follows performs no work. Any other failure
/// is returned to the caller.
pub async fn list_branches(
    client: &Client,
    builder: &UrlBuilder,
) -> Result<Vec<BranchId>, SweepError> {
    let url = builder.listing_url();
    tracing::debug!("Fetching branch listing: {}", url);

    let result = fetch_url(client, &url).await;
    if result.is_timeout() {
        tracing::warn!("Branch listing timed out, continuing with no branches");
        return Ok(Vec::new());
    }

    let page = result.into_page(&url)?;
    let branches = parse_branch_listing(&page.body);
    tracing::info!("Branch listing returned {} branches", branches.len());

    Ok(branches)
}
