//! Shared fixtures for the integration tests

use branch_sweep::config::{
    Config, CrawlerConfig, OutputConfig, PaginationPolicyKind, SiteConfig, UserAgentConfig,
};
use branch_sweep::crawler::{BranchId, Coordinator};
use branch_sweep::output::SequentialIds;
use branch_sweep::FailurePolicy;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use wiremock::{Match, Request};

/// Creates a test configuration pointed at a mock server
pub fn create_test_config(base_url: &str, drop_location: &Path) -> Config {
    Config {
        site: SiteConfig {
            base_url: base_url.to_string(),
            api_path: "/api/finder".to_string(),
            year: 2024,
        },
        crawler: CrawlerConfig {
            page_size: 20,
            max_concurrent_requests: 4,
            request_timeout_ms: 2_000,
            pagination_url_max_length: 149,
            pagination_policy: PaginationPolicyKind::OffsetParameter,
            failure_policy: FailurePolicy::Abort,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            drop_location: drop_location.to_string_lossy().into_owned(),
        },
        branches: None,
    }
}

/// A coordinator whose run id is `id-0000` and whose batches follow as `id-0001`, ...
pub fn coordinator(config: Config) -> Coordinator {
    Coordinator::with_id_generator(config, Arc::new(SequentialIds::new("id")))
        .expect("Failed to build coordinator")
}

/// Matches requests that carry no `pageoffset` query parameter
pub struct FirstPage;

impl Match for FirstPage {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(key, _)| key == "pageoffset")
    }
}

/// Builds `count` distinct twelve-character item codes starting at `first`
pub fn item_codes(country: &str, first: u64, count: u64) -> Vec<String> {
    (first..first + count)
        .map(|n| format!("{}{:010}", country, n))
        .collect()
}

/// Builds a search result document
pub fn search_page(amount: u32, amount_total: u32, codes: &[String]) -> String {
    let rows: String = codes
        .iter()
        .enumerate()
        .map(|(i, code)| {
            format!(
                "<row><link_target>/shares/instrument-{}-{}</link_target></row>",
                i, code
            )
        })
        .collect();

    format!(
        "<results><amount>{}</amount><amount_total>{}</amount_total>{}</results>",
        amount, amount_total, rows
    )
}

/// Builds a branch listing document with a header row
pub fn branch_listing(branches: &[BranchId]) -> String {
    let rows: String = branches
        .iter()
        .map(|b| format!("<row><key>{}</key><value>Branch {}</value></row>", b, b))
        .collect();

    format!(
        "<results><row><key>key</key><value>value</value></row>{}</results>",
        rows
    )
}

/// Reads every batch file of a run, sorted by file name
pub fn read_batches(run_dir: &Path) -> Vec<(String, String)> {
    let mut batches: Vec<(String, String)> = fs::read_dir(run_dir)
        .expect("Failed to read run directory")
        .map(|entry| {
            let path = entry.expect("Failed to read entry").path();
            let name = path
                .file_name()
                .expect("Batch file has no name")
                .to_string_lossy()
                .into_owned();
            let content = fs::read_to_string(&path).expect("Failed to read batch");
            (name, content)
        })
        .collect();
    batches.sort();
    batches
}
