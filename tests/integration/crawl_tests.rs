//! End-to-end crawl tests
//!
//! These tests use wiremock to stand in for the finder site and check the
//! batch files a full run leaves in the drop location.

use crate::common::{
    branch_listing, coordinator, create_test_config, item_codes, read_batches, search_page,
    FirstPage,
};
use branch_sweep::config::PaginationPolicyKind;
use branch_sweep::crawler::{BranchId, DEFAULT_PAGINATION_URL_MAX_LENGTH};
use branch_sweep::{FailurePolicy, SweepError, UrlBuilder};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Branch 4 reports 20 of 45 items per page, spread over three pages
fn branch_4_first() -> Vec<String> {
    item_codes("DE", 0, 20)
}

fn branch_4_second() -> Vec<String> {
    item_codes("US", 20, 20)
}

fn branch_4_third() -> Vec<String> {
    item_codes("NL", 40, 5)
}

/// Branch 8 reports all of its 10 items on the first page
fn branch_8() -> Vec<String> {
    item_codes("CH", 0, 10)
}

/// Mounts a three-page branch 4 and a single-page branch 8
async fn mount_two_branches(server: &MockServer) {
    Mock::given(method("GET"))
        .and(query_param("branch", "4"))
        .and(FirstPage)
        .respond_with(
            ResponseTemplate::new(200).set_body_string(search_page(20, 45, &branch_4_first())),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("branch", "4"))
        .and(query_param("pageoffset", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(search_page(20, 45, &branch_4_second())),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("branch", "4"))
        .and(query_param("pageoffset", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(search_page(5, 45, &branch_4_third())),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("branch", "8"))
        .and(FirstPage)
        .respond_with(ResponseTemplate::new(200).set_body_string(search_page(10, 10, &branch_8())))
        .expect(1)
        .mount(server)
        .await;
}

fn batch_content(url: &str, codes: &[String]) -> String {
    let mut content = url.to_string();
    for code in codes {
        content.push('\n');
        content.push_str(code);
    }
    content
}

/// Every code written under `run_dir`, sorted
fn written_codes(run_dir: &Path) -> Vec<String> {
    let mut codes: Vec<String> = read_batches(run_dir)
        .into_iter()
        .flat_map(|(_, content)| {
            content
                .lines()
                .skip(1)
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect();
    codes.sort();
    codes
}

fn all_two_branch_codes() -> Vec<String> {
    let mut codes = [branch_4_first(), branch_4_second(), branch_4_third(), branch_8()].concat();
    codes.sort();
    codes
}

#[tokio::test]
async fn test_full_crawl_writes_one_file_per_page() {
    let server = MockServer::start().await;
    mount_two_branches(&server).await;

    let drop = TempDir::new().expect("Failed to create temp dir");
    let mut config = create_test_config(&server.uri(), drop.path());
    config.crawler.max_concurrent_requests = 1;
    config.branches = Some(vec![BranchId(4), BranchId(8)]);
    let page_size = config.crawler.page_size;

    let coordinator = coordinator(config);
    let builder = coordinator.url_builder().clone();
    let summary = coordinator.run().await.expect("Crawl failed");

    assert_eq!(summary.run_id, "id-0000");
    assert_eq!(summary.jobs_dispatched, 4);
    assert_eq!(summary.jobs_completed, 4);
    assert_eq!(summary.jobs_failed, 0);
    assert_eq!(summary.batches_written, 4);
    assert_eq!(summary.items_written, 55);
    assert_eq!(summary.follow_ups_enqueued, 2);

    // One request at a time: both seeds run before branch 4's follow-ups
    let seed_4 = builder.search_url(BranchId(4), page_size, 1);
    let seed_8 = builder.search_url(BranchId(8), page_size, 1);
    let expected = vec![
        ("id-0001.txt".to_string(), batch_content(&seed_4, &branch_4_first())),
        ("id-0002.txt".to_string(), batch_content(&seed_8, &branch_8())),
        (
            "id-0003.txt".to_string(),
            batch_content(&format!("{}&pageoffset=1", seed_4), &branch_4_second()),
        ),
        (
            "id-0004.txt".to_string(),
            batch_content(&format!("{}&pageoffset=2", seed_4), &branch_4_third()),
        ),
    ];

    assert_eq!(read_batches(&drop.path().join("id-0000")), expected);
}

#[tokio::test]
async fn test_url_length_policy_stops_at_follow_up_pages() {
    let server = MockServer::start().await;
    mount_two_branches(&server).await;

    let drop = TempDir::new().expect("Failed to create temp dir");
    let mut config = create_test_config(&server.uri(), drop.path());
    let seed_len = UrlBuilder::from_config(&config.site)
        .search_url(BranchId(4), config.crawler.page_size, 1)
        .len();
    config.crawler.pagination_policy = PaginationPolicyKind::UrlLength;
    config.crawler.pagination_url_max_length = seed_len;
    config.branches = Some(vec![BranchId(4), BranchId(8)]);

    let summary = coordinator(config).run().await.expect("Crawl failed");

    assert_eq!(summary.jobs_completed, 4);
    assert_eq!(summary.batches_written, 4);
    assert_eq!(summary.follow_ups_enqueued, 2);
    assert_eq!(
        written_codes(&drop.path().join("id-0000")),
        all_two_branch_codes()
    );
}

#[tokio::test]
async fn test_default_url_length_threshold() {
    let server = MockServer::start().await;
    mount_two_branches(&server).await;

    let drop = TempDir::new().expect("Failed to create temp dir");
    let mut config = create_test_config(&server.uri(), drop.path());
    // Sized so a seed URL on 127.0.0.1 fits in 149 bytes for any port width
    config.site.api_path = "/research/finder/evaluation/search.php".to_string();
    config.crawler.pagination_policy = PaginationPolicyKind::UrlLength;
    config.branches = Some(vec![BranchId(4), BranchId(8)]);
    assert_eq!(
        config.crawler.pagination_url_max_length,
        DEFAULT_PAGINATION_URL_MAX_LENGTH
    );

    let seed = UrlBuilder::from_config(&config.site).search_url(
        BranchId(4),
        config.crawler.page_size,
        1,
    );
    let follow_up = format!("{}&pageoffset=1", seed);
    assert!(seed.len() <= DEFAULT_PAGINATION_URL_MAX_LENGTH, "{}", seed);
    assert!(follow_up.len() > DEFAULT_PAGINATION_URL_MAX_LENGTH);

    let summary = coordinator(config).run().await.expect("Crawl failed");

    assert_eq!(summary.jobs_completed, 4);
    assert_eq!(summary.batches_written, 4);
    assert_eq!(summary.follow_ups_enqueued, 2);
    assert_eq!(
        written_codes(&drop.path().join("id-0000")),
        all_two_branch_codes()
    );
}

#[tokio::test]
async fn test_listing_drives_the_run() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/finder"))
        .and(query_param("page", "OptionsBranch"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(branch_listing(&[BranchId(8), BranchId(15)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("page", "StocksFinder"))
        .and(query_param("branch", "8"))
        .respond_with(ResponseTemplate::new(200).set_body_string(search_page(10, 10, &branch_8())))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("page", "StocksFinder"))
        .and(query_param("branch", "15"))
        .respond_with(ResponseTemplate::new(200).set_body_string(search_page(0, 0, &[])))
        .expect(1)
        .mount(&server)
        .await;

    let drop = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&server.uri(), drop.path());

    let summary = coordinator(config).run().await.expect("Crawl failed");

    assert_eq!(summary.branches, 2);
    assert_eq!(summary.jobs_completed, 2);
    assert_eq!(summary.batches_written, 1);
    assert_eq!(read_batches(&drop.path().join("id-0000")).len(), 1);
}

#[tokio::test]
async fn test_listing_timeout_means_no_work() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("page", "OptionsBranch"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(branch_listing(&[BranchId(4)]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("page", "StocksFinder"))
        .respond_with(ResponseTemplate::new(200).set_body_string(search_page(10, 10, &branch_8())))
        .expect(0)
        .mount(&server)
        .await;

    let drop = TempDir::new().expect("Failed to create temp dir");
    let mut config = create_test_config(&server.uri(), drop.path());
    config.crawler.request_timeout_ms = 200;

    let summary = coordinator(config).run().await.expect("Crawl failed");

    assert_eq!(summary.branches, 0);
    assert_eq!(summary.jobs_dispatched, 0);
    assert_eq!(fs::read_dir(drop.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_empty_body_branch_does_not_abort_the_run() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("branch", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("branch", "8"))
        .respond_with(ResponseTemplate::new(200).set_body_string(search_page(10, 10, &branch_8())))
        .expect(1)
        .mount(&server)
        .await;

    let drop = TempDir::new().expect("Failed to create temp dir");
    let mut config = create_test_config(&server.uri(), drop.path());
    config.crawler.max_concurrent_requests = 1;
    config.branches = Some(vec![BranchId(4), BranchId(8)]);
    assert_eq!(config.crawler.failure_policy, FailurePolicy::Abort);

    let summary = coordinator(config).run().await.expect("Crawl failed");

    assert_eq!(summary.jobs_completed, 2);
    assert_eq!(summary.batches_written, 1);
    assert_eq!(written_codes(&drop.path().join("id-0000")), branch_8());
}

#[tokio::test]
async fn test_skip_policy_isolates_failing_branch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("branch", "4"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("branch", "8"))
        .respond_with(ResponseTemplate::new(200).set_body_string(search_page(10, 10, &branch_8())))
        .expect(1)
        .mount(&server)
        .await;

    let drop = TempDir::new().expect("Failed to create temp dir");
    let mut config = create_test_config(&server.uri(), drop.path());
    config.crawler.failure_policy = FailurePolicy::Skip;
    config.branches = Some(vec![BranchId(4), BranchId(8)]);

    let summary = coordinator(config).run().await.expect("Crawl failed");

    assert_eq!(summary.jobs_dispatched, 2);
    assert_eq!(summary.jobs_failed, 1);
    assert_eq!(summary.jobs_completed, 1);

    let batches = read_batches(&drop.path().join("id-0000"));
    assert_eq!(batches.len(), 1);
    assert!(batches[0].1.contains("branch=8"));
    assert!(batches[0].1.ends_with("\nCH0000000009"));
}

#[tokio::test]
async fn test_abort_policy_stops_the_run() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("branch", "4"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("branch", "8"))
        .respond_with(ResponseTemplate::new(200).set_body_string(search_page(10, 10, &branch_8())))
        .expect(0)
        .mount(&server)
        .await;

    let drop = TempDir::new().expect("Failed to create temp dir");
    let mut config = create_test_config(&server.uri(), drop.path());
    config.crawler.max_concurrent_requests = 1;
    config.branches = Some(vec![BranchId(4), BranchId(8)]);

    let result = coordinator(config).run().await;

    match result {
        Err(SweepError::Status { status, url }) => {
            assert_eq!(status, 500);
            assert!(url.contains("branch=4"));
        }
        other => panic!("Expected a status error, got {:?}", other),
    }
    assert_eq!(fs::read_dir(drop.path()).unwrap().count(), 0);
}
