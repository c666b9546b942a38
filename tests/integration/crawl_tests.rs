//! Integration tests for the traversal engine
//!
//! These tests use wiremock to create mock HTTP servers and run full
//! crawls end-to-end through the real HTTP fetcher.

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};
use sumi_trail::config::{load_config, Config, CrawlRequest, CrawlerConfig, SearchType, UserAgentConfig};
use sumi_trail::crawler::{spawn_crawl, CrawlOutcome, Crawler, HttpFetcher};
use sumi_trail::output::{CrawlEvent, EventSink, RecordLog, RECORD_HEADER};
use sumi_trail::state::{RunStatus, StopReason};
use sumi_trail::TrailError;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a page with a title, a paragraph of body text and one anchor per link
fn html(title: &str, body: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body><p>{}</p>{}</body></html>",
        title, body, anchors
    )
}

/// Mounts a GET route answering with the given HTML
async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Mock site: / -> /page1, /page2; /page1 -> /page3, / ; /page3 -> /page4
async fn mount_site(server: &MockServer) {
    mount_page(server, "/", html("Home", "Welcome", &["/page1", "/page2"])).await;
    mount_page(server, "/page1", html("Page 1", "Content 1", &["/page3", "/"])).await;
    mount_page(server, "/page2", html("Page 2", "Content 2", &[])).await;
    mount_page(server, "/page3", html("Page 3", "Content 3", &["/page4"])).await;
    mount_page(server, "/page4", html("Page 4", "Content 4", &[])).await;
}

fn test_config() -> Config {
    Config {
        crawler: CrawlerConfig {
            fetch_timeout_ms: 2_000,
            ..CrawlerConfig::default()
        },
        ..Config::default()
    }
}

fn crawler_for(config: &Config) -> Arc<Crawler<HttpFetcher>> {
    let fetcher = HttpFetcher::new(config).expect("Failed to build fetcher");
    Arc::new(Crawler::new(fetcher, config.crawler.clone()).with_rng_seed(1))
}

/// Runs a request to completion, collecting every event
async fn crawl(
    config: &Config,
    request: CrawlRequest,
) -> (Result<CrawlOutcome, TrailError>, Vec<CrawlEvent>) {
    let mut handle = spawn_crawl(crawler_for(config), request);
    let mut events = Vec::new();
    while let Some(event) = handle.next_event().await {
        events.push(event);
    }
    (handle.join().await, events)
}

fn urls(outcome: &CrawlOutcome) -> Vec<String> {
    outcome.pages.iter().map(|p| p.url.clone()).collect()
}

#[tokio::test]
async fn test_breadth_crawl_mock_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_site(&mock_server).await;

    let config = test_config();
    let request = CrawlRequest::new(format!("{}/", base_url), SearchType::Breadth, 1, &config.crawler);
    let (result, events) = crawl(&config, request).await;
    let outcome = result.expect("Crawl failed");

    assert_eq!(outcome.status, RunStatus::Completed);
    assert_eq!(outcome.reason, StopReason::LimitReached);
    assert_eq!(outcome.pages.len(), 3);
    assert_eq!(outcome.pages[0].url, format!("{}/", base_url));
    assert_eq!(outcome.pages[0].title, "Home");

    let found = urls(&outcome);
    assert!(found.contains(&format!("{}/page1", base_url)));
    assert!(found.contains(&format!("{}/page2", base_url)));
    assert!(outcome.pages[1..].iter().all(|p| p.depth == 1));

    // Three page events then the completion
    assert_eq!(events.len(), 4);
    assert_eq!(
        events.last(),
        Some(&CrawlEvent::Complete {
            reason: StopReason::LimitReached,
            pages_visited: 3
        })
    );
}

#[tokio::test]
async fn test_breadth_crawl_exhausts_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_site(&mock_server).await;

    let config = test_config();
    let request = CrawlRequest::new(format!("{}/", base_url), SearchType::Breadth, 3, &config.crawler);
    let (result, _) = crawl(&config, request).await;
    let outcome = result.expect("Crawl failed");

    assert_eq!(outcome.reason, StopReason::Exhausted);
    assert_eq!(outcome.pages.len(), 5);

    let page4 = outcome
        .pages
        .iter()
        .find(|p| p.url == format!("{}/page4", base_url))
        .expect("page4 not visited");
    assert_eq!(page4.depth, 3);
    assert_eq!(page4.referrer_url, Some(format!("{}/page3", base_url)));
}

#[tokio::test]
async fn test_depth_crawl_follows_chain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_page(&mock_server, "/", html("Start", "start", &["/a"])).await;
    mount_page(&mock_server, "/a", html("A", "a", &["/b"])).await;
    mount_page(&mock_server, "/b", html("B", "b", &["/"])).await;

    let config = test_config();
    let request = CrawlRequest::new(format!("{}/", base_url), SearchType::Depth, 10, &config.crawler);
    let (result, _) = crawl(&config, request).await;
    let outcome = result.expect("Crawl failed");

    assert_eq!(
        urls(&outcome),
        vec![
            format!("{}/", base_url),
            format!("{}/a", base_url),
            format!("{}/b", base_url),
        ]
    );
    let depths: Vec<_> = outcome.pages.iter().map(|p| p.depth).collect();
    assert_eq!(depths, vec![0, 1, 2]);
    assert_eq!(outcome.reason, StopReason::Exhausted);
}

#[tokio::test]
async fn test_depth_crawl_backtracks_past_broken_link() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_page(&mock_server, "/", html("Start", "start", &["/broken", "/ok"])).await;
    mount_page(&mock_server, "/ok", html("OK", "ok", &[])).await;

    let config = test_config();
    let request = CrawlRequest::new(format!("{}/", base_url), SearchType::Depth, 5, &config.crawler);
    let (result, _) = crawl(&config, request).await;
    let outcome = result.expect("Crawl failed");

    assert_eq!(outcome.pages.len(), 2);
    assert!(!urls(&outcome).contains(&format!("{}/broken", base_url)));
    assert_eq!(outcome.status, RunStatus::Completed);
}

#[tokio::test]
async fn test_keyword_stops_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_page(&mock_server, "/", html("Home", "Welcome", &["/page1"])).await;
    mount_page(&mock_server, "/page1", html("Page 1", "a Needle in here", &["/page2"])).await;
    mount_page(&mock_server, "/page2", html("Page 2", "never reached", &[])).await;

    let config = test_config();
    let request = CrawlRequest::new(format!("{}/", base_url), SearchType::Breadth, 3, &config.crawler)
        .with_keyword(Some("needle"));
    let (result, _) = crawl(&config, request).await;
    let outcome = result.expect("Crawl failed");

    assert_eq!(outcome.reason, StopReason::KeywordFound);
    assert_eq!(outcome.pages.len(), 2);
    assert!(outcome.pages[1].keyword_matched);
    assert!(!outcome.pages[0].keyword_matched);
}

#[tokio::test]
async fn test_seed_not_found_fails_run() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let config = test_config();
    let request = CrawlRequest::new(format!("{}/", base_url), SearchType::Breadth, 2, &config.crawler);
    let (result, events) = crawl(&config, request).await;
    let outcome = result.expect("Crawl should resolve, not error");

    assert_eq!(outcome.status, RunStatus::Failed);
    assert!(outcome.pages.is_empty());
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn test_invalid_seed_is_rejected() {
    let config = test_config();
    let request = CrawlRequest::new("not a url", SearchType::Breadth, 2, &config.crawler);
    let (result, events) = crawl(&config, request).await;

    assert!(matches!(result, Err(TrailError::InvalidSeed { .. })));
    assert_eq!(
        events,
        vec![CrawlEvent::Complete {
            reason: StopReason::InvalidSeed,
            pages_visited: 0
        }]
    );
}

#[tokio::test]
async fn test_max_pages_reached() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_site(&mock_server).await;

    let config = test_config();
    let request = CrawlRequest::new(format!("{}/", base_url), SearchType::Breadth, 3, &config.crawler)
        .with_max_total_pages(2);
    let (result, _) = crawl(&config, request).await;
    let outcome = result.expect("Crawl failed");

    assert_eq!(outcome.reason, StopReason::MaxPagesReached);
    assert_eq!(outcome.pages.len(), 2);
}

#[tokio::test]
async fn test_user_agent_from_pool() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "TrailTest/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html("Home", "hi", &[])))
        .mount(&mock_server)
        .await;

    let config = Config {
        user_agent: UserAgentConfig {
            pool: vec!["TrailTest/1.0".to_string()],
        },
        ..test_config()
    };
    let request = CrawlRequest::new(format!("{}/", base_url), SearchType::Breadth, 0, &config.crawler);
    let (result, _) = crawl(&config, request).await;
    let outcome = result.expect("Crawl failed");

    assert_eq!(outcome.pages.len(), 1);
    assert_eq!(outcome.status, RunStatus::Completed);
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_page(&mock_server, "/", html("Home", "hi", &["/slow", "/fast"])).await;
    mount_page(&mock_server, "/fast", html("Fast", "fast", &[])).await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html("Slow", "slow", &[]))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let config = Config {
        crawler: CrawlerConfig {
            fetch_timeout_ms: 300,
            ..CrawlerConfig::default()
        },
        ..Config::default()
    };
    let request = CrawlRequest::new(format!("{}/", base_url), SearchType::Breadth, 1, &config.crawler);

    let started = Instant::now();
    let (result, _) = crawl(&config, request).await;
    let outcome = result.expect("Crawl failed");

    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(outcome.pages.len(), 2);
    assert!(!urls(&outcome).contains(&format!("{}/slow", base_url)));
    assert_eq!(outcome.reason, StopReason::Exhausted);
}

#[tokio::test]
async fn test_cancel_aborts_in_flight_fetches() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_page(&mock_server, "/", html("Home", "hi", &["/stuck1", "/stuck2"])).await;

    Mock::given(method("GET"))
        .and(path("/stuck1"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/stuck2"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&mock_server)
        .await;

    let config = Config {
        crawler: CrawlerConfig {
            fetch_timeout_ms: 30_000,
            ..CrawlerConfig::default()
        },
        ..Config::default()
    };
    let request = CrawlRequest::new(format!("{}/", base_url), SearchType::Breadth, 2, &config.crawler);
    let mut handle = spawn_crawl(crawler_for(&config), request);

    let first = handle.next_event().await.expect("Expected a first event");
    assert!(matches!(first, CrawlEvent::PageVisited(_)));

    let started = Instant::now();
    handle.cancel();

    let mut rest = Vec::new();
    while let Some(event) = handle.next_event().await {
        rest.push(event);
    }
    let outcome = handle.join().await.expect("Crawl failed");

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(
        rest,
        vec![CrawlEvent::Complete {
            reason: StopReason::Cancelled,
            pages_visited: 1
        }]
    );
    assert_eq!(outcome.status, RunStatus::Stopped);
    assert_eq!(outcome.pages.len(), 1);
}

#[tokio::test]
async fn test_record_log_written_for_run() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_site(&mock_server).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let (mut log, log_path) =
        RecordLog::create(dir.path(), chrono::Utc::now()).expect("Failed to create record log");

    let config = test_config();
    let request = CrawlRequest::new(format!("{}/", base_url), SearchType::Breadth, 1, &config.crawler);
    let mut handle = spawn_crawl(crawler_for(&config), request);
    while let Some(event) = handle.next_event().await {
        log.handle(&event).expect("Failed to write record");
    }
    let outcome = handle.join().await.expect("Crawl failed");

    let content = std::fs::read_to_string(&log_path).expect("Failed to read record log");
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines[0], RECORD_HEADER);
    assert_eq!(lines.len(), outcome.pages.len() + 1);
    assert!(lines[1].contains(&format!("||Home||{}/||false||0", base_url)));
}

#[tokio::test]
async fn test_config_file_limits_run() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_site(&mock_server).await;

    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    writeln!(
        file,
        r#"
[crawler]
max-breadth-limit = 2
max-total-pages = 3
max-in-flight = 1

[user-agent]
pool = ["ConfigBot/2.0"]
"#
    )
    .expect("Failed to write config");

    let config = load_config(file.path()).expect("Failed to load config");
    assert_eq!(config.crawler.max_total_pages, 3);

    let over_ceiling = CrawlRequest::new(format!("{}/", base_url), SearchType::Breadth, 3, &config.crawler);
    let (result, _) = crawl(&config, over_ceiling).await;
    assert!(matches!(result, Err(TrailError::Config(_))));

    let request = CrawlRequest::new(format!("{}/", base_url), SearchType::Breadth, 2, &config.crawler);
    let (result, _) = crawl(&config, request).await;
    let outcome = result.expect("Crawl failed");
    assert_eq!(outcome.reason, StopReason::MaxPagesReached);
    assert_eq!(outcome.pages.len(), 3);
}
