//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use linkwalker::config::Config;
use linkwalker::crawler::{crawl, CrawlEngine, TraversalOrder};
use linkwalker::events::{CrawlEvent, EventBus};
use linkwalker::storage::{JsonStorage, Site, Storage};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::broadcast::Receiver;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a deterministic single-worker configuration writing into `dir`
fn create_test_config(seed: String, dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.crawler.seed_urls = vec![seed];
    config.crawler.max_workers = 1;
    config.crawler.traversal_order = TraversalOrder::Document;
    config.crawler.fetch_timeout_ms = 2_000;
    config.crawler.robots_timeout_ms = 1_000;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.output.sites_path = dir.path().join("sites.json").display().to_string();
    config.output.images_path = dir.path().join("images.json").display().to_string();
    config
}

fn open_store(config: &Config) -> Arc<JsonStorage> {
    Arc::new(JsonStorage::open(&config.output.sites_path, &config.output.images_path).unwrap())
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html")
        .set_body_string(body.to_string())
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html_page(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(response)
        .mount(server)
        .await;
}

fn drain(rx: &mut Receiver<CrawlEvent>) -> Vec<CrawlEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_full_crawl_records_sites_and_images() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_robots(
        &mock_server,
        ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"),
    )
    .await;
    mount_page(
        &mock_server,
        "/",
        &format!(
            r#"<html><head><title>Ex</title>
            <meta name="description" content="Example home">
            <link rel="icon" href="/favicon.ico"></head>
            <body><img src="/a.png"><img src="/a.png">
            <a href="{base}/b">b</a><a href="/relative">skipped</a></body></html>"#
        ),
    )
    .await;
    mount_page(&mock_server, "/b", "<html><body><p>No head here</p></body></html>").await;

    let config = create_test_config(format!("{}/", base), &dir);
    let store = open_store(&config);
    let bus = EventBus::new(config.events.capacity);
    let mut rx = bus.subscribe();

    let mut engine = CrawlEngine::new(&config, store.clone(), bus).unwrap();
    let report = engine.run().await.unwrap();

    assert_eq!(report.recorded(), 2);
    assert_eq!(report.failed(), 0);
    assert_eq!(report.images_added, 1);
    assert!(!report.cancelled);
    assert!(engine.frontier().is_claimed(&format!("{}/b", base)));
    assert!(!engine.frontier().is_claimed(&format!("{}/relative", base)));

    let snapshot = store.snapshot().unwrap();
    assert_eq!(snapshot.images, vec![format!("{}/a.png", base)]);

    let home = &snapshot.sites[0];
    assert_eq!(home.url, format!("{}/", base));
    assert_eq!(home.title, "Ex");
    assert_eq!(home.description, "Example home");
    assert_eq!(home.favicon, format!("{}/favicon.ico", base));

    let b = &snapshot.sites[1];
    assert_eq!(b.url, format!("{}/b", base));
    assert_eq!(b.title, "No title");
    assert_eq!(b.description, "No description");
    assert_eq!(b.favicon, "");

    // Persisted to disk, not just held in memory
    let reopened = open_store(&config);
    assert_eq!(reopened.site_count().unwrap(), 2);

    let events = drain(&mut rx);
    let discovered: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            CrawlEvent::SiteDiscovered { site } => Some(site.url.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(discovered, vec![format!("{}/", base), format!("{}/b", base)]);
    assert!(events.contains(&CrawlEvent::log(format!("Crawling: {}/", base))));
}

#[tokio::test]
async fn test_robots_txt_respect() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_robots(
        &mock_server,
        ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"),
    )
    .await;
    mount_page(
        &mock_server,
        "/",
        &format!(r#"<a href="{base}/private/page">p</a><a href="{base}/public">q</a>"#),
    )
    .await;
    mount_page(&mock_server, "/public", "<title>Public</title>").await;
    Mock::given(method("GET"))
        .and(path("/private/page"))
        .respond_with(html_page("<title>Secret</title>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(format!("{}/", base), &dir);
    let store = open_store(&config);
    let mut engine = CrawlEngine::new(&config, store.clone(), EventBus::new(64)).unwrap();
    let report = engine.run().await.unwrap();

    assert_eq!(report.recorded(), 2);
    assert_eq!(report.disallowed(), 1);

    let urls: Vec<String> = store.snapshot().unwrap().sites.into_iter().map(|s| s.url).collect();
    assert!(!urls.contains(&format!("{}/private/page", base)));
}

#[tokio::test]
async fn test_robots_server_error_allows_everything() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_robots(&mock_server, ResponseTemplate::new(500)).await;
    mount_page(&mock_server, "/", "<title>Open</title>").await;

    let config = create_test_config(format!("{}/", base), &dir);
    let report = crawl(&config, EventBus::new(16)).await.unwrap();

    assert_eq!(report.recorded(), 1);
    assert_eq!(report.disallowed(), 0);

    let store = open_store(&config);
    assert_eq!(store.snapshot().unwrap().sites[0].title, "Open");
}

#[tokio::test]
async fn test_fetch_failures_emit_errors_and_crawl_continues() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_robots(&mock_server, ResponseTemplate::new(404)).await;
    mount_page(
        &mock_server,
        "/",
        &format!(
            r#"<a href="{base}/slow">s</a><a href="{base}/missing">m</a><a href="{base}/ok">o</a>"#
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html_page("<title>Slow</title>").set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/ok", "<title>Fine</title>").await;

    let mut config = create_test_config(format!("{}/", base), &dir);
    config.crawler.fetch_timeout_ms = 300;
    let store = open_store(&config);
    let bus = EventBus::new(64);
    let mut rx = bus.subscribe();

    let mut engine = CrawlEngine::new(&config, store.clone(), bus).unwrap();
    let report = engine.run().await.unwrap();

    assert_eq!(report.recorded(), 2);
    assert_eq!(report.failed(), 2);
    assert_eq!(store.site_count().unwrap(), 2);

    let error_urls: Vec<String> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            CrawlEvent::Error { url, .. } => Some(url),
            _ => None,
        })
        .collect();
    assert_eq!(
        error_urls,
        vec![format!("{}/slow", base), format!("{}/missing", base)]
    );
}

#[tokio::test]
async fn test_resume_skips_recorded_urls() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_robots(&mock_server, ResponseTemplate::new(404)).await;
    mount_page(
        &mock_server,
        "/",
        &format!(r#"<title>Home</title><a href="{base}/old">o</a><a href="{base}/new">n</a>"#),
    )
    .await;
    mount_page(&mock_server, "/new", "<title>New</title>").await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(html_page("<title>Old</title>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(format!("{}/", base), &dir);
    {
        let previous = open_store(&config);
        previous
            .record_site(Site::new(
                format!("{}/old", base),
                "Old".to_string(),
                "No description".to_string(),
                String::new(),
            ))
            .unwrap();
    }

    let store = open_store(&config);
    let mut engine = CrawlEngine::new(&config, store.clone(), EventBus::new(64)).unwrap();
    let report = engine.run().await.unwrap();

    assert_eq!(report.recorded(), 2);
    assert_eq!(report.duplicates(), 1);

    let urls: Vec<String> = store.snapshot().unwrap().sites.into_iter().map(|s| s.url).collect();
    assert_eq!(
        urls,
        vec![format!("{}/old", base), format!("{}/", base), format!("{}/new", base)]
    );
}

#[tokio::test]
async fn test_page_limit_stops_crawl() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_robots(&mock_server, ResponseTemplate::new(404)).await;
    mount_page(
        &mock_server,
        "/",
        &format!(r#"<a href="{base}/1">1</a><a href="{base}/2">2</a>"#),
    )
    .await;

    let mut config = create_test_config(format!("{}/", base), &dir);
    config.crawler.max_pages = Some(1);
    let store = open_store(&config);

    let mut engine = CrawlEngine::new(&config, store.clone(), EventBus::new(64)).unwrap();
    let report = engine.run().await.unwrap();

    assert!(report.cancelled);
    assert_eq!(report.recorded(), 1);
    assert_eq!(store.site_count().unwrap(), 1);
    assert_eq!(engine.frontier().pending_len(), 2);
}

#[tokio::test]
async fn test_cancel_during_robots_lookup_skips_page_fetch() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_robots(
        &mock_server,
        ResponseTemplate::new(200)
            .set_body_string("User-agent: *\nAllow: /")
            .set_delay(Duration::from_millis(800)),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("<title>Too late</title>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(format!("{}/", base), &dir);
    let store = open_store(&config);
    let mut engine = CrawlEngine::new(&config, store.clone(), EventBus::new(64)).unwrap();

    let token = engine.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
    });

    let report = engine.run().await.unwrap();

    assert!(report.cancelled);
    assert_eq!(report.recorded(), 0);
    assert_eq!(report.failed(), 0);
    assert_eq!(report.interrupted, 1);
    assert_eq!(store.site_count().unwrap(), 0);
    assert_eq!(engine.frontier().pending_len(), 1);
    assert_eq!(engine.frontier().next_pending(), Some(format!("{}/", base)));
}

#[tokio::test]
async fn test_many_workers_claim_each_url_once() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_robots(&mock_server, ResponseTemplate::new(404)).await;

    // Every page links to every other page
    let links: String = (0..12)
        .map(|i| format!(r#"<a href="{base}/p{i}">{i}</a>"#))
        .collect();
    mount_page(&mock_server, "/", &links).await;
    for i in 0..12 {
        mount_page(&mock_server, &format!("/p{}", i), &links).await;
    }

    let mut config = create_test_config(format!("{}/", base), &dir);
    config.crawler.max_workers = 6;
    config.crawler.traversal_order = TraversalOrder::Shuffle;
    let store = open_store(&config);

    let mut engine = CrawlEngine::new(&config, store.clone(), EventBus::new(1024)).unwrap();
    let report = engine.run().await.unwrap();

    assert_eq!(report.recorded(), 13);
    assert_eq!(store.site_count().unwrap(), 13);
    assert_eq!(engine.frontier().claimed_len(), 13);
}
