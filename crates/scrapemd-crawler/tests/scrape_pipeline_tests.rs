use std::sync::Arc;
use std::time::Duration;

use httpmock::{Method::GET, MockServer};
use scrapemd_crawler::{
    CrawlerConfig, FetchOrchestrator, HeadlessBrowser, RenderConfig, ScrapeError, ScrapeRequest, StaticCrawler,
};

fn orchestrator(ignore_robots_txt: bool) -> FetchOrchestrator {
    let browser = Arc::new(HeadlessBrowser::disabled(RenderConfig::default()));
    let crawler = Arc::new(
        StaticCrawler::new(CrawlerConfig {
            delay: Duration::ZERO,
            random_delay: Duration::ZERO,
            request_timeout: Duration::from_secs(5),
            ignore_robots_txt,
            ..CrawlerConfig::default()
        })
        .unwrap(),
    );
    FetchOrchestrator::new(browser, crawler, Duration::from_secs(10))
}

#[tokio::test]
async fn test_static_fallback_end_to_end() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/robots.txt");
            then.status(404);
        })
        .await;
    let page = server
        .mock_async(|when, then| {
            when.method(GET).path("/article");
            then.status(200).header("content-type", "text/html; charset=utf-8").body(concat!(
                "<html><head><title>An Article</title></head><body>",
                "<nav><a href=\"/\">Home</a></nav>",
                "<main><h2>Foo</h2><ol><li>a</li><li>b</li></ol></main>",
                "</body></html>"
            ));
        })
        .await;

    let url = server.url("/article");
    let result = orchestrator(false)
        .scrape(&ScrapeRequest::new(&url, 1).unwrap())
        .await
        .unwrap();

    assert_eq!(result.title, "An Article");
    assert_eq!(result.markdown, "## Foo\n\n1. a\n2. b\n\n");
    assert_eq!(result.links.len(), 1);
    assert_eq!(result.links[0].href, server.url("/"));
    assert_eq!(result.links[0].text, "Home");
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("falling back to static fetch"));
    assert!(result.raw_html.contains("<main>"));
    page.assert_async().await;
}

#[tokio::test]
async fn test_both_strategies_fail() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/down");
            then.status(503);
        })
        .await;

    let url = server.url("/down");
    let err = orchestrator(true)
        .scrape(&ScrapeRequest::new(&url, 1).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::FetchFailed { .. }));
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
#[ignore = "requires network access"]
async fn test_live_example_com() {
    let browser = Arc::new(HeadlessBrowser::launch(RenderConfig::default()).await);
    let crawler = Arc::new(StaticCrawler::new(CrawlerConfig::default()).unwrap());
    let orchestrator = FetchOrchestrator::new(browser.clone(), crawler, Duration::from_secs(30));

    let started = chrono::Utc::now();
    let result = orchestrator
        .scrape(&ScrapeRequest::new("https://example.com", 1).unwrap())
        .await
        .unwrap();

    assert!(!result.title.is_empty());
    assert!(!result.markdown.is_empty());
    assert!(result.fetched_at >= started - chrono::Duration::minutes(1));
    browser.shutdown().await;
}
