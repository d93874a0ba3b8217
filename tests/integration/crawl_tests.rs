//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end over plain HTTP.

use feedcast_crawler::config::{CrawlConfig, EngineConfig, Scheme};
use feedcast_crawler::crawler::Rejection;
use feedcast_crawler::output::CrawlStatistics;
use feedcast_crawler::{ConfigError, CrawlError, CrawlPhase, Crawler, PageRecord};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An HTML page with the given title and body markup
fn page(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            title, body
        ),
        "text/html; charset=utf-8",
    )
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Domain of the mock server, e.g. `127.0.0.1:54321`
fn domain(server: &MockServer) -> String {
    format!("127.0.0.1:{}", server.address().port())
}

fn url(server: &MockServer, route: &str) -> String {
    format!("http://{}{}", domain(server), route)
}

fn test_config(server: &MockServer) -> CrawlConfig {
    CrawlConfig {
        domain: domain(server),
        scheme: Scheme::Http,
        max_pages: 10,
        max_duration: 30,
        max_depth: 1,
        ..CrawlConfig::default()
    }
}

fn test_engine() -> EngineConfig {
    EngineConfig {
        politeness_delay_ms: 5,
        request_timeout_secs: 5,
        ..EngineConfig::default()
    }
}

/// Runs a crawl to completion
async fn run(config: CrawlConfig) -> (Vec<PageRecord>, CrawlStatistics) {
    let mut stream = Crawler::new(config)
        .with_engine_config(test_engine())
        .run()
        .await
        .expect("crawl should start");

    let mut records = Vec::new();
    while let Some(record) = stream.next().await {
        records.push(record);
    }

    (records, stream.statistics())
}

fn sorted_urls(records: &[PageRecord]) -> Vec<String> {
    let mut urls: Vec<_> = records.iter().map(|record| record.url.clone()).collect();
    urls.sort();
    urls
}

#[tokio::test]
async fn test_three_page_fixture() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/",
        page(
            "Home",
            r#"<h1>Home</h1><p>Welcome home</p><a href="/a">A</a> <a href="/b">B</a>"#,
        ),
    )
    .await;
    mount(
        &server,
        "/a",
        page("Page A", r#"<p>This is A</p><a href="/">Home</a><a href="/c">C</a>"#),
    )
    .await;
    mount(&server, "/b", page("Page B", "<p>This is B</p>")).await;

    // Beyond the depth budget: never fetched
    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(page("Page C", "<p>This is C</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let (records, stats) = run(test_config(&server)).await;

    assert_eq!(
        sorted_urls(&records),
        vec![url(&server, "/"), url(&server, "/a"), url(&server, "/b")]
    );
    for record in &records {
        assert!(!record.title.is_empty(), "{} has no title", record.url);
        assert!(!record.body.trim().is_empty(), "{} has no body", record.url);
    }

    let home = records
        .iter()
        .find(|record| record.url == url(&server, "/"))
        .unwrap();
    assert_eq!(home.title, "Home");
    assert!(home.body.contains("Welcome home"));
    assert!(!home.body.contains("<h1>"));

    assert_eq!(stats.phase, CrawlPhase::Closed);
    assert_eq!(stats.records_emitted, 3);
    assert_eq!(stats.beyond_depth, 1);
    assert_eq!(stats.rejected.get(&Rejection::Duplicate), Some(&1));
    assert!(stats.finished_at.is_some());
}

#[tokio::test]
async fn test_invalid_domain_rejected() {
    let config = CrawlConfig::for_domain("lorem ipsum blabla");
    let err = Crawler::new(config).run().await.unwrap_err();

    assert!(matches!(
        err,
        CrawlError::Config(ConfigError::InvalidDomain(_))
    ));
}

#[tokio::test]
async fn test_preflight_error_status_rejected() {
    let server = MockServer::start().await;
    mount(&server, "/", ResponseTemplate::new(500)).await;

    let err = Crawler::new(test_config(&server))
        .with_engine_config(test_engine())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CrawlError::Config(ConfigError::HttpStatus { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_domain_normalized_before_crawl() {
    let server = MockServer::start().await;
    mount(&server, "/", page("Home", "<p>Hello</p>")).await;

    let config = CrawlConfig {
        domain: format!("http://{}/some/path?q=1", domain(&server)),
        ..test_config(&server)
    };
    let (records, stats) = run(config).await;

    assert_eq!(sorted_urls(&records), vec![url(&server, "/")]);
    assert_eq!(stats.domain, domain(&server));
}

#[tokio::test]
async fn test_page_budget_enforced() {
    let server = MockServer::start().await;

    let links: String = (1..=9)
        .map(|i| format!(r#"<a href="/p{}">{}</a>"#, i, i))
        .collect();
    mount(&server, "/", page("Home", &format!("<p>Index</p>{}", links))).await;
    for i in 1..=9 {
        mount(
            &server,
            &format!("/p{}", i),
            page(&format!("P{}", i), &format!("<p>Page {}</p>", i)),
        )
        .await;
    }

    let config = CrawlConfig {
        max_pages: 3,
        ..test_config(&server)
    };
    let (records, stats) = run(config).await;

    assert_eq!(records.len(), 3);
    assert_eq!(stats.pages_reserved, 3);
    assert_eq!(stats.rejected.get(&Rejection::PageBudget), Some(&7));
    assert_eq!(server.received_requests().await.unwrap().len(), 1 + 3);
}

#[tokio::test]
async fn test_no_duplicate_visits_under_concurrent_discovery() {
    let server = MockServer::start().await;

    let all_links = r#"<a href="/a">a</a><a href="/b">b</a><a href="/c">c</a>
        <a href="/d">d</a><a href="/shared">shared</a><a href="/shared#frag">again</a>
        <a href="/shared?utm=1">tracked</a>"#;

    mount(&server, "/", page("Home", &format!("<p>Root</p>{}", all_links))).await;
    for route in ["/a", "/b", "/c", "/d"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(page(route, &format!("<p>{}</p>{}", route, all_links)))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/shared"))
        .respond_with(page("Shared", "<p>Shared</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let config = CrawlConfig {
        max_depth: 3,
        ..test_config(&server)
    };
    let (records, stats) = run(config).await;

    let urls = sorted_urls(&records);
    let mut deduped = urls.clone();
    deduped.dedup();
    assert_eq!(urls, deduped);
    assert_eq!(urls.len(), 6);
    assert_eq!(stats.pages_reserved, 6);
}

#[tokio::test]
async fn test_empty_body_not_emitted() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/",
        page("Home", r#"<p>Content</p><a href="/chrome">chrome</a>"#),
    )
    .await;
    mount(
        &server,
        "/chrome",
        page("Chrome only", r#"<header>Logo</header><footer>Links</footer>"#),
    )
    .await;

    let (records, stats) = run(test_config(&server)).await;

    assert_eq!(sorted_urls(&records), vec![url(&server, "/")]);
    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(stats.records_without_body, 1);
}

#[tokio::test]
async fn test_link_filters() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/",
        page(
            "Home",
            &format!(
                r#"<header><a href="/from-header">h</a></header>
                <p>Home page</p>
                <a href="/followed">ok</a>
                <a href="/private" rel="nofollow">no</a>
                <a href="javascript:void(0)">js</a>
                <a href="mailto:team@example.com">mail</a>
                <a href="https://other.example.org/x">external</a>
                <a href="{}">absolute</a>
                <footer><a href="/from-footer">f</a></footer>"#,
                url(&server, "/absolute")
            ),
        ),
    )
    .await;
    for route in ["/from-header", "/followed", "/private", "/absolute", "/from-footer"] {
        mount(&server, route, page(route, &format!("<p>{}</p>", route))).await;
    }

    let (records, stats) = run(test_config(&server)).await;

    assert_eq!(
        sorted_urls(&records),
        vec![
            url(&server, "/"),
            url(&server, "/absolute"),
            url(&server, "/followed"),
        ]
    );
    assert_eq!(stats.rejected.get(&Rejection::NoFollow), Some(&1));
    assert_eq!(stats.rejected.get(&Rejection::PseudoUrl), Some(&2));
    assert_eq!(stats.rejected.get(&Rejection::HeaderFooter), Some(&2));
    assert_eq!(stats.rejected.get(&Rejection::OutOfScope), Some(&1));
}

#[tokio::test]
async fn test_header_footer_links_followed_when_opted_in() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/",
        page(
            "Home",
            r#"<header><a href="/from-header">h</a></header><p>Home</p>
            <footer><a href="/from-footer">f</a></footer>"#,
        ),
    )
    .await;
    mount(&server, "/from-header", page("H", "<p>Header target</p>")).await;
    mount(&server, "/from-footer", page("F", "<p>Footer target</p>")).await;

    let config = CrawlConfig {
        keep_header_footer_links: true,
        ..test_config(&server)
    };
    let (records, _) = run(config).await;

    assert_eq!(
        sorted_urls(&records),
        vec![
            url(&server, "/"),
            url(&server, "/from-footer"),
            url(&server, "/from-header"),
        ]
    );
}

#[tokio::test]
async fn test_meta_fields_extracted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><head>
                <title>Feed &amp; News</title>
                <meta name="description" content="Daily headlines">
                <meta name="keywords" content="news, daily">
            </head><body><p>Top&nbsp;story</p><script>track()</script></body></html>"#,
            "text/html",
        ))
        .mount(&server)
        .await;

    let (records, _) = run(test_config(&server)).await;

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.title, "Feed &amp; News");
    assert_eq!(record.description, "Daily headlines");
    assert_eq!(record.keywords, "news, daily");
    assert!(record.body.contains("Top\u{a0}story"));
    assert!(!record.body.contains("track"));
}

#[tokio::test]
async fn test_non_html_and_missing_pages_skipped() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/",
        page(
            "Home",
            r#"<p>Home</p><a href="/feed.xml">feed</a><a href="/gone">gone</a>"#,
        ),
    )
    .await;
    mount(
        &server,
        "/feed.xml",
        ResponseTemplate::new(200).set_body_raw("<rss></rss>", "application/rss+xml"),
    )
    .await;

    let (records, stats) = run(test_config(&server)).await;

    assert_eq!(sorted_urls(&records), vec![url(&server, "/")]);
    assert_eq!(stats.fetch_failures, 2);
    assert_eq!(stats.pages_reserved, 3);
}

#[tokio::test]
async fn test_no_admission_after_deadline() {
    let server = MockServer::start().await;
    let slow = Duration::from_millis(700);

    mount(
        &server,
        "/",
        page("Home", r#"<p>Home</p><a href="/a">a</a>"#).set_delay(slow),
    )
    .await;
    mount(
        &server,
        "/a",
        page("A", r#"<p>A</p><a href="/b">b</a>"#).set_delay(slow),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(page("B", "<p>B</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let config = CrawlConfig {
        max_duration: 1,
        max_depth: 4,
        ..test_config(&server)
    };
    let (records, stats) = run(config).await;

    assert_eq!(
        sorted_urls(&records),
        vec![url(&server, "/"), url(&server, "/a")]
    );
    assert_eq!(stats.rejected.get(&Rejection::Deadline), Some(&1));
}

#[tokio::test]
async fn test_stream_is_consumer_paced() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/",
        page("Home", r#"<p>Home</p><a href="/a">a</a><a href="/b">b</a>"#),
    )
    .await;
    mount(&server, "/a", page("A", "<p>A</p>")).await;
    mount(&server, "/b", page("B", "<p>B</p>")).await;

    let mut stream = Crawler::new(test_config(&server))
        .with_engine_config(test_engine())
        .run()
        .await
        .unwrap();

    // Nobody reads for a while: one record is buffered and the other page
    // tasks wait on the hand-off, so the crawl cannot drain
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(stream.phase(), CrawlPhase::Running);
    assert_eq!(stream.statistics().pages_fetched, 3);

    let mut count = 0;
    while stream.next().await.is_some() {
        count += 1;
    }
    assert_eq!(count, 3);
    assert_eq!(stream.phase(), CrawlPhase::Closed);
}

#[tokio::test]
async fn test_http_endpoint_returns_urls_and_pages() {
    let site = MockServer::start().await;
    mount(
        &site,
        "/",
        page("Home", r#"<p>Home</p><a href="/a">a</a>"#),
    )
    .await;
    mount(&site, "/a", page("A", "<p>A</p>")).await;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let api = format!("http://{}/crawl", listener.local_addr().unwrap());
    tokio::spawn(feedcast_crawler::server::serve(listener, test_engine()));

    let client = reqwest::Client::new();

    let urls: Vec<String> = client
        .post(&api)
        .body(format!(
            r#"{{"domain": "{}", "scheme": "http", "max_depth": 1}}"#,
            domain(&site)
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let mut urls = urls;
    urls.sort();
    assert_eq!(urls, vec![url(&site, "/"), url(&site, "/a")]);

    let response = client
        .post(&api)
        .body(format!(
            r#"{{"domain": "{}", "scheme": "http", "with_page_content": true}}"#,
            domain(&site)
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let pages: Vec<PageRecord> = response.json().await.unwrap();
    assert_eq!(pages.len(), 2);
    assert!(pages.iter().all(|page| !page.title.is_empty()));
}
