use biotools_curator::candidate::Candidate;
use biotools_curator::config::CrawlConfig;
use biotools_curator::crawl::{BoundedHomepageCrawler, HomepageStatus};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html")
        .set_body_string(body.to_string())
}

fn crawler(config: &CrawlConfig) -> BoundedHomepageCrawler {
    BoundedHomepageCrawler::from_config(config).unwrap()
}

fn candidate(homepage: &str) -> Candidate {
    Candidate {
        id: "tool".into(),
        title: "Tool".into(),
        homepage: Some(homepage.to_string()),
        ..Candidate::default()
    }
}

#[tokio::test]
async fn frames_contribute_documentation_and_repositories() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><body><p>Genome assembly toolkit.</p>
               <iframe src="/frame.html"></iframe></body></html>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/frame.html"))
        .respond_with(html(
            r#"<html><body>
               <a href="/docs/tutorial.html">Tutorial</a>
               <a href="https://github.com/lab/tool/blob/main/README.md">Code</a>
               </body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let mut candidate = candidate(&format!("{}/", server.uri()));
    let bundle = crawler(&CrawlConfig::default()).crawl(&mut candidate).await;

    assert_eq!(bundle.homepage_status, HomepageStatus::Ok);
    assert!(bundle.homepage_scraped);
    assert_eq!(bundle.metrics.frames_fetched, 1);
    assert_eq!(bundle.metrics.fetch_attempts, 2);
    let docs = format!("{}/docs/tutorial.html", server.uri());
    assert!(bundle.documentation_urls.contains(&docs));
    assert!(bundle.repository_urls.contains("https://github.com/lab/tool"));
    assert!(candidate.documentation.contains(&docs));
    assert!(candidate.repository.iter().any(|r| r == "https://github.com/lab/tool"));
}

#[tokio::test]
async fn frame_budget_caps_network_fetches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<iframe src="/a.html"></iframe><iframe src="/b.html"></iframe>
               <iframe src="/c.html"></iframe>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a.html"))
        .respond_with(html("<p>a</p>"))
        .mount(&server)
        .await;

    let config = CrawlConfig {
        max_frame_fetches: 1,
        ..CrawlConfig::default()
    };
    let mut candidate = candidate(&format!("{}/", server.uri()));
    let bundle = crawler(&config).crawl(&mut candidate).await;

    assert_eq!(bundle.metrics.frames_fetched, 1);
    assert_eq!(bundle.metrics.frames_skipped_budget, 2);
    assert_eq!(bundle.metrics.fetch_attempts, 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn zero_depth_disables_frame_crawling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<iframe src="/a.html"></iframe>"#))
        .mount(&server)
        .await;

    let config = CrawlConfig {
        max_frame_depth: 0,
        ..CrawlConfig::default()
    };
    let mut candidate = candidate(&format!("{}/", server.uri()));
    let bundle = crawler(&config).crawl(&mut candidate).await;

    assert_eq!(bundle.metrics.frames_fetched, 0);
    assert_eq!(bundle.metrics.frames_skipped_depth, 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn publication_homepage_is_replaced_before_fetching() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tool"))
        .respond_with(html("<p>Protein structure viewer</p>"))
        .mount(&server)
        .await;

    let tool_page = format!("{}/tool", server.uri());
    let mut candidate = Candidate {
        urls: vec![tool_page.clone()],
        ..candidate("https://doi.org/10.1093/nar/gkz001")
    };
    let bundle = crawler(&CrawlConfig::default()).crawl(&mut candidate).await;

    assert_eq!(bundle.homepage_status, HomepageStatus::Ok);
    assert!(bundle.homepage_substituted);
    assert_eq!(bundle.homepage_url.as_deref(), Some(tool_page.as_str()));
    assert_eq!(candidate.homepage.as_deref(), Some(tool_page.as_str()));
}

#[tokio::test]
async fn homepage_http_error_is_recorded_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut candidate = candidate(&format!("{}/", server.uri()));
    let bundle = crawler(&CrawlConfig::default()).crawl(&mut candidate).await;

    assert_eq!(bundle.homepage_status, HomepageStatus::Error);
    assert_eq!(bundle.homepage_error.as_deref(), Some("HTTP 503"));
    assert_eq!(bundle.http_status, Some(503));
    assert!(!bundle.homepage_scraped);
    assert_eq!(bundle.metrics.errors.len(), 1);
    assert_eq!(bundle.metrics.errors[0].context, "homepage");
    assert!(!bundle.has_usable_homepage());
}
