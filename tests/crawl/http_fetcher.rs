use biotools_curator::config::CrawlConfig;
use biotools_curator::crawl::{FetchLimits, FetchOutcome, Fetcher, HttpFetcher};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> HttpFetcher {
    HttpFetcher::new(&CrawlConfig::default()).unwrap()
}

fn limits(max_bytes: usize) -> FetchLimits {
    FetchLimits {
        timeout: Duration::from_secs(5),
        max_bytes,
    }
}

#[tokio::test]
async fn html_body_is_returned_with_final_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string("<html><body>hello</body></html>"),
        )
        .mount(&server)
        .await;

    let outcome = fetcher().fetch(&format!("{}/", server.uri()), limits(10_000)).await;
    let FetchOutcome::Html {
        final_url,
        status,
        body,
        ..
    } = outcome
    else {
        panic!("expected html, got {outcome:?}");
    };
    assert_eq!(status, 200);
    assert_eq!(final_url, format!("{}/", server.uri()));
    assert!(body.contains("hello"));
}

#[tokio::test]
async fn non_html_content_is_refused() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/paper.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(vec![0_u8; 64]),
        )
        .mount(&server)
        .await;

    let outcome = fetcher()
        .fetch(&format!("{}/paper.pdf", server.uri()), limits(10_000))
        .await;
    assert_eq!(outcome.label(), "non_html");
    assert!(outcome.message().contains("application/pdf"));
}

#[tokio::test]
async fn body_over_the_ceiling_is_too_large() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/big"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("x".repeat(50_000)),
        )
        .mount(&server)
        .await;

    let outcome = fetcher()
        .fetch(&format!("{}/big", server.uri()), limits(1_000))
        .await;
    assert_eq!(outcome.label(), "too_large");
    assert_eq!(outcome.status(), Some(200));
}

#[tokio::test]
async fn body_at_the_ceiling_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/exact"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("y".repeat(1_000)),
        )
        .mount(&server)
        .await;

    let outcome = fetcher()
        .fetch(&format!("{}/exact", server.uri()), limits(1_000))
        .await;
    assert_eq!(outcome.label(), "ok");
}

#[tokio::test]
async fn http_errors_keep_the_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let outcome = fetcher()
        .fetch(&format!("{}/missing", server.uri()), limits(1_000))
        .await;
    assert_eq!(outcome, FetchOutcome::HttpStatus { status: 404 });
    assert_eq!(outcome.message(), "HTTP 404");
}

#[tokio::test]
async fn slow_responses_time_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("late")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let short = FetchLimits {
        timeout: Duration::from_millis(200),
        max_bytes: 1_000,
    };
    let outcome = fetcher().fetch(&server.uri(), short).await;
    assert_eq!(outcome.label(), "timeout");
}

#[tokio::test]
async fn unreachable_hosts_are_connection_errors() {
    // Nothing listens on the discard port.
    let outcome = fetcher().fetch("http://127.0.0.1:9/", limits(1_000)).await;
    assert_eq!(outcome.label(), "connection_error");
    assert_eq!(outcome.status(), None);
}
