use std::time::Duration;

use catalog_client::fetcher::DEFAULT_USER_AGENT;
use catalog_core::{AppError, Fetcher, RetryingFetcher};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::integration::common::{fast_retry, fetcher_with_timeout};

#[tokio::test]
async fn sends_browser_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tr/tr/product/A9F74225"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher_with_timeout(Duration::from_secs(5));
    let body = fetcher
        .fetch(&format!("{}/tr/tr/product/A9F74225", server.uri()))
        .await
        .unwrap();

    assert_eq!(body, "<html>ok</html>");

    let requests = server.received_requests().await.unwrap();
    let user_agent = requests[0]
        .headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert_eq!(user_agent, DEFAULT_USER_AGENT);
}

#[tokio::test]
async fn forbidden_is_denied_after_one_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = RetryingFetcher::new(fetcher_with_timeout(Duration::from_secs(5)), fast_retry());
    let err = fetcher
        .fetch(&format!("{}/tr/tr/product/X", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::AccessDenied(_)));
}

#[tokio::test]
async fn other_statuses_are_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = RetryingFetcher::new(fetcher_with_timeout(Duration::from_secs(5)), fast_retry());

    let err = fetcher
        .fetch(&format!("{}/missing", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::HttpError { status: 404, .. }));

    let err = fetcher
        .fetch(&format!("{}/broken", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::HttpError { status: 503, .. }));
}

#[tokio::test]
async fn timeouts_are_retried_up_to_the_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html>too late</html>")
                .set_delay(Duration::from_secs(2)),
        )
        .expect(3)
        .mount(&server)
        .await;

    let fetcher =
        RetryingFetcher::new(fetcher_with_timeout(Duration::from_millis(200)), fast_retry());
    let err = fetcher
        .fetch(&format!("{}/slow", server.uri()))
        .await
        .unwrap_err();

    assert!(
        matches!(err, AppError::Timeout(d) if d == Duration::from_millis(200)),
        "unexpected error: {err}"
    );
    assert_eq!(err.to_string(), "Request timed out after 200ms");
}
