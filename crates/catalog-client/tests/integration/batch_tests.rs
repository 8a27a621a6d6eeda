use std::time::Duration;

use catalog_client::MarkupExtractor;
use catalog_core::progress::CountingReporter;
use catalog_core::{BatchConfig, BatchOutcome, BatchReport, BatchService, FailureKind, RetryingFetcher};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::integration::common::{fast_retry, fetcher_with_timeout, product_page};

fn config_for(server: &MockServer) -> BatchConfig {
    BatchConfig {
        url_template: format!("{}/tr/tr/product/{{code}}", server.uri()),
        concurrency: 4,
        stagger: Duration::from_millis(10),
    }
}

#[tokio::test]
async fn good_page_and_missing_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tr/tr/product/A9F74225"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page("A9F74225", &["1P", "2P"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tr/tr/product/INVALID000"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = RetryingFetcher::new(fetcher_with_timeout(Duration::from_secs(5)), fast_retry());
    let svc = BatchService::new(fetcher, MarkupExtractor::new().unwrap(), config_for(&server));
    let reporter = CountingReporter::new();
    let codes = vec!["A9F74225".to_string(), "INVALID000".to_string()];

    let outcomes = svc.run(&codes, &reporter).await;

    assert_eq!(outcomes.len(), 2);
    assert_eq!(reporter.completed(), 2);
    match &outcomes[0] {
        BatchOutcome::Success { code, page } => {
            assert_eq!(code, "A9F74225");
            assert_eq!(page.summary.name, "Product A9F74225");
            assert_eq!(page.summary.stock_code, "A9F74225");
            assert_eq!(page.summary.display_price, "1.234,56 TL");
            assert_eq!(page.summary.joined_categories(), "Home > Breakers");
            assert_eq!(page.characteristics.len(), 2);
            assert!(page.characteristics[0].source_url.ends_with("/tr/tr/product/A9F74225"));
        }
        other => panic!("expected success, got {other:?}"),
    }
    assert!(matches!(
        &outcomes[1],
        BatchOutcome::Skipped { code, kind: FailureKind::HttpError(404), .. } if code == "INVALID000"
    ));

    let report = BatchReport::from_outcomes(outcomes);
    assert_eq!(report.products.len(), 1);
    assert_eq!(report.characteristics.len(), 2);
    assert_eq!(report.skipped_count(), 1);
}

#[tokio::test]
async fn denied_code_does_not_disturb_siblings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tr/tr/product/BLOCKED"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;
    for code in ["P1", "P2", "P3"] {
        Mock::given(method("GET"))
            .and(path(format!("/tr/tr/product/{code}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(product_page(code, &["x"])))
            .mount(&server)
            .await;
    }

    let fetcher = RetryingFetcher::new(fetcher_with_timeout(Duration::from_secs(5)), fast_retry());
    let svc = BatchService::new(fetcher, MarkupExtractor::new().unwrap(), config_for(&server));
    let codes: Vec<String> = ["P1", "BLOCKED", "P2", "P3"].iter().map(|s| s.to_string()).collect();

    let report = BatchReport::from_outcomes(svc.run(&codes, &CountingReporter::new()).await);

    assert_eq!(report.succeeded(), 3);
    assert_eq!(report.characteristics.len(), 3);
    assert_eq!(report.skipped[0].code, "BLOCKED");
    assert_eq!(report.skipped[0].kind, FailureKind::Denied);
}
