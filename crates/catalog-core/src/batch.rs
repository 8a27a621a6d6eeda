use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use futures::stream::{self, StreamExt};
use url::Url;

use crate::error::AppError;
use crate::models::{BatchOutcome, ProductPage};
use crate::progress::{BatchEvent, ProgressReporter};
use crate::traits::{Fetcher, PageExtractor};

/// Placeholder replaced by the product code in [`BatchConfig::url_template`].
pub const CODE_PLACEHOLDER: &str = "{code}";

/// Product page URL of the Turkish Schneider Electric catalog.
pub const DEFAULT_URL_TEMPLATE: &str = "https://www.se.com/tr/tr/product/{code}";

/// Configuration for the batch orchestrator.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Product page URL with a `{code}` placeholder.
    pub url_template: String,

    /// Maximum number of units of work in flight.
    pub concurrency: usize,

    /// Pause between starting two successive units.
    pub stagger: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            concurrency: 16,
            stagger: Duration::from_millis(100),
        }
    }
}

impl BatchConfig {
    /// Canonical request URL for a product code.
    pub fn product_url(&self, code: &str) -> String {
        self.url_template.replace(CODE_PLACEHOLDER, code)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !self.url_template.contains(CODE_PLACEHOLDER) {
            return Err(AppError::ConfigError(format!(
                "URL template '{}' has no {CODE_PLACEHOLDER} placeholder",
                self.url_template
            )));
        }

        let sample = self.product_url("SAMPLE");
        let parsed = Url::parse(&sample)
            .map_err(|e| AppError::ConfigError(format!("Invalid URL template: {e}")))?;
        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(AppError::ConfigError(format!(
                    "URL scheme '{scheme}' is not allowed (only http/https)"
                )));
            }
        }
        if parsed.host_str().is_none() {
            return Err(AppError::ConfigError("URL template has no host".to_string()));
        }

        if self.concurrency == 0 {
            return Err(AppError::ConfigError(
                "concurrency must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Fans out one fetch+extract unit of work per product code.
///
/// Generic over the fetcher and extractor, so tests run without real HTTP.
/// A failing unit becomes a [`BatchOutcome::Skipped`] and never affects
/// its siblings.
pub struct BatchService<F, X>
where
    F: Fetcher,
    X: PageExtractor,
{
    fetcher: F,
    extractor: X,
    config: BatchConfig,
}

impl<F, X> BatchService<F, X>
where
    F: Fetcher,
    X: PageExtractor,
{
    pub fn new(fetcher: F, extractor: X, config: BatchConfig) -> Self {
        Self {
            fetcher,
            extractor,
            config,
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Fetch and extract a single product.
    ///
    /// A panic inside the extractor is converted to
    /// [`AppError::ExtractionError`].
    pub async fn product(&self, code: &str) -> Result<ProductPage, AppError> {
        let url = self.config.product_url(code);
        let html = self.fetcher.fetch(&url).await?;
        tracing::debug!(%code, bytes = html.len(), "Fetched product page");

        let page = panic::catch_unwind(AssertUnwindSafe(|| {
            self.extractor.extract(code, &url, &html)
        }))
        .map_err(|_| AppError::ExtractionError(format!("extractor panicked on {url}")))??;

        if page.access_denied {
            tracing::warn!(%code, %url, "Page title reports access denied");
        }
        Ok(page)
    }

    /// Run every code through fetch+extract and return one outcome per code.
    ///
    /// At most `concurrency` units are in flight; successive units start at
    /// least `stagger` apart. Units complete in any order, the returned
    /// outcomes follow input order.
    pub async fn run<R: ProgressReporter>(&self, codes: &[String], reporter: &R) -> Vec<BatchOutcome> {
        reporter.report(BatchEvent::Started { total: codes.len() });

        let stagger = self.config.stagger;
        let concurrency = self.config.concurrency.max(1);

        let mut indexed: Vec<(usize, BatchOutcome)> = stream::iter(codes.iter().enumerate())
            .then(move |(index, code)| async move {
                if index > 0 && !stagger.is_zero() {
                    tokio::time::sleep(stagger).await;
                }
                (index, code)
            })
            .map(move |(index, code)| async move {
                let outcome = self.process(code, reporter).await;
                reporter.advance();
                (index, outcome)
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        indexed.sort_by_key(|(index, _)| *index);
        let outcomes: Vec<BatchOutcome> = indexed.into_iter().map(|(_, outcome)| outcome).collect();

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        reporter.report(BatchEvent::Finished {
            succeeded,
            skipped: outcomes.len() - succeeded,
        });

        outcomes
    }

    async fn process<R: ProgressReporter>(&self, code: &str, reporter: &R) -> BatchOutcome {
        match self.product(code).await {
            Ok(page) => {
                reporter.report(BatchEvent::UnitCompleted {
                    code,
                    characteristics: page.characteristics.len(),
                });
                BatchOutcome::Success {
                    code: code.to_string(),
                    page,
                }
            }
            Err(e) => {
                let outcome = BatchOutcome::skipped(code, &e);
                if let BatchOutcome::Skipped { kind, reason, .. } = &outcome {
                    reporter.report(BatchEvent::UnitSkipped {
                        code,
                        kind: *kind,
                        reason,
                    });
                }
                outcome
            }
        }
    }
}
