//! Bounded retries for transport-level fetch failures.
//!
//! Wraps any [`Fetcher`] and replays a request only when the inner fetcher
//! reports a retryable error ([`AppError::is_retryable`]): connection
//! failures and timeouts. HTTP answers, including 403, are returned on the
//! first attempt.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use catalog_core::retry::{RetryConfig, RetryingFetcher};
//!
//! # use catalog_core::traits::Fetcher;
//! # #[derive(Clone)] struct MyFetcher;
//! # impl Fetcher for MyFetcher {
//! #     async fn fetch(&self, _: &str) -> Result<String, catalog_core::error::AppError> { todo!() }
//! # }
//! let fetcher = RetryingFetcher::new(MyFetcher, RetryConfig::new(5, Duration::from_millis(500)));
//! ```

use std::time::Duration;

use crate::error::AppError;
use crate::traits::Fetcher;

/// Configuration for the retrying fetcher.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first one. Zero is treated as one.
    pub max_attempts: u32,

    /// Fixed pause between two attempts.
    pub delay: Duration,
}

impl RetryConfig {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl Default for RetryConfig {
    /// 3 attempts, 1 second apart.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

/// A [`Fetcher`] wrapper that retries transient failures.
#[derive(Clone)]
pub struct RetryingFetcher<F> {
    inner: F,
    config: RetryConfig,
}

impl<F: Fetcher> RetryingFetcher<F> {
    pub fn new(inner: F, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

impl<F: Fetcher> Fetcher for RetryingFetcher<F> {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        let attempts = self.config.attempts();
        let mut attempt = 1;

        loop {
            tracing::debug!(%url, attempt, "Fetching");
            match self.inner.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < attempts => {
                    tracing::warn!(
                        %url,
                        attempt,
                        max_attempts = attempts,
                        error = %e,
                        "Transient fetch failure, retrying"
                    );
                    tokio::time::sleep(self.config.delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_retryable() {
                        tracing::warn!(%url, attempts, error = %e, "Giving up after retries");
                    }
                    return Err(e);
                }
            }
        }
    }
}
