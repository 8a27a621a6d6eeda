use std::future::Future;

use crate::error::AppError;
use crate::models::ProductPage;

/// Fetches raw HTML content from a URL.
///
/// Errors must be classified: [`AppError::AccessDenied`] and
/// [`AppError::HttpError`] for definitive HTTP answers,
/// [`AppError::NetworkError`]/[`AppError::Timeout`] for transport failures.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Turns the markup of a product page into structured records.
///
/// Implementations are pure: the same input always yields the same page.
/// Missing elements degrade to empty fields; only malformed payloads error.
pub trait PageExtractor: Send + Sync + Clone {
    fn extract(&self, code: &str, url: &str, html: &str) -> Result<ProductPage, AppError>;
}
