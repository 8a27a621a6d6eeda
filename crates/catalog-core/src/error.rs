use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Application-wide error types for catalog harvesting.
#[derive(Error, Debug)]
pub enum AppError {
    /// The remote explicitly refused the request (HTTP 403).
    #[error("Access denied for {0}")]
    AccessDenied(String),

    /// The remote answered with a definitive non-success status.
    #[error("HTTP {status} for {url}")]
    HttpError { status: u16, url: String },

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// A payload embedded in the page was present but unusable.
    #[error("Extraction error: {0}")]
    ExtractionError(String),

    /// Invalid configuration (URL template, concurrency, selectors).
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Returns true if this error is a transport failure worth retrying.
    ///
    /// HTTP statuses are never retried, including 403.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::NetworkError(_) | AppError::Timeout(_))
    }

    /// Classifies this error for a skipped unit of work.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            AppError::AccessDenied(_) => FailureKind::Denied,
            AppError::HttpError { status, .. } => FailureKind::HttpError(*status),
            AppError::NetworkError(_) | AppError::Timeout(_) => FailureKind::NetworkError,
            AppError::ExtractionError(_) => FailureKind::Extraction,
            AppError::ConfigError(_) => FailureKind::InvalidRequest,
        }
    }
}

/// Why a product code was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Denied,
    HttpError(u16),
    NetworkError,
    Extraction,
    /// The request could not be built (e.g. the code yields an invalid URL).
    InvalidRequest,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Denied => write!(f, "denied"),
            FailureKind::HttpError(status) => write!(f, "http_{status}"),
            FailureKind::NetworkError => write!(f, "network_error"),
            FailureKind::Extraction => write!(f, "extraction"),
            FailureKind::InvalidRequest => write!(f, "invalid_request"),
        }
    }
}
